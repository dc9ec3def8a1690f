//! Key statement generation.
//!
//! Re-establishes the identity of every bound instance without internal
//! identifiers: attributes are pinned by their own value, entities and
//! relations by their key attributes.

use std::collections::BTreeMap;

use crate::concept::Concept;
use crate::error::ReconstructionError;
use crate::pattern::{Pattern, Statement, Variable};
use crate::storage::KeyLookup;
use crate::value::{Literal, Value};

/// Builds identity statements for every binding of a substitution.
///
/// Values whose type cannot be expressed as a literal produce no statement.
///
/// # Errors
/// - `TypeConcept` if a variable is bound to a schema-level type
/// - `KeyLookup` if the collaborator fails to enumerate keys
pub fn key_statements(
    substitution: &BTreeMap<Variable, Concept>,
    lookup: &dyn KeyLookup,
) -> Result<Pattern, ReconstructionError> {
    let mut statements = Pattern::new();

    for (variable, concept) in substitution {
        match concept {
            Concept::Attribute { value, .. } => {
                if let Some(literal) = literal_or_skip(variable, value) {
                    statements.insert(Statement::new(variable.clone()).value(literal));
                }
            }
            Concept::Entity { id, .. } | Concept::Relation { id, .. } => {
                let keys = lookup
                    .key_attributes(id)
                    .map_err(|source| ReconstructionError::KeyLookup {
                        variable: variable.name().to_string(),
                        source,
                    })?;
                for key in keys {
                    if let Some(literal) = literal_or_skip(variable, &key.value) {
                        statements.insert(Statement::new(variable.clone()).has(key.type_label, literal));
                    }
                }
            }
            Concept::Type { label } => {
                return Err(ReconstructionError::TypeConcept {
                    variable: variable.name().to_string(),
                    label: label.clone(),
                });
            }
        }
    }

    Ok(statements)
}

fn literal_or_skip(variable: &Variable, value: &Value) -> Option<Literal> {
    let literal = value.to_literal();
    if literal.is_none() {
        tracing::warn!(
            variable = variable.name(),
            value_type = value.type_name(),
            "value type has no literal form; no identity statement emitted"
        );
    }
    literal
}
