//! Property reification.
//!
//! Each recognised property of a statement becomes an explicit fact with a
//! fresh subject variable, so a checker can ask generically which properties
//! held on a variable without understanding the original pattern syntax.

use std::collections::HashSet;

use crate::pattern::{Property, Statement, Variable};
use crate::value::Literal;
use crate::verify::vocab::{
    HAS_ATTRIBUTE_PROPERTY, INSTANCE, ISA_PROPERTY, OWNER, REL, RELATION_PROPERTY, ROLEPLAYER,
    ROLE_LABEL, TYPE_LABEL,
};

/// Allocator of fresh variable names.
///
/// Names are `{prefix}{n}` for a monotonically increasing `n`. Reserved names
/// (variables already used by the answer being reconstructed) are skipped, so
/// a fresh variable never collides with a user variable.
///
/// # Examples
///
/// ```
/// use resolution_verify::FreshVars;
///
/// let mut fresh = FreshVars::new("x");
/// fresh.reserve(["x1".to_string()]);
/// assert_eq!(fresh.next_var().name(), "x0");
/// assert_eq!(fresh.next_var().name(), "x2");
/// ```
#[derive(Debug, Clone)]
pub struct FreshVars {
    prefix: String,
    next: u64,
    reserved: HashSet<String>,
}

impl FreshVars {
    /// Creates an allocator starting at `{prefix}0`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            reserved: HashSet::new(),
        }
    }

    /// Marks names that must never be allocated.
    pub fn reserve(&mut self, names: impl IntoIterator<Item = String>) {
        self.reserved.extend(names);
    }

    /// Allocates the next fresh variable.
    pub fn next_var(&mut self) -> Variable {
        loop {
            let name = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if !self.reserved.contains(&name) {
                return Variable::named(name);
            }
        }
    }

    /// Number of indices consumed so far, including skipped reserved names.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.next
    }

    /// Returns the name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// A reified fact and the fresh variable naming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    /// Fresh subject of the fact.
    pub variable: Variable,
    /// The synthesized statement.
    pub statement: Statement,
}

/// Reifies every recognised property of `statement`.
///
/// Facts are returned in property order; relation properties yield one fact
/// per role player. `Value`, `Id` and `Neq` properties are not reified.
pub fn reify_statement(statement: &Statement, fresh: &mut FreshVars) -> Vec<Fact> {
    let subject = statement.subject();
    let mut facts = Vec::new();

    for property in statement.properties() {
        match property {
            Property::Has { attribute_type, value } => {
                let variable = fresh.next_var();
                let fact = Statement::new(variable.clone())
                    .rel(OWNER, subject.clone())
                    .isa(HAS_ATTRIBUTE_PROPERTY)
                    .has(attribute_type.clone(), value.clone());
                facts.push(Fact {
                    variable,
                    statement: fact,
                });
            }
            Property::Relation { role_players } => {
                for role_player in role_players {
                    let variable = fresh.next_var();
                    let mut fact = Statement::new(variable.clone())
                        .rel(REL, subject.clone())
                        .rel(ROLEPLAYER, role_player.player.clone())
                        .isa(RELATION_PROPERTY);
                    if let Some(role) = &role_player.role {
                        fact = fact.has(ROLE_LABEL, Literal::from(role.as_str()));
                    }
                    facts.push(Fact {
                        variable,
                        statement: fact,
                    });
                }
            }
            Property::Isa { type_label } => {
                let variable = fresh.next_var();
                let fact = Statement::new(variable.clone())
                    .rel(INSTANCE, subject.clone())
                    .isa(ISA_PROPERTY)
                    .has(TYPE_LABEL, Literal::from(type_label.as_str()));
                facts.push(Fact {
                    variable,
                    statement: fact,
                });
            }
            Property::Value { .. } | Property::Id { .. } | Property::Neq { .. } => {
                tracing::debug!(
                    subject = subject.name(),
                    property = property.name(),
                    "property kind is not reified"
                );
            }
        }
    }

    for fact in &facts {
        tracing::trace!(fact = %fact.statement, "reified");
    }
    facts
}
