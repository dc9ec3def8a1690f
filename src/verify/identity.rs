//! Identity filtering.
//!
//! Internal identifiers are not stable across re-execution, so statements
//! pinning a variable to one must never reach a verification query. The
//! variable's identity is re-established by key statements instead.

use regex::Regex;

use crate::error::ValidationError;
use crate::pattern::{Pattern, Property, Statement};

/// Decides whether a statement references an engine-internal identifier.
pub trait IdentityPredicate: Send + Sync {
    /// Returns true if `statement` must be removed.
    fn is_internal(&self, statement: &Statement) -> bool;
}

/// Matches a regular expression against the statement's rendering.
///
/// Heuristic: the expression sees literals and labels too. See
/// [`ID_KEYWORD_MARKER`](crate::config::ID_KEYWORD_MARKER).
#[derive(Debug, Clone)]
pub struct RenderedIdMarker {
    marker: Regex,
}

impl RenderedIdMarker {
    /// Compiles a marker expression.
    pub fn new(marker: &str) -> Result<Self, ValidationError> {
        let marker = Regex::new(marker).map_err(|e| ValidationError::InvalidConfig {
            field: "id_marker".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { marker })
    }
}

impl IdentityPredicate for RenderedIdMarker {
    fn is_internal(&self, statement: &Statement) -> bool {
        self.marker.is_match(&statement.to_string())
    }
}

/// Structural check: the statement carries an `Id` property. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdPropertyPredicate;

impl IdentityPredicate for IdPropertyPredicate {
    fn is_internal(&self, statement: &Statement) -> bool {
        statement
            .properties()
            .iter()
            .any(|p| matches!(p, Property::Id { .. }))
    }
}

/// Removes statements the predicate flags, keeping all others unchanged.
#[must_use]
pub fn remove_id_statements(pattern: &Pattern, predicate: &dyn IdentityPredicate) -> Pattern {
    pattern.filtered(|statement| {
        let internal = predicate.is_internal(statement);
        if internal {
            tracing::trace!(statement = %statement, "dropping identifier statement");
        }
        !internal
    })
}
