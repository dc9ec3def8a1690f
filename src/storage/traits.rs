//! Collaborator traits for the reasoning engine and its storage.
//!
//! Reconstruction never talks to a database directly. It needs exactly two
//! capabilities, which backends implement:
//! - executing a query with explanations enabled
//! - enumerating the key attributes of an entity or relation
//!
//! Implementations own all locking and transaction discipline. Calls are
//! blocking.

use thiserror::Error;

use crate::answer::Answer;
use crate::concept::{ConceptId, KeyAttribute};
use crate::query::Query;

/// Errors raised by lookup collaborators.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Concept not found.
    #[error("Concept not found: {0}")]
    ConceptNotFound(ConceptId),

    /// The engine rejected or failed to run a query.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Backend error.
    #[error("Lookup backend error: {0}")]
    BackendError(String),
}

/// Executes queries against the reasoning engine.
pub trait QueryExecutor: Send + Sync {
    /// Runs `query` and returns its answers in engine order.
    ///
    /// Answers must carry their pattern and, for inferred answers, their
    /// explanation.
    fn execute(&self, query: &Query) -> Result<Vec<Answer>, LookupError>;
}

/// Enumerates the persistent identity of instances.
pub trait KeyLookup: Send + Sync {
    /// Returns the key attributes of an entity or relation instance.
    fn key_attributes(&self, id: &ConceptId) -> Result<Vec<KeyAttribute>, LookupError>;
}
