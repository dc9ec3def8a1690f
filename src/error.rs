//! Error types for verification query reconstruction.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! failing stage. Reconstruction errors are always fatal for the answer they
//! occur in; silent narrowings (unknown literal types, unknown property
//! kinds) never surface here.

use std::fmt;

use thiserror::Error;

use crate::storage::LookupError;

/// Validation errors for configuration and inputs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid configuration field '{field}': {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },
}

/// Stage of the reconstruction pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Checking that an answer carries its pattern and rule label.
    PatternCheck,
    /// Re-establishing instance identity through key attributes.
    KeyStatements,
    /// Descending into premise answers.
    Recursion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternCheck => write!(f, "pattern check"),
            Self::KeyStatements => write!(f, "key statements"),
            Self::Recursion => write!(f, "recursion"),
        }
    }
}

/// Precondition violations found while reconstructing one answer.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("Answer at explanation depth {depth} is missing a pattern; the query was not run with explanations enabled")]
    MissingPattern {
        depth: usize,
    },

    #[error("Single-premise explanation at depth {depth} carries no rule label")]
    MissingRuleLabel {
        depth: usize,
    },

    #[error("Variable ${variable} is bound to type '{label}'; only instances can be verified")]
    TypeConcept {
        variable: String,
        label: String,
    },

    #[error("Key lookup for ${variable} failed: {source}")]
    KeyLookup {
        variable: String,
        #[source]
        source: LookupError,
    },

    #[error("Explanation tree exceeds maximum depth of {max_depth}")]
    DepthExceeded {
        max_depth: usize,
    },
}

impl ReconstructionError {
    /// Returns the pipeline stage that raised this error.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::MissingPattern { .. } | Self::MissingRuleLabel { .. } => Stage::PatternCheck,
            Self::TypeConcept { .. } | Self::KeyLookup { .. } => Stage::KeyStatements,
            Self::DepthExceeded { .. } => Stage::Recursion,
        }
    }
}

/// Worker pool failures in the batch driver.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Reconstruction worker disconnected")]
    Disconnected,

    #[error("Failed to spawn reconstruction worker: {message}")]
    WorkerSpawn {
        message: String,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Query execution failed: {0}")]
    Query(#[source] LookupError),

    #[error("Answer {index} ({stage}): {source}", stage = .source.stage())]
    Answer {
        index: usize,
        #[source]
        source: ReconstructionError,
    },

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl VerifyError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wraps a reconstruction error with the position of its answer.
    #[must_use]
    pub const fn answer(index: usize, source: ReconstructionError) -> Self {
        Self::Answer { index, source }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if an answer violated a reconstruction precondition.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Answer {
                source: ReconstructionError::MissingPattern { .. }
                    | ReconstructionError::MissingRuleLabel { .. }
                    | ReconstructionError::TypeConcept { .. },
                ..
            }
        )
    }

    /// Returns the index of the failing answer, if any.
    #[must_use]
    pub const fn answer_index(&self) -> Option<usize> {
        match self {
            Self::Answer { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result type alias for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;
