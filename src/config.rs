//! Verifier configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, VerifyError, VerifyResult};

/// Conservative default bound on explanation depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Rendered form of the identifier keyword, for use as an `id_marker`.
///
/// Matches `$x id V1;` but not `$x has person-id "p1";` or `$id isa person;`.
/// An attribute type literally named `id` still trips it.
pub const ID_KEYWORD_MARKER: &str = " id ";

/// How fresh variable names are scoped across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshScope {
    /// One counter shared by every answer in the batch.
    #[default]
    Shared,
    /// An independent namespace per answer (`{prefix}{answer}_{n}`).
    PerAnswer,
}

/// Verifier configuration.
///
/// # Examples
///
/// ```
/// use resolution_verify::{FreshScope, VerifierConfig};
///
/// let config = VerifierConfig::from_json(r#"{"workers": 4, "fresh_scope": "per_answer"}"#).unwrap();
/// assert_eq!(config.workers, 4);
/// assert_eq!(config.fresh_scope, FreshScope::PerAnswer);
/// assert_eq!(config.fresh_prefix, "x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Maximum explanation depth before reconstruction fails.
    pub max_depth: usize,
    /// Prefix of fresh variable names.
    pub fresh_prefix: String,
    /// Fresh variable scoping across a batch.
    pub fresh_scope: FreshScope,
    /// Number of reconstruction workers. 1 runs inline.
    pub workers: usize,
    /// Maximum queued answers per batch when running on workers.
    pub queue_capacity: usize,
    /// Make anonymous subjects explicit before executing the original query.
    pub normalize_query: bool,
    /// Regular expression over a statement's rendering marking statements
    /// that pin internal identifiers. `None` checks for an `Id` property
    /// structurally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_marker: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fresh_prefix: "x".to_string(),
            fresh_scope: FreshScope::Shared,
            workers: 1,
            queue_capacity: 1024,
            normalize_query: true,
            id_marker: None,
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.into(),
    }
}

impl VerifierConfig {
    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(s: &str) -> VerifyResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| invalid("<root>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field ranges and cross-field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be at least 1"));
        }
        validate_prefix(&self.fresh_prefix)?;
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("queue_capacity", "must be at least 1"));
        }
        if self.workers > 1 && self.fresh_scope == FreshScope::Shared {
            return Err(invalid(
                "fresh_scope",
                "parallel workers require per_answer fresh variable scope",
            ));
        }
        if let Some(marker) = &self.id_marker {
            regex::Regex::new(marker).map_err(|e| invalid("id_marker", e.to_string()))?;
        }
        Ok(())
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let Some(first) = prefix.chars().next() else {
        return Err(ValidationError::MissingField {
            field: "fresh_prefix".to_string(),
        });
    };
    if !first.is_ascii_alphabetic() {
        return Err(invalid("fresh_prefix", "must start with an ASCII letter"));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid("fresh_prefix", "may only contain [A-Za-z0-9_-]"));
    }
    Ok(())
}
