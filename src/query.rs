//! Match queries and the verification queries built from answers.
//!
//! A [`VerificationQuery`] is the self-contained artifact handed to an
//! independent checker: one per answer, carrying a stable fingerprint so the
//! checker can deduplicate or cache results across runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::pattern::{Pattern, Statement, Variable};

/// A `match ... get` query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Conjunction to match.
    pub pattern: Pattern,

    /// Variables to return. Empty means all named variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub get: Vec<Variable>,
}

impl Query {
    /// Creates a query returning all named variables.
    #[must_use]
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            get: Vec::new(),
        }
    }

    /// Restricts the returned variables.
    #[must_use]
    pub fn get(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.get = variables.into_iter().collect();
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "match")?;
        if !self.pattern.is_empty() {
            writeln!(f, "{}", self.pattern)?;
        }
        write!(f, "get")?;
        for (i, var) in self.get.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{var}")?;
        }
        write!(f, ";")
    }
}

/// The reconstructed verification query for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationQuery {
    /// Position of the answer in the original query's result.
    pub answer_index: usize,

    /// The query to evaluate.
    pub query: Query,

    /// Hex blake3 digest of the canonical statement renderings.
    pub fingerprint: String,
}

impl VerificationQuery {
    /// Wraps a reconstructed pattern as a verification query.
    #[must_use]
    pub fn new(answer_index: usize, pattern: Pattern) -> Self {
        let fingerprint = fingerprint(&pattern);
        Self {
            answer_index,
            query: Query::new(pattern),
            fingerprint,
        }
    }

    /// Returns the reconstructed statements.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.query.pattern
    }
}

impl fmt::Display for VerificationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

/// Stable digest of a pattern, independent of statement and property order.
///
/// Equal patterns always share a fingerprint.
#[must_use]
pub fn fingerprint(pattern: &Pattern) -> String {
    let mut lines: Vec<String> = pattern.iter().map(canonical_line).collect();
    lines.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

fn canonical_line(statement: &Statement) -> String {
    let mut properties: Vec<String> = statement.properties().iter().map(ToString::to_string).collect();
    properties.sort_unstable();
    format!("{} {};", statement.subject(), properties.join(", "))
}

/// Serialize verification queries to pretty JSON.
pub fn to_json_pretty(queries: &[VerificationQuery]) -> VerifyResult<String> {
    serde_json::to_string_pretty(queries)
        .map_err(|e| VerifyError::internal(format!("serialize verification queries: {e}")))
}

/// Deserialize verification queries from JSON.
pub fn from_json(s: &str) -> VerifyResult<Vec<VerificationQuery>> {
    serde_json::from_str(s)
        .map_err(|e| VerifyError::internal(format!("deserialize verification queries: {e}")))
}
