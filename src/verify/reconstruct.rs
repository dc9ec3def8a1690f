//! Recursive reconstruction of one answer's verification pattern.
//!
//! For an answer the pattern is the union of:
//! - the answer's own statements with internal identifiers removed
//! - identity statements for every binding
//! - for a single rule firing, the premise's reconstruction plus the
//!   reified inference relation between premise and conclusion
//! - for a conjunctive explanation, the reconstruction of every premise
//!
//! Explanation trees are assumed finite and acyclic. Depth is bounded so a
//! malformed tree fails with `DepthExceeded` instead of overflowing the stack.
//! Shared sub-answers are reconstructed each time they appear; their
//! inference facts get fresh names on each visit.

use std::sync::Arc;

use crate::answer::Answer;
use crate::config::{VerifierConfig, DEFAULT_MAX_DEPTH};
use crate::error::{ReconstructionError, ValidationError};
use crate::pattern::Pattern;
use crate::storage::KeyLookup;
use crate::verify::identity::{remove_id_statements, IdPropertyPredicate, IdentityPredicate, RenderedIdMarker};
use crate::verify::inference::build_inference_facts;
use crate::verify::keys::key_statements;
use crate::verify::reify::FreshVars;

/// Reconstructs verification patterns from explained answers.
#[derive(Clone)]
pub struct Reconstructor {
    lookup: Arc<dyn KeyLookup>,
    identity: Arc<dyn IdentityPredicate>,
    max_depth: usize,
    fresh_prefix: String,
}

impl Reconstructor {
    /// Creates a reconstructor with the structural identity predicate and the
    /// default depth bound and fresh prefix.
    #[must_use]
    pub fn new(lookup: Arc<dyn KeyLookup>) -> Self {
        Self {
            lookup,
            identity: Arc::new(IdPropertyPredicate),
            max_depth: DEFAULT_MAX_DEPTH,
            fresh_prefix: "x".to_string(),
        }
    }

    /// Creates a reconstructor from a validated configuration.
    pub fn from_config(lookup: Arc<dyn KeyLookup>, config: &VerifierConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let identity: Arc<dyn IdentityPredicate> = match &config.id_marker {
            Some(marker) => Arc::new(RenderedIdMarker::new(marker)?),
            None => Arc::new(IdPropertyPredicate),
        };
        Ok(Self {
            lookup,
            identity,
            max_depth: config.max_depth,
            fresh_prefix: config.fresh_prefix.clone(),
        })
    }

    /// Replaces the identity predicate.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityPredicate>) -> Self {
        self.identity = identity;
        self
    }

    /// Sets the maximum explanation depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the fresh variable prefix.
    #[must_use]
    pub fn with_fresh_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fresh_prefix = prefix.into();
        self
    }

    /// Returns the fresh variable prefix.
    #[must_use]
    pub fn fresh_prefix(&self) -> &str {
        &self.fresh_prefix
    }

    /// Reconstructs `answer` with a fresh-variable scope of its own.
    pub fn reconstruct(&self, answer: &Answer) -> Result<Pattern, ReconstructionError> {
        let mut fresh = FreshVars::new(self.fresh_prefix.clone());
        self.reconstruct_with(answer, &mut fresh)
    }

    /// Reconstructs `answer`, drawing fresh variables from `fresh`.
    ///
    /// Every variable name in the answer tree is reserved in `fresh` first.
    /// Sharing one allocator across answers yields the batch-wide numbering.
    pub fn reconstruct_with(&self, answer: &Answer, fresh: &mut FreshVars) -> Result<Pattern, ReconstructionError> {
        fresh.reserve(answer.variable_names());
        let statements = self.walk(answer, 0, fresh)?;
        tracing::debug!(
            statements = statements.len(),
            fresh_consumed = fresh.consumed(),
            "reconstructed answer"
        );
        Ok(statements)
    }

    /// Builds the inference facts for one rule application in isolation.
    #[must_use]
    pub fn build_inference_facts(&self, when: &Pattern, then: &Pattern, rule_label: &str) -> Pattern {
        let mut fresh = FreshVars::new(self.fresh_prefix.clone());
        fresh.reserve(when.variables().chain(then.variables()).map(|v| v.name().to_string()));
        build_inference_facts(when, then, rule_label, &mut fresh)
    }

    fn walk(&self, answer: &Answer, depth: usize, fresh: &mut FreshVars) -> Result<Pattern, ReconstructionError> {
        if depth > self.max_depth {
            return Err(ReconstructionError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        let then = answer
            .pattern
            .as_ref()
            .ok_or(ReconstructionError::MissingPattern { depth })?;

        let mut statements = remove_id_statements(then, self.identity.as_ref());
        statements.absorb(key_statements(&answer.substitution, self.lookup.as_ref())?);

        let Some(explanation) = &answer.explanation else {
            return Ok(statements);
        };

        if let [premise] = explanation.answers.as_slice() {
            let rule = explanation
                .rule
                .as_deref()
                .ok_or(ReconstructionError::MissingRuleLabel { depth })?;
            statements.absorb(self.walk(premise, depth + 1, fresh)?);
            let when = premise
                .pattern
                .as_ref()
                .ok_or(ReconstructionError::MissingPattern { depth: depth + 1 })?;
            statements.absorb(build_inference_facts(when, then, rule, fresh));
        } else {
            for premise in &explanation.answers {
                statements.absorb(self.walk(premise, depth + 1, fresh)?);
            }
        }

        Ok(statements)
    }
}

impl std::fmt::Debug for Reconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconstructor")
            .field("max_depth", &self.max_depth)
            .field("fresh_prefix", &self.fresh_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Explanation;
    use crate::concept::{Concept, ConceptId, KeyAttribute};
    use crate::pattern::{Property, Statement, Variable};
    use crate::storage::InMemoryGraph;
    use crate::value::Literal;
    use crate::verify::vocab::RESOLUTION;

    fn var(name: &str) -> Variable {
        Variable::named(name)
    }

    fn graph() -> Arc<InMemoryGraph> {
        let graph = InMemoryGraph::new();
        graph
            .insert_keys(ConceptId::new("V1"), vec![KeyAttribute::new("name", "alice")])
            .unwrap();
        graph
            .insert_keys(ConceptId::new("V2"), vec![KeyAttribute::new("name", "bob")])
            .unwrap();
        Arc::new(graph)
    }

    fn leaf(name: &str, id: &str) -> Answer {
        Answer::new()
            .bind(var(name), Concept::entity(id, "person"))
            .with_pattern(Pattern::from(vec![Statement::new(var(name)).isa("person")]))
    }

    fn resolution_count(pattern: &Pattern) -> usize {
        pattern
            .iter()
            .filter(|s| s.properties().contains(&Property::isa(RESOLUTION)))
            .count()
    }

    #[test]
    fn test_leaf_answer() {
        let r = Reconstructor::new(graph());
        let out = r.reconstruct(&leaf("x0", "V1")).unwrap();
        let expected = Pattern::from(vec![
            Statement::new(var("x0")).isa("person"),
            Statement::new(var("x0")).has("name", Literal::from("alice")),
        ]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_id_statements_are_stripped() {
        let answer = Answer::new()
            .bind(var("x"), Concept::entity("V1", "person"))
            .with_pattern(Pattern::from(vec![
                Statement::new(var("x")).id("V1"),
                Statement::new(var("x")).isa("person"),
            ]));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        assert!(out.iter().all(|s| !s.to_string().contains(" id ")));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_id_lookalikes_survive_reconstruction() {
        let answer = Answer::new()
            .bind(var("id"), Concept::entity("V1", "person"))
            .with_pattern(Pattern::from(vec![
                Statement::new(var("id")).isa("person"),
                Statement::new(var("id")).has("person-id", Literal::from("p1")),
                Statement::new(var("id")).id("V1"),
            ]));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        assert_eq!(
            out.to_string(),
            "$id isa person;\n$id has person-id \"p1\";\n$id has name \"alice\";"
        );

        let config = VerifierConfig {
            id_marker: Some(crate::config::ID_KEYWORD_MARKER.to_string()),
            ..VerifierConfig::default()
        };
        let keyword = Reconstructor::from_config(graph(), &config).unwrap();
        assert_eq!(keyword.reconstruct(&answer).unwrap(), out);
    }

    #[test]
    fn test_missing_pattern_is_fatal() {
        let answer = Answer::new().bind(var("x"), Concept::entity("V1", "person"));
        let err = Reconstructor::new(graph()).reconstruct(&answer).unwrap_err();
        assert!(matches!(err, ReconstructionError::MissingPattern { depth: 0 }));
    }

    #[test]
    fn test_missing_premise_pattern_reports_depth() {
        let premise = Answer::new().bind(var("y"), Concept::entity("V2", "person"));
        let answer = leaf("x", "V1").with_explanation(Explanation::rule("r", premise));
        let err = Reconstructor::new(graph()).reconstruct(&answer).unwrap_err();
        assert!(matches!(err, ReconstructionError::MissingPattern { depth: 1 }));
    }

    #[test]
    fn test_single_premise_without_rule_label() {
        let answer = leaf("x", "V1").with_explanation(Explanation {
            rule: None,
            answers: vec![leaf("y", "V2")],
        });
        let err = Reconstructor::new(graph()).reconstruct(&answer).unwrap_err();
        assert!(matches!(err, ReconstructionError::MissingRuleLabel { depth: 0 }));
    }

    #[test]
    fn test_single_premise_adds_resolution() {
        let answer = leaf("x", "V1").with_explanation(Explanation::rule("r", leaf("y", "V2")));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        assert_eq!(resolution_count(&out), 1);
        assert!(out.contains(&Statement::new(var("y")).has("name", Literal::from("bob"))));
    }

    #[test]
    fn test_conjunction_adds_no_resolution() {
        let answer = leaf("x", "V1").with_explanation(Explanation::conjunction(vec![
            leaf("x", "V1"),
            leaf("y", "V2"),
        ]));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        assert_eq!(resolution_count(&out), 0);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_empty_explanation_is_base_only() {
        let answer = leaf("x", "V1").with_explanation(Explanation::conjunction(Vec::new()));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_depth_bound() {
        let mut answer = leaf("x", "V1");
        for _ in 0..5 {
            answer = leaf("x", "V1").with_explanation(Explanation::rule("r", answer));
        }
        let r = Reconstructor::new(graph()).with_max_depth(4);
        let err = r.reconstruct(&answer).unwrap_err();
        assert!(matches!(err, ReconstructionError::DepthExceeded { max_depth: 4 }));

        let r = Reconstructor::new(graph()).with_max_depth(5);
        assert!(r.reconstruct(&answer).is_ok());
    }

    #[test]
    fn test_fresh_names_avoid_user_variables() {
        let answer = leaf("x0", "V1").with_explanation(Explanation::rule("r", leaf("x1", "V2")));
        let out = Reconstructor::new(graph()).reconstruct(&answer).unwrap();
        // x0 and x1 are user variables; reified facts start at x2.
        let fresh: Vec<&str> = out
            .iter()
            .map(|s| s.subject().name())
            .filter(|n| *n != "x0" && *n != "x1")
            .collect();
        assert_eq!(fresh, vec!["x2", "x3", "x4"]);
    }

    #[test]
    fn test_type_binding_fails() {
        let answer = Answer::new()
            .bind(var("t"), Concept::schema_type("person"))
            .with_pattern(Pattern::new());
        let err = Reconstructor::new(graph()).reconstruct(&answer).unwrap_err();
        assert!(matches!(err, ReconstructionError::TypeConcept { .. }));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = VerifierConfig {
            max_depth: 0,
            ..VerifierConfig::default()
        };
        assert!(Reconstructor::from_config(graph(), &config).is_err());
    }
}
