//! Answers and explanations produced by the reasoning engine.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::concept::Concept;
use crate::pattern::{Pattern, Variable};

/// One solution to a query.
///
/// The substitution is ordered by variable name so that key statements are
/// generated in a stable order.
///
/// # Examples
///
/// ```
/// use resolution_verify::{Answer, Concept, Pattern, Statement, Variable};
///
/// let x = Variable::named("x0");
/// let answer = Answer::new()
///     .bind(x.clone(), Concept::entity("V1", "person"))
///     .with_pattern(Pattern::from(vec![Statement::new(x.clone()).isa("person")]));
/// assert!(answer.get(&x).is_some());
/// assert!(!answer.has_explanation());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Answer {
    /// Variable to concept bindings.
    #[serde(with = "bindings", default)]
    pub substitution: BTreeMap<Variable, Concept>,

    /// Statements that held to produce this binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,

    /// How the answer was derived, if it was inferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl Answer {
    /// Creates an empty answer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable to a concept.
    #[must_use]
    pub fn bind(mut self, variable: Variable, concept: Concept) -> Self {
        self.substitution.insert(variable, concept);
        self
    }

    /// Sets the supporting pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.explanation = Some(explanation);
        self
    }

    /// Returns the concept bound to `variable`.
    #[must_use]
    pub fn get(&self, variable: &Variable) -> Option<&Concept> {
        self.substitution.get(variable)
    }

    /// Returns true if the answer carries an explanation.
    #[must_use]
    pub const fn has_explanation(&self) -> bool {
        self.explanation.is_some()
    }

    /// Every variable name used anywhere in this answer's explanation tree.
    ///
    /// Walks the tree with an explicit stack.
    #[must_use]
    pub fn variable_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        let mut stack = vec![self];
        while let Some(answer) = stack.pop() {
            names.extend(answer.substitution.keys().map(|v| v.name().to_string()));
            if let Some(pattern) = &answer.pattern {
                names.extend(pattern.variables().map(|v| v.name().to_string()));
            }
            if let Some(explanation) = &answer.explanation {
                stack.extend(explanation.answers.iter());
            }
        }
        names
    }
}

/// Proof fragment for an inferred answer.
///
/// One premise answer means a single rule firing; several mean a conjunction
/// of independently derived sub-answers with no single attributable rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Explanation {
    /// Label of the rule that fired, if one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Premise answers.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Explanation {
    /// A single rule firing over one premise answer.
    #[must_use]
    pub fn rule(label: impl Into<String>, premise: Answer) -> Self {
        Self {
            rule: Some(label.into()),
            answers: vec![premise],
        }
    }

    /// A conjunction of independently derived premise answers.
    #[must_use]
    pub fn conjunction(answers: Vec<Answer>) -> Self {
        Self { rule: None, answers }
    }

    /// Returns true if exactly one premise answer is present.
    #[must_use]
    pub fn is_single_rule(&self) -> bool {
        self.answers.len() == 1
    }
}

mod bindings {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::concept::Concept;
    use crate::pattern::Variable;

    pub fn serialize<S: Serializer>(map: &BTreeMap<Variable, Concept>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<Variable, Concept>, D::Error> {
        let pairs = Vec::<(Variable, Concept)>::deserialize(d)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Statement;

    fn person(name: &str) -> Statement {
        Statement::new(Variable::named(name)).isa("person")
    }

    #[test]
    fn test_answer_builder() {
        let answer = Answer::new()
            .bind(Variable::named("x"), Concept::entity("V1", "person"))
            .with_pattern(Pattern::from(vec![person("x")]));
        assert_eq!(answer.substitution.len(), 1);
        assert!(answer.pattern.is_some());
        assert!(answer.explanation.is_none());
    }

    #[test]
    fn test_variable_names_walks_premises() {
        let premise = Answer::new()
            .bind(Variable::named("p"), Concept::entity("V2", "person"))
            .with_pattern(Pattern::from(vec![Statement::new(Variable::named("r"))
                .rel("a", Variable::named("q"))]));
        let answer = Answer::new()
            .bind(Variable::named("x"), Concept::entity("V1", "person"))
            .with_explanation(Explanation::rule("r1", premise));

        let names = answer.variable_names();
        for expected in ["x", "p", "r", "q"] {
            assert!(names.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_explanation_shapes() {
        assert!(Explanation::rule("r", Answer::new()).is_single_rule());
        let conj = Explanation::conjunction(vec![Answer::new(), Answer::new()]);
        assert!(!conj.is_single_rule());
        assert!(conj.rule.is_none());
    }

    #[test]
    fn test_answer_serialization() {
        let answer = Answer::new()
            .bind(Variable::named("x"), Concept::attribute("V3", "name", "alice"))
            .with_pattern(Pattern::from(vec![person("x")]))
            .with_explanation(Explanation::conjunction(vec![Answer::new()]));
        let json = serde_json::to_string(&answer).unwrap();
        let decoded: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(answer, decoded);
    }
}
