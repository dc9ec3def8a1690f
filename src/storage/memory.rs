//! In-memory lookup backend.
//!
//! Thread-safe implementation of both collaborator traits over canned data:
//! answers are registered per rendered query and key attributes per concept.
//! It is intended for embedded usage, tests, and as a reference
//! implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::answer::Answer;
use crate::concept::{ConceptId, KeyAttribute};
use crate::query::Query;
use crate::storage::traits::{KeyLookup, LookupError, QueryExecutor};

fn lock_err(context: &'static str) -> LookupError {
    LookupError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory graph of canned answers and key attributes.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    answers: RwLock<HashMap<String, Vec<Answer>>>,
    keys: RwLock<HashMap<ConceptId, Vec<KeyAttribute>>>,
    executions: AtomicUsize,
    key_lookups: AtomicUsize,
}

impl InMemoryGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the answers returned for `query`, replacing earlier ones.
    pub fn insert_answers(&self, query: &Query, answers: Vec<Answer>) -> Result<(), LookupError> {
        let mut state = self.answers.write().map_err(|_| lock_err("answers.insert"))?;
        state.insert(query.to_string(), answers);
        Ok(())
    }

    /// Registers the key attributes of an instance, replacing earlier ones.
    ///
    /// Instances without keys must still be registered (with an empty list).
    pub fn insert_keys(&self, id: ConceptId, keys: Vec<KeyAttribute>) -> Result<(), LookupError> {
        let mut state = self.keys.write().map_err(|_| lock_err("keys.insert"))?;
        state.insert(id, keys);
        Ok(())
    }

    /// Number of `execute` calls served.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }

    /// Number of `key_attributes` calls served.
    #[must_use]
    pub fn key_lookup_count(&self) -> usize {
        self.key_lookups.load(Ordering::Relaxed)
    }
}

impl QueryExecutor for InMemoryGraph {
    fn execute(&self, query: &Query) -> Result<Vec<Answer>, LookupError> {
        self.executions.fetch_add(1, Ordering::Relaxed);
        let state = self.answers.read().map_err(|_| lock_err("answers.execute"))?;
        Ok(state.get(&query.to_string()).cloned().unwrap_or_default())
    }
}

impl KeyLookup for InMemoryGraph {
    fn key_attributes(&self, id: &ConceptId) -> Result<Vec<KeyAttribute>, LookupError> {
        self.key_lookups.fetch_add(1, Ordering::Relaxed);
        let state = self.keys.read().map_err(|_| lock_err("keys.get"))?;
        state
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::ConceptNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Pattern, Statement, Variable};

    fn query() -> Query {
        Query::new(Pattern::from(vec![Statement::new(Variable::named("x")).isa("person")]))
    }

    #[test]
    fn test_execute_returns_registered_answers() {
        let graph = InMemoryGraph::new();
        graph.insert_answers(&query(), vec![Answer::new(), Answer::new()]).unwrap();
        assert_eq!(graph.execute(&query()).unwrap().len(), 2);
        assert_eq!(graph.execution_count(), 1);
    }

    #[test]
    fn test_execute_unknown_query_is_empty() {
        let graph = InMemoryGraph::new();
        assert!(graph.execute(&query()).unwrap().is_empty());
    }

    #[test]
    fn test_key_attributes_roundtrip() {
        let graph = InMemoryGraph::new();
        let id = ConceptId::new("V1");
        graph
            .insert_keys(id.clone(), vec![KeyAttribute::new("name", "alice")])
            .unwrap();
        let keys = graph.key_attributes(&id).unwrap();
        assert_eq!(keys, vec![KeyAttribute::new("name", "alice")]);
        assert_eq!(graph.key_lookup_count(), 1);
    }

    #[test]
    fn test_key_attributes_unknown_concept() {
        let graph = InMemoryGraph::new();
        let err = graph.key_attributes(&ConceptId::new("V404")).unwrap_err();
        assert!(matches!(err, LookupError::ConceptNotFound(_)));
    }
}
