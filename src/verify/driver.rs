//! Batch driver: one verification query per answer of a query.
//!
//! The driver executes the (optionally normalized) query with explanations,
//! then reconstructs every answer. Results keep the executor's answer order.
//!
//! With more than one worker, answers are fanned out over a bounded channel to
//! named scoped threads; a full queue blocks the feeder until a worker frees a
//! slot. Parallel batches require per-answer fresh scopes so the output does
//! not depend on scheduling.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded};

use crate::answer::Answer;
use crate::config::{FreshScope, VerifierConfig};
use crate::error::{ExecutionError, ReconstructionError, VerifyError, VerifyResult};
use crate::pattern::Pattern;
use crate::query::{Query, VerificationQuery};
use crate::storage::{KeyLookup, QueryExecutor};
use crate::verify::identity::IdentityPredicate;
use crate::verify::normalize::make_anonymous_explicit;
use crate::verify::reconstruct::Reconstructor;
use crate::verify::reify::FreshVars;

type Reconstruction = Result<Pattern, ReconstructionError>;

/// Builds verification queries for every answer of a query.
pub struct VerificationDriver {
    executor: Arc<dyn QueryExecutor>,
    reconstructor: Reconstructor,
    config: VerifierConfig,
}

impl VerificationDriver {
    /// Creates a driver after validating `config`.
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        lookup: Arc<dyn KeyLookup>,
        config: VerifierConfig,
    ) -> VerifyResult<Self> {
        let reconstructor = Reconstructor::from_config(lookup, &config)?;
        Ok(Self {
            executor,
            reconstructor,
            config,
        })
    }

    /// Replaces the identity predicate used to filter answer patterns.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityPredicate>) -> Self {
        self.reconstructor = self.reconstructor.with_identity(identity);
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Returns the reconstructor used for single answers.
    #[must_use]
    pub const fn reconstructor(&self) -> &Reconstructor {
        &self.reconstructor
    }

    /// Builds one verification query per answer, failing on the first
    /// (lowest-index) answer that violates a precondition.
    ///
    /// # Errors
    /// - `Query` if the executor fails
    /// - `Answer` carrying the index of the first failing answer
    /// - `Execution` if the worker pool cannot run the batch
    pub fn build_verification_queries(&self, query: &Query) -> VerifyResult<Vec<VerificationQuery>> {
        self.build_each(query)?.into_iter().collect()
    }

    /// Builds one result per answer, so a single bad answer does not discard
    /// the rest of the batch.
    pub fn build_each(&self, query: &Query) -> VerifyResult<Vec<VerifyResult<VerificationQuery>>> {
        let answers = self.execute(query)?;
        self.build_from_answers(&answers)
    }

    /// Builds one result per answer for answers obtained elsewhere.
    pub fn build_from_answers(&self, answers: &[Answer]) -> VerifyResult<Vec<VerifyResult<VerificationQuery>>> {
        let reconstructions = if self.config.workers > 1 && answers.len() > 1 {
            self.reconstruct_parallel(answers)?
        } else {
            self.reconstruct_sequential(answers)
        };

        let results: Vec<VerifyResult<VerificationQuery>> = reconstructions
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result
                    .map(|pattern| VerificationQuery::new(index, pattern))
                    .map_err(|source| VerifyError::answer(index, source))
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(
            answers = results.len(),
            failed,
            workers = self.config.workers,
            "verification batch complete"
        );
        Ok(results)
    }

    fn execute(&self, query: &Query) -> VerifyResult<Vec<Answer>> {
        let result = if self.config.normalize_query {
            let normalized = Query {
                pattern: make_anonymous_explicit(&query.pattern),
                get: query.get.clone(),
            };
            self.executor.execute(&normalized)
        } else {
            self.executor.execute(query)
        };
        let answers = result.map_err(VerifyError::Query)?;

        tracing::debug!(answers = answers.len(), "executed query with explanations");
        Ok(answers)
    }

    fn fresh_for(&self, index: usize) -> FreshVars {
        FreshVars::new(format!("{}{}_", self.config.fresh_prefix, index))
    }

    fn reconstruct_one(&self, index: usize, answer: &Answer, fresh: &mut FreshVars) -> Reconstruction {
        let span = tracing::debug_span!("reconstruct", answer = index);
        let _guard = span.enter();
        self.reconstructor.reconstruct_with(answer, fresh)
    }

    fn reconstruct_sequential(&self, answers: &[Answer]) -> Vec<Reconstruction> {
        match self.config.fresh_scope {
            FreshScope::Shared => {
                let mut fresh = FreshVars::new(self.config.fresh_prefix.clone());
                answers
                    .iter()
                    .enumerate()
                    .map(|(index, answer)| self.reconstruct_one(index, answer, &mut fresh))
                    .collect()
            }
            FreshScope::PerAnswer => answers
                .iter()
                .enumerate()
                .map(|(index, answer)| self.reconstruct_one(index, answer, &mut self.fresh_for(index)))
                .collect(),
        }
    }

    fn reconstruct_parallel(&self, answers: &[Answer]) -> Result<Vec<Reconstruction>, ExecutionError> {
        let capacity = self.config.queue_capacity;
        let workers = self.config.workers.min(answers.len());

        thread::scope(|scope| {
            let (job_tx, job_rx) = bounded::<(usize, &Answer)>(capacity);
            let (out_tx, out_rx) = unbounded::<(usize, Reconstruction)>();

            for idx in 0..workers {
                let rx = job_rx.clone();
                let tx = out_tx.clone();
                thread::Builder::new()
                    .name(format!("verify-worker-{idx}"))
                    .spawn_scoped(scope, move || {
                        for (index, answer) in rx {
                            let result = self.reconstruct_one(index, answer, &mut self.fresh_for(index));
                            if tx.send((index, result)).is_err() {
                                break;
                            }
                        }
                    })
                    .map_err(|e| ExecutionError::WorkerSpawn {
                        message: e.to_string(),
                    })?;
            }
            drop(out_tx);

            for job in answers.iter().enumerate() {
                job_tx.send(job).map_err(|_| ExecutionError::Disconnected)?;
            }
            // Close the queue: workers drain it, then exit.
            drop(job_tx);

            let mut slots: Vec<Option<Reconstruction>> = answers.iter().map(|_| None).collect();
            for (index, result) in out_rx {
                slots[index] = Some(result);
            }
            slots
                .into_iter()
                .map(|slot| slot.ok_or(ExecutionError::Disconnected))
                .collect()
        })
    }
}

impl std::fmt::Debug for VerificationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationDriver")
            .field("reconstructor", &self.reconstructor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Explanation;
    use crate::concept::{Concept, ConceptId, KeyAttribute};
    use crate::error::ValidationError;
    use crate::pattern::{Statement, Variable};
    use crate::storage::{InMemoryGraph, LookupError};

    fn var(name: &str) -> Variable {
        Variable::named(name)
    }

    fn person_query() -> Query {
        Query::new(Pattern::from(vec![Statement::new(var("x")).isa("person")])).get([var("x")])
    }

    fn person(id: &str) -> Answer {
        Answer::new()
            .bind(var("x"), Concept::entity(id, "person"))
            .with_pattern(Pattern::from(vec![
                Statement::new(var("x")).isa("person"),
                Statement::new(var("x")).id(id),
            ]))
    }

    fn graph_with(answers: Vec<Answer>) -> Arc<InMemoryGraph> {
        let graph = InMemoryGraph::new();
        for i in 0..answers.len() {
            graph
                .insert_keys(ConceptId::new(format!("V{i}")), vec![KeyAttribute::new("name", format!("p{i}"))])
                .unwrap();
        }
        graph.insert_answers(&person_query(), answers).unwrap();
        Arc::new(graph)
    }

    fn driver(graph: &Arc<InMemoryGraph>, config: VerifierConfig) -> VerificationDriver {
        VerificationDriver::new(graph.clone(), graph.clone(), config).unwrap()
    }

    #[test]
    fn test_one_query_per_answer_in_order() {
        let answers: Vec<Answer> = (0..3).map(|i| person(&format!("V{i}"))).collect();
        let graph = graph_with(answers);
        let queries = driver(&graph, VerifierConfig::default())
            .build_verification_queries(&person_query())
            .unwrap();

        assert_eq!(queries.len(), 3);
        for (i, q) in queries.iter().enumerate() {
            assert_eq!(q.answer_index, i);
            let rendered = q.query.to_string();
            assert!(rendered.contains(&format!("$x has name \"p{i}\";")));
            assert!(!rendered.contains(" id "));
        }
        assert_eq!(graph.execution_count(), 1);
    }

    #[test]
    fn test_empty_result_set() {
        let graph = Arc::new(InMemoryGraph::new());
        let queries = driver(&graph, VerifierConfig::default())
            .build_verification_queries(&person_query())
            .unwrap();
        assert!(queries.is_empty());
    }

    #[test]
    fn test_first_failing_answer_is_reported() {
        let bad = Answer::new().bind(var("x"), Concept::schema_type("person")).with_pattern(Pattern::new());
        let answers = vec![person("V0"), person("V1"), bad];
        let graph = graph_with(answers);
        let err = driver(&graph, VerifierConfig::default())
            .build_verification_queries(&person_query())
            .unwrap_err();
        assert_eq!(err.answer_index(), Some(2));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_build_each_keeps_good_answers() {
        let missing = Answer::new().bind(var("x"), Concept::entity("V1", "person"));
        let graph = graph_with(vec![person("V0"), missing]);
        let results = driver(&graph, VerifierConfig::default())
            .build_each(&person_query())
            .unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(VerifyError::Answer {
                index: 1,
                source: ReconstructionError::MissingPattern { depth: 0 }
            })
        ));
    }

    #[test]
    fn test_executor_failure() {
        struct Failing;
        impl QueryExecutor for Failing {
            fn execute(&self, _query: &Query) -> Result<Vec<Answer>, LookupError> {
                Err(LookupError::QueryFailed("boom".to_string()))
            }
        }
        let graph = Arc::new(InMemoryGraph::new());
        let driver = VerificationDriver::new(Arc::new(Failing), graph, VerifierConfig::default()).unwrap();
        let err = driver.build_verification_queries(&person_query()).unwrap_err();
        assert!(matches!(err, VerifyError::Query(LookupError::QueryFailed(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let graph = Arc::new(InMemoryGraph::new());
        let config = VerifierConfig {
            workers: 2,
            ..VerifierConfig::default()
        };
        let err = VerificationDriver::new(graph.clone(), graph, config).unwrap_err();
        assert!(matches!(err, VerifyError::Validation(ValidationError::InvalidConfig { .. })));
    }

    #[test]
    fn test_query_is_normalized_before_execution() {
        let anon = Variable::anonymous();
        let query = Query::new(Pattern::from(vec![Statement::new(anon).rel("a", var("x")).isa("pair")]));
        let normalized = Query::new(make_anonymous_explicit(&query.pattern));

        let graph = InMemoryGraph::new();
        graph.insert_keys(ConceptId::new("V0"), Vec::new()).unwrap();
        graph.insert_answers(&normalized, vec![person("V0")]).unwrap();
        let graph = Arc::new(graph);

        let queries = driver(&graph, VerifierConfig::default())
            .build_verification_queries(&query)
            .unwrap();
        assert_eq!(queries.len(), 1);

        let config = VerifierConfig {
            normalize_query: false,
            ..VerifierConfig::default()
        };
        let queries = driver(&graph, config).build_verification_queries(&query).unwrap();
        assert!(queries.is_empty());
    }

    #[test]
    fn test_shared_scope_numbers_across_answers() {
        let explained = |id: &str| person(id).with_explanation(Explanation::rule("r", person(id)));
        let graph = graph_with(vec![explained("V0"), explained("V1")]);
        let queries = driver(&graph, VerifierConfig::default())
            .build_verification_queries(&person_query())
            .unwrap();
        // Each answer reifies one body fact, one head fact and a resolution.
        assert!(queries[0].query.to_string().contains("$x2 "));
        assert!(queries[1].query.to_string().contains("$x3 "));
        assert!(!queries[1].query.to_string().contains("$x0 "));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let explained = |id: &str| person(id).with_explanation(Explanation::rule("r", person(id)));
        let answers: Vec<Answer> = (0..8).map(|i| explained(&format!("V{i}"))).collect();
        let graph = graph_with(answers);

        let sequential = VerifierConfig {
            fresh_scope: FreshScope::PerAnswer,
            ..VerifierConfig::default()
        };
        let parallel = VerifierConfig {
            workers: 3,
            ..sequential.clone()
        };
        let a = driver(&graph, sequential).build_verification_queries(&person_query()).unwrap();
        let b = driver(&graph, parallel).build_verification_queries(&person_query()).unwrap();
        assert_eq!(a, b);
        assert!(a[5].query.to_string().contains("$x5_0 "));
    }

    #[test]
    fn test_parallel_batch_larger_than_queue() {
        let explained = |id: &str| person(id).with_explanation(Explanation::rule("r", person(id)));
        let answers: Vec<Answer> = (0..9).map(|i| explained(&format!("V{i}"))).collect();
        let graph = graph_with(answers);

        let sequential = VerifierConfig {
            queue_capacity: 2,
            fresh_scope: FreshScope::PerAnswer,
            ..VerifierConfig::default()
        };
        let parallel = VerifierConfig {
            workers: 2,
            ..sequential.clone()
        };
        let a = driver(&graph, sequential).build_verification_queries(&person_query()).unwrap();
        let b = driver(&graph, parallel).build_verification_queries(&person_query()).unwrap();
        assert_eq!(b.len(), 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_single_slot_queue() {
        let answers: Vec<Answer> = (0..5).map(|i| person(&format!("V{i}"))).collect();
        let graph = graph_with(answers);
        let config = VerifierConfig {
            workers: 3,
            queue_capacity: 1,
            fresh_scope: FreshScope::PerAnswer,
            ..VerifierConfig::default()
        };
        let queries = driver(&graph, config).build_verification_queries(&person_query()).unwrap();
        let indices: Vec<usize> = queries.iter().map(|q| q.answer_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
