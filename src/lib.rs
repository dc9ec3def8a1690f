//! # resolution-verify
//!
//! Turns explained answers of a rule-based reasoner into standalone
//! verification queries. Each query restates, without internal identifiers,
//! everything the answer relied on: the matched statements, identity
//! statements built from key attributes, and one reified `resolution`
//! relation per rule firing in the explanation tree.
//!
//! An independent checker can run these queries against a materialised
//! graph to confirm the reasoner's conclusions.
//!
//! ## Core Concepts
//!
//! - **Pattern**: an order-preserving set of statements about variables
//! - **Answer**: a substitution, the pattern it satisfied, and an optional explanation
//! - **Fact**: one reified property, named by a fresh variable
//! - **Resolution**: a relation linking the body facts of a rule to its head facts
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use resolution_verify::{
//!     Answer, Concept, ConceptId, InMemoryGraph, KeyAttribute, Pattern, Query, Statement,
//!     Variable, VerificationDriver, VerifierConfig,
//! };
//!
//! let x = Variable::named("x");
//! let query = Query::new(Pattern::from(vec![Statement::new(x.clone()).isa("person")]));
//!
//! let graph = InMemoryGraph::new();
//! graph.insert_keys(ConceptId::new("V1"), vec![KeyAttribute::new("name", "alice")]).unwrap();
//! let answer = Answer::new()
//!     .bind(x.clone(), Concept::entity("V1", "person"))
//!     .with_pattern(query.pattern.clone());
//! graph.insert_answers(&query, vec![answer]).unwrap();
//!
//! let graph = Arc::new(graph);
//! let driver = VerificationDriver::new(graph.clone(), graph, VerifierConfig::default()).unwrap();
//! let queries = driver.build_verification_queries(&query).unwrap();
//! assert_eq!(queries[0].query.to_string(), "match\n$x isa person;\n$x has name \"alice\";\nget;");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod answer;
pub mod concept;
pub mod error;
pub mod pattern;
pub mod query;
pub mod value;

// Collaborators and configuration
pub mod config;
pub mod storage;

// Reconstruction pipeline
pub mod verify;

pub use answer::{Answer, Explanation};
pub use concept::{Concept, ConceptId, ConceptKind, KeyAttribute};
pub use config::{FreshScope, VerifierConfig, ID_KEYWORD_MARKER};
pub use error::{ExecutionError, ReconstructionError, Stage, ValidationError, VerifyError, VerifyResult};
pub use pattern::{HasValue, Pattern, Property, RolePlayer, Statement, Variable};
pub use query::{fingerprint, Query, VerificationQuery};
pub use storage::{InMemoryGraph, KeyLookup, LookupError, QueryExecutor};
pub use value::{Literal, Value};
pub use verify::{
    build_inference_facts, key_statements, make_anonymous_explicit, reify_statement, remove_id_statements,
    Fact, FreshVars, IdPropertyPredicate, IdentityPredicate, Reconstructor, RenderedIdMarker,
    VerificationDriver,
};
