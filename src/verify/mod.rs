//! Verification query reconstruction.
//!
//! Each stage is a small pure function over [`Pattern`](crate::Pattern)s; the
//! [`Reconstructor`] composes them recursively over an explanation tree and
//! the [`VerificationDriver`] runs it over every answer of a query.

mod driver;
mod identity;
mod inference;
mod keys;
mod normalize;
mod reconstruct;
mod reify;
pub mod vocab;

pub use driver::VerificationDriver;
pub use identity::{remove_id_statements, IdPropertyPredicate, IdentityPredicate, RenderedIdMarker};
pub use inference::build_inference_facts;
pub use keys::key_statements;
pub use normalize::make_anonymous_explicit;
pub use reconstruct::Reconstructor;
pub use reify::{reify_statement, Fact, FreshVars};
