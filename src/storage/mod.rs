//! Lookup collaborators.
//!
//! These traits define the abstract interface to the reasoning engine and
//! its storage. An in-memory reference backend is provided.

mod memory;
mod traits;

pub use memory::InMemoryGraph;
pub use traits::{KeyLookup, LookupError, QueryExecutor};
