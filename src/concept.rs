//! Concept references returned by the reasoning engine.
//!
//! A concept is an opaque handle into the engine's data. Instance concepts
//! (attributes, entities, relations) can be pinned down again by a
//! verification query; schema-level types cannot.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Value;

/// Engine-internal concept identifier.
///
/// These identifiers are not stable across re-execution and must never
/// appear in a verification query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    /// Wraps an identifier reported by the engine.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random identifier in the engine's `V<hex>` shape.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("V{}", Uuid::new_v4().simple()))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConceptId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A persistent identity-establishing attribute of an entity or relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyAttribute {
    /// Label of the key attribute type, e.g. `name`.
    pub type_label: String,
    /// The key's value.
    pub value: Value,
}

impl KeyAttribute {
    /// Creates a key attribute.
    #[must_use]
    pub fn new(type_label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            type_label: type_label.into(),
            value: value.into(),
        }
    }
}

/// Kind of a concept, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    /// An attribute instance.
    Attribute,
    /// An entity instance.
    Entity,
    /// A relation instance.
    Relation,
    /// A schema-level type.
    Type,
}

impl fmt::Display for ConceptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute => write!(f, "attribute"),
            Self::Entity => write!(f, "entity"),
            Self::Relation => write!(f, "relation"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// A concept bound to a variable in an answer.
///
/// # Examples
///
/// ```
/// use resolution_verify::{Concept, ConceptKind};
///
/// let alice = Concept::entity("V1", "person");
/// assert!(alice.is_thing());
/// assert_eq!(alice.kind(), ConceptKind::Entity);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Concept {
    /// An attribute instance carrying its literal value.
    Attribute {
        /// Internal identifier.
        id: ConceptId,
        /// Attribute type label.
        type_label: String,
        /// The attribute's value.
        value: Value,
    },
    /// An entity instance.
    Entity {
        /// Internal identifier.
        id: ConceptId,
        /// Entity type label.
        type_label: String,
    },
    /// A relation instance.
    Relation {
        /// Internal identifier.
        id: ConceptId,
        /// Relation type label.
        type_label: String,
    },
    /// A schema-level type.
    Type {
        /// Type label.
        label: String,
    },
}

impl Concept {
    /// Creates an attribute concept.
    #[must_use]
    pub fn attribute(id: impl Into<ConceptId>, type_label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Attribute {
            id: id.into(),
            type_label: type_label.into(),
            value: value.into(),
        }
    }

    /// Creates an entity concept.
    #[must_use]
    pub fn entity(id: impl Into<ConceptId>, type_label: impl Into<String>) -> Self {
        Self::Entity {
            id: id.into(),
            type_label: type_label.into(),
        }
    }

    /// Creates a relation concept.
    #[must_use]
    pub fn relation(id: impl Into<ConceptId>, type_label: impl Into<String>) -> Self {
        Self::Relation {
            id: id.into(),
            type_label: type_label.into(),
        }
    }

    /// Creates a type concept.
    #[must_use]
    pub fn schema_type(label: impl Into<String>) -> Self {
        Self::Type { label: label.into() }
    }

    /// Returns the concept kind.
    #[must_use]
    pub const fn kind(&self) -> ConceptKind {
        match self {
            Self::Attribute { .. } => ConceptKind::Attribute,
            Self::Entity { .. } => ConceptKind::Entity,
            Self::Relation { .. } => ConceptKind::Relation,
            Self::Type { .. } => ConceptKind::Type,
        }
    }

    /// Returns the internal identifier of an instance concept.
    #[must_use]
    pub const fn id(&self) -> Option<&ConceptId> {
        match self {
            Self::Attribute { id, .. } | Self::Entity { id, .. } | Self::Relation { id, .. } => Some(id),
            Self::Type { .. } => None,
        }
    }

    /// Returns the label of the concept's type (or of the type itself).
    #[must_use]
    pub fn type_label(&self) -> &str {
        match self {
            Self::Attribute { type_label, .. }
            | Self::Entity { type_label, .. }
            | Self::Relation { type_label, .. } => type_label,
            Self::Type { label } => label,
        }
    }

    /// Returns true for instance-level concepts.
    #[must_use]
    pub const fn is_thing(&self) -> bool {
        !matches!(self, Self::Type { .. })
    }
}
