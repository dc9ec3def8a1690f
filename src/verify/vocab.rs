//! Schema labels of the reified verification facts.
//!
//! A checker evaluating verification queries needs these types and roles in
//! its schema.

/// Fact type for a reified `has` property.
pub const HAS_ATTRIBUTE_PROPERTY: &str = "has-attribute-property";
/// Fact type for one reified role player edge.
pub const RELATION_PROPERTY: &str = "relation-property";
/// Fact type for a reified `isa` property.
pub const ISA_PROPERTY: &str = "isa-property";
/// Relation type linking a rule's body facts to its head facts.
pub const RESOLUTION: &str = "resolution";

/// Attribute carrying the label of the rule that fired.
pub const RULE_LABEL: &str = "rule-label";
/// Attribute carrying the role label of a reified role player edge.
pub const ROLE_LABEL: &str = "role-label";
/// Attribute carrying the type label of a reified `isa`.
pub const TYPE_LABEL: &str = "type-label";

/// Role of the attribute owner in a `has-attribute-property`.
pub const OWNER: &str = "owner";
/// Role of the relation instance in a `relation-property`.
pub const REL: &str = "rel";
/// Role of the player in a `relation-property`.
pub const ROLEPLAYER: &str = "roleplayer";
/// Role of the typed instance in an `isa-property`.
pub const INSTANCE: &str = "instance";
/// Role of a premise fact in a `resolution`.
pub const BODY: &str = "body";
/// Role of a conclusion fact in a `resolution`.
pub const HEAD: &str = "head";
