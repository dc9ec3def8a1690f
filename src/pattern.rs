//! Pattern model: variables, properties, statements and patterns.
//!
//! These types are plain data with structural equality. A [`Pattern`] is a
//! conjunction of statements with set semantics: inserting a statement that is
//! already present is a no-op, so reconstructing the same sub-explanation
//! twice never duplicates facts. Iteration follows insertion order, which
//! keeps fresh-variable numbering and rendering deterministic.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::concept::ConceptId;
use crate::value::Literal;

/// A pattern variable.
///
/// Equality, ordering and hashing use the name only; the `returned` flag
/// controls rendering.
///
/// # Examples
///
/// ```
/// use resolution_verify::Variable;
///
/// let x = Variable::named("x");
/// assert_eq!(x.to_string(), "$x");
///
/// let anon = Variable::anonymous();
/// assert_eq!(anon.to_string(), "$_");
/// assert_eq!(anon.as_returned().to_string(), format!("${}", anon.name()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(default = "default_returned")]
    returned: bool,
}

const fn default_returned() -> bool {
    true
}

impl Variable {
    /// Creates a named (user-visible) variable.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returned: true,
        }
    }

    /// Creates an anonymous variable with a generated unique name.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            name: format!("anon-{}", Uuid::new_v4().simple()),
            returned: false,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the variable is user-visible.
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        self.returned
    }

    /// Returns the same variable marked as user-visible.
    #[must_use]
    pub fn as_returned(&self) -> Self {
        Self {
            name: self.name.clone(),
            returned: true,
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.returned {
            write!(f, "${}", self.name)
        } else {
            write!(f, "$_")
        }
    }
}

/// Right-hand side of a `has` property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HasValue {
    /// The attribute equals a literal.
    Literal(Literal),
    /// The attribute is bound to another variable.
    Variable(Variable),
}

impl From<Literal> for HasValue {
    fn from(v: Literal) -> Self {
        Self::Literal(v)
    }
}

impl From<Variable> for HasValue {
    fn from(v: Variable) -> Self {
        Self::Variable(v)
    }
}

impl fmt::Display for HasValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Variable(var) => write!(f, "{var}"),
        }
    }
}

/// One role player edge of a relation property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePlayer {
    /// Optional role label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// The player variable.
    pub player: Variable,
}

impl RolePlayer {
    /// Creates a role player with a role label.
    #[must_use]
    pub fn new(role: impl Into<String>, player: Variable) -> Self {
        Self {
            role: Some(role.into()),
            player,
        }
    }

    /// Creates a role player without a role label.
    #[must_use]
    pub const fn unlabelled(player: Variable) -> Self {
        Self { role: None, player }
    }
}

impl fmt::Display for RolePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Some(role) => write!(f, "{role}: {}", self.player),
            None => write!(f, "{}", self.player),
        }
    }
}

/// One facet of a statement's subject.
///
/// Only `Has`, `Isa` and `Relation` are reified; the remaining kinds may
/// appear in engine patterns and are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum Property {
    /// Subject owns an attribute of the given type.
    Has {
        /// Attribute type label.
        attribute_type: String,
        /// Literal value or attribute variable.
        value: HasValue,
    },
    /// Subject is an instance of the named type.
    Isa {
        /// Type label.
        type_label: String,
    },
    /// Subject is a relation connecting the role players.
    Relation {
        /// Ordered role players.
        role_players: Vec<RolePlayer>,
    },
    /// Subject is an attribute equal to a literal.
    Value {
        /// The compared literal.
        literal: Literal,
    },
    /// Subject is pinned to an engine-internal identifier.
    Id {
        /// The internal identifier.
        concept_id: ConceptId,
    },
    /// Subject differs from another variable.
    Neq {
        /// The other variable.
        other: Variable,
    },
}

impl Property {
    /// Creates a `has` property.
    #[must_use]
    pub fn has(attribute_type: impl Into<String>, value: impl Into<HasValue>) -> Self {
        Self::Has {
            attribute_type: attribute_type.into(),
            value: value.into(),
        }
    }

    /// Creates an `isa` property.
    #[must_use]
    pub fn isa(type_label: impl Into<String>) -> Self {
        Self::Isa {
            type_label: type_label.into(),
        }
    }

    /// Returns a short stable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Has { .. } => "has",
            Self::Isa { .. } => "isa",
            Self::Relation { .. } => "relation",
            Self::Value { .. } => "value",
            Self::Id { .. } => "id",
            Self::Neq { .. } => "neq",
        }
    }

    /// Variables referenced by this property (excluding the subject).
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        let single = match self {
            Self::Has {
                value: HasValue::Variable(var),
                ..
            } => Some(var),
            Self::Neq { other } => Some(other),
            _ => None,
        };
        let players: &[RolePlayer] = match self {
            Self::Relation { role_players } => role_players.as_slice(),
            _ => &[][..],
        };
        single.into_iter().chain(players.iter().map(|rp| &rp.player))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Has { attribute_type, value } => write!(f, "has {attribute_type} {value}"),
            Self::Isa { type_label } => write!(f, "isa {type_label}"),
            Self::Relation { role_players } => {
                write!(f, "(")?;
                for (i, rp) in role_players.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{rp}")?;
                }
                write!(f, ")")
            }
            Self::Value { literal } => write!(f, "== {literal}"),
            Self::Id { concept_id } => write!(f, "id {concept_id}"),
            Self::Neq { other } => write!(f, "!= {other}"),
        }
    }
}

/// A subject variable plus a set of properties.
///
/// Properties keep their insertion order (it drives fresh-variable numbering
/// during reification) but equality and hashing treat them as a set.
///
/// # Examples
///
/// ```
/// use resolution_verify::{Literal, Statement, Variable};
///
/// let stmt = Statement::new(Variable::named("r"))
///     .rel("frienda", Variable::named("x"))
///     .rel("friendb", Variable::named("y"))
///     .isa("friendship");
/// assert_eq!(stmt.to_string(), "$r (frienda: $x, friendb: $y) isa friendship;");
///
/// let key = Statement::new(Variable::named("x")).has("name", Literal::from("alice"));
/// assert_eq!(key.to_string(), "$x has name \"alice\";");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    subject: Variable,
    #[serde(default)]
    properties: Vec<Property>,
}

impl Statement {
    /// Creates a statement with no properties.
    #[must_use]
    pub const fn new(subject: Variable) -> Self {
        Self {
            subject,
            properties: Vec::new(),
        }
    }

    /// Creates a statement from a subject and properties, dropping duplicates.
    #[must_use]
    pub fn with_properties(subject: Variable, properties: impl IntoIterator<Item = Property>) -> Self {
        properties
            .into_iter()
            .fold(Self::new(subject), Self::property)
    }

    /// Returns the subject variable.
    #[must_use]
    pub const fn subject(&self) -> &Variable {
        &self.subject
    }

    /// Returns the properties in insertion order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Adds a property unless an equal one is present.
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    /// Adds an `isa` property.
    #[must_use]
    pub fn isa(self, type_label: impl Into<String>) -> Self {
        self.property(Property::isa(type_label))
    }

    /// Adds a `has` property.
    #[must_use]
    pub fn has(self, attribute_type: impl Into<String>, value: impl Into<HasValue>) -> Self {
        self.property(Property::has(attribute_type, value))
    }

    /// Adds an equality-to-literal property.
    #[must_use]
    pub fn value(self, literal: impl Into<Literal>) -> Self {
        self.property(Property::Value {
            literal: literal.into(),
        })
    }

    /// Adds an internal identifier property.
    #[must_use]
    pub fn id(self, concept_id: impl Into<ConceptId>) -> Self {
        self.property(Property::Id {
            concept_id: concept_id.into(),
        })
    }

    /// Adds a labelled role player, extending the existing relation property.
    #[must_use]
    pub fn rel(self, role: impl Into<String>, player: Variable) -> Self {
        self.role_player(RolePlayer::new(role, player))
    }

    /// Adds a role player, extending the existing relation property.
    #[must_use]
    pub fn role_player(mut self, role_player: RolePlayer) -> Self {
        let existing = self
            .properties
            .iter_mut()
            .find_map(|p| match p {
                Property::Relation { role_players } => Some(role_players),
                _ => None,
            });
        match existing {
            Some(role_players) => role_players.push(role_player),
            None => self.properties.push(Property::Relation {
                role_players: vec![role_player],
            }),
        }
        self
    }

    /// Returns a copy of this statement with a different subject.
    #[must_use]
    pub fn with_subject(&self, subject: Variable) -> Self {
        Self {
            subject,
            properties: self.properties.clone(),
        }
    }

    /// All variables mentioned by this statement, subject first.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        std::iter::once(&self.subject).chain(self.properties.iter().flat_map(|p| p.variables()))
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.properties.len() == other.properties.len()
            && self.properties.iter().all(|p| other.properties.contains(p))
    }
}

impl Eq for Statement {}

impl Hash for Statement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.hash(state);
        self.properties.len().hash(state);
        // Order-insensitive combination to agree with `PartialEq`.
        let combined = self.properties.iter().fold(0u64, |acc, p| {
            let mut h = DefaultHasher::new();
            p.hash(&mut h);
            acc.wrapping_add(h.finish())
        });
        combined.hash(state);
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_relation = self
            .properties
            .iter()
            .any(|p| matches!(p, Property::Relation { .. }));

        let mut head = Vec::new();
        if self.subject.is_returned() || !has_relation {
            head.push(self.subject.to_string());
        }
        for p in self.properties.iter().filter(|p| matches!(p, Property::Relation { .. })) {
            head.push(p.to_string());
        }
        let rest: Vec<String> = self
            .properties
            .iter()
            .filter(|p| !matches!(p, Property::Relation { .. }))
            .map(ToString::to_string)
            .collect();

        write!(f, "{}", head.join(" "))?;
        if !rest.is_empty() {
            write!(f, " {}", rest.join(", "))?;
        }
        write!(f, ";")
    }
}

/// A conjunction of statements with set semantics and insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Statement>", into = "Vec<Statement>")]
pub struct Pattern {
    statements: Vec<Statement>,
    seen: HashSet<Statement>,
}

impl Pattern {
    /// Creates an empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement. Returns false if an equal statement was present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.seen.contains(&statement) {
            return false;
        }
        self.seen.insert(statement.clone());
        self.statements.push(statement);
        true
    }

    /// Inserts every statement of `other`.
    pub fn absorb(&mut self, other: Self) {
        self.extend(other.statements);
    }

    /// Returns true if an equal statement is present.
    #[must_use]
    pub fn contains(&self, statement: &Statement) -> bool {
        self.seen.contains(statement)
    }

    /// Number of distinct statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the pattern has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates statements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Returns the statements in insertion order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// All variables mentioned anywhere in the pattern.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.statements.iter().flat_map(|s| s.variables())
    }

    /// Keeps only statements matching the predicate.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&Statement) -> bool) -> Self {
        self.statements.iter().filter(|s| keep(s)).cloned().collect()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.statements.iter().all(|s| other.contains(s))
    }
}

impl Eq for Pattern {}

impl Extend<Statement> for Pattern {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        for statement in iter {
            self.insert(statement);
        }
    }
}

impl FromIterator<Statement> for Pattern {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        let mut pattern = Self::new();
        pattern.extend(iter);
        pattern
    }
}

impl From<Vec<Statement>> for Pattern {
    fn from(statements: Vec<Statement>) -> Self {
        statements.into_iter().collect()
    }
}

impl From<Pattern> for Vec<Statement> {
    fn from(pattern: Pattern) -> Self {
        pattern.statements
    }
}

impl IntoIterator for Pattern {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
