//! Schema rules and the relationships between them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dialect_types::{Cardinality, ScalarKind};

use crate::constraint::Constraint;
use crate::slot::Factory;

/// Index of a rule in its [`crate::Schema`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct RuleId(u32);

impl RuleId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        RuleId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shape in which an object accumulates the values of one member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CollectionKind {
    Singleton,
    /// Ordered, duplicates allowed.
    List,
    /// Ordered, duplicates rejected.
    Set,
    /// Addressed by key, duplicate keys rejected.
    Map,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Singleton,
        CollectionKind::List,
        CollectionKind::Set,
        CollectionKind::Map,
    ];

    /// The collection a member gets when none is declared.
    pub const fn default_for(cardinality: Cardinality) -> Self {
        if cardinality.is_singleton() {
            CollectionKind::Singleton
        } else {
            CollectionKind::List
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CollectionKind::Singleton => "singleton",
            CollectionKind::List => "list",
            CollectionKind::Set => "set",
            CollectionKind::Map => "map",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollectionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.name() == s).ok_or(())
    }
}

/// "An object of rule X may contain `cardinality` values of `subject`."
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub subject: RuleId,
    /// Key of the subject rule; also the member name in documents.
    pub name: String,
    pub cardinality: Cardinality,
    pub collection: CollectionKind,
}

impl Relationship {
    pub fn is_required(&self) -> bool {
        self.cardinality.is_required()
    }
}

/// A scalar member.
#[derive(Clone, Debug)]
pub struct PropertyRule {
    pub key: String,
    pub kind: ScalarKind,
    pub constraints: Vec<Constraint>,
}

impl PropertyRule {
    /// First constraint `value` violates, as a reason.
    pub fn check(&self, value: &dialect_types::Value) -> Result<(), String> {
        self.constraints.iter().try_for_each(|c| c.check(value))
    }
}

/// An object with members.
///
/// `relationships` and `child_names` are fixed when the schema is built and
/// match 1:1; the factory receives its arguments in that order.
pub struct ObjectRule<T> {
    pub key: String,
    /// Name of the type the factory builds.
    pub type_name: String,
    pub is_root: bool,
    pub alias: Option<String>,
    pub relationships: Vec<Relationship>,
    pub child_names: Arc<[String]>,
    /// Position in `relationships` of the key member.
    pub key_member: Option<usize>,
    pub factory: Factory<T>,
}

impl<T> ObjectRule<T> {
    /// Name under which this rule is addressed as a root.
    pub fn root_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.key)
    }

    /// Relationship named `name` and its position.
    pub fn member(&self, name: &str) -> Option<(usize, &Relationship)> {
        self.relationships
            .iter()
            .enumerate()
            .find(|(_, rel)| rel.name == name)
    }

    pub fn key_relationship(&self) -> Option<&Relationship> {
        self.key_member.and_then(|i| self.relationships.get(i))
    }
}

impl<T> Clone for ObjectRule<T> {
    fn clone(&self) -> Self {
        ObjectRule {
            key: self.key.clone(),
            type_name: self.type_name.clone(),
            is_root: self.is_root,
            alias: self.alias.clone(),
            relationships: self.relationships.clone(),
            child_names: Arc::clone(&self.child_names),
            key_member: self.key_member,
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for ObjectRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRule")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("is_root", &self.is_root)
            .field("alias", &self.alias)
            .field("relationships", &self.relationships)
            .field("key_member", &self.key_member)
            .finish_non_exhaustive()
    }
}

/// A schema rule.
pub enum Rule<T> {
    Object(ObjectRule<T>),
    Property(PropertyRule),
}

impl<T> Rule<T> {
    pub fn key(&self) -> &str {
        match self {
            Rule::Object(rule) => &rule.key,
            Rule::Property(rule) => &rule.key,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRule<T>> {
        match self {
            Rule::Object(rule) => Some(rule),
            Rule::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyRule> {
        match self {
            Rule::Property(rule) => Some(rule),
            Rule::Object(_) => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Rule::Object(_))
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        match self {
            Rule::Object(rule) => Rule::Object(rule.clone()),
            Rule::Property(rule) => Rule::Property(rule.clone()),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Object(rule) => rule.fmt(f),
            Rule::Property(rule) => rule.fmt(f),
        }
    }
}
