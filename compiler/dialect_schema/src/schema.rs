//! The frozen schema.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::SchemaWarning;
use crate::rule::{ObjectRule, PropertyRule, Relationship, Rule, RuleId};

/// A built, read-only set of rules.
///
/// `Send + Sync`; share it behind an `Arc` between transformer runs.
pub struct Schema<T> {
    pub(crate) rules: Vec<Rule<T>>,
    pub(crate) by_key: FxHashMap<String, RuleId>,
    /// Root name (alias or key) to rule, sorted for stable listings.
    pub(crate) roots: BTreeMap<String, RuleId>,
    pub(crate) warnings: Vec<SchemaWarning>,
}

impl<T> Schema<T> {
    /// Every rule in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule<T>)> {
        self.rules.iter().enumerate().map(|(i, rule)| {
            #[allow(clippy::cast_possible_truncation)]
            (RuleId::new(i as u32), rule)
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule by id. Ids come from this schema, so lookup cannot fail.
    #[track_caller]
    pub fn rule(&self, id: RuleId) -> &Rule<T> {
        &self.rules[id.index()]
    }

    pub fn lookup(&self, key: &str) -> Option<RuleId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&Rule<T>> {
        self.lookup(key).map(|id| self.rule(id))
    }

    pub fn object(&self, id: RuleId) -> Option<&ObjectRule<T>> {
        self.rules.get(id.index()).and_then(Rule::as_object)
    }

    pub fn property(&self, id: RuleId) -> Option<&PropertyRule> {
        self.rules.get(id.index()).and_then(Rule::as_property)
    }

    /// Root object addressed by `name` (its alias, or its key).
    pub fn root(&self, name: &str) -> Option<RuleId> {
        self.roots.get(name).copied()
    }

    /// Root names in sorted order.
    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Relationships of an object rule; empty for properties.
    pub fn relationships(&self, id: RuleId) -> &[Relationship] {
        match self.object(id) {
            Some(rule) => &rule.relationships,
            None => &[],
        }
    }

    /// Object rules that may contain `id`, with the relationship used.
    pub fn containers(&self, id: RuleId) -> impl Iterator<Item = (RuleId, &Relationship)> {
        self.rules().flat_map(move |(owner, rule)| {
            rule.as_object()
                .into_iter()
                .flat_map(|object| object.relationships.iter())
                .filter(move |rel| rel.subject == id)
                .map(move |rel| (owner, rel))
        })
    }

    /// Suspicious but legal declarations found while building.
    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("rules", &self.rules)
            .field("roots", &self.roots)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
