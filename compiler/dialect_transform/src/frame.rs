//! Per-container accumulation state.

use std::fmt::Write;

use dialect_ir::Pos;
use dialect_schema::{CollectionKind, Member, Relationship, RuleId, Slot};
use dialect_types::Value;
use rustc_hash::FxHashSet;

use crate::violation::SchemaViolation;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum FrameKind {
    /// An object node; accumulates one slot per relationship of its rule.
    Object,
    /// A pair or array node; collects elements for the enclosing object.
    Container,
}

/// A relationship of an object rule, by position.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Governing {
    pub owner: RuleId,
    pub index: usize,
}

/// A value waiting in a container frame.
pub(crate) struct Pending<T> {
    pub member: Member<T>,
    /// Key of an object: its key member value, or its
    /// [identity](Frame::identity) if the rule has no key member.
    pub key: Option<String>,
    pub pos: Pos,
}

pub(crate) struct Frame<T> {
    pub name: String,
    pub kind: FrameKind,
    /// Object rule of an object frame; `None` if unresolved.
    pub rule: Option<RuleId>,
    /// Relationship this frame's values are accumulated under.
    pub governing: Option<Governing>,
    pub seen_error: bool,
    pub pos: Pos,
    /// Object frames: one slot per relationship.
    pub slots: Vec<Slot<T>>,
    /// Object frames: keys already used per relationship (maps, sets of objects).
    keys: Vec<FxHashSet<String>>,
    /// Object frames: key of each accumulated object per relationship, in
    /// slot order.
    object_keys: Vec<Vec<String>>,
    /// Container frames.
    pub pending: Vec<Pending<T>>,
}

impl<T> Frame<T> {
    pub fn object(
        name: &str,
        rule: Option<RuleId>,
        members: usize,
        governing: Option<Governing>,
        pos: Pos,
    ) -> Self {
        Frame {
            name: name.to_string(),
            kind: FrameKind::Object,
            rule,
            governing,
            seen_error: rule.is_none(),
            pos,
            slots: std::iter::repeat_with(|| Slot::Absent).take(members).collect(),
            keys: vec![FxHashSet::default(); members],
            object_keys: vec![Vec::new(); members],
            pending: Vec::new(),
        }
    }

    pub fn container(name: &str, governing: Option<Governing>, pos: Pos) -> Self {
        Frame {
            name: name.to_string(),
            kind: FrameKind::Container,
            rule: None,
            governing,
            seen_error: governing.is_none(),
            pos,
            slots: Vec::new(),
            keys: Vec::new(),
            object_keys: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_object(&self) -> bool {
        self.kind == FrameKind::Object
    }

    /// Add a value under relationship `index` of this object frame.
    ///
    /// Does nothing once the frame has seen an error; a rejected value marks
    /// the frame.
    pub fn accumulate(
        &mut self,
        index: usize,
        relationship: &Relationship,
        member: Member<T>,
        key: Option<String>,
    ) -> Result<(), SchemaViolation> {
        if self.seen_error {
            return Ok(());
        }
        let object_key = matches!(member, Member::Object(_)).then(|| key.clone().unwrap_or_default());
        let result = self.insert(index, relationship, member, key);
        match (&result, object_key) {
            (Err(_), _) => self.seen_error = true,
            (Ok(()), Some(object_key)) => {
                if let Some(object_keys) = self.object_keys.get_mut(index) {
                    object_keys.push(object_key);
                }
            }
            (Ok(()), None) => {}
        }
        result
    }

    fn insert(
        &mut self,
        index: usize,
        relationship: &Relationship,
        member: Member<T>,
        key: Option<String>,
    ) -> Result<(), SchemaViolation> {
        let name = || relationship.name.clone();
        let (Some(slot), Some(keys)) = (self.slots.get_mut(index), self.keys.get_mut(index)) else {
            return Err(SchemaViolation::UnnamedValue {
                context: self.name.clone(),
            });
        };
        let key = key.or_else(|| member.as_value().map(Value::key_string));

        match relationship.collection {
            CollectionKind::Singleton => {
                if !slot.is_absent() {
                    return Err(SchemaViolation::DuplicateSingleton { member: name() });
                }
                *slot = Slot::Single(member);
            }
            CollectionKind::List => match slot {
                Slot::List(items) => items.push(member),
                _ => *slot = Slot::List(vec![member]),
            },
            CollectionKind::Set => {
                let duplicate = match &member {
                    Member::Value(value) => slot
                        .members()
                        .any(|existing| existing.as_value() == Some(value)),
                    Member::Object(_) => key.as_ref().is_some_and(|key| keys.contains(key)),
                };
                if duplicate {
                    let value = key.unwrap_or_default();
                    return Err(SchemaViolation::DuplicateValue {
                        member: name(),
                        value,
                    });
                }
                if let (Member::Object(_), Some(key)) = (&member, &key) {
                    keys.insert(key.clone());
                }
                match slot {
                    Slot::Set(items) => items.push(member),
                    _ => *slot = Slot::Set(vec![member]),
                }
            }
            CollectionKind::Map => {
                let Some(key) = key else {
                    return Err(SchemaViolation::MissingKey { member: name() });
                };
                if !keys.insert(key.clone()) {
                    return Err(SchemaViolation::DuplicateKey { member: name(), key });
                }
                match slot {
                    Slot::Map(entries) => entries.push((key, member)),
                    _ => *slot = Slot::Map(vec![(key, member)]),
                }
            }
        }
        Ok(())
    }

    /// Canonical rendering of the accumulated members, for comparing objects
    /// whose rule has no key member: `Rule { Member: value, ...; }`.
    ///
    /// Objects among the members are rendered by their keys. Set members are
    /// sorted, so accumulation order does not matter.
    pub fn identity(&self, rule: &str, relationships: &[Relationship]) -> String {
        let mut out = format!("{rule} {{");
        for ((rel, slot), object_keys) in relationships.iter().zip(&self.slots).zip(&self.object_keys) {
            if slot.is_absent() {
                continue;
            }
            let mut object_keys = object_keys.iter();
            let mut items: Vec<String> = slot
                .members()
                .map(|member| match member {
                    Member::Value(value) => value.to_literal(),
                    Member::Object(_) => object_keys.next().cloned().unwrap_or_default(),
                })
                .collect();
            if matches!(slot, Slot::Set(_)) {
                items.sort();
            }
            let _ = write!(out, " {}: {};", rel.name, items.join(", "));
        }
        out.push_str(" }");
        out
    }
}
