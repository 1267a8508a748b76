//! Accumulated member values and factory arguments.

use std::sync::Arc;

use dialect_types::Value;

/// Builds the typed value of an object from its members.
pub type Factory<T> = Arc<dyn Fn(FactoryArgs<T>) -> Result<T, String> + Send + Sync>;

/// One accumulated value: a scalar or a constructed object.
#[derive(Clone, Debug, PartialEq)]
pub enum Member<T> {
    Value(Value),
    Object(T),
}

impl<T> Member<T> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Member::Value(value) => Some(value),
            Member::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&T> {
        match self {
            Member::Object(object) => Some(object),
            Member::Value(_) => None,
        }
    }
}

/// Everything accumulated for one relationship of an object.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot<T> {
    Absent,
    Single(Member<T>),
    List(Vec<Member<T>>),
    Set(Vec<Member<T>>),
    /// Entries in insertion order; keys are unique.
    Map(Vec<(String, Member<T>)>),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<T> Slot<T> {
    /// Number of accumulated values.
    pub fn count(&self) -> usize {
        match self {
            Slot::Absent => 0,
            Slot::Single(_) => 1,
            Slot::List(items) | Slot::Set(items) => items.len(),
            Slot::Map(entries) => entries.len(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    /// Every accumulated member in order.
    pub fn members(&self) -> Box<dyn Iterator<Item = &Member<T>> + '_> {
        match self {
            Slot::Absent => Box::new(std::iter::empty()),
            Slot::Single(member) => Box::new(std::iter::once(member)),
            Slot::List(items) | Slot::Set(items) => Box::new(items.iter()),
            Slot::Map(entries) => Box::new(entries.iter().map(|(_, member)| member)),
        }
    }

    /// The value of a singleton scalar slot.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Slot::Single(member) => member.as_value(),
            _ => None,
        }
    }

    /// The object of a singleton object slot.
    pub fn object(&self) -> Option<&T> {
        match self {
            Slot::Single(member) => member.as_object(),
            _ => None,
        }
    }

    /// Entry of a map slot by key.
    pub fn entry(&self, key: &str) -> Option<&Member<T>> {
        match self {
            Slot::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, m)| m),
            _ => None,
        }
    }
}

/// Arguments handed to a [`Factory`]: exactly one slot per relationship, in
/// the object rule's frozen member order.
#[derive(Debug)]
pub struct FactoryArgs<T> {
    rule: String,
    names: Arc<[String]>,
    slots: Vec<Slot<T>>,
}

impl<T> FactoryArgs<T> {
    /// `slots` must match `names` in length and order.
    pub fn new(rule: &str, names: Arc<[String]>, slots: Vec<Slot<T>>) -> Self {
        debug_assert_eq!(names.len(), slots.len());
        FactoryArgs {
            rule: rule.to_string(),
            names,
            slots,
        }
    }

    /// Key of the object rule being built.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Slot<T>> {
        let index = self.names.iter().position(|n| n == name)?;
        self.slots.get(index)
    }

    /// Scalar value of a singleton member.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Slot::value)
    }

    /// Remove a member's slot, leaving [`Slot::Absent`].
    pub fn take(&mut self, name: &str) -> Slot<T> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|index| self.slots.get_mut(index))
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// `(name, slot)` pairs in member order.
    pub fn into_fields(self) -> impl Iterator<Item = (String, Slot<T>)> {
        let names: Vec<String> = self.names.iter().cloned().collect();
        names.into_iter().zip(self.slots)
    }
}
