//! Untyped transformation target.
//!
//! A [`Record`] keeps every member slot of an object under its member name,
//! in the rule's member order. It is what dialects loaded at runtime build,
//! and it can be written back into a generic tree.

use std::sync::Arc;

use dialect_ir::{Document, NodeId, Pos};
use dialect_schema::{Factory, FactoryArgs, Member, Schema, Slot};
use dialect_types::Value;

/// An object built by [`record_factory`].
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Key of the object rule that built the record.
    pub rule: String,
    pub fields: Vec<(String, Slot<Record>)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Slot<Record>> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, slot)| slot)
    }

    /// Scalar value of a singleton member.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Slot::value)
    }

    /// Object of a singleton member.
    pub fn object(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Slot::object)
    }

    /// Every scalar of a member, whatever its collection.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Value> + 'a {
        self.get(name)
            .into_iter()
            .flat_map(Slot::members)
            .filter_map(Member::as_value)
    }

    /// Every object of a member, whatever its collection.
    pub fn objects<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Record> + 'a {
        self.get(name)
            .into_iter()
            .flat_map(Slot::members)
            .filter_map(Member::as_object)
    }

    /// Write the record back as a generic tree that transforms to an equal
    /// record under `schema`.
    ///
    /// Scalars become `name: literal` pairs (a `true` boolean singleton
    /// becomes a flag), scalar collections become arrays, nested objects
    /// become named objects. Nodes get ascending line numbers in member
    /// order.
    pub fn to_document<T>(&self, schema: &Schema<T>) -> Document {
        let name = schema
            .get(&self.rule)
            .and_then(|rule| rule.as_object())
            .map_or(self.rule.as_str(), |object| object.root_name());
        let mut writer = Writer {
            doc: Document::new(),
            line: 0,
        };
        let root = writer.object(name, self);
        writer.doc.set_root(root);
        writer.doc
    }
}

/// Factory that collects the members of any object into a [`Record`].
pub fn record_factory() -> Factory<Record> {
    Arc::new(|args: FactoryArgs<Record>| {
        Ok(Record {
            rule: args.rule().to_string(),
            fields: args.into_fields().collect(),
        })
    })
}

struct Writer {
    doc: Document,
    line: u32,
}

impl Writer {
    fn pos(&mut self) -> Pos {
        self.line += 1;
        Pos::new(self.line, 1)
    }

    fn object(&mut self, name: &str, record: &Record) -> NodeId {
        let pos = self.pos();
        let mut members = Vec::new();
        for (field, slot) in &record.fields {
            let items: Vec<&Member<Record>> = slot.members().collect();
            let is_scalar = items.iter().all(|item| item.as_value().is_some());
            match slot {
                Slot::Absent => {}
                Slot::Single(Member::Value(Value::Boolean(true))) => {
                    let pos = self.pos();
                    members.push(self.doc.flag(field, pos));
                }
                Slot::Single(Member::Value(value)) => members.push(self.pair(field, value)),
                _ if is_scalar => {
                    let pos = self.pos();
                    let elements = items
                        .iter()
                        .filter_map(|item| item.as_value())
                        .map(|value| self.scalar(value))
                        .collect();
                    let array = self.doc.array(elements, pos);
                    members.push(self.doc.pair(field, array, pos));
                }
                _ => {
                    for object in items.iter().filter_map(|item| item.as_object()) {
                        members.push(self.object(field, object));
                    }
                }
            }
        }
        self.doc.object(name, members, pos)
    }

    fn pair(&mut self, name: &str, value: &Value) -> NodeId {
        let pos = self.pos();
        let scalar = self.scalar_at(value, pos);
        self.doc.pair(name, scalar, pos)
    }

    fn scalar(&mut self, value: &Value) -> NodeId {
        let pos = self.pos();
        self.scalar_at(value, pos)
    }

    fn scalar_at(&mut self, value: &Value, pos: Pos) -> NodeId {
        match value {
            Value::Path(path) => self.doc.path(path, pos),
            Value::Cardinality(card) => self.doc.cardinality(card.min(), card.max(), pos),
            value => self.doc.scalar(value.kind(), &value.to_literal(), pos),
        }
    }
}

#[cfg(test)]
mod tests;
