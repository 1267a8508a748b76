//! The frame-stack transformer.
//!
//! The walk is depth-first over the generic tree. Every object, pair and
//! array node pushes a [`Frame`]; scalar subtrees are evaluated and
//! accumulated into the innermost container. Leaving an object validates
//! its members and runs its factory; the result is handed to the parent
//! frame, or becomes the run's value once the stack is empty.
//!
//! Errors never abort the walk. A frame that fails marks its parent, so a
//! parent does not report follow-up violations (missing members, failed
//! factories) caused by a broken child, while sibling subtrees are still
//! checked in their own frames.

use std::sync::Arc;

use dialect_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};
use dialect_eval::{ExprBuilder, Library};
use dialect_ir::{Document, NodeId, NodeKind, Pos};
use dialect_schema::{FactoryArgs, Member, Relationship, RuleId, Schema};
use dialect_stack::{ensure_sufficient_stack, Nesting, DEFAULT_MAX_DEPTH};
use dialect_types::{ScalarKind, Value};

use crate::frame::{Frame, Governing, Pending};
use crate::violation::SchemaViolation;

/// Outcome of one transformer run.
#[derive(Debug)]
pub struct Transformation<T> {
    /// The root object; `None` if it could not be built.
    pub value: Option<T>,
    pub diagnostics: DiagnosticQueue,
}

impl<T> Transformation<T> {
    /// `true` when no error was reported. Warnings do not count.
    pub fn is_success(&self) -> bool {
        self.diagnostics.has_errors().is_none()
    }

    /// The value, or every diagnostic in position order.
    pub fn into_result(self) -> Result<T, Vec<Diagnostic>> {
        match self.value {
            Some(value) if self.diagnostics.has_errors().is_none() => Ok(value),
            _ => Err(self.diagnostics.sorted()),
        }
    }
}

/// Transforms documents against one schema and library.
///
/// Holds only shared references; one transformer can serve any number of
/// runs, also from several threads.
pub struct Transformer<'a, T> {
    schema: &'a Schema<T>,
    library: &'a dyn Library,
    config: DiagnosticConfig,
    max_depth: usize,
}

impl<'a, T> Transformer<'a, T> {
    pub fn new(schema: &'a Schema<T>, library: &'a dyn Library) -> Self {
        Transformer {
            schema,
            library,
            config: DiagnosticConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DiagnosticConfig) -> Self {
        self.config = config;
        self
    }

    /// Deepest accepted document nesting.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Transform the tree rooted at `root`.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = doc.len()))]
    pub fn transform(&self, doc: &Document, root: NodeId) -> Transformation<T> {
        let mut run = Run {
            schema: self.schema,
            library: self.library,
            builder: ExprBuilder::new(self.library),
            frames: Vec::new(),
            diagnostics: DiagnosticQueue::with_config(self.config.clone()),
            nesting: Nesting::with_limit(self.max_depth),
            depth_reported: false,
            result: None,
        };
        run.visit(doc, root);
        tracing::debug!(
            errors = run.diagnostics.error_count(),
            built = run.result.is_some(),
            "transform finished"
        );
        Transformation {
            value: run.result,
            diagnostics: run.diagnostics,
        }
    }
}

/// Relationship `governing` refers to.
fn relationship<T>(schema: &Schema<T>, governing: Governing) -> Option<&Relationship> {
    schema
        .object(governing.owner)
        .and_then(|object| object.relationships.get(governing.index))
}

/// What a member of kind `subject` expects, for messages.
fn describe<T>(schema: &Schema<T>, subject: RuleId) -> String {
    match schema.property(subject) {
        Some(property) => property.kind.to_string(),
        None => format!("a `{}` object", schema.rule(subject).key()),
    }
}

/// Mutable state of one run.
struct Run<'a, T> {
    schema: &'a Schema<T>,
    library: &'a dyn Library,
    builder: ExprBuilder<'a>,
    frames: Vec<Frame<T>>,
    diagnostics: DiagnosticQueue,
    nesting: Nesting,
    /// The nesting limit is reported once per run.
    depth_reported: bool,
    result: Option<T>,
}

/// Snapshot of the innermost frame, taken before reporting.
#[derive(Clone)]
struct Top {
    is_object: bool,
    rule: Option<RuleId>,
    governing: Option<Governing>,
    name: String,
}

impl<T> Run<'_, T> {
    fn report(&mut self, violation: &SchemaViolation, pos: Pos) {
        self.diagnostics.add(violation.to_diagnostic(pos));
    }

    fn internal(&mut self, message: String, pos: Pos) {
        self.diagnostics.add(
            Diagnostic::error(ErrorCode::E9001)
                .with_message(message)
                .with_label(pos, "while transforming this node"),
        );
    }

    fn top(&self) -> Option<Top> {
        self.frames.last().map(|frame| Top {
            is_object: frame.is_object(),
            rule: frame.rule,
            governing: frame.governing,
            name: frame.name.clone(),
        })
    }

    fn mark_top(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.seen_error = true;
        }
    }

    fn push(&mut self, frame: Frame<T>) {
        tracing::trace!(frame = %frame.name, depth = self.frames.len(), "push");
        self.frames.push(frame);
    }

    fn pop(&mut self) -> Option<Frame<T>> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            tracing::trace!(frame = %frame.name, seen_error = frame.seen_error, "pop");
        }
        frame
    }

    fn visit(&mut self, doc: &Document, id: NodeId) {
        if !self.nesting.enter() {
            if !self.depth_reported {
                self.depth_reported = true;
                let pos = doc.try_get(id).map_or(Pos::DUMMY, |node| node.pos);
                self.internal(
                    format!("document nesting exceeds {} levels", self.nesting.limit()),
                    pos,
                );
            }
            self.mark_top();
            return;
        }
        ensure_sufficient_stack(|| self.visit_node(doc, id));
        self.nesting.leave();
    }

    fn visit_node(&mut self, doc: &Document, id: NodeId) {
        let Some(node) = doc.try_get(id) else {
            self.internal(format!("node {} is not in the document", id.raw()), Pos::DUMMY);
            self.mark_top();
            return;
        };
        let pos = node.pos;
        match &node.kind {
            NodeKind::Object { name, members } => self.visit_object(doc, name.as_deref(), members, pos),
            NodeKind::Pair { name, value } => self.visit_pair(doc, name, *value, pos),
            NodeKind::Array { elements } => self.visit_array(doc, elements, pos),
            kind => self.visit_value(doc, id, kind.describe(), pos),
        }
    }

    // Objects

    fn visit_object(&mut self, doc: &Document, name: Option<&str>, members: &[NodeId], pos: Pos) {
        let frame = self.enter_object(name, pos);
        let resolved = frame.rule.is_some();
        self.push(frame);
        if resolved {
            for &member in members {
                self.visit(doc, member);
            }
        }
        self.leave_object();
    }

    /// Resolve the rule of an object node against the enclosing frame.
    fn enter_object(&mut self, name: Option<&str>, pos: Pos) -> Frame<T> {
        let schema = self.schema;
        let display = name.unwrap_or("{}");
        let resolved = match self.top() {
            None => match name.and_then(|n| schema.root(n)) {
                Some(rule) => Ok((rule, None)),
                None => {
                    Err(SchemaViolation::UnknownRoot {
                        name: display.to_string(),
                        roots: schema.root_names().map(str::to_string).collect(),
                    })
                }
            },
            Some(top) if top.is_object => self.resolve_object_member(&top, name),
            Some(top) => self.resolve_object_element(&top, name),
        };

        match resolved {
            Ok((rule, governing)) => {
                let members = schema.relationships(rule).len();
                Frame::object(display, Some(rule), members, governing, pos)
            }
            Err(violation) => {
                self.report(&violation, pos);
                Frame::object(display, None, 0, None, pos)
            }
        }
    }

    /// `Name { ... }` directly inside an object: a member of the parent.
    fn resolve_object_member(
        &self,
        top: &Top,
        name: Option<&str>,
    ) -> Result<(RuleId, Option<Governing>), SchemaViolation> {
        let schema = self.schema;
        let Some(owner) = top.rule else {
            return Err(SchemaViolation::UnnamedValue {
                context: top.name.clone(),
            });
        };
        let Some(name) = name else {
            return Err(SchemaViolation::UnnamedValue {
                context: top.name.clone(),
            });
        };
        let Some(object) = schema.object(owner) else {
            return Err(SchemaViolation::UnnamedValue {
                context: top.name.clone(),
            });
        };
        match object.member(name) {
            Some((index, rel)) if schema.object(rel.subject).is_some() => {
                Ok((rel.subject, Some(Governing { owner, index })))
            }
            Some((_, rel)) => Err(SchemaViolation::InvalidMember {
                name: name.to_string(),
                object: object.key.clone(),
                reason: format!("`{name}` is a {} property, not an object", describe(schema, rel.subject)),
            }),
            None => Err(SchemaViolation::UnknownMember {
                name: name.to_string(),
                object: object.key.clone(),
                expected: object.child_names.to_vec(),
            }),
        }
    }

    /// An object inside a pair or array: an element of the container.
    fn resolve_object_element(
        &self,
        top: &Top,
        name: Option<&str>,
    ) -> Result<(RuleId, Option<Governing>), SchemaViolation> {
        let schema = self.schema;
        let Some((governing, rel)) = top
            .governing
            .and_then(|g| relationship(schema, g).map(|rel| (g, rel)))
        else {
            return Err(SchemaViolation::UnnamedValue {
                context: top.name.clone(),
            });
        };
        if schema.object(rel.subject).is_none() {
            return Err(SchemaViolation::WrongKind {
                member: rel.name.clone(),
                expected: describe(schema, rel.subject),
                found: "object".to_string(),
            });
        }
        match name {
            Some(name) if name != rel.name => Err(SchemaViolation::UnknownMember {
                name: name.to_string(),
                object: top.name.clone(),
                expected: vec![rel.name.clone()],
            }),
            _ => Ok((rel.subject, Some(governing))),
        }
    }

    fn leave_object(&mut self) {
        let Some(frame) = self.pop() else {
            return;
        };
        let pos = frame.pos;
        let governing = frame.governing;
        let produced = self.finish_object(frame);
        self.deliver(produced, governing, pos);
    }

    /// Validate the accumulated members and run the factory.
    fn finish_object(&mut self, frame: Frame<T>) -> Option<(T, Option<String>)> {
        if frame.seen_error {
            return None;
        }
        let schema = self.schema;
        let object = frame.rule.and_then(|rule| schema.object(rule))?;

        let mut valid = true;
        for (rel, slot) in object.relationships.iter().zip(&frame.slots) {
            let count = slot.count();
            if !rel.cardinality.is_valid(count as u64) {
                let violation = SchemaViolation::Cardinality {
                    member: rel.name.clone(),
                    cardinality: rel.cardinality,
                    found: count,
                };
                self.report(&violation, frame.pos);
                valid = false;
            }
            let Some(property) = schema.property(rel.subject) else {
                continue;
            };
            for value in slot.members().filter_map(Member::as_value) {
                if let Err(reason) = property.check(value) {
                    let violation = SchemaViolation::Constraint {
                        member: rel.name.clone(),
                        reason,
                    };
                    self.report(&violation, frame.pos);
                    valid = false;
                }
            }
        }
        if !valid {
            return None;
        }

        let key = match object.key_member {
            Some(index) => frame
                .slots
                .get(index)
                .and_then(|slot| slot.value())
                .map(Value::key_string),
            None => Some(frame.identity(&object.key, &object.relationships)),
        };
        let args = FactoryArgs::new(&object.key, Arc::clone(&object.child_names), frame.slots);
        match (object.factory)(args) {
            Ok(value) => Some((value, key)),
            Err(reason) => {
                let violation = SchemaViolation::FactoryFailure {
                    rule: object.key.clone(),
                    reason,
                };
                self.report(&violation, frame.pos);
                None
            }
        }
    }

    /// Hand a finished object to the enclosing frame.
    fn deliver(&mut self, produced: Option<(T, Option<String>)>, governing: Option<Governing>, pos: Pos) {
        let schema = self.schema;
        let Some(top) = self.frames.last_mut() else {
            if let Some((value, _)) = produced {
                self.result = Some(value);
            }
            return;
        };
        let Some((value, key)) = produced else {
            top.seen_error = true;
            return;
        };
        if !top.is_object() {
            top.pending.push(Pending {
                member: Member::Object(value),
                key,
                pos,
            });
            return;
        }
        let Some((governing, rel)) = governing.and_then(|g| relationship(schema, g).map(|rel| (g, rel))) else {
            top.seen_error = true;
            return;
        };
        if let Err(violation) = top.accumulate(governing.index, rel, Member::Object(value), key) {
            self.report(&violation, pos);
        }
    }

    // Pairs and arrays

    fn visit_pair(&mut self, doc: &Document, name: &str, value: Option<NodeId>, pos: Pos) {
        let governing = match self.resolve_pair(name) {
            Ok(governing) => Some(governing),
            Err(violation) => {
                self.report(&violation, pos);
                None
            }
        };

        let Some(value) = value else {
            self.flag(name, governing, pos);
            return;
        };
        self.push(Frame::container(name, governing, pos));
        if governing.is_some() {
            self.visit(doc, value);
        }
        self.leave_container();
    }

    /// A pair names a member of the enclosing object.
    fn resolve_pair(&self, name: &str) -> Result<Governing, SchemaViolation> {
        let schema = self.schema;
        let top = match self.top() {
            Some(top) => top,
            None => {
                return Err(SchemaViolation::UnknownRoot {
                    name: name.to_string(),
                    roots: schema.root_names().map(str::to_string).collect(),
                })
            }
        };
        let object = top
            .rule
            .filter(|_| top.is_object)
            .and_then(|owner| schema.object(owner).map(|object| (owner, object)));
        let Some((owner, object)) = object else {
            return Err(SchemaViolation::UnknownMember {
                name: name.to_string(),
                object: top.name,
                expected: Vec::new(),
            });
        };
        match object.member(name) {
            Some((index, _)) => Ok(Governing { owner, index }),
            None => Err(SchemaViolation::UnknownMember {
                name: name.to_string(),
                object: object.key.clone(),
                expected: object.child_names.to_vec(),
            }),
        }
    }

    /// `name;` sets a boolean member to `true`.
    fn flag(&mut self, name: &str, governing: Option<Governing>, pos: Pos) {
        let schema = self.schema;
        let Some((governing, rel)) = governing.and_then(|g| relationship(schema, g).map(|rel| (g, rel))) else {
            self.mark_top();
            return;
        };
        let is_boolean = schema
            .property(rel.subject)
            .is_some_and(|p| matches!(p.kind, ScalarKind::Boolean | ScalarKind::Any));
        if !is_boolean {
            let violation = SchemaViolation::WrongKind {
                member: name.to_string(),
                expected: describe(schema, rel.subject),
                found: "a boolean flag".to_string(),
            };
            self.report(&violation, pos);
            self.mark_top();
            return;
        }
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        if let Err(violation) = top.accumulate(governing.index, rel, Member::Value(Value::Boolean(true)), None) {
            self.report(&violation, pos);
        }
    }

    fn visit_array(&mut self, doc: &Document, elements: &[NodeId], pos: Pos) {
        let (name, governing) = match self.top() {
            Some(top) if !top.is_object => (top.name, top.governing),
            Some(top) => {
                let violation = SchemaViolation::UnnamedValue { context: top.name };
                self.report(&violation, pos);
                ("[]".to_string(), None)
            }
            None => {
                let violation = SchemaViolation::UnknownRoot {
                    name: "[]".to_string(),
                    roots: self.schema.root_names().map(str::to_string).collect(),
                };
                self.report(&violation, pos);
                ("[]".to_string(), None)
            }
        };

        self.push(Frame::container(&name, governing, pos));
        if governing.is_some() {
            for &element in elements {
                self.visit(doc, element);
            }
        }
        self.leave_container();
    }

    /// Flatten a finished pair or array into the enclosing frame.
    fn leave_container(&mut self) {
        let schema = self.schema;
        let Some(frame) = self.pop() else {
            return;
        };
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        if frame.seen_error {
            top.seen_error = true;
            return;
        }
        if !top.is_object() {
            top.pending.extend(frame.pending);
            return;
        }
        let Some((governing, rel)) = frame
            .governing
            .and_then(|g| relationship(schema, g).map(|rel| (g, rel)))
        else {
            top.seen_error = true;
            return;
        };

        let mut violations = Vec::new();
        for pending in frame.pending {
            if let Err(violation) = top.accumulate(governing.index, rel, pending.member, pending.key) {
                violations.push((violation, pending.pos));
            }
        }
        for (violation, pos) in violations {
            self.report(&violation, pos);
        }
    }

    // Scalars

    /// Evaluate a literal or expression subtree and add it to the enclosing
    /// container.
    fn visit_value(&mut self, doc: &Document, id: NodeId, found: &str, pos: Pos) {
        let schema = self.schema;
        let violation = match self.top() {
            None => Some(SchemaViolation::UnknownRoot {
                name: found.to_string(),
                roots: schema.root_names().map(str::to_string).collect(),
            }),
            Some(top) if top.is_object => Some(SchemaViolation::UnnamedValue { context: top.name }),
            Some(_) => None,
        };
        if let Some(violation) = violation {
            self.report(&violation, pos);
            self.mark_top();
            return;
        }

        let governing = self.frames.last().and_then(|top| top.governing);
        let Some(rel) = governing.and_then(|g| relationship(schema, g)) else {
            self.mark_top();
            return;
        };
        let Some(property) = schema.property(rel.subject) else {
            let violation = SchemaViolation::WrongKind {
                member: rel.name.clone(),
                expected: describe(schema, rel.subject),
                found: found.to_string(),
            };
            self.report(&violation, pos);
            self.mark_top();
            return;
        };

        let value = match self
            .builder
            .from_node(doc, id)
            .and_then(|expr| expr.evaluate(self.library))
        {
            Ok(value) => value,
            Err(err) => {
                self.diagnostics.add(err.to_diagnostic(pos));
                self.mark_top();
                return;
            }
        };

        let kind = property.kind;
        if kind != ScalarKind::Any && !value.is_null() && value.kind() != kind {
            let violation = SchemaViolation::WrongKind {
                member: rel.name.clone(),
                expected: kind.to_string(),
                found: value.kind().to_string(),
            };
            self.report(&violation, pos);
            self.mark_top();
            return;
        }

        if let Some(top) = self.frames.last_mut() {
            top.pending.push(Pending {
                member: Member::Value(value),
                key: None,
                pos,
            });
        }
    }
}
