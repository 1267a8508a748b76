//! Schema declaration and validation.

use std::collections::BTreeMap;
use std::sync::Arc;

use dialect_types::{common_type, Cardinality, ScalarKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::constraint::Constraint;
use crate::error::{SchemaBuildError, SchemaWarning};
use crate::rule::{CollectionKind, ObjectRule, PropertyRule, Relationship, Rule, RuleId};
use crate::schema::Schema;
use crate::slot::{Factory, FactoryArgs};

/// Declaration of a property rule.
#[derive(Clone, Debug)]
pub struct PropertyDecl {
    pub key: String,
    pub kind: ScalarKind,
    pub constraints: Vec<Constraint>,
}

impl PropertyDecl {
    pub fn new(key: &str, kind: ScalarKind) -> Self {
        PropertyDecl {
            key: key.to_string(),
            kind,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// One member of an object declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDecl {
    /// Key of the member's rule.
    pub rule: String,
    pub cardinality: Cardinality,
    /// Defaults to singleton for `max <= 1`, list otherwise.
    pub collection: Option<CollectionKind>,
}

impl MemberDecl {
    pub fn new(rule: &str, cardinality: Cardinality) -> Self {
        MemberDecl {
            rule: rule.to_string(),
            cardinality,
            collection: None,
        }
    }

    #[must_use]
    pub fn with_collection(mut self, collection: CollectionKind) -> Self {
        self.collection = Some(collection);
        self
    }

    fn collection(&self) -> CollectionKind {
        self.collection
            .unwrap_or_else(|| CollectionKind::default_for(self.cardinality))
    }
}

/// Declaration of an object rule.
pub struct ObjectDecl<T> {
    pub key: String,
    pub type_name: Option<String>,
    pub root: bool,
    pub alias: Option<String>,
    pub key_member: Option<String>,
    pub members: Vec<MemberDecl>,
    pub factory: Option<Factory<T>>,
}

impl<T> ObjectDecl<T> {
    pub fn new(key: &str) -> Self {
        ObjectDecl {
            key: key.to_string(),
            type_name: None,
            root: false,
            alias: None,
            key_member: None,
            members: Vec::new(),
            factory: None,
        }
    }

    /// Name of the type the factory builds; defaults to the key.
    #[must_use]
    pub fn describes(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    #[must_use]
    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    /// Address the root by `alias` instead of its key.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    #[must_use]
    pub fn key_member(mut self, member: &str) -> Self {
        self.key_member = Some(member.to_string());
        self
    }

    #[must_use]
    pub fn member(self, rule: &str, cardinality: Cardinality) -> Self {
        self.with_member(MemberDecl::new(rule, cardinality))
    }

    #[must_use]
    pub fn member_as(self, rule: &str, cardinality: Cardinality, collection: CollectionKind) -> Self {
        self.with_member(MemberDecl::new(rule, cardinality).with_collection(collection))
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn factory<F>(self, factory: F) -> Self
    where
        F: Fn(FactoryArgs<T>) -> Result<T, String> + Send + Sync + 'static,
    {
        self.with_factory(Arc::new(factory))
    }

    #[must_use]
    pub fn with_factory(mut self, factory: Factory<T>) -> Self {
        self.factory = Some(factory);
        self
    }
}

enum Decl<T> {
    Property(PropertyDecl),
    Object(ObjectDecl<T>),
}

impl<T> Decl<T> {
    fn key(&self) -> &str {
        match self {
            Decl::Property(decl) => &decl.key,
            Decl::Object(decl) => &decl.key,
        }
    }
}

/// Collects declarations and builds a [`Schema`].
///
/// Forward references between declarations are allowed; everything is
/// resolved in [`SchemaBuilder::build`].
pub struct SchemaBuilder<T> {
    decls: Vec<Decl<T>>,
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        SchemaBuilder { decls: Vec::new() }
    }
}

/// Resolved members of one object declaration.
struct Resolved {
    relationships: Vec<Relationship>,
    key_member: Option<usize>,
}

impl<T> SchemaBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&mut self, decl: PropertyDecl) -> &mut Self {
        self.decls.push(Decl::Property(decl));
        self
    }

    pub fn object(&mut self, decl: ObjectDecl<T>) -> &mut Self {
        self.decls.push(Decl::Object(decl));
        self
    }

    /// Resolve and freeze the declarations.
    ///
    /// The first error aborts the build.
    #[tracing::instrument(level = "debug", skip_all, fields(decls = self.decls.len()))]
    pub fn build(self) -> Result<Schema<T>, SchemaBuildError> {
        let by_key = self.register()?;

        let mut resolved: Vec<Option<Resolved>> = Vec::with_capacity(self.decls.len());
        for decl in &self.decls {
            resolved.push(match decl {
                Decl::Object(object) => Some(self.resolve_members(object, &by_key)?),
                Decl::Property(property) => {
                    check_constraints(property)?;
                    None
                }
            });
        }
        self.check_maps(&resolved)?;

        let mut rules = Vec::with_capacity(self.decls.len());
        for (decl, resolved) in self.decls.into_iter().zip(resolved) {
            rules.push(match (decl, resolved) {
                (Decl::Object(object), Some(resolved)) => Rule::Object(freeze(object, resolved)?),
                (Decl::Object(object), None) => Rule::Object(freeze(
                    object,
                    Resolved {
                        relationships: Vec::new(),
                        key_member: None,
                    },
                )?),
                (Decl::Property(property), _) => Rule::Property(PropertyRule {
                    key: property.key,
                    kind: property.kind,
                    constraints: property.constraints,
                }),
            });
        }

        let roots = collect_roots(&rules)?;
        let warnings = unused_rules(&rules, &roots);
        for warning in &warnings {
            tracing::debug!(%warning, "schema warning");
        }
        tracing::debug!(rules = rules.len(), roots = roots.len(), "schema built");

        Ok(Schema {
            rules,
            by_key,
            roots,
            warnings,
        })
    }

    fn register(&self) -> Result<FxHashMap<String, RuleId>, SchemaBuildError> {
        let mut by_key = FxHashMap::default();
        for (index, decl) in self.decls.iter().enumerate() {
            let id = RuleId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if by_key.insert(decl.key().to_string(), id).is_some() {
                return Err(SchemaBuildError::DuplicateRule {
                    key: decl.key().to_string(),
                });
            }
        }
        Ok(by_key)
    }

    fn resolve_members(
        &self,
        object: &ObjectDecl<T>,
        by_key: &FxHashMap<String, RuleId>,
    ) -> Result<Resolved, SchemaBuildError> {
        let fail = |member: &MemberDecl| (object.key.clone(), member.rule.clone());
        let mut relationships: Vec<Relationship> = Vec::with_capacity(object.members.len());

        for member in &object.members {
            let Some(&subject) = by_key.get(&member.rule) else {
                let (object, member) = fail(member);
                return Err(SchemaBuildError::UnresolvedMember { object, member });
            };
            if member.cardinality.is_zero() {
                let (object, member) = fail(member);
                return Err(SchemaBuildError::ZeroCardinality { object, member });
            }
            let collection = member.collection();
            if (collection == CollectionKind::Singleton) != member.cardinality.is_singleton() {
                let (object, name) = fail(member);
                return Err(SchemaBuildError::InconsistentCollection {
                    object,
                    member: name,
                    cardinality: member.cardinality,
                    collection,
                });
            }
            if relationships.iter().any(|rel| rel.name == member.rule) {
                let (object, member) = fail(member);
                return Err(SchemaBuildError::DuplicateMember { object, member });
            }
            relationships.push(Relationship {
                subject,
                name: member.rule.clone(),
                cardinality: member.cardinality,
                collection,
            });
        }

        let key_member = match &object.key_member {
            None => None,
            Some(name) => Some(self.check_key_member(object, name, &relationships)?),
        };
        Ok(Resolved {
            relationships,
            key_member,
        })
    }

    /// The key member must be a declared, required singleton property.
    fn check_key_member(
        &self,
        object: &ObjectDecl<T>,
        name: &str,
        relationships: &[Relationship],
    ) -> Result<usize, SchemaBuildError> {
        let invalid = |reason| SchemaBuildError::InvalidKeyMember {
            object: object.key.clone(),
            member: name.to_string(),
            reason,
        };
        let (index, rel) = relationships
            .iter()
            .enumerate()
            .find(|(_, rel)| rel.name == name)
            .ok_or_else(|| invalid("is not a member"))?;
        if !matches!(self.decls.get(rel.subject.index()), Some(Decl::Property(_))) {
            return Err(invalid("is not a property"));
        }
        if rel.cardinality != Cardinality::ONE {
            return Err(invalid("is not a required singleton"));
        }
        Ok(index)
    }

    /// A map over objects needs the objects to have a key member.
    fn check_maps(&self, resolved: &[Option<Resolved>]) -> Result<(), SchemaBuildError> {
        for (decl, own) in self.decls.iter().zip(resolved) {
            let Some(own) = own else { continue };
            for rel in &own.relationships {
                if rel.collection != CollectionKind::Map {
                    continue;
                }
                let keyless = matches!(
                    resolved.get(rel.subject.index()),
                    Some(Some(Resolved {
                        key_member: None,
                        ..
                    }))
                );
                if keyless {
                    return Err(SchemaBuildError::MapWithoutKey {
                        object: decl.key().to_string(),
                        member: rel.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Range bounds must compare with the property kind; lengths apply to text.
fn check_constraints(property: &PropertyDecl) -> Result<(), SchemaBuildError> {
    let invalid = |reason: String| SchemaBuildError::InvalidConstraint {
        property: property.key.clone(),
        reason,
    };
    if property.kind == ScalarKind::Any {
        return Ok(());
    }
    for constraint in &property.constraints {
        match constraint {
            Constraint::Range { min, max } => {
                for bound in min.iter().chain(max) {
                    if common_type(property.kind, bound.kind()).is_err() {
                        return Err(invalid(format!(
                            "bound {bound} does not compare with {}",
                            property.kind
                        )));
                    }
                }
            }
            Constraint::Length { .. } if !property.kind.is_text_like() => {
                return Err(invalid(format!("{} values have no length", property.kind)));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Fix member order and bind the factory.
fn freeze<T>(object: ObjectDecl<T>, resolved: Resolved) -> Result<ObjectRule<T>, SchemaBuildError> {
    let Some(factory) = object.factory else {
        return Err(SchemaBuildError::MissingFactory { object: object.key });
    };
    let child_names: Arc<[String]> = resolved
        .relationships
        .iter()
        .map(|rel| rel.name.clone())
        .collect();
    Ok(ObjectRule {
        type_name: object.type_name.unwrap_or_else(|| object.key.clone()),
        key: object.key,
        is_root: object.root,
        alias: object.alias,
        relationships: resolved.relationships,
        child_names,
        key_member: resolved.key_member,
        factory,
    })
}

fn collect_roots<T>(rules: &[Rule<T>]) -> Result<BTreeMap<String, RuleId>, SchemaBuildError> {
    let mut roots: BTreeMap<String, RuleId> = BTreeMap::new();
    for (index, rule) in rules.iter().enumerate() {
        let Some(object) = rule.as_object().filter(|object| object.is_root) else {
            continue;
        };
        let name = object.root_name();
        if let Some(first) = roots.get(name) {
            return Err(SchemaBuildError::DuplicateRoot {
                name: name.to_string(),
                first: rules[first.index()].key().to_string(),
                second: object.key.clone(),
            });
        }
        roots.insert(name.to_string(), RuleId::new(u32::try_from(index).unwrap_or(u32::MAX)));
    }
    if roots.is_empty() {
        return Err(SchemaBuildError::NoRoot);
    }
    Ok(roots)
}

/// Rules that are neither roots nor members of any object.
fn unused_rules<T>(rules: &[Rule<T>], roots: &BTreeMap<String, RuleId>) -> Vec<SchemaWarning> {
    let mut used: FxHashSet<RuleId> = roots.values().copied().collect();
    for rule in rules {
        if let Some(object) = rule.as_object() {
            used.extend(object.relationships.iter().map(|rel| rel.subject));
        }
    }
    rules
        .iter()
        .enumerate()
        .filter(|(index, _)| !used.contains(&RuleId::new(u32::try_from(*index).unwrap_or(u32::MAX))))
        .map(|(_, rule)| SchemaWarning::UnusedRule {
            key: rule.key().to_string(),
        })
        .collect()
}
