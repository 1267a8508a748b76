//! Transformation sessions.

use std::sync::Arc;

use dialect_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};
use dialect_eval::{FunctionRegistry, Library};
use dialect_ir::{Document, NodeId};
use dialect_schema::Schema;
use dialect_stack::DEFAULT_MAX_DEPTH;
use dialect_transform::{load_dialect, Record, Transformer};
use rayon::prelude::*;

use crate::outcome::Outcome;

/// Settings shared by every run of a [`Session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name diagnostics are rendered against.
    pub source_name: String,
    pub diagnostics: DiagnosticConfig,
    /// Run [`Session::transform_all`] on the rayon pool.
    pub parallel: bool,
    /// Deepest accepted document nesting.
    pub max_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            source_name: "<document>".to_string(),
            diagnostics: DiagnosticConfig::default(),
            parallel: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.diagnostics = self.diagnostics.with_error_limit(limit);
        self
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// A schema and library ready to transform documents.
///
/// Cloning is cheap; clones share the schema and library.
pub struct Session<T> {
    schema: Arc<Schema<T>>,
    library: Arc<dyn Library>,
    config: SessionConfig,
    /// Warnings from loading the schema, if it came from a dialect.
    warnings: Vec<Diagnostic>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Session {
            schema: Arc::clone(&self.schema),
            library: Arc::clone(&self.library),
            config: self.config.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

impl<T> Session<T> {
    pub fn new(schema: Schema<T>, library: impl Library + 'static) -> Self {
        Self::from_shared(Arc::new(schema), Arc::new(library))
    }

    pub fn from_shared(schema: Arc<Schema<T>>, library: Arc<dyn Library>) -> Self {
        Session {
            schema,
            library,
            config: SessionConfig::default(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub fn library(&self) -> &dyn Library {
        &*self.library
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Warnings reported while loading the dialect.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    fn transformer(&self) -> Transformer<'_, T> {
        Transformer::new(&self.schema, &*self.library)
            .with_config(self.config.diagnostics.clone())
            .with_max_depth(self.config.max_depth)
    }

    /// Transform the tree rooted at `root`.
    pub fn transform(&self, doc: &Document, root: NodeId) -> Outcome<T> {
        self.run(&self.config.source_name, doc, Some(root))
    }

    fn run(&self, source: &str, doc: &Document, root: Option<NodeId>) -> Outcome<T> {
        let Some(root) = root else {
            let mut queue = DiagnosticQueue::with_config(self.config.diagnostics.clone());
            queue.add(Diagnostic::error(ErrorCode::E9001).with_message("document has no root node"));
            return Outcome::new(source, None, queue);
        };
        let transformation = self.transformer().transform(doc, root);
        Outcome::new(source, transformation.value, transformation.diagnostics)
    }
}

impl<T: Send> Session<T> {
    /// Transform every document from its root node.
    ///
    /// Documents are independent; with [`SessionConfig::parallel`] they run on
    /// the rayon pool. Outcomes keep the input order and are rendered against
    /// `{source_name}[{index}]`.
    #[tracing::instrument(level = "debug", skip_all, fields(documents = docs.len()))]
    pub fn transform_all(&self, docs: &[Document]) -> Vec<Outcome<T>> {
        let run = |(index, doc): (usize, &Document)| {
            let source = format!("{}[{index}]", self.config.source_name);
            self.run(&source, doc, doc.root())
        };
        let outcomes: Vec<Outcome<T>> = if self.config.parallel {
            docs.par_iter().enumerate().map(run).collect()
        } else {
            docs.iter().enumerate().map(run).collect()
        };
        tracing::debug!(
            failed = outcomes.iter().filter(|o| o.has_errors()).count(),
            "batch finished"
        );
        outcomes
    }
}

impl Session<Record> {
    /// Load the dialect rooted at `root` and start a session over it, with
    /// the builtin function library.
    ///
    /// On failure the outcome carries the loader's diagnostics.
    pub fn from_dialect(doc: &Document, root: NodeId, config: SessionConfig) -> Result<Self, Outcome<Record>> {
        match load_dialect(doc, root) {
            Ok(dialect) => {
                tracing::debug!(dialect = %dialect.name, "session started");
                Ok(Session {
                    schema: Arc::new(dialect.schema),
                    library: Arc::new(FunctionRegistry::with_builtins()),
                    config,
                    warnings: dialect.warnings,
                })
            }
            Err(diagnostics) => Err(Outcome::new(config.source_name, None, diagnostics)),
        }
    }
}
