//! Result of transforming one document.

use dialect_diagnostic::{emitter, Diagnostic, DiagnosticQueue};

/// Value and diagnostics of one run.
#[derive(Debug)]
pub struct Outcome<T> {
    source: String,
    value: Option<T>,
    /// Sorted by position.
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

impl<T> Outcome<T> {
    pub(crate) fn new(source: impl Into<String>, value: Option<T>, mut queue: DiagnosticQueue) -> Self {
        let diagnostics = queue.flush();
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        Outcome {
            source: source.into(),
            value,
            diagnostics,
            errors,
        }
    }

    /// Name the diagnostics are rendered against.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The built value. Present only when no error was reported.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref().filter(|_| self.errors == 0)
    }

    pub fn into_value(self) -> Option<T> {
        if self.errors == 0 {
            self.value
        } else {
            None
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// `{source}:{line} {message}` per diagnostic, errors before warnings
    /// before infos, followed by a summary line.
    pub fn render(&self) -> String {
        emitter::render(&self.source, &self.diagnostics)
    }
}
