//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics at the same position
//! - Stable position ordering on flush
//! - `ErrorGuaranteed` proof that errors were emitted

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use dialect_ir::Pos;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

#[inline]
fn message_hash(msg: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    msg.hash(&mut hasher);
    hasher.finish()
}

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic whose code, message and position repeat an earlier one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits and no filtering (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }

    /// Stop recording errors after `limit` of them.
    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }
}

/// Append-only collector for one run.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic);
/// // ... add more diagnostics
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    /// Collected diagnostics, in report order.
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/infos).
    error_count: usize,
    warning_count: usize,
    /// Errors dropped because the limit was reached.
    suppressed: usize,
    /// (position, code, message hash) of everything recorded so far.
    seen: HashSet<(Pos, ErrorCode, u64)>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was recorded, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }

        if self.config.deduplicate {
            let key = (diag.sort_pos(), diag.code, message_hash(&diag.message));
            if !self.seen.insert(key) {
                return false;
            }
        }

        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        self.diagnostics.push(diag);
        true
    }

    /// Add every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diag in diagnostics {
            self.add(diag);
        }
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The returned `ErrorGuaranteed` can only be obtained through the queue.
    /// A diagnostic with a non-error severity is promoted to an error.
    pub fn emit_error(&mut self, mut diag: Diagnostic) -> ErrorGuaranteed {
        diag.severity = Severity::Error;
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count + self.suppressed)
    }

    /// Diagnostics ordered by position without clearing the queue.
    ///
    /// Equal positions keep report order. When errors were dropped by the
    /// limit a trailing "too many errors" diagnostic is appended.
    pub fn sorted(&self) -> Vec<Diagnostic> {
        let mut result = self.diagnostics.clone();
        result.sort_by_key(Diagnostic::sort_pos);
        if self.suppressed > 0 {
            result.push(too_many_errors(self.config.error_limit, self.suppressed));
        }
        result
    }

    /// Sort diagnostics by position and return them, clearing the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let result = self.sorted();
        self.diagnostics.clear();
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        result
    }

    /// Get diagnostics in report order without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, dropped: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("stopped after {limit} errors"))
        .with_note(format!("{dropped} further error(s) were not reported"))
}
