//! Diagnostic emitters.
//!
//! The core renders diagnostics as plain text lines of the form
//! `{source}:{line} {message}`, errors first, then warnings, then infos,
//! followed by a one-line summary.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// Line-oriented plain text emitter.
pub struct PlainEmitter<W: Write> {
    writer: W,
    source: String,
}

impl<W: Write> PlainEmitter<W> {
    /// Create an emitter that prefixes every line with `source`.
    pub fn new(writer: W, source: impl Into<String>) -> Self {
        PlainEmitter {
            writer,
            source: source.into(),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl PlainEmitter<io::Stderr> {
    /// Create an emitter writing to stderr.
    pub fn stderr(source: impl Into<String>) -> Self {
        PlainEmitter::new(io::stderr(), source)
    }
}

impl<W: Write> DiagnosticEmitter for PlainEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let line = diagnostic.sort_pos().line;
        let _ = writeln!(
            self.writer,
            "{}:{line} {}",
            self.source, diagnostic.message
        );
        for note in &diagnostic.notes {
            let _ = writeln!(self.writer, "  = note: {note}");
        }
        for suggestion in &diagnostic.suggestions {
            let _ = writeln!(self.writer, "  = help: {suggestion}");
        }
    }

    /// Errors first, then warnings, then infos; position order within a group.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            for diag in diagnostics.iter().filter(|d| d.severity == severity) {
                self.emit(diag);
            }
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }

        if error_count > 0 {
            let _ = write!(
                self.writer,
                "{}: failed with {error_count} error{}",
                self.source,
                plural_s(error_count)
            );
            if warning_count > 0 {
                let _ = write!(
                    self.writer,
                    "; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            }
            let _ = writeln!(self.writer);
        } else {
            let _ = writeln!(
                self.writer,
                "{}: {warning_count} warning{} emitted",
                self.source,
                plural_s(warning_count)
            );
        }
    }
}

/// Render `diagnostics` with a [`PlainEmitter`] into a string.
pub fn render(source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut emitter = PlainEmitter::new(Vec::new(), source);
    emitter.emit_all(diagnostics);
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
    emitter.emit_summary(errors, warnings);
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

#[cfg(test)]
mod tests;
