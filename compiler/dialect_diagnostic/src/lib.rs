//! Diagnostic system for the Dialect pipeline.
//!
//! Every phase (literal parsing, type promotion, evaluation, schema building,
//! transformation) reports problems as [`Diagnostic`]s rather than aborting:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary position (where it went wrong)
//! - Notes (why it's wrong)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted.
//!
//! ```text
//! // Can only get ErrorGuaranteed by emitting an error
//! let guarantee = queue.emit_error(diagnostic);
//!
//! // Functions can return ErrorGuaranteed to prove they reported errors
//! fn load() -> Result<Schema, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
