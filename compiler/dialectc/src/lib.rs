//! Dialect driver.
//!
//! Ties the pipeline together for callers that already hold a generic tree:
//!
//! ```text
//! Document ──► Session::transform ──► Outcome { value, diagnostics }
//!                  │
//!                  ├── Schema<T>   (shared, read-only)
//!                  └── Library     (shared, read-only)
//! ```
//!
//! A [`Session`] can be built from a hand-declared schema or from a dialect
//! document ([`Session::from_dialect`]). Independent documents are
//! transformed in parallel by [`Session::transform_all`].

use std::sync::Once;

mod outcome;
mod session;

pub use outcome::Outcome;
pub use session::{Session, SessionConfig};

pub use dialect_diagnostic::{Diagnostic, DiagnosticConfig, ErrorCode, Severity};
pub use dialect_transform::{LoadedDialect, Record, SchemaViolation};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing based on the `RUST_LOG` environment variable.
///
/// Call once at startup; later calls do nothing.
///
/// # Example
///
/// ```bash
/// RUST_LOG=dialect_transform=trace cargo test -p dialectc
/// RUST_LOG=dialect_eval=trace,dialect_schema=debug cargo test
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
