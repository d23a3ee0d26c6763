//! Shared primitives, traits, and diagnostics for the Protea toolkit.
//!
//! `protea-core` provides the foundation the alignment crate builds on:
//!
//! - **Error types**: [`ProteaError`] and [`Result`] for structured error handling
//! - **Traits**: small contracts like [`Scored`] and [`Summarizable`]
//! - **Diagnostics**: a rate-limited, caller-injected warning channel
//!   ([`Diagnostics`]) that forwards to the `log` facade by default

pub mod diagnostics;
pub mod error;
pub mod traits;

pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, LogSink, DEFAULT_WARNING_LIMIT};
pub use error::{ProteaError, Result};
pub use traits::*;
