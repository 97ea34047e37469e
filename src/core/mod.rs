//! Core types shared by every other module.
//!
//! - [`error`] - fatal errors ([`ArtdepsError`]) and their user-facing rendering
//!   ([`ErrorContext`], [`user_friendly_error`])
//! - [`diagnostics`] - recoverable problems ([`Diagnostic`]) and the sinks that
//!   receive them
//! - [`condition`] - the build-variant [`Condition`] attached to entries, rules
//!   and jobs

pub mod condition;
pub mod diagnostics;
pub mod error;

pub use condition::Condition;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity, TracingSink, error_count};
pub use error::{ArtdepsError, ErrorContext, user_friendly_error};
