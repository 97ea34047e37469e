//! Recoverable problems reported while loading and resolving a descriptor.
//!
//! Descriptors are edited by hand, so a typo on one line must never abort the
//! whole run. Parsing and resolution push a [`Diagnostic`] into a
//! [`DiagnosticSink`] and carry on with the next line or entry.

use std::fmt;
use tracing::{debug, error, warn};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Low-priority detail, e.g. the cause chain behind a transport error.
    Verbose,
    /// Suspicious but harmless input (unknown keys).
    Warning,
    /// Something was dropped because of this problem.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Verbose => "verbose",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Which class of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed line or section.
    Format,
    /// A named server, build configuration or project does not exist.
    Reference,
    /// A remote call failed.
    Transport,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Format => "format",
            Self::Reference => "reference",
            Self::Transport => "transport",
        })
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// 1-based line number in the descriptor, when the problem has one.
    pub line: Option<usize>,
    /// Literal content of that line.
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            line: None,
            source_line: None,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn verbose(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Verbose, kind, message)
    }

    /// Attaches the descriptor line this diagnostic refers to.
    #[must_use]
    pub fn at_line(mut self, line: usize, content: &str) -> Self {
        self.line = Some(line);
        self.source_line = Some(content.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} ({}) line {line}: {}", self.severity, self.kind, self.message)?,
            None => write!(f, "{} ({}): {}", self.severity, self.kind, self.message)?,
        }
        if let Some(content) = &self.source_line {
            write!(f, "\n    | {content}")?;
        }
        Ok(())
    }
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Emits every diagnostic as a `tracing` event and forwards it to an inner sink.
pub struct TracingSink<S> {
    inner: S,
}

impl<S: DiagnosticSink> TracingSink<S> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DiagnosticSink> DiagnosticSink for TracingSink<S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(kind = %diagnostic.kind, line = ?diagnostic.line, "{}", diagnostic.message),
            Severity::Warning => warn!(kind = %diagnostic.kind, line = ?diagnostic.line, "{}", diagnostic.message),
            Severity::Verbose => debug!(kind = %diagnostic.kind, line = ?diagnostic.line, "{}", diagnostic.message),
        }
        self.inner.report(diagnostic);
    }
}

/// Counts error-severity diagnostics.
pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}
