//! Error handling for artdeps
//!
//! Two layers live here:
//! 1. [`ArtdepsError`] - strongly-typed errors for the failures that abort an
//!    operation (descriptor or configuration file unreadable, unknown server, ...)
//! 2. [`ErrorContext`] - a wrapper adding user-facing details and suggestions,
//!    rendered in color by the CLI
//!
//! Recoverable problems found while parsing or resolving a descriptor are *not*
//! errors in this sense; they are reported as
//! [`Diagnostic`](crate::core::Diagnostic)s and processing continues.
//!
//! # Examples
//!
//! ```rust,no_run
//! use artdeps::core::{ArtdepsError, ErrorContext, user_friendly_error};
//!
//! let error = ArtdepsError::DescriptorNotFound {
//!     path: "artifacts.deps".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for artdeps operations that cannot be recovered from.
///
/// Each variant names a specific failure mode and carries enough context
/// (paths, names, reasons) to build an actionable message.
#[derive(Error, Debug)]
pub enum ArtdepsError {
    /// The descriptor file does not exist.
    #[error("Descriptor file not found: {path}")]
    DescriptorNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The descriptor file exists but could not be read.
    #[error("Failed to read descriptor file: {path}")]
    DescriptorRead {
        /// Path of the descriptor
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The descriptor file could not be written.
    #[error("Failed to write descriptor file: {path}")]
    DescriptorWrite {
        /// Path of the descriptor
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A server name was requested that the registry does not know.
    #[error("Server '{name}' is not declared in the descriptor")]
    ServerNotFound {
        /// Requested server name
        name: String,
    },

    /// A `Type=` value did not name a supported connector kind.
    #[error("Unknown server type '{value}'")]
    UnknownServerType {
        /// The literal value
        value: String,
        /// Closest known value, if any
        suggestion: Option<String>,
    },

    /// A `Condition=` value did not name a known condition.
    #[error("Unknown condition '{value}'")]
    UnknownCondition {
        /// The literal value
        value: String,
        /// Closest known value, if any
        suggestion: Option<String>,
    },

    /// The global configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A snapshot document could not be loaded.
    #[error("Invalid snapshot '{path}': {reason}")]
    SnapshotError {
        /// Snapshot location
        path: String,
        /// What went wrong
        reason: String,
    },

    /// The descriptor parsed with errors and the caller asked for a clean one.
    #[error("Descriptor has {count} error(s)")]
    DescriptorInvalid {
        /// Number of error diagnostics
        count: usize,
    },

    /// Some dependency sections could not be resolved.
    #[error("{count} dependency problem(s) while resolving")]
    ResolutionIncomplete {
        /// Number of error diagnostics
        count: usize,
    },

    /// Anything else
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// An error plus optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ArtdepsError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error without details or suggestion.
    #[must_use]
    pub const fn new(error: ArtdepsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Adds a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Adds details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Converts any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// Typed [`ArtdepsError`]s anywhere in the chain are recognized; other errors
/// become [`ArtdepsError::Other`] carrying the full cause chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();

    let Some(typed) = error.chain().find_map(|e| e.downcast_ref::<ArtdepsError>()) else {
        let ctx = ErrorContext::new(ArtdepsError::Other {
            message: error.to_string(),
        });
        return if details.is_empty() {
            ctx
        } else {
            ctx.with_details(details.join(": "))
        };
    };

    let ctx = match typed {
        ArtdepsError::DescriptorNotFound {
            path,
        } => ErrorContext::new(ArtdepsError::DescriptorNotFound {
            path: path.clone(),
        })
        .with_suggestion("Pass the descriptor with --descriptor or set `descriptor` in the config file"),
        ArtdepsError::ServerNotFound {
            name,
        } => ErrorContext::new(ArtdepsError::ServerNotFound {
            name: name.clone(),
        })
        .with_suggestion(format!("Add a [[{name}]] block with Type= and Url= to the descriptor")),
        ArtdepsError::UnknownServerType {
            value,
            suggestion,
        } => with_did_you_mean(
            ErrorContext::new(ArtdepsError::UnknownServerType {
                value: value.clone(),
                suggestion: suggestion.clone(),
            }),
            suggestion.as_deref(),
        ),
        ArtdepsError::UnknownCondition {
            value,
            suggestion,
        } => with_did_you_mean(
            ErrorContext::new(ArtdepsError::UnknownCondition {
                value: value.clone(),
                suggestion: suggestion.clone(),
            }),
            suggestion.as_deref(),
        ),
        ArtdepsError::ConfigError {
            message,
        } => ErrorContext::new(ArtdepsError::ConfigError {
            message: message.clone(),
        })
        .with_suggestion("Check the TOML syntax of your artdeps config file"),
        ArtdepsError::DescriptorInvalid {
            count,
        } => ErrorContext::new(ArtdepsError::DescriptorInvalid {
            count: *count,
        })
        .with_suggestion("Fix the reported lines and run `artdeps check` again"),
        ArtdepsError::ResolutionIncomplete {
            count,
        } => ErrorContext::new(ArtdepsError::ResolutionIncomplete {
            count: *count,
        })
        .with_suggestion("Run with --verbose to see the underlying transport errors"),
        other => ErrorContext::new(ArtdepsError::Other {
            message: other.to_string(),
        }),
    };

    if details.is_empty() {
        ctx
    } else {
        ctx.with_details(details.join(": "))
    }
}

fn with_did_you_mean(ctx: ErrorContext, suggestion: Option<&str>) -> ErrorContext {
    match suggestion {
        Some(s) => ctx.with_suggestion(format!("Did you mean '{s}'?")),
        None => ctx,
    }
}

/// Returns the candidate closest to `value`, if it is close enough to be a likely typo.
pub fn closest_match<'a>(value: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, strsim::jaro_winkler(&value.to_lowercase(), &c.to_lowercase())))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
