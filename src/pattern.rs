//! Path rules: which artifact files of a build to take and where to put them.
//!
//! Each non-empty line of a dependency's `Path` value is one rule:
//!
//! ```text
//! [@<Condition>:]<pattern>[=><destination>]
//! ```
//!
//! # Pattern Syntax
//!
//! Patterns are glob patterns matched against the `/`-separated relative paths
//! of a build's artifact listing:
//!
//! - `*` matches any sequence of characters within a single path component
//! - `**` matches any number of path components (it must be a whole component)
//! - `?` matches any single character except `/`
//! - `[abc]` / `[a-z]` match one character of the set or range
//!
//! Matching is case-sensitive. Brace alternatives (`{a,b}`) are not supported.
//!
//! # Destinations
//!
//! - no `=>`: the file keeps its relative path
//! - destination empty or ending in `/`: a directory; the file is placed under
//!   it at its path relative to the pattern's literal directory prefix
//!   (`build/*.zip=>lib/` puts `build/x.zip` at `lib/x.zip`)
//! - any other destination: a literal file path used as-is
//!
//! # Conditions
//!
//! `@Debug:` / `@Release:` narrow the rule to one build variant; without a
//! prefix the rule inherits the dependency's condition.
//!
//! # Security
//!
//! Patterns and destinations that are absolute or contain a `..` component are
//! rejected, so a rule can neither reach outside the artifact tree nor write
//! outside the destination root.

use crate::core::Condition;
use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::trace;

/// Separator between the source pattern and the destination.
pub const DESTINATION_SEPARATOR: &str = "=>";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Why a rule line could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Path rule is empty")]
    Empty,

    #[error("Unknown condition '{value}' in path rule")]
    UnknownCondition {
        value: String,
    },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("Unsafe path '{path}': {reason}")]
    UnsafePath {
        path: String,
        reason: String,
    },
}

/// One parsed rule line.
#[derive(Debug, Clone)]
pub struct PathRule {
    /// Condition written on the rule (`Always` when there is no prefix)
    pub condition: Condition,
    pub source_pattern: String,
    pub destination: Option<String>,
    pattern: Pattern,
    prefix: String,
}

impl PathRule {
    /// Parses one rule line.
    ///
    /// ```rust
    /// use artdeps::pattern::PathRule;
    ///
    /// let rule = PathRule::parse("build/*.zip => lib/")?;
    /// assert!(rule.matches("build/x.zip"));
    /// assert!(!rule.matches("build/nested/x.zip"));
    /// assert_eq!(rule.destination_for("build/x.zip"), "lib/x.zip");
    /// # Ok::<(), artdeps::pattern::RuleError>(())
    /// ```
    pub fn parse(line: &str) -> Result<Self, RuleError> {
        let mut rest = line.trim();
        if rest.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut condition = Condition::Always;
        if let Some(prefixed) = rest.strip_prefix('@') {
            let (name, remainder) = prefixed.split_once(':').unwrap_or((prefixed, ""));
            condition = name.trim().parse().map_err(|_| RuleError::UnknownCondition {
                value: name.trim().to_string(),
            })?;
            rest = remainder.trim();
        }

        let (source, destination) = match rest.split_once(DESTINATION_SEPARATOR) {
            Some((source, destination)) => (source.trim(), Some(destination.trim().to_string())),
            None => (rest, None),
        };
        if source.is_empty() {
            return Err(RuleError::Empty);
        }

        validate_path_safety(source)?;
        if let Some(destination) = &destination {
            validate_path_safety(destination)?;
        }

        let pattern = Pattern::new(source).map_err(|e| RuleError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.msg.to_string(),
        })?;

        Ok(Self {
            condition,
            source_pattern: source.to_string(),
            destination,
            pattern,
            prefix: literal_prefix(source),
        })
    }

    /// Whether an artifact path matches the source pattern.
    pub fn matches(&self, path: &str) -> bool {
        let matched = self.pattern.matches_with(path, MATCH_OPTIONS);
        trace!("'{}' {} '{}'", path, if matched { "matches" } else { "does not match" }, self.source_pattern);
        matched
    }

    /// Local destination of a matched artifact path.
    pub fn destination_for(&self, path: &str) -> String {
        match self.destination.as_deref() {
            None => path.to_string(),
            Some(dir) if dir.is_empty() || dir.ends_with('/') => {
                let relative = path.strip_prefix(self.prefix.as_str()).unwrap_or_else(|| file_name(path));
                format!("{dir}{relative}")
            }
            Some(file) => file.to_string(),
        }
    }

    /// Directory components before the first wildcard, with a trailing `/`.
    pub fn literal_prefix(&self) -> &str {
        &self.prefix
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

fn literal_prefix(pattern: &str) -> String {
    let components: Vec<&str> = pattern.split('/').collect();
    let literal = components.iter().position(|c| has_wildcard(c)).unwrap_or(components.len() - 1);
    components[..literal].iter().map(|c| format!("{c}/")).collect()
}

/// Rejects absolute paths and `..` components.
pub fn validate_path_safety(path: &str) -> Result<(), RuleError> {
    let unsafe_path = |reason: &str| RuleError::UnsafePath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.starts_with('/') || path.starts_with('\\') {
        return Err(unsafe_path("absolute path"));
    }
    if path.as_bytes().get(1) == Some(&b':') {
        return Err(unsafe_path("absolute path"));
    }
    if path.split(['/', '\\']).any(|c| c == "..") {
        return Err(unsafe_path("path traversal (..)"));
    }
    Ok(())
}
