//! The dependency descriptor: a small, hand-edited, line-oriented text file.
//!
//! # Format
//!
//! ```text
//! # comment lines are ignored
//! [[ci]]
//! Type=TeamCity
//! Url=https://ci.example.com
//!
//! [ci::Lib_Build]
//! Name=Build
//! RevisionName=lastSuccessful
//! RevisionValue=latest.lastSuccessful
//! Condition=Always
//! CleanDestination=false
//! Path=build/*.zip=>lib/
//! docs/**
//!
//! ```
//!
//! - `[[name]]` opens a server block (`Type`, `Url`)
//! - `[server::buildConfigId]` opens a dependency block (`Name`, `RevisionName`,
//!   `RevisionValue`, `Condition`, `CleanDestination`, `Path`)
//! - `Path` continues on the following non-blank lines; a blank line (or end of
//!   input) terminates it
//! - `Name` is written for readers and ignored when reading
//!
//! Parsing never fails as a whole: see [`parser`] for the recovery rules.

pub mod io;
pub mod parser;
pub mod writer;

pub use io::{load_file, read_file, save_file};
pub use parser::parse;
pub use writer::{save, save_specs};

use crate::core::{Condition, Diagnostic};
use crate::server::Server;
use std::fmt;

/// Which build's artifacts a dependency uses.
///
/// `name` is the selector kind (`lastSuccessful`, `lastPinned`, `lastFinished`,
/// `buildNumber`, `buildTag`, ...) and `value` its argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionSelector {
    pub name: String,
    pub value: String,
}

impl Default for RevisionSelector {
    fn default() -> Self {
        Self::new("lastSuccessful", "latest.lastSuccessful")
    }
}

impl RevisionSelector {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The revision part of an artifact download path.
    ///
    /// `latest.lastSuccessful` → `.lastSuccessful`, a `buildTag` selector with
    /// value `stable` → `stable.tcbuildtag`, anything else is used verbatim
    /// (build numbers).
    pub fn path_segment(&self) -> String {
        if let Some(rest) = self.value.strip_prefix("latest.") {
            format!(".{rest}")
        } else if self.name == "buildTag" {
            format!("{}.tcbuildtag", self.value)
        } else {
            self.value.clone()
        }
    }
}

impl fmt::Display for RevisionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The header line a section was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOrigin {
    pub line: usize,
    pub header: String,
}

/// One `[server::buildConfigId]` section as written, before resolution.
///
/// Equality ignores [`origin`](Self::origin).
#[derive(Debug, Clone)]
pub struct DependencySpec {
    /// Name of a server declared in the same descriptor
    pub server: String,
    pub build_configuration_id: String,
    pub revision: RevisionSelector,
    pub condition: Condition,
    /// Newline separated path rules, kept verbatim
    pub path_rules: String,
    /// Whether the destination is emptied before artifacts are copied into it
    pub clean_destination: bool,
    /// Set by the parser; `None` for sections built in code.
    pub origin: Option<SectionOrigin>,
}

impl PartialEq for DependencySpec {
    fn eq(&self, other: &Self) -> bool {
        self.server == other.server
            && self.build_configuration_id == other.build_configuration_id
            && self.revision == other.revision
            && self.condition == other.condition
            && self.path_rules == other.path_rules
            && self.clean_destination == other.clean_destination
    }
}

impl Eq for DependencySpec {}

impl DependencySpec {
    pub fn new(server: impl Into<String>, build_configuration_id: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            build_configuration_id: build_configuration_id.into(),
            revision: RevisionSelector::default(),
            condition: Condition::default(),
            path_rules: String::new(),
            clean_destination: false,
            origin: None,
        }
    }

    #[must_use]
    pub fn with_revision(mut self, revision: RevisionSelector) -> Self {
        self.revision = revision;
        self
    }

    #[must_use]
    pub const fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    #[must_use]
    pub fn with_path_rules(mut self, rules: impl Into<String>) -> Self {
        self.path_rules = rules.into();
        self
    }

    #[must_use]
    pub const fn with_clean_destination(mut self, clean: bool) -> Self {
        self.clean_destination = clean;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, line: usize, header: impl Into<String>) -> Self {
        self.origin = Some(SectionOrigin {
            line,
            header: header.into(),
        });
        self
    }

    /// `server::buildConfigId`, the section header without brackets.
    pub fn key(&self) -> String {
        format!("{}::{}", self.server, self.build_configuration_id)
    }

    /// Non-empty rule lines, in order.
    pub fn rule_lines(&self) -> impl Iterator<Item = &str> {
        self.path_rules.lines().map(|l| l.trim_end_matches('\r')).filter(|l| !l.trim().is_empty())
    }
}

/// Servers and dependency sections of a descriptor, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub servers: Vec<Server>,
    pub dependencies: Vec<DependencySpec>,
}

impl Descriptor {
    pub fn server(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.name == name)
    }
}

/// Result of [`parse`]: whatever could be read, plus what went wrong.
#[derive(Debug, Clone, Default)]
pub struct ParsedDescriptor {
    pub descriptor: Descriptor,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDescriptor {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}
