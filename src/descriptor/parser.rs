//! Descriptor parsing with line-accurate error recovery.
//!
//! Every malformed line yields a [`Diagnostic`] carrying its line number and
//! literal content, and parsing continues with the next line:
//!
//! - unknown `Type` value: error, the server is not created, its block is still consumed
//! - server block without `Type`/`Url`, or with a name already taken: error, no server
//! - dependency section naming an undeclared server: one reference error; the
//!   block is consumed into a placeholder that is then discarded
//! - unknown `Condition` / invalid `CleanDestination`: error, previous value kept
//! - line without `=`, `key=value` outside any section, malformed header: error, skipped
//! - unknown key inside a section: warning, skipped

use crate::core::error::ArtdepsError;
use crate::core::{Diagnostic, DiagnosticKind};
use crate::descriptor::{DependencySpec, ParsedDescriptor};
use crate::server::{Server, ServerType};
use tracing::{debug, trace};

/// Parses descriptor text. Never fails; problems are returned as diagnostics.
///
/// ```rust
/// let parsed = artdeps::descriptor::parse("[[ci]]\nType=TeamCity\nUrl=https://ci\n\n[ci::Lib_Build]\nPath=*.zip\n");
/// assert_eq!(parsed.descriptor.servers.len(), 1);
/// assert_eq!(parsed.descriptor.dependencies.len(), 1);
/// assert!(parsed.diagnostics.is_empty());
/// ```
pub fn parse(text: &str) -> ParsedDescriptor {
    let mut parser = Parser::default();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        parser.line(idx + 1, line);
    }
    parser.finish_block();

    let parsed = parser.parsed;
    debug!(
        "Parsed descriptor: {} server(s), {} dependency section(s), {} diagnostic(s)",
        parsed.descriptor.servers.len(),
        parsed.descriptor.dependencies.len(),
        parsed.diagnostics.len()
    );
    parsed
}

#[derive(Debug)]
struct ServerDraft {
    name: String,
    line: usize,
    header: String,
    server_type: Option<ServerType>,
    url: Option<String>,
    /// Set once the block can no longer produce a server; its lines are still consumed.
    rejected: bool,
}

#[derive(Debug)]
struct DependencyDraft {
    spec: DependencySpec,
    placeholder: bool,
    in_path: bool,
}

#[derive(Debug, Default)]
enum Block {
    #[default]
    None,
    Server(ServerDraft),
    Dependency(DependencyDraft),
}

#[derive(Default)]
struct Parser {
    parsed: ParsedDescriptor,
    block: Block,
}

impl Parser {
    fn line(&mut self, line_no: usize, line: &str) {
        if matches!(&self.block, Block::Dependency(d) if d.in_path) {
            if line.trim().is_empty() {
                self.finish_block();
            } else if let Block::Dependency(d) = &mut self.block {
                if !d.spec.path_rules.is_empty() {
                    d.spec.path_rules.push('\n');
                }
                d.spec.path_rules.push_str(line);
            }
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.finish_block();
        } else if trimmed.starts_with('#') {
            trace!("line {line_no}: comment");
        } else if trimmed.starts_with('[') {
            self.finish_block();
            self.open_section(trimmed, line_no, line);
        } else {
            self.key_value(line.trim_start(), line_no, line);
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.parsed.diagnostics.push(diagnostic);
    }

    fn format_error(&mut self, message: impl Into<String>, line_no: usize, line: &str) {
        self.report(Diagnostic::error(DiagnosticKind::Format, message).at_line(line_no, line));
    }

    fn open_section(&mut self, header: &str, line_no: usize, line: &str) {
        if let Some(inner) = header.strip_prefix("[[").and_then(|h| h.strip_suffix("]]")) {
            self.open_server(inner.trim(), line_no, line);
            return;
        }

        let Some(inner) = header.strip_prefix('[').and_then(|h| h.strip_suffix(']')) else {
            self.format_error(format!("Malformed section header '{header}'"), line_no, line);
            return;
        };

        match inner.split_once("::") {
            Some((server, config)) if !server.trim().is_empty() && !config.trim().is_empty() => {
                self.open_dependency(server.trim(), config.trim(), line_no, line);
            }
            _ => self.format_error(
                format!("Malformed dependency header '{header}', expected [server::buildConfigId]"),
                line_no,
                line,
            ),
        }
    }

    fn open_server(&mut self, name: &str, line_no: usize, line: &str) {
        if name.is_empty() {
            self.format_error("Server block without a name", line_no, line);
            return;
        }

        let rejected = self.parsed.descriptor.server(name).is_some();
        if rejected {
            self.format_error(format!("Server '{name}' is declared more than once"), line_no, line);
        }

        self.block = Block::Server(ServerDraft {
            name: name.to_string(),
            line: line_no,
            header: line.to_string(),
            server_type: None,
            url: None,
            rejected,
        });
    }

    fn open_dependency(&mut self, server: &str, config: &str, line_no: usize, line: &str) {
        let placeholder = self.parsed.descriptor.server(server).is_none();
        if placeholder {
            self.report(
                Diagnostic::error(
                    DiagnosticKind::Reference,
                    format!("Server '{server}' is not declared; section [{server}::{config}] is ignored"),
                )
                .at_line(line_no, line),
            );
        }

        self.block = Block::Dependency(DependencyDraft {
            spec: DependencySpec::new(server, config).with_origin(line_no, line),
            placeholder,
            in_path: false,
        });
    }

    /// `Path` keeps its value untrimmed, like its continuation lines.
    fn key_value(&mut self, unindented: &str, line_no: usize, line: &str) {
        let Some((key, raw_value)) = unindented.split_once('=') else {
            self.format_error("Expected key=value", line_no, line);
            return;
        };
        let key = key.trim();
        let value = raw_value.trim();

        match std::mem::take(&mut self.block) {
            Block::None => {
                self.format_error(format!("'{key}' appears outside of any section"), line_no, line);
            }
            Block::Server(mut draft) => {
                self.server_key(&mut draft, key, value, line_no, line);
                self.block = Block::Server(draft);
            }
            Block::Dependency(mut draft) => {
                self.dependency_key(&mut draft, key, value, raw_value, line_no, line);
                self.block = Block::Dependency(draft);
            }
        }
    }

    fn server_key(&mut self, draft: &mut ServerDraft, key: &str, value: &str, line_no: usize, line: &str) {
        match key {
            "Type" => match value.parse::<ServerType>() {
                Ok(server_type) => draft.server_type = Some(server_type),
                Err(e) => {
                    self.format_error(describe(&e), line_no, line);
                    draft.rejected = true;
                }
            },
            "Url" => draft.url = Some(value.to_string()),
            _ => self.report(
                Diagnostic::warning(DiagnosticKind::Format, format!("Unknown key '{key}' in server block"))
                    .at_line(line_no, line),
            ),
        }
    }

    fn dependency_key(
        &mut self,
        draft: &mut DependencyDraft,
        key: &str,
        value: &str,
        raw_value: &str,
        line_no: usize,
        line: &str,
    ) {
        let spec = &mut draft.spec;
        match key {
            "Name" => {}
            "RevisionName" => spec.revision.name = value.to_string(),
            "RevisionValue" => spec.revision.value = value.to_string(),
            "Condition" => match value.parse() {
                Ok(condition) => spec.condition = condition,
                Err(e) => self.format_error(describe(&e), line_no, line),
            },
            "CleanDestination" => match value {
                "true" => spec.clean_destination = true,
                "false" => spec.clean_destination = false,
                _ => self.format_error(
                    format!("CleanDestination must be 'true' or 'false', got '{value}'"),
                    line_no,
                    line,
                ),
            },
            "Path" => {
                spec.path_rules = raw_value.to_string();
                draft.in_path = true;
            }
            _ => self.report(
                Diagnostic::warning(DiagnosticKind::Format, format!("Unknown key '{key}' in dependency section"))
                    .at_line(line_no, line),
            ),
        }
    }

    fn finish_block(&mut self) {
        match std::mem::take(&mut self.block) {
            Block::None => {}
            Block::Server(draft) => self.finish_server(draft),
            Block::Dependency(draft) => {
                if draft.placeholder {
                    trace!("Dropping placeholder section {}", draft.spec.key());
                } else {
                    self.parsed.descriptor.dependencies.push(draft.spec);
                }
            }
        }
    }

    fn finish_server(&mut self, draft: ServerDraft) {
        if draft.rejected {
            return;
        }
        let ServerDraft {
            name,
            line,
            header,
            server_type,
            url,
            ..
        } = draft;

        match (server_type, url) {
            (Some(server_type), Some(url)) => {
                self.parsed.descriptor.servers.push(Server::new(name, server_type, url));
            }
            (None, _) => self.format_error(format!("Server '{name}' has no Type"), line, &header),
            (_, None) => self.format_error(format!("Server '{name}' has no Url"), line, &header),
        }
    }
}

fn describe(error: &ArtdepsError) -> String {
    match error {
        ArtdepsError::UnknownServerType {
            suggestion: Some(s),
            ..
        }
        | ArtdepsError::UnknownCondition {
            suggestion: Some(s),
            ..
        } => format!("{error} (did you mean '{s}'?)"),
        _ => error.to_string(),
    }
}
