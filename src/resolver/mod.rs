//! Resolution of descriptor sections into dependency entries and download jobs.
//!
//! # Pipeline
//!
//! For each dependency section, in file order:
//!
//! 1. Look up the build configuration by id and the server's project list
//!    concurrently, so their latencies overlap.
//! 2. Configuration missing → reference error, section skipped.
//! 3. Owning project missing → reference error, section skipped.
//! 4. Otherwise a [`DependencyEntry`] is built.
//!
//! Any transport failure is reported as an error diagnostic plus a verbose one
//! carrying the cause chain, and the pipeline moves on: an unreachable server
//! only costs the sections that name it.
//!
//! [`collect_jobs`] then fetches each entry's artifact listing once and expands
//! its path rules with [`expand_jobs`].
//!
//! Metadata is memoized per server connection, so sections sharing a server
//! share its project list and configuration lookups.

pub mod entry;
pub mod import;
pub mod job;

pub use entry::DependencyEntry;
pub use import::{import_dependencies, merge_imported};
pub use job::{Job, expand_jobs};

use crate::core::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::descriptor::{DependencySpec, Descriptor, SectionOrigin};
use crate::server::ServerRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Why one section or entry could not be resolved.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Server '{name}' is not registered")]
    UnknownServer {
        name: String,
    },

    #[error("Build configuration '{id}' not found on server '{server}'")]
    BuildConfigurationNotFound {
        server: String,
        id: String,
    },

    #[error("Project '{project_id}' of build configuration '{build_configuration_id}' not found on server '{server}'")]
    ProjectNotFound {
        server: String,
        project_id: String,
        build_configuration_id: String,
    },

    #[error("Server '{server}' returned build configuration '{returned}' when asked for '{requested}'")]
    Inconsistent {
        server: String,
        requested: String,
        returned: String,
    },

    #[error("Failed to {operation} on server '{server}'")]
    Transport {
        server: String,
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    fn transport(server: &str, operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Transport {
            server: server.to_string(),
            operation: operation.into(),
            source,
        }
    }

    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Transport {
                ..
            } => DiagnosticKind::Transport,
            _ => DiagnosticKind::Reference,
        }
    }

    /// An error diagnostic, plus a verbose one with the cause chain for transport errors.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        let mut diagnostics = vec![Diagnostic::error(self.kind(), self.to_string())];
        if let Self::Transport {
            source,
            ..
        } = &self
        {
            diagnostics.push(Diagnostic::verbose(DiagnosticKind::Transport, format!("{source:#}")));
        }
        diagnostics
    }
}

fn report(sink: &mut dyn DiagnosticSink, error: ResolveError) {
    report_at(sink, error, None);
}

/// Reports `error`, pointing at the section header when it is known.
fn report_at(sink: &mut dyn DiagnosticSink, error: ResolveError, origin: Option<&SectionOrigin>) {
    for diagnostic in error.into_diagnostics() {
        sink.report(match origin {
            Some(origin) => diagnostic.at_line(origin.line, &origin.header),
            None => diagnostic,
        });
    }
}

/// Resolves every section of a descriptor; failures become diagnostics.
pub async fn resolve(
    descriptor: &Descriptor,
    registry: &ServerRegistry,
    sink: &mut dyn DiagnosticSink,
) -> Vec<DependencyEntry> {
    let mut entries = Vec::with_capacity(descriptor.dependencies.len());

    for spec in &descriptor.dependencies {
        match resolve_entry(spec, registry).await {
            Ok(entry) => {
                debug!("Resolved {} to {}", spec.key(), entry.display_name());
                entries.push(entry);
            }
            Err(e) => report_at(sink, e, spec.origin.as_ref()),
        }
    }

    debug!("Resolved {} of {} dependency section(s)", entries.len(), descriptor.dependencies.len());
    entries
}

/// Resolves one section against its server.
pub async fn resolve_entry(spec: &DependencySpec, registry: &ServerRegistry) -> Result<DependencyEntry, ResolveError> {
    let connection = registry.connection(&spec.server).ok_or_else(|| ResolveError::UnknownServer {
        name: spec.server.clone(),
    })?;
    let server = connection.server();
    let config_id = spec.build_configuration_id.as_str();

    let (configuration, projects) = tokio::join!(connection.build_configuration(config_id), connection.projects());

    let configuration = configuration
        .map_err(|source| ResolveError::transport(&server.name, format!("look up build configuration '{config_id}'"), source))?
        .ok_or_else(|| ResolveError::BuildConfigurationNotFound {
            server: server.name.clone(),
            id: config_id.to_string(),
        })?;

    let projects =
        projects.map_err(|source| ResolveError::transport(&server.name, "list projects", source))?;
    let project = projects.iter().find(|p| p.id == configuration.project_id).cloned().ok_or_else(|| {
        ResolveError::ProjectNotFound {
            server: server.name.clone(),
            project_id: configuration.project_id.clone(),
            build_configuration_id: config_id.to_string(),
        }
    })?;

    let returned = configuration.id.clone();
    DependencyEntry::new(spec, Arc::clone(server), project, configuration).ok_or_else(|| ResolveError::Inconsistent {
        server: server.name.clone(),
        requested: config_id.to_string(),
        returned,
    })
}

/// Fetches each entry's artifact listing once and expands its rules into jobs.
pub async fn collect_jobs(
    entries: &[DependencyEntry],
    registry: &ServerRegistry,
    sink: &mut dyn DiagnosticSink,
) -> Vec<Job> {
    let mut jobs = Vec::new();

    for entry in entries {
        let Some(connection) = registry.connection(&entry.server.name) else {
            report(
                sink,
                ResolveError::UnknownServer {
                    name: entry.server.name.clone(),
                },
            );
            continue;
        };

        match connection.artifact_files(entry.build_configuration_id(), &entry.revision).await {
            Ok(files) => {
                debug!("{} has {} artifact file(s) at {}", entry.display_name(), files.len(), entry.revision);
                jobs.extend(expand_jobs(entry, &files, sink));
            }
            Err(source) => report(
                sink,
                ResolveError::transport(
                    &entry.server.name,
                    format!("list artifacts of '{}'", entry.build_configuration_id()),
                    source,
                ),
            ),
        }
    }

    jobs
}

/// Entries and jobs of a full resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub entries: Vec<DependencyEntry>,
    pub jobs: Vec<Job>,
}

/// [`resolve`] followed by [`collect_jobs`].
pub async fn resolve_jobs(
    descriptor: &Descriptor,
    registry: &ServerRegistry,
    sink: &mut dyn DiagnosticSink,
) -> Resolution {
    let entries = resolve(descriptor, registry, sink).await;
    let jobs = collect_jobs(&entries, registry, sink).await;
    Resolution {
        entries,
        jobs,
    }
}
