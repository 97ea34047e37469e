//! Shared plumbing for CLI commands.

use crate::config::GlobalConfig;
use crate::core::{ArtdepsError, Diagnostic, Severity, error_count};
use crate::descriptor::{Descriptor, ParsedDescriptor, load_file};
use crate::server::{ConnectorFactory, ServerRegistry};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs besides its own arguments.
pub struct CommandContext {
    pub config: GlobalConfig,
    pub descriptor_path: PathBuf,
    pub factory: Arc<dyn ConnectorFactory>,
    pub verbose: bool,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(
        config: GlobalConfig,
        descriptor: Option<&Path>,
        factory: Arc<dyn ConnectorFactory>,
        verbose: bool,
        quiet: bool,
    ) -> Self {
        let descriptor_path = config.descriptor_path(descriptor);
        Self {
            config,
            descriptor_path,
            factory,
            verbose,
            quiet,
        }
    }

    pub async fn load_descriptor(&self) -> Result<ParsedDescriptor> {
        load_file(&self.descriptor_path).await
    }

    /// Registry over the descriptor's servers with configured URL overrides applied.
    ///
    /// The descriptor itself is left untouched so overrides never reach the file.
    pub fn registry(&self, descriptor: &Descriptor) -> ServerRegistry {
        let mut servers = descriptor.servers.clone();
        self.config.apply_server_overrides(&mut servers);
        ServerRegistry::from_servers(&servers, Arc::clone(&self.factory))
    }

    /// Prints diagnostics to stderr; verbose ones only with `--verbose`, warnings not with `--quiet`.
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            let shown = match diagnostic.severity {
                Severity::Error => true,
                Severity::Warning => !self.quiet,
                Severity::Verbose => self.verbose,
            };
            if shown {
                eprintln!("{}", render_diagnostic(diagnostic));
            }
        }
    }

    /// Prints a progress or summary line unless `--quiet`.
    pub fn status(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }
}

/// One diagnostic, colored by severity.
pub fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "✗ error".red().bold(),
        Severity::Warning => "⚠ warning".yellow(),
        Severity::Verbose => "  detail".dimmed(),
    };
    let location = diagnostic.line.map(|l| format!(" line {l}")).unwrap_or_default();
    let mut out = format!("{label} ({}){location}: {}", diagnostic.kind, diagnostic.message);
    if let Some(content) = &diagnostic.source_line {
        out.push_str(&format!("\n    {} {content}", "|".blue()));
    }
    out
}

/// Fails with [`ArtdepsError::DescriptorInvalid`] if any diagnostic is an error.
pub fn ensure_valid(diagnostics: &[Diagnostic]) -> Result<()> {
    match error_count(diagnostics) {
        0 => Ok(()),
        count => Err(ArtdepsError::DescriptorInvalid {
            count,
        }
        .into()),
    }
}
