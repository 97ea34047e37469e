//! Command-line interface for artdeps.
//!
//! # Available Commands
//!
//! - `check` - Parse the descriptor and report problems (`--resolve` also
//!   resolves every section against its server)
//! - `fmt` - Re-emit the descriptor in canonical form
//! - `resolve` - Resolve the descriptor and print the download jobs
//! - `list` - Show the projects and build configurations of a server
//! - `import` - Add sections for the artifact dependencies a build
//!   configuration declares on its server
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output, including transport error causes
//! - `--quiet` - Only report errors
//! - `--config` - Path to a custom config file
//! - `--descriptor` - Descriptor to operate on (default `artifacts.deps`)
//!
//! # Example
//!
//! ```bash
//! artdeps check --resolve
//! artdeps resolve --variant Release --format json
//! artdeps -d other.deps fmt --write
//! ```

mod check;
mod common;
mod fmt;
mod import;
mod list;
mod resolve;

pub use common::CommandContext;

use crate::config::GlobalConfig;
use crate::server::{ConnectorFactory, DefaultConnectors};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Artifact dependency descriptor tool.
#[derive(Parser)]
#[command(
    name = "artdeps",
    about = "Manage build-server artifact dependencies",
    version,
    long_about = "artdeps reads an artifact dependency descriptor, resolves each section against its \
                  build server and expands path rules into download jobs."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Descriptor file to operate on
    #[arg(short, long, global = true)]
    descriptor: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the descriptor and report problems
    Check(check::CheckCommand),

    /// Rewrite the descriptor in canonical form
    Fmt(fmt::FmtCommand),

    /// Resolve the descriptor and print download jobs
    Resolve(resolve::ResolveCommand),

    /// List projects and build configurations of a server
    List(list::ListCommand),

    /// Import the artifact dependencies a build configuration declares
    Import(import::ImportCommand),
}

impl Cli {
    /// Runs the selected command with the built-in connectors.
    pub async fn execute(self) -> Result<()> {
        self.execute_with_factory(Arc::new(DefaultConnectors)).await
    }

    /// Runs the selected command, opening server connectors through `factory`.
    pub async fn execute_with_factory(self, factory: Arc<dyn ConnectorFactory>) -> Result<()> {
        init_logging(self.log_level());

        let config = GlobalConfig::load_with_optional(self.config.clone()).await?;
        let ctx = CommandContext::new(config, self.descriptor.as_deref(), factory, self.verbose, self.quiet);

        match self.command {
            Commands::Check(cmd) => cmd.execute(&ctx).await,
            Commands::Fmt(cmd) => cmd.execute(&ctx).await,
            Commands::Resolve(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Import(cmd) => cmd.execute(&ctx).await,
        }
    }

    /// Default log filter for the chosen verbosity.
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
