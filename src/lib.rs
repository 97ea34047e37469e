//! artdeps - build-server artifact dependencies
//!
//! A project declares which artifacts of which builds it consumes in a
//! plain-text *descriptor* (`artifacts.deps`). artdeps parses that file,
//! resolves every section against its build server and expands the path
//! rules into concrete download jobs.
//!
//! # Architecture Overview
//!
//! ```text
//! descriptor text ──parse──▶ Descriptor ──resolve──▶ DependencyEntry ──expand──▶ Job
//!        ▲                        │                        ▲
//!        └──────── save ──────────┘                 ServerRegistry
//!                                                  (memoized connectors)
//! ```
//!
//! - Parsing never fails as a whole: malformed lines become diagnostics and
//!   the rest of the file is still used.
//! - Resolution is per section: an unreachable server or a missing build
//!   configuration drops only the sections that depend on it.
//! - Server metadata is fetched at most once per resolution pass.
//!
//! # Core Modules
//!
//! - [`descriptor`] - Descriptor format: parse, save, file I/O
//! - [`server`] - Server model, connector traits, registry and built-in connectors
//! - [`resolver`] - Resolution pipeline, job expansion and dependency import
//! - [`pattern`] - Path rule syntax and matching
//! - [`core`] - Conditions, diagnostics and error types
//! - [`config`] - Global user configuration (`~/.artdeps/config.toml`)
//! - [`cli`] - The `artdeps` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use artdeps::core::Diagnostic;
//! use artdeps::descriptor::load_file;
//! use artdeps::resolver::resolve_jobs;
//! use artdeps::server::{DefaultConnectors, ServerRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let parsed = load_file(Path::new("artifacts.deps")).await?;
//! let registry = ServerRegistry::from_servers(&parsed.descriptor.servers, Arc::new(DefaultConnectors));
//!
//! let mut diagnostics: Vec<Diagnostic> = parsed.diagnostics;
//! let resolution = resolve_jobs(&parsed.descriptor, &registry, &mut diagnostics).await;
//! for job in &resolution.jobs {
//!     println!("{} -> {}", job.source_url, job.destination);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod descriptor;
pub mod pattern;
pub mod resolver;
pub mod server;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
