//! `artdeps resolve`: print the download jobs of a descriptor.

use super::common::CommandContext;
use crate::core::{ArtdepsError, Condition, error_count};
use crate::resolver::{DependencyEntry, Job, resolve_jobs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One job per line
    Text,
    /// A single JSON document with entries, jobs and diagnostics
    Json,
}

#[derive(Args)]
pub struct ResolveCommand {
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only print jobs applying to this build variant
    #[arg(long)]
    pub variant: Option<Condition>,
}

#[derive(Serialize)]
struct EntryReport {
    section: String,
    project: String,
    build_configuration: String,
    revision: String,
}

impl From<&DependencyEntry> for EntryReport {
    fn from(entry: &DependencyEntry) -> Self {
        Self {
            section: entry.to_spec().key(),
            project: entry.project.name.clone(),
            build_configuration: entry.build_configuration.name.clone(),
            revision: entry.revision.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    variant: Option<Condition>,
    entries: Vec<EntryReport>,
    jobs: Vec<&'a Job>,
    diagnostics: Vec<String>,
}

impl ResolveCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let parsed = ctx.load_descriptor().await?;
        let descriptor = parsed.descriptor;
        let mut diagnostics = parsed.diagnostics;

        let registry = ctx.registry(&descriptor);
        let resolution = resolve_jobs(&descriptor, &registry, &mut diagnostics).await;

        let variant = self.variant.or(ctx.config.variant);
        let jobs: Vec<&Job> =
            resolution.jobs.iter().filter(|job| variant.is_none_or(|v| job.applies_to(v))).collect();

        match self.format {
            OutputFormat::Json => {
                let report = ResolveReport {
                    variant,
                    entries: resolution.entries.iter().map(EntryReport::from).collect(),
                    jobs,
                    diagnostics: diagnostics.iter().map(ToString::to_string).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                ctx.print_diagnostics(&diagnostics);
                for job in &jobs {
                    println!("{}", render_job(job));
                }
                ctx.status(format!(
                    "{} {} of {} section(s) resolved, {} job(s)",
                    "✓".green(),
                    resolution.entries.len(),
                    descriptor.dependencies.len(),
                    jobs.len()
                ));
            }
        }

        match error_count(&diagnostics) {
            0 => Ok(()),
            count => Err(ArtdepsError::ResolutionIncomplete {
                count,
            }
            .into()),
        }
    }
}

fn render_job(job: &Job) -> String {
    let mut line = format!("{} -> {}", job.source_url, job.destination);
    if job.condition != Condition::Always {
        line.push_str(&format!(" [{}]", job.condition));
    }
    if job.clean_destination {
        line.push_str(" (clean)");
    }
    line
}
