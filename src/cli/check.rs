//! `artdeps check`: report everything wrong with a descriptor.

use super::common::{CommandContext, ensure_valid};
use crate::resolver::resolve_jobs;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct CheckCommand {
    /// Also resolve every section against its server
    #[arg(long)]
    pub resolve: bool,
}

impl CheckCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let parsed = ctx.load_descriptor().await?;
        let descriptor = parsed.descriptor;
        let mut diagnostics = parsed.diagnostics;

        let mut summary = format!(
            "{} server(s), {} dependency section(s)",
            descriptor.servers.len(),
            descriptor.dependencies.len()
        );

        if self.resolve {
            let registry = ctx.registry(&descriptor);
            let resolution = resolve_jobs(&descriptor, &registry, &mut diagnostics).await;
            summary.push_str(&format!(
                ", {} resolved, {} job(s)",
                resolution.entries.len(),
                resolution.jobs.len()
            ));
        }

        ctx.print_diagnostics(&diagnostics);
        ensure_valid(&diagnostics)?;

        ctx.status(format!("{} {}: {summary}", "✓".green(), ctx.descriptor_path.display()));
        Ok(())
    }
}
