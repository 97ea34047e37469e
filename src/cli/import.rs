//! `artdeps import`: add sections for a build configuration's declared artifact dependencies.

use super::common::{CommandContext, ensure_valid};
use crate::descriptor::{save_file, save_specs};
use crate::resolver::{import_dependencies, merge_imported};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct ImportCommand {
    /// Server declaring the dependencies
    pub server: String,

    /// Build configuration whose artifact dependencies are imported
    pub build_configuration: String,

    /// Print the resulting descriptor instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let parsed = ctx.load_descriptor().await?;
        // Rewriting would drop lines the parser rejected.
        ctx.print_diagnostics(&parsed.diagnostics);
        ensure_valid(&parsed.diagnostics)?;

        let mut descriptor = parsed.descriptor;
        let registry = ctx.registry(&descriptor);
        registry.require(&self.server)?;

        let imported = import_dependencies(&registry, &self.server, &self.build_configuration).await?;
        let found = imported.len();
        let added = merge_imported(&mut descriptor, imported);

        let text = save_specs(&descriptor.servers, &descriptor.dependencies);
        if self.dry_run {
            print!("{text}");
        } else if added > 0 {
            save_file(&ctx.descriptor_path, &text).await?;
        }

        ctx.status(format!(
            "{} Imported {added} of {found} declared dependenc(ies) from {}::{}",
            "✓".green(),
            self.server,
            self.build_configuration
        ));
        Ok(())
    }
}
