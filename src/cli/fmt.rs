//! `artdeps fmt`: canonical re-emission of a descriptor.

use super::common::{CommandContext, ensure_valid};
use crate::core::ArtdepsError;
use crate::descriptor::{parse, read_file, save_file, save_specs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct FmtCommand {
    /// Rewrite the descriptor in place
    #[arg(long, conflicts_with = "check")]
    pub write: bool,

    /// Fail if the descriptor is not in canonical form
    #[arg(long)]
    pub check: bool,
}

impl FmtCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let path = &ctx.descriptor_path;
        let text = read_file(path).await?;
        let parsed = parse(&text);

        // Formatting would silently drop the offending lines.
        ctx.print_diagnostics(&parsed.diagnostics);
        ensure_valid(&parsed.diagnostics)?;

        let canonical = save_specs(&parsed.descriptor.servers, &parsed.descriptor.dependencies);

        if self.check {
            if canonical != text {
                return Err(ArtdepsError::Other {
                    message: format!("{} is not formatted; run `artdeps fmt --write`", path.display()),
                }
                .into());
            }
            ctx.status(format!("{} {} is formatted", "✓".green(), path.display()));
        } else if self.write {
            if canonical == text {
                ctx.status(format!("{} {} already formatted", "✓".green(), path.display()));
            } else {
                save_file(path, &canonical).await?;
                ctx.status(format!("{} Formatted {}", "✓".green(), path.display()));
            }
        } else {
            print!("{canonical}");
        }
        Ok(())
    }
}
