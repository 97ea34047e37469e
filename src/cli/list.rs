//! `artdeps list`: browse the projects and build configurations of a server.

use super::common::CommandContext;
use crate::core::ArtdepsError;
use crate::server::ServerConnection;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures::future::join_all;
use std::sync::Arc;

#[derive(Args)]
pub struct ListCommand {
    /// Server to list; every declared server when omitted
    pub server: Option<String>,
}

impl ListCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let parsed = ctx.load_descriptor().await?;
        ctx.print_diagnostics(&parsed.diagnostics);
        let registry = ctx.registry(&parsed.descriptor);

        let connections: Vec<&ServerConnection> = match &self.server {
            Some(name) => vec![registry.require(name)?],
            None => registry.servers().filter_map(|s| registry.connection(&s.name)).collect(),
        };

        let mut failed = 0;
        for connection in connections {
            let server = Arc::clone(connection.server());
            println!("{} ({}, {})", server.name.bold(), server.server_type, server.url);
            if let Err(e) = list_server(connection).await {
                failed += 1;
                eprintln!("  {} {e:#}", "✗".red());
            }
        }

        if failed > 0 {
            return Err(ArtdepsError::Other {
                message: format!("{failed} server(s) could not be listed"),
            }
            .into());
        }
        Ok(())
    }
}

async fn list_server(connection: &ServerConnection) -> Result<()> {
    let projects = connection.projects().await.context("Failed to list projects")?;

    let configurations = join_all(projects.iter().map(|p| connection.build_configurations(&p.id))).await;

    for (project, configs) in projects.iter().zip(configurations) {
        let configs = configs.with_context(|| format!("Failed to list build configurations of '{}'", project.id))?;
        println!("  {} [{}]", project.name, project.id.dimmed());
        for config in configs {
            println!("    {} [{}]", config.name, config.id.cyan());
        }
    }
    Ok(())
}
