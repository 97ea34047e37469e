//! Importing the artifact dependencies a build configuration declares on its server.

use crate::descriptor::{DependencySpec, Descriptor, RevisionSelector};
use crate::resolver::ResolveError;
use crate::server::ServerRegistry;
use tracing::{debug, info};

/// Turns the server-side artifact dependencies of `build_configuration_id` into sections.
///
/// Every imported section points at `server`, since a declaration can only
/// refer to configurations on the same server.
pub async fn import_dependencies(
    registry: &ServerRegistry,
    server: &str,
    build_configuration_id: &str,
) -> Result<Vec<DependencySpec>, ResolveError> {
    let connection = registry.connection(server).ok_or_else(|| ResolveError::UnknownServer {
        name: server.to_string(),
    })?;

    let transport = |operation: String| {
        move |source: anyhow::Error| ResolveError::Transport {
            server: server.to_string(),
            operation,
            source,
        }
    };

    connection
        .build_configuration(build_configuration_id)
        .await
        .map_err(transport(format!("look up build configuration '{build_configuration_id}'")))?
        .ok_or_else(|| ResolveError::BuildConfigurationNotFound {
            server: server.to_string(),
            id: build_configuration_id.to_string(),
        })?;

    let declarations = connection
        .artifact_dependencies(build_configuration_id)
        .await
        .map_err(transport(format!("list artifact dependencies of '{build_configuration_id}'")))?;
    debug!("{build_configuration_id} declares {} artifact dependenc(ies)", declarations.len());

    Ok(declarations
        .into_iter()
        .map(|d| {
            DependencySpec::new(server, d.source_build_configuration_id)
                .with_revision(RevisionSelector::new(d.revision_name, d.revision_value))
                .with_path_rules(d.path_rules)
                .with_clean_destination(d.clean_destination)
        })
        .collect())
}

/// Appends imported sections whose `server::id` key is not already present.
///
/// Returns how many were added.
pub fn merge_imported(descriptor: &mut Descriptor, imported: Vec<DependencySpec>) -> usize {
    let mut added = 0;
    for spec in imported {
        if descriptor.dependencies.iter().any(|d| d.key() == spec.key()) {
            info!("Skipping {}: already in descriptor", spec.key());
            continue;
        }
        descriptor.dependencies.push(spec);
        added += 1;
    }
    added
}
