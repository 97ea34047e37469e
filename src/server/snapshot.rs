//! Offline connector backed by a JSON snapshot of a build server.
//!
//! # File Format
//!
//! ```json
//! {
//!   "projects": [{ "id": "Lib", "name": "Library" }],
//!   "build_configurations": [{ "id": "Lib_Build", "name": "Build", "project_id": "Lib" }],
//!   "artifact_dependencies": {
//!     "App_Build": [{
//!       "source_build_configuration_id": "Lib_Build",
//!       "revision_name": "lastSuccessful",
//!       "revision_value": "latest.lastSuccessful",
//!       "path_rules": "build/*.zip=>lib/"
//!     }]
//!   },
//!   "artifacts": { "Lib_Build": { ".lastSuccessful": ["build/x.zip"] } }
//! }
//! ```
//!
//! Artifact listings are keyed by the revision's download path segment
//! (see [`RevisionSelector::path_segment`]). The document is read on first use
//! and reused for the lifetime of the connector.

use crate::core::ArtdepsError;
use crate::descriptor::RevisionSelector;
use crate::server::Memo;
use crate::server::connector::{
    ArtifactDeclaration, ArtifactLister, BuildConfigLister, BuildConfiguration, Project, ProjectLister,
};
use crate::server::memory::MemoryServer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deserialized snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub build_configurations: Vec<BuildConfiguration>,
    #[serde(default)]
    pub artifact_dependencies: HashMap<String, Vec<ArtifactDeclaration>>,
    #[serde(default)]
    pub artifacts: HashMap<String, HashMap<String, Vec<String>>>,
}

/// Connector reading a [`Snapshot`] from disk.
///
/// Queries are answered by a [`MemoryServer`] built from the document.
#[derive(Debug)]
pub struct SnapshotServer {
    path: PathBuf,
    server: Memo<MemoryServer>,
}

impl SnapshotServer {
    /// `location` is a filesystem path or a `file://` URL.
    pub fn new(location: &str) -> Self {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Self {
            path: PathBuf::from(path),
            server: Memo::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn server(&self) -> Result<&MemoryServer> {
        self.server.get_or_fetch(|| async { load_snapshot(&self.path).await.map(MemoryServer::from) }).await
    }
}

async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    debug!("Loading server snapshot from {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = serde_json::from_str(&content).map_err(|e| ArtdepsError::SnapshotError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(snapshot)
}

#[async_trait]
impl ProjectLister for SnapshotServer {
    async fn list_all_projects(&self) -> Result<Vec<Project>> {
        self.server().await?.list_all_projects().await
    }
}

#[async_trait]
impl BuildConfigLister for SnapshotServer {
    async fn list_build_configurations(&self, project_id: &str) -> Result<Vec<BuildConfiguration>> {
        self.server().await?.list_build_configurations(project_id).await
    }

    async fn get_build_configuration(&self, id: &str) -> Result<Option<BuildConfiguration>> {
        self.server().await?.get_build_configuration(id).await
    }

    async fn list_artifact_dependencies(&self, build_configuration_id: &str) -> Result<Vec<ArtifactDeclaration>> {
        self.server().await?.list_artifact_dependencies(build_configuration_id).await
    }
}

#[async_trait]
impl ArtifactLister for SnapshotServer {
    async fn list_artifact_files(
        &self,
        build_configuration_id: &str,
        revision: &RevisionSelector,
    ) -> Result<Vec<String>> {
        self.server().await?.list_artifact_files(build_configuration_id, revision).await
    }
}
