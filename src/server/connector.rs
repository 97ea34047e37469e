//! Capability interfaces implemented by every server connector.
//!
//! Callers never downcast to a concrete connector. They hold an
//! `Arc<dyn BuildServer>` and use the three capabilities it bundles:
//! [`ProjectLister`], [`BuildConfigLister`] and [`ArtifactLister`].
//!
//! Every method may fail with a transport error (`anyhow::Error`); the
//! resolution pipeline turns such failures into per-entry diagnostics.

use crate::descriptor::RevisionSelector;
use crate::server::{MemoryServer, Server, ServerType, SnapshotServer};
use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A project on a build server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A build configuration; belongs to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub id: String,
    pub name: String,
    pub project_id: String,
}

/// An artifact dependency declared by a build configuration on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDeclaration {
    /// Build configuration whose artifacts are consumed
    pub source_build_configuration_id: String,
    pub revision_name: String,
    pub revision_value: String,
    /// Newline separated path rules
    pub path_rules: String,
    #[serde(default)]
    pub clean_destination: bool,
}

#[async_trait]
pub trait ProjectLister: Send + Sync {
    async fn list_all_projects(&self) -> Result<Vec<Project>>;
}

#[async_trait]
pub trait BuildConfigLister: Send + Sync {
    async fn list_build_configurations(&self, project_id: &str) -> Result<Vec<BuildConfiguration>>;

    /// `Ok(None)` when the server has no configuration with this id.
    async fn get_build_configuration(&self, id: &str) -> Result<Option<BuildConfiguration>>;

    async fn list_artifact_dependencies(&self, build_configuration_id: &str) -> Result<Vec<ArtifactDeclaration>>;
}

#[async_trait]
pub trait ArtifactLister: Send + Sync {
    /// Relative, `/`-separated paths of every artifact file of the selected build.
    async fn list_artifact_files(
        &self,
        build_configuration_id: &str,
        revision: &RevisionSelector,
    ) -> Result<Vec<String>>;
}

/// Everything the pipeline needs from a server.
pub trait BuildServer: ProjectLister + BuildConfigLister + ArtifactLister {}

impl<T: ProjectLister + BuildConfigLister + ArtifactLister> BuildServer for T {}

/// Opens a connector for a declared server.
///
/// Embedding applications provide their own factory to plug in a network
/// transport; [`DefaultConnectors`] only knows offline connectors.
pub trait ConnectorFactory: Send + Sync {
    fn connect(&self, server: &Server) -> Result<Arc<dyn BuildServer>>;
}

/// Built-in factory: opens [`SnapshotServer`]s and refuses `TeamCity` servers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnectors;

impl ConnectorFactory for DefaultConnectors {
    fn connect(&self, server: &Server) -> Result<Arc<dyn BuildServer>> {
        match server.server_type {
            ServerType::Snapshot => Ok(Arc::new(SnapshotServer::new(&server.url))),
            ServerType::TeamCity => bail!(
                "no transport is configured for TeamCity server '{}' ({})",
                server.name,
                server.url
            ),
        }
    }
}

/// Factory handing out pre-built connectors by server name; anything unknown
/// falls back to another factory.
pub struct FixedConnectors<F> {
    connectors: Vec<(String, Arc<dyn BuildServer>)>,
    fallback: F,
}

impl<F: ConnectorFactory> FixedConnectors<F> {
    pub const fn new(fallback: F) -> Self {
        Self {
            connectors: Vec::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, connector: Arc<dyn BuildServer>) -> Self {
        self.connectors.push((name.into(), connector));
        self
    }

    #[must_use]
    pub fn with_memory(self, name: impl Into<String>, server: MemoryServer) -> Self {
        self.with(name, Arc::new(server))
    }
}

impl<F: ConnectorFactory> ConnectorFactory for FixedConnectors<F> {
    fn connect(&self, server: &Server) -> Result<Arc<dyn BuildServer>> {
        match self.connectors.iter().find(|(name, _)| *name == server.name) {
            Some((_, connector)) => Ok(Arc::clone(connector)),
            None => self.fallback.connect(server),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connectors_refuse_teamcity() {
        let server = Server::new("ci", ServerType::TeamCity, "https://ci");
        let err = DefaultConnectors.connect(&server).err().unwrap();
        assert!(err.to_string().contains("no transport"));
    }

    #[test]
    fn test_default_connectors_open_snapshot() {
        let server = Server::new("offline", ServerType::Snapshot, "/tmp/none.json");
        assert!(DefaultConnectors.connect(&server).is_ok());
    }

    #[tokio::test]
    async fn test_fixed_connectors_prefer_named() {
        let memory = MemoryServer::new().with_project("P", "Product");
        let factory = FixedConnectors::new(DefaultConnectors).with_memory("ci", memory);

        let server = Server::new("ci", ServerType::TeamCity, "https://ci");
        let connector = factory.connect(&server).unwrap();
        let projects = connector.list_all_projects().await.unwrap();
        assert_eq!(projects.len(), 1);

        let other = Server::new("other", ServerType::TeamCity, "https://other");
        assert!(factory.connect(&other).is_err());
    }
}
