//! The server registry for one resolution pass.

use crate::core::ArtdepsError;
use crate::descriptor::RevisionSelector;
use crate::server::connector::{ArtifactDeclaration, BuildConfiguration, BuildServer, ConnectorFactory, Project};
use crate::server::{KeyedMemo, Memo, Server};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A server together with its lazily opened connector and metadata caches.
///
/// The connector is opened on first use. Project lists, build configurations
/// looked up by id and artifact listings are each fetched at most once; a
/// failed fetch is not cached.
pub struct ServerConnection {
    server: Arc<Server>,
    factory: Arc<dyn ConnectorFactory>,
    connector: Memo<Arc<dyn BuildServer>>,
    projects: Memo<Vec<Project>>,
    configurations: KeyedMemo<String, Option<BuildConfiguration>>,
    artifacts: KeyedMemo<(String, String), Vec<String>>,
}

impl std::fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConnection")
            .field("server", &self.server)
            .field("connected", &self.connector.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ServerConnection {
    fn new(server: Arc<Server>, factory: Arc<dyn ConnectorFactory>) -> Self {
        Self {
            server,
            factory,
            connector: Memo::new(),
            projects: Memo::new(),
            configurations: KeyedMemo::new(),
            artifacts: KeyedMemo::new(),
        }
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    async fn connector(&self) -> Result<&Arc<dyn BuildServer>> {
        self.connector
            .get_or_fetch(|| async {
                debug!("Opening {} connector for server '{}'", self.server.server_type, self.server.name);
                self.factory.connect(&self.server)
            })
            .await
    }

    /// All projects of the server, fetched once.
    pub async fn projects(&self) -> Result<&[Project]> {
        let projects = self
            .projects
            .get_or_fetch(|| async {
                trace!("Fetching project list from '{}'", self.server.name);
                self.connector().await?.list_all_projects().await
            })
            .await?;
        Ok(projects.as_slice())
    }

    /// One build configuration by id, fetched once per id.
    pub async fn build_configuration(&self, id: &str) -> Result<Option<BuildConfiguration>> {
        self.configurations
            .get_or_fetch(id.to_string(), || async {
                trace!("Fetching build configuration '{}' from '{}'", id, self.server.name);
                self.connector().await?.get_build_configuration(id).await
            })
            .await
    }

    /// Artifact listing of one build, fetched once per configuration and revision.
    pub async fn artifact_files(&self, build_configuration_id: &str, revision: &RevisionSelector) -> Result<Vec<String>> {
        let key = (build_configuration_id.to_string(), revision.path_segment());
        self.artifacts
            .get_or_fetch(key, || async {
                trace!(
                    "Fetching artifact listing of '{}' at {} from '{}'",
                    build_configuration_id,
                    revision,
                    self.server.name
                );
                self.connector().await?.list_artifact_files(build_configuration_id, revision).await
            })
            .await
    }

    /// Build configurations of one project (not cached).
    pub async fn build_configurations(&self, project_id: &str) -> Result<Vec<BuildConfiguration>> {
        self.connector().await?.list_build_configurations(project_id).await
    }

    /// Artifact dependencies declared by a build configuration (not cached).
    pub async fn artifact_dependencies(&self, build_configuration_id: &str) -> Result<Vec<ArtifactDeclaration>> {
        self.connector().await?.list_artifact_dependencies(build_configuration_id).await
    }
}

/// Maps server names to servers and their connections.
///
/// Built from the servers parsed out of a descriptor and handed down the
/// resolution pipeline explicitly; it is owned by one resolution pass.
///
/// ```rust
/// use artdeps::server::{DefaultConnectors, Server, ServerRegistry, ServerType};
/// use std::sync::Arc;
///
/// let servers = vec![Server::new("ci", ServerType::TeamCity, "https://ci.example.com")];
/// let registry = ServerRegistry::from_servers(&servers, Arc::new(DefaultConnectors));
/// assert!(registry.contains("ci"));
/// ```
pub struct ServerRegistry {
    factory: Arc<dyn ConnectorFactory>,
    order: Vec<String>,
    connections: HashMap<String, ServerConnection>,
}

impl ServerRegistry {
    pub fn new(factory: Arc<dyn ConnectorFactory>) -> Self {
        Self {
            factory,
            order: Vec::new(),
            connections: HashMap::new(),
        }
    }

    /// Builds a registry holding `servers`; a repeated name keeps the first declaration.
    pub fn from_servers(servers: &[Server], factory: Arc<dyn ConnectorFactory>) -> Self {
        let mut registry = Self::new(factory);
        for server in servers {
            if let Err(e) = registry.register(server.clone()) {
                debug!("{e}");
            }
        }
        registry
    }

    /// Adds a server; fails if the name is taken.
    pub fn register(&mut self, server: Server) -> Result<(), ArtdepsError> {
        if self.connections.contains_key(&server.name) {
            return Err(ArtdepsError::Other {
                message: format!("Server '{}' is already registered", server.name),
            });
        }
        let name = server.name.clone();
        let connection = ServerConnection::new(Arc::new(server), Arc::clone(&self.factory));
        self.order.push(name.clone());
        self.connections.insert(name, connection);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Server>> {
        self.connections.get(name).map(ServerConnection::server)
    }

    pub fn connection(&self, name: &str) -> Option<&ServerConnection> {
        self.connections.get(name)
    }

    /// Like [`connection`](Self::connection) but failing with [`ArtdepsError::ServerNotFound`].
    pub fn require(&self, name: &str) -> Result<&ServerConnection, ArtdepsError> {
        self.connection(name).ok_or_else(|| ArtdepsError::ServerNotFound {
            name: name.to_string(),
        })
    }

    /// Servers in registration order.
    pub fn servers(&self) -> impl Iterator<Item = &Arc<Server>> {
        self.order.iter().filter_map(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
