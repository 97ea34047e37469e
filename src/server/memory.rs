//! In-memory connector.
//!
//! Holds a fixed set of projects, build configurations, declared artifact
//! dependencies and artifact listings. Failures can be injected per operation,
//! and every call is counted so callers can verify memoization.

use crate::descriptor::RevisionSelector;
use crate::server::connector::{
    ArtifactDeclaration, ArtifactLister, BuildConfigLister, BuildConfiguration, Project, ProjectLister,
};
use crate::server::snapshot::Snapshot;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Operations of a connector, used to inject failures and read call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProjects,
    ListBuildConfigurations,
    GetBuildConfiguration,
    ListArtifactDependencies,
    ListArtifactFiles,
}

#[derive(Debug, Default)]
struct CallCounters {
    list_projects: AtomicUsize,
    list_build_configurations: AtomicUsize,
    get_build_configuration: AtomicUsize,
    list_artifact_dependencies: AtomicUsize,
    list_artifact_files: AtomicUsize,
}

impl CallCounters {
    fn counter(&self, op: Operation) -> &AtomicUsize {
        match op {
            Operation::ListProjects => &self.list_projects,
            Operation::ListBuildConfigurations => &self.list_build_configurations,
            Operation::GetBuildConfiguration => &self.get_build_configuration,
            Operation::ListArtifactDependencies => &self.list_artifact_dependencies,
            Operation::ListArtifactFiles => &self.list_artifact_files,
        }
    }
}

/// A build server living entirely in memory.
///
/// ```rust
/// use artdeps::server::MemoryServer;
///
/// let server = MemoryServer::new()
///     .with_project("Lib", "Library")
///     .with_build_configuration("Lib_Build", "Build", "Lib")
///     .with_artifacts("Lib_Build", ".lastSuccessful", ["build/x.zip", "build/y.txt"]);
/// assert_eq!(server.calls(artdeps::server::memory::Operation::ListProjects), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    projects: Vec<Project>,
    build_configurations: Vec<BuildConfiguration>,
    declarations: HashMap<String, Vec<ArtifactDeclaration>>,
    /// config id → revision path segment → files
    artifacts: HashMap<String, HashMap<String, Vec<String>>>,
    failures: HashSet<Operation>,
    calls: Arc<CallCounters>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_project(mut self, id: &str, name: &str) -> Self {
        self.projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_build_configuration(mut self, id: &str, name: &str, project_id: &str) -> Self {
        self.build_configurations.push(BuildConfiguration {
            id: id.to_string(),
            name: name.to_string(),
            project_id: project_id.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_declaration(mut self, build_configuration_id: &str, declaration: ArtifactDeclaration) -> Self {
        self.declarations.entry(build_configuration_id.to_string()).or_default().push(declaration);
        self
    }

    /// Registers the artifact listing of one build, keyed by the revision's path segment.
    #[must_use]
    pub fn with_artifacts<I, S>(mut self, build_configuration_id: &str, revision_segment: &str, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artifacts
            .entry(build_configuration_id.to_string())
            .or_default()
            .insert(revision_segment.to_string(), files.into_iter().map(Into::into).collect());
        self
    }

    /// Makes every call of `op` fail with a transport error.
    #[must_use]
    pub fn failing(mut self, op: Operation) -> Self {
        self.failures.insert(op);
        self
    }

    /// How many times `op` has been called (shared across clones).
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.counter(op).load(Ordering::SeqCst)
    }

    fn enter(&self, op: Operation) -> Result<()> {
        self.calls.counter(op).fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(&op) {
            return Err(anyhow!("connection refused").context(format!("{op:?} failed")));
        }
        Ok(())
    }
}

impl From<Snapshot> for MemoryServer {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            projects: snapshot.projects,
            build_configurations: snapshot.build_configurations,
            declarations: snapshot.artifact_dependencies,
            artifacts: snapshot.artifacts,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProjectLister for MemoryServer {
    async fn list_all_projects(&self) -> Result<Vec<Project>> {
        self.enter(Operation::ListProjects)?;
        Ok(self.projects.clone())
    }
}

#[async_trait]
impl BuildConfigLister for MemoryServer {
    async fn list_build_configurations(&self, project_id: &str) -> Result<Vec<BuildConfiguration>> {
        self.enter(Operation::ListBuildConfigurations)?;
        Ok(self.build_configurations.iter().filter(|c| c.project_id == project_id).cloned().collect())
    }

    async fn get_build_configuration(&self, id: &str) -> Result<Option<BuildConfiguration>> {
        self.enter(Operation::GetBuildConfiguration)?;
        Ok(self.build_configurations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_artifact_dependencies(&self, build_configuration_id: &str) -> Result<Vec<ArtifactDeclaration>> {
        self.enter(Operation::ListArtifactDependencies)?;
        Ok(self.declarations.get(build_configuration_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ArtifactLister for MemoryServer {
    async fn list_artifact_files(
        &self,
        build_configuration_id: &str,
        revision: &RevisionSelector,
    ) -> Result<Vec<String>> {
        self.enter(Operation::ListArtifactFiles)?;
        Ok(self
            .artifacts
            .get(build_configuration_id)
            .and_then(|by_revision| by_revision.get(&revision.path_segment()))
            .cloned()
            .unwrap_or_default())
    }
}
