//! Resolved dependency entries.

use crate::core::Condition;
use crate::descriptor::{DependencySpec, RevisionSelector};
use crate::server::{BuildConfiguration, Project, Server};
use std::sync::Arc;

/// A dependency section whose server, build configuration and project were all found.
///
/// Only [`DependencyEntry::new`] builds one, and it refuses a configuration
/// that does not belong to the given project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub server: Arc<Server>,
    pub project: Project,
    pub build_configuration: BuildConfiguration,
    pub revision: RevisionSelector,
    pub condition: Condition,
    pub path_rules: String,
    pub clean_destination: bool,
}

impl DependencyEntry {
    /// Returns `None` when `build_configuration` does not belong to `project`.
    pub fn new(
        spec: &DependencySpec,
        server: Arc<Server>,
        project: Project,
        build_configuration: BuildConfiguration,
    ) -> Option<Self> {
        if build_configuration.project_id != project.id || build_configuration.id != spec.build_configuration_id {
            return None;
        }
        Some(Self {
            server,
            project,
            build_configuration,
            revision: spec.revision.clone(),
            condition: spec.condition,
            path_rules: spec.path_rules.clone(),
            clean_destination: spec.clean_destination,
        })
    }

    pub fn build_configuration_id(&self) -> &str {
        &self.build_configuration.id
    }

    /// The section this entry was resolved from.
    pub fn to_spec(&self) -> DependencySpec {
        DependencySpec {
            server: self.server.name.clone(),
            build_configuration_id: self.build_configuration.id.clone(),
            revision: self.revision.clone(),
            condition: self.condition,
            path_rules: self.path_rules.clone(),
            clean_destination: self.clean_destination,
            origin: None,
        }
    }

    /// `Project / Configuration` for display.
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.project.name, self.build_configuration.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerType;

    fn parts() -> (DependencySpec, Arc<Server>, Project) {
        let spec = DependencySpec::new("ci", "Lib_Build").with_path_rules("*.zip").with_clean_destination(true);
        let server = Arc::new(Server::new("ci", ServerType::TeamCity, "https://ci"));
        let project = Project {
            id: "Lib".to_string(),
            name: "Library".to_string(),
        };
        (spec, server, project)
    }

    #[test]
    fn test_consistent_entry_round_trips_to_dependency_spec() {
        let (spec, server, project) = parts();
        let config = BuildConfiguration {
            id: "Lib_Build".to_string(),
            name: "Build".to_string(),
            project_id: "Lib".to_string(),
        };
        let entry = DependencyEntry::new(&spec, server, project, config).unwrap();
        assert_eq!(entry.to_spec(), spec);
        assert_eq!(entry.display_name(), "Library / Build");
    }

    #[test]
    fn test_inconsistent_project_is_rejected() {
        let (spec, server, project) = parts();
        let config = BuildConfiguration {
            id: "Lib_Build".to_string(),
            name: "Build".to_string(),
            project_id: "Other".to_string(),
        };
        assert!(DependencyEntry::new(&spec, server, project, config).is_none());
    }
}
