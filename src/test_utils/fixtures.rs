//! Descriptor and server fixtures shared by unit and integration tests.

use crate::server::connector::{ArtifactDeclaration, BuildConfiguration, Project};
use crate::server::memory::MemoryServer;
use crate::server::snapshot::Snapshot;
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptor file fixture.
pub struct DescriptorFixture {
    pub content: String,
}

impl DescriptorFixture {
    /// One snapshot server `ci` and two sections.
    ///
    /// `ci::Lib_Build` takes `build/*.zip` into `lib/`; `ci::Tools_Build` is a
    /// Debug-only dependency on build 42 with a Release-only rule that never applies.
    pub fn basic(snapshot: &Path) -> Self {
        Self {
            content: format!(
                "\
# Fixture descriptor
[[ci]]
Type=Snapshot
Url=file://{}

[ci::Lib_Build]
Path=build/*.zip=>lib/

[ci::Tools_Build]
RevisionName=buildNumber
RevisionValue=42
Condition=Debug
Path=bin/*.exe=>tools/
@Release: bin/*.pdb=>symbols/
",
                snapshot.display()
            ),
        }
    }

    /// Two lines the parser rejects plus one valid section.
    pub fn with_errors(snapshot: &Path) -> Self {
        let mut fixture = Self::basic(snapshot);
        fixture.content.push_str(
            "
[ghost::Nothing]
Path=*

[ci::Lib_Build]
Condition=Sometimes
",
        );
        fixture
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("artifacts.deps");
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Snapshot document fixture.
pub struct SnapshotFixture {
    pub snapshot: Snapshot,
}

impl SnapshotFixture {
    /// Server contents matching [`DescriptorFixture::basic`].
    pub fn basic() -> Self {
        let mut artifacts: HashMap<String, HashMap<String, Vec<String>>> = HashMap::new();
        artifacts.entry("Lib_Build".to_string()).or_default().insert(
            ".lastSuccessful".to_string(),
            vec!["build/x.zip".to_string(), "build/y.txt".to_string(), "build/z.zip".to_string()],
        );
        artifacts
            .entry("Tools_Build".to_string())
            .or_default()
            .insert("42".to_string(), vec!["bin/tool.exe".to_string(), "bin/tool.pdb".to_string()]);

        let mut artifact_dependencies = HashMap::new();
        artifact_dependencies.insert(
            "App_Build".to_string(),
            vec![ArtifactDeclaration {
                source_build_configuration_id: "Lib_Build".to_string(),
                revision_name: "lastPinned".to_string(),
                revision_value: "latest.lastPinned".to_string(),
                path_rules: "build/*.zip=>lib/".to_string(),
                clean_destination: true,
            }],
        );

        Self {
            snapshot: Snapshot {
                projects: vec![project("Lib", "Library"), project("Tools", "Tooling"), project("App", "Application")],
                build_configurations: vec![
                    configuration("Lib_Build", "Build", "Lib"),
                    configuration("Tools_Build", "Build", "Tools"),
                    configuration("App_Build", "Build", "App"),
                ],
                artifact_dependencies,
                artifacts,
            },
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("ci-snapshot.json");
        fs::write(&path, serde_json::to_string_pretty(&self.snapshot)?)?;
        Ok(path)
    }
}

/// In-memory equivalent of [`SnapshotFixture::basic`].
pub fn memory_server() -> MemoryServer {
    SnapshotFixture::basic().snapshot.into()
}

fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn configuration(id: &str, name: &str, project_id: &str) -> BuildConfiguration {
    BuildConfiguration {
        id: id.to_string(),
        name: name.to_string(),
        project_id: project_id.to_string(),
    }
}
