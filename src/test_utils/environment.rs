//! Test environment setup and management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fixtures::{DescriptorFixture, SnapshotFixture};

/// A temporary project directory with a snapshot server, a descriptor and an isolated config file.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    /// Empty project directory; the snapshot and config paths point at files that do not exist yet.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            snapshot_path: temp_dir.path().join("ci-snapshot.json"),
            config_path: temp_dir.path().join("config.toml"),
            temp_dir,
            project_dir,
        })
    }

    /// [`SnapshotFixture::basic`] plus [`DescriptorFixture::basic`] pointing at it.
    pub fn with_basic_descriptor() -> Result<Self> {
        let env = Self::new()?;
        SnapshotFixture::basic().write_to(env.temp_dir.path())?;
        DescriptorFixture::basic(&env.snapshot_path).write_to(&env.project_dir)?;
        Ok(env)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.project_dir.join("artifacts.deps")
    }

    pub fn write_descriptor(&self, content: &str) -> Result<PathBuf> {
        self.create_file("artifacts.deps", content)
    }

    pub fn write_config(&self, content: &str) -> Result<&Path> {
        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
        Ok(&self.config_path)
    }

    /// Creates a file relative to the project directory.
    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.project_dir.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content).with_context(|| format!("Failed to write {}", full_path.display()))?;
        Ok(full_path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let full_path = self.project_dir.join(path);
        fs::read_to_string(&full_path).with_context(|| format!("Failed to read {}", full_path.display()))
    }
}
