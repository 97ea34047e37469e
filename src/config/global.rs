//! Global user configuration.
//!
//! # Location
//!
//! - **Unix/macOS**: `~/.artdeps/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\artdeps\config.toml`
//!
//! The CLI's `--config` flag points somewhere else.
//!
//! # Format
//!
//! ```toml
//! # Descriptor used when --descriptor is not given
//! descriptor = "deps/artifacts.deps"
//!
//! # Only jobs applying to this variant are printed by `resolve`
//! variant = "Release"
//!
//! # Server URL overrides, by server name
//! [servers]
//! ServerA = "https://mirror.example.com"
//! ```
//!
//! Server overrides are personal and never written back to the shared
//! descriptor. When a name appears both here and in the descriptor, the URL
//! from this file wins.

use crate::core::{ArtdepsError, Condition};
use crate::server::Server;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Descriptor file name used when neither the CLI nor the configuration names one.
pub const DEFAULT_DESCRIPTOR: &str = "artifacts.deps";

/// User-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalConfig {
    /// Default descriptor path
    #[serde(default)]
    pub descriptor: Option<String>,

    /// Default build variant
    #[serde(default)]
    pub variant: Option<Condition>,

    /// Server URL overrides
    #[serde(default)]
    pub servers: HashMap<String, String>,
}

impl GlobalConfig {
    /// Loads from `path`, or the default location when `None`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the file
    /// exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads from a specific file, which must exist.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| ArtdepsError::ConfigError {
            message: format!("{}: {}", path.display(), e.message()),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("artdeps")
        } else {
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?.join(".artdeps")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The descriptor to use: `explicit` first, then the configured one, then [`DEFAULT_DESCRIPTOR`].
    pub fn descriptor_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.descriptor.as_deref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR))
    }

    /// Replaces the URL of every server that has an override. Returns how many changed.
    pub fn apply_server_overrides(&self, servers: &mut [Server]) -> usize {
        let mut applied = 0;
        for server in servers.iter_mut() {
            if let Some(url) = self.servers.get(&server.name) {
                debug!("Server '{}' URL overridden: {} -> {}", server.name, server.url, url);
                server.url.clone_from(url);
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_all_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(
            &path,
            "descriptor = \"deps/main.deps\"\nvariant = \"Release\"\n\n[servers]\nServerA = \"https://mirror\"\n",
        )
        .await
        .unwrap();

        let loaded = GlobalConfig::load_with_optional(Some(path)).await.unwrap();
        assert_eq!(loaded.descriptor.as_deref(), Some("deps/main.deps"));
        assert_eq!(loaded.variant, Some(Condition::Release));
        assert_eq!(loaded.servers.get("ServerA").map(String::as_str), Some("https://mirror"));
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = GlobalConfig::load_with_optional(Some(temp.path().join("absent.toml"))).await.unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "variant = \"Nightly\"\n").await.unwrap();

        let err = GlobalConfig::load_with_optional(Some(path)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ArtdepsError>(), Some(ArtdepsError::ConfigError { .. })));
    }

    #[test]
    fn test_descriptor_path_precedence() {
        let mut config = GlobalConfig::default();
        assert_eq!(config.descriptor_path(None), PathBuf::from(DEFAULT_DESCRIPTOR));

        config.descriptor = Some("configured.deps".to_string());
        assert_eq!(config.descriptor_path(None), PathBuf::from("configured.deps"));
        assert_eq!(config.descriptor_path(Some(Path::new("cli.deps"))), PathBuf::from("cli.deps"));
    }

    #[test]
    fn test_server_overrides_win() {
        let mut config = GlobalConfig::default();
        config.servers.insert("ServerA".to_string(), "https://mirror".to_string());
        config.servers.insert("Unused".to_string(), "https://nowhere".to_string());

        let mut servers = vec![
            Server::new("ServerA", ServerType::TeamCity, "https://a"),
            Server::new("ServerB", ServerType::TeamCity, "https://b"),
        ];
        assert_eq!(config.apply_server_overrides(&mut servers), 1);
        assert_eq!(servers[0].url, "https://mirror");
        assert_eq!(servers[1].url, "https://b");
    }
}
