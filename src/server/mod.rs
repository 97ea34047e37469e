//! Build servers declared in a descriptor and the connections used to query them.
//!
//! # Components
//!
//! - [`Server`] - a named server block (`[[name]]`, `Type=`, `Url=`)
//! - [`ServerRegistry`] - name → server + lazily opened [`ServerConnection`]
//! - [`BuildServer`] - capability traits every connector implements
//! - [`Memo`] / [`KeyedMemo`] - resolve-once caches owned by each connection
//! - [`MemoryServer`] - in-memory connector; [`SnapshotServer`] - JSON snapshot connector
//!
//! A registry lives for one resolution pass. Metadata is fetched at most once per
//! server per registry and reused by every dependency that names the server.

pub mod connector;
pub mod memo;
pub mod memory;
pub mod registry;
pub mod snapshot;

pub use connector::{
    ArtifactDeclaration, ArtifactLister, BuildConfigLister, BuildConfiguration, BuildServer,
    ConnectorFactory, DefaultConnectors, FixedConnectors, Project, ProjectLister,
};
pub use memo::{KeyedMemo, Memo};
pub use memory::MemoryServer;
pub use registry::{ServerConnection, ServerRegistry};
pub use snapshot::SnapshotServer;

use crate::core::error::{ArtdepsError, closest_match};
use crate::descriptor::RevisionSelector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connector kind named by a server block's `Type=` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerType {
    /// A remote TeamCity CI server; its transport is provided by the embedding
    /// application through a [`ConnectorFactory`].
    TeamCity,
    /// An offline JSON snapshot of a server (see [`SnapshotServer`]).
    Snapshot,
}

impl ServerType {
    pub const ALL: [Self; 2] = [Self::TeamCity, Self::Snapshot];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamCity => "TeamCity",
            Self::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerType {
    type Err = ArtdepsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            let names = Self::ALL.map(Self::as_str);
            ArtdepsError::UnknownServerType {
                value: s.to_string(),
                suggestion: closest_match(s, &names).map(str::to_string),
            }
        })
    }
}

/// A build server declared in the descriptor.
///
/// # Fields
///
/// - `name`: unique within a descriptor; dependency sections refer to it
/// - `server_type`: which connector talks to it
/// - `url`: base URL (or snapshot location)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub server_type: ServerType,
    pub url: String,
}

impl Server {
    pub fn new(name: impl Into<String>, server_type: ServerType, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_type,
            url: url.into(),
        }
    }

    /// Fully qualified download URL of one artifact file.
    ///
    /// `<url>/repository/download/<configId>/<revisionSegment>/<path>`
    pub fn artifact_url(&self, build_configuration_id: &str, revision: &RevisionSelector, path: &str) -> String {
        format!(
            "{}/repository/download/{}/{}/{}",
            self.url.trim_end_matches('/'),
            build_configuration_id,
            revision.path_segment(),
            path.trim_start_matches('/')
        )
    }
}
