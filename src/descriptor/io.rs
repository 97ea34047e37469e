//! Reading and writing descriptor files.
//!
//! Failing to read or write the file itself is the only fatal descriptor
//! error; everything inside the file is handled by the parser's recovery rules.

use crate::core::ArtdepsError;
use crate::descriptor::{ParsedDescriptor, parse};
use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Reads and parses a descriptor file.
///
/// # Errors
///
/// [`ArtdepsError::DescriptorNotFound`] if the file does not exist,
/// [`ArtdepsError::DescriptorRead`] for any other I/O failure.
pub async fn load_file(path: &Path) -> Result<ParsedDescriptor> {
    Ok(parse(&read_file(path).await?))
}

/// Reads descriptor text without parsing it.
pub async fn read_file(path: &Path) -> Result<String> {
    debug!("Loading descriptor {}", path.display());
    let text = fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ArtdepsError::DescriptorNotFound {
                path: path.display().to_string(),
            }
        } else {
            ArtdepsError::DescriptorRead {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    Ok(text)
}

/// Writes descriptor text, replacing the file atomically (temp file + rename).
pub async fn save_file(path: &Path, text: &str) -> Result<()> {
    debug!("Writing descriptor {}", path.display());
    let write_error = |source| ArtdepsError::DescriptorWrite {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_error)?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, text).await.map_err(write_error)?;
    fs::rename(&temp_path, path).await.map_err(write_error)?;
    Ok(())
}
