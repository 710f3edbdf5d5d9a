//! Saving enhanced output locally
//!
//! The bulk archive and single images land in the download directory.
//! Existing files are never overwritten.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::{ApiError, EnhancerApi};

/// File name the server gives its bulk archive
pub const ARCHIVE_NAME: &str = "Enhanced-Images.zip";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to download images: {0}")]
    Api(#[from] ApiError),
    #[error("Failed to save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("There are no enhanced images to download")]
    NothingToExport,
}

/// First free path for `file_name` in `dir`, appending " (n)" as needed
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1..)
        .map(|n| match extension {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Write `bytes` under a free name in `dir`
pub async fn save_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = unique_path(dir, file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::info!("Saved {} bytes to {:?}", bytes.len(), path);
    Ok(path)
}

/// Fetch the server-built archive and save it
pub async fn download_all(api: &dyn EnhancerApi, dir: &Path) -> Result<PathBuf, ExportError> {
    let archive = api.download_all().await?;
    save_bytes(dir, ARCHIVE_NAME, &archive).await
}

/// Fetch one enhanced image and save it as `save_as`
pub async fn download_image(
    api: &dyn EnhancerApi,
    file_name: &str,
    save_as: &str,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = api.fetch_output(file_name).await?;
    save_bytes(dir, save_as, &bytes).await
}
