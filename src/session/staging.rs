//! Upload/selection tracking
//!
//! Holds the images staged for the next enhancement request.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extensions accepted by the file picker and drop zone
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff"];

/// A user-selected image awaiting enhancement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Generated at selection time; names may collide, ids do not
    pub id: Uuid,
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            path: path.into(),
            size_bytes,
        }
    }

    /// Stage a file from disk, reading its size
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::new(name, path, metadata.len()))
    }

    pub fn size_string(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Whether a path looks like an image the server can enhance
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Stage every readable image among `paths`, skipping the rest
pub fn stage_paths<I, P>(paths: I) -> Vec<StagedFile>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .filter(|p| is_supported_image(p.as_ref()))
        .filter_map(|p| match StagedFile::from_path(p.as_ref()) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", p.as_ref(), e);
                None
            }
        })
        .collect()
}

/// The staged set. A selection replaces it wholesale.
#[derive(Debug, Default)]
pub struct UploadTracker {
    files: Vec<StagedFile>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, files: Vec<StagedFile>) {
        tracing::debug!("Staging {} file(s), replacing {}", files.len(), self.files.len());
        self.files = files;
    }

    /// Drop one file; returns false if it was not staged
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        before != self.files.len()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// Get a human-readable size string
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < 1024.0 {
        format!("{} B", bytes as u64)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(names: &[&str]) -> Vec<StagedFile> {
        names
            .iter()
            .map(|n| StagedFile::new(*n, format!("/tmp/{}", n), 1024))
            .collect()
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let mut tracker = UploadTracker::new();
        let first = batch(&["a.png", "b.png"]);
        let second = batch(&["c.png"]);

        tracker.select(first.clone());
        assert_eq!(tracker.files(), first.as_slice());

        tracker.select(second.clone());
        assert_eq!(tracker.files(), second.as_slice());

        tracker.select(Vec::new());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut tracker = UploadTracker::new();
        let files = batch(&["a.png", "b.png"]);
        let target = files[0].id;
        tracker.select(files);

        assert!(tracker.remove(target));
        let after_first: Vec<_> = tracker.files().to_vec();
        assert!(!tracker.remove(target));
        assert_eq!(tracker.files(), after_first.as_slice());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_duplicate_names_are_distinct_entries() {
        let mut tracker = UploadTracker::new();
        let files = batch(&["face.png", "face.png"]);
        let first = files[0].id;
        tracker.select(files);

        assert!(tracker.remove(first));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.files()[0].name, "face.png");
    }

    #[test]
    fn test_supported_images() {
        assert!(is_supported_image(Path::new("/x/photo.JPG")));
        assert!(is_supported_image(Path::new("scan.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn test_stage_paths_reads_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("portrait.png");
        std::fs::write(&image, vec![0u8; 2048]).unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "x").unwrap();
        let missing = dir.path().join("gone.png");

        let staged = stage_paths([image.clone(), text, missing]);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "portrait.png");
        assert_eq!(staged[0].size_bytes, 2048);
        assert_eq!(staged[0].size_string(), "2.00 KB");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
