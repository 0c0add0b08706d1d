//! The directory-listing service seam.
//!
//! The engine only talks to [`ListingBackend`]; a UI embedding this crate can
//! plug in an HTTP client, an SSH session or anything else that can answer
//! "list this path". [`LocalBackend`] answers from the local filesystem.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BrowseError;
use crate::fs::entry::{DirectoryEntry, EntryKind, ListResponse, PathValidation};

/// A service that can list one directory level and check a typed path.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// List the immediate children of `path`. Never recursive.
    async fn list(&self, path: &Path) -> Result<ListResponse, BrowseError>;

    /// Check that `path` exists and what it is. Must not enumerate contents.
    async fn validate(&self, path: &Path) -> PathValidation;
}

/// Lists directories straight from the local filesystem via `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    show_hidden: bool,
}

impl LocalBackend {
    pub fn new(show_hidden: bool) -> Self {
        Self { show_hidden }
    }
}

#[async_trait]
impl ListingBackend for LocalBackend {
    async fn list(&self, path: &Path) -> Result<ListResponse, BrowseError> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_dir() {
            return Err(BrowseError::Unknown(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        // Unreadable children and broken symlinks are skipped, not fatal.
        while let Some(child) = reader.next_entry().await? {
            let child_path = child.path();
            let meta = match tokio::fs::metadata(&child_path).await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let size = match kind {
                EntryKind::File => Some(meta.len()),
                EntryKind::Directory => None,
            };
            let entry = DirectoryEntry::new(&child_path, kind, size);
            if !self.show_hidden && entry.is_hidden() {
                continue;
            }
            entries.push(entry);
        }

        Ok(ListResponse::with_entries(path, entries))
    }

    async fn validate(&self, path: &Path) -> PathValidation {
        let meta = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                return PathValidation {
                    error: Some(BrowseError::from(e).user_message()),
                    ..Default::default()
                }
            }
        };

        // Opening a handle checks permissions without iterating it.
        let is_readable = if meta.is_dir() {
            tokio::fs::read_dir(path).await.is_ok()
        } else {
            tokio::fs::File::open(path).await.is_ok()
        };

        PathValidation {
            exists: true,
            is_directory: meta.is_dir(),
            is_file: meta.is_file(),
            is_readable,
            is_risky_path: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("alpha").join("nested")).unwrap();
        fs::write(dir.path().join("file_a.txt"), "hello").unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        dir
    }

    #[tokio::test]
    async fn list_is_one_level_only() {
        let dir = setup_test_dir();
        let backend = LocalBackend::new(false);
        let resp = backend.list(dir.path()).await.unwrap();
        let mut names: Vec<String> = resp.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["alpha", "file_a.txt", "file_b.rs"]);
        assert_eq!(resp.path, dir.path());
        assert_eq!(resp.parent.as_deref(), dir.path().parent());
    }

    #[tokio::test]
    async fn list_reports_kind_and_size() {
        let dir = setup_test_dir();
        let resp = LocalBackend::new(false).list(dir.path()).await.unwrap();
        let file = resp.entries.iter().find(|e| e.name == "file_a.txt").unwrap();
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.size, Some(5));
        assert_eq!(file.extension.as_deref(), Some("txt"));
        let alpha = resp.entries.iter().find(|e| e.name == "alpha").unwrap();
        assert_eq!(alpha.kind, EntryKind::Directory);
        assert!(alpha.size.is_none());
    }

    #[tokio::test]
    async fn list_with_hidden_files() {
        let dir = setup_test_dir();
        let resp = LocalBackend::new(true).list(dir.path()).await.unwrap();
        assert!(resp.entries.iter().any(|e| e.name == ".hidden"));
    }

    #[tokio::test]
    async fn list_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = LocalBackend::default()
            .list(&dir.path().join("missing"))
            .await
            .unwrap_err();
        assert_eq!(err, BrowseError::NotFound);
    }

    #[tokio::test]
    async fn list_file_is_an_error() {
        let dir = setup_test_dir();
        let err = LocalBackend::default()
            .list(&dir.path().join("file_a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowseError::Unknown(_)));
    }

    #[tokio::test]
    async fn validate_existing_directory() {
        let dir = setup_test_dir();
        let v = LocalBackend::default().validate(dir.path()).await;
        assert!(v.exists);
        assert!(v.is_directory);
        assert!(!v.is_file);
        assert!(v.is_readable);
        assert!(v.error.is_none());
    }

    #[tokio::test]
    async fn validate_existing_file() {
        let dir = setup_test_dir();
        let v = LocalBackend::default()
            .validate(&dir.path().join("file_b.rs"))
            .await;
        assert!(v.exists);
        assert!(v.is_file);
        assert!(!v.is_directory);
    }

    #[tokio::test]
    async fn validate_missing_path() {
        let dir = TempDir::new().unwrap();
        let v = LocalBackend::default()
            .validate(&dir.path().join("nope"))
            .await;
        assert!(!v.exists);
        assert_eq!(v.error.as_deref(), Some("Directory not found"));
    }
}
