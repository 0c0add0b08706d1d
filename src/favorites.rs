use std::path::{Path, PathBuf};

/// Favorite paths in the order they were added. Lives for the session only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesStore {
    paths: Vec<PathBuf>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` unless it is already a favorite.
    pub fn add(&mut self, path: &Path) {
        if !self.contains(path) {
            self.paths.push(path.to_path_buf());
        }
    }

    /// Remove `path` if present.
    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn list(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
