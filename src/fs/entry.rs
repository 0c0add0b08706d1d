use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fs::risk::RiskTier;

/// Type of listed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a listed directory. Produced only by a successful listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl DirectoryEntry {
    /// Build an entry for `path`, deriving `name` and `extension` from it.
    pub fn new(path: &Path, kind: EntryKind, size: Option<u64>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let extension = match kind {
            EntryKind::File => path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase()),
            EntryKind::Directory => None,
        };
        Self {
            name,
            path: path.to_path_buf(),
            kind,
            size,
            extension,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Sort entries in place: optionally directories first, then by
/// case-insensitive name.
pub fn sort_entries(entries: &mut [DirectoryEntry], dirs_first: bool) {
    entries.sort_by(|a, b| {
        let mut cmp = std::cmp::Ordering::Equal;

        if dirs_first {
            cmp = b.is_dir().cmp(&a.is_dir());
        }

        cmp.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// What the listing service answers for one `list(path)` call.
///
/// `error`, `timed_out`, `risk_tier` and `warning` are optional; when the
/// service fills them in they take precedence over the client's own
/// classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub path: PathBuf,
    #[serde(default)]
    pub parent: Option<PathBuf>,
    #[serde(default)]
    pub entries: Vec<DirectoryEntry>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timed_out: Option<bool>,
    #[serde(default)]
    pub risk_tier: Option<RiskTier>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl ListResponse {
    /// A successful response carrying only entries.
    pub fn with_entries(path: &Path, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            path: path.to_path_buf(),
            parent: path.parent().map(Path::to_path_buf),
            entries,
            ..Default::default()
        }
    }

    /// Parse a response from its JSON wire form.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Existence check for a manually typed path. Never enumerates contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathValidation {
    pub exists: bool,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_readable: bool,
    pub is_risky_path: bool,
    #[serde(default)]
    pub error: Option<String>,
}
