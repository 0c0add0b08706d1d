//! Engine configuration: TOML file loading and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. Explicit path passed to [`BrowserConfig::load`]
//! 2. `$FS_BROWSE_CONFIG` environment variable (path to config file)
//! 3. Project-local `.fs-browse.toml` in the current working directory
//! 4. Global `~/.config/fs-browse/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::fs::risk::{
    RiskPolicy, RiskTimeouts, DEFAULT_NORMAL_TIMEOUT_MS, DEFAULT_RISKY_MOUNT_TIMEOUT_MS,
    DEFAULT_RISKY_PREFIXES, DEFAULT_RISKY_WARNING, DEFAULT_VOLUME_ROOTS,
    DEFAULT_VOLUME_ROOT_TIMEOUT_MS,
};

// ── Section configs ──────────────────────────────────────────────────────────

/// Listing budgets per risk tier, in milliseconds.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    pub normal_ms: Option<u64>,
    pub risky_mount_ms: Option<u64>,
    pub volume_root_ms: Option<u64>,
}

/// Path classification tables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RiskConfig {
    /// Directories whose direct listing enumerates mounted volumes.
    pub volume_roots: Option<Vec<String>>,
    /// Prefixes of network and removable-media paths.
    pub risky_prefixes: Option<Vec<String>>,
    /// Warning shown on risky-mount paths.
    pub warning: Option<String>,
}

/// Tree presentation settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Directories always listed first.
    pub dirs_first: Option<bool>,
    /// Include dot-files in local listings.
    pub show_hidden: Option<bool>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level engine configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BrowserConfig {
    pub timeouts: TimeoutConfig,
    pub risk: RiskConfig,
    pub tree: TreeConfig,
}

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FS_BROWSE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fs-browse.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fs-browse").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning logged).
fn load_file(path: &Path) -> Option<BrowserConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<BrowserConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(path = %path.display(), "failed to parse config file: {}", e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl BrowserConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &BrowserConfig) -> BrowserConfig {
        BrowserConfig {
            timeouts: TimeoutConfig {
                normal_ms: other.timeouts.normal_ms.or(self.timeouts.normal_ms),
                risky_mount_ms: other.timeouts.risky_mount_ms.or(self.timeouts.risky_mount_ms),
                volume_root_ms: other.timeouts.volume_root_ms.or(self.timeouts.volume_root_ms),
            },
            risk: RiskConfig {
                volume_roots: other.risk.volume_roots.clone().or(self.risk.volume_roots),
                risky_prefixes: other
                    .risk
                    .risky_prefixes
                    .clone()
                    .or(self.risk.risky_prefixes),
                warning: other.risk.warning.clone().or(self.risk.warning),
            },
            tree: TreeConfig {
                dirs_first: other.tree.dirs_first.or(self.tree.dirs_first),
                show_hidden: other.tree.show_hidden.or(self.tree.show_hidden),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `explicit_path` has the highest priority among files.
    pub fn load(explicit_path: Option<&Path>) -> BrowserConfig {
        let mut config = BrowserConfig::default();

        // Walk in reverse so that the highest-priority candidate wins.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(path) = explicit_path {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn normal_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.normal_ms.unwrap_or(DEFAULT_NORMAL_TIMEOUT_MS))
    }

    pub fn risky_mount_timeout(&self) -> Duration {
        Duration::from_millis(
            self.timeouts
                .risky_mount_ms
                .unwrap_or(DEFAULT_RISKY_MOUNT_TIMEOUT_MS),
        )
    }

    pub fn volume_root_timeout(&self) -> Duration {
        Duration::from_millis(
            self.timeouts
                .volume_root_ms
                .unwrap_or(DEFAULT_VOLUME_ROOT_TIMEOUT_MS),
        )
    }

    pub fn volume_roots(&self) -> Vec<String> {
        self.risk
            .volume_roots
            .clone()
            .unwrap_or_else(|| DEFAULT_VOLUME_ROOTS.iter().map(|s| s.to_string()).collect())
    }

    pub fn risky_prefixes(&self) -> Vec<String> {
        self.risk
            .risky_prefixes
            .clone()
            .unwrap_or_else(|| DEFAULT_RISKY_PREFIXES.iter().map(|s| s.to_string()).collect())
    }

    pub fn risky_warning(&self) -> &str {
        self.risk.warning.as_deref().unwrap_or(DEFAULT_RISKY_WARNING)
    }

    /// Whether directories are listed before files.
    pub fn dirs_first(&self) -> bool {
        self.tree.dirs_first.unwrap_or(true)
    }

    /// Whether dot-files are listed.
    pub fn show_hidden(&self) -> bool {
        self.tree.show_hidden.unwrap_or(false)
    }

    /// Budgets in tier order. Out-of-order values are raised into order.
    pub fn timeouts(&self) -> RiskTimeouts {
        let timeouts = RiskTimeouts {
            normal: self.normal_timeout(),
            risky_mount: self.risky_mount_timeout(),
            volume_root: self.volume_root_timeout(),
        };
        if !timeouts.is_ordered() {
            warn!(
                ?timeouts,
                "timeouts must satisfy volume_root <= risky_mount <= normal; adjusting"
            );
        }
        timeouts.ordered()
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy::new(
            self.volume_roots(),
            self.risky_prefixes(),
            self.risky_warning().to_string(),
            self.timeouts(),
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
