//! Path risk classification: which paths are likely to be slow or dead, and
//! how long a listing of them may take before it is abandoned.
//!
//! Pure string matching. No filesystem access, no state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default budget for ordinary paths.
pub const DEFAULT_NORMAL_TIMEOUT_MS: u64 = 5000;
/// Default budget for network and removable-media mounts.
pub const DEFAULT_RISKY_MOUNT_TIMEOUT_MS: u64 = 2000;
/// Default budget for the volumes directories themselves.
pub const DEFAULT_VOLUME_ROOT_TIMEOUT_MS: u64 = 1000;

/// Warning attached to risky-mount paths.
pub const DEFAULT_RISKY_WARNING: &str = "Some volumes may be slow or unavailable";

/// Directories under which the OS mounts volumes.
pub const DEFAULT_VOLUME_ROOTS: &[&str] = &["/Volumes", "/mnt", "/media"];

/// Prefixes of network mounts, UNC/SMB/AFP paths and removable media.
pub const DEFAULT_RISKY_PREFIXES: &[&str] = &[
    "/Volumes/",
    "/mnt/",
    "/media/",
    "/run/media/",
    "/net/",
    "/Network/",
    "/afs/",
    "//",
    "\\\\",
    "smb://",
    "afp://",
    "nfs://",
    "cifs://",
];

/// Expected latency and reliability class of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    #[default]
    Normal,
    RiskyMount,
    VolumeRoot,
}

impl RiskTier {
    /// Whether timeouts on this tier get the volume-reliability message.
    pub fn is_risky(self) -> bool {
        !matches!(self, RiskTier::Normal)
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Normal => "normal",
            RiskTier::RiskyMount => "risky-mount",
            RiskTier::VolumeRoot => "volume-root",
        }
    }
}

/// Per-tier listing budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskTimeouts {
    pub normal: Duration,
    pub risky_mount: Duration,
    pub volume_root: Duration,
}

impl Default for RiskTimeouts {
    fn default() -> Self {
        Self {
            normal: Duration::from_millis(DEFAULT_NORMAL_TIMEOUT_MS),
            risky_mount: Duration::from_millis(DEFAULT_RISKY_MOUNT_TIMEOUT_MS),
            volume_root: Duration::from_millis(DEFAULT_VOLUME_ROOT_TIMEOUT_MS),
        }
    }
}

impl RiskTimeouts {
    /// Whether `volume_root <= risky_mount <= normal` holds.
    pub fn is_ordered(&self) -> bool {
        self.volume_root <= self.risky_mount && self.risky_mount <= self.normal
    }

    /// Raise the larger tiers so that `volume_root <= risky_mount <= normal`.
    pub fn ordered(self) -> Self {
        let risky_mount = self.risky_mount.max(self.volume_root);
        let normal = self.normal.max(risky_mount);
        Self {
            normal,
            risky_mount,
            volume_root: self.volume_root,
        }
    }

    pub fn for_tier(&self, tier: RiskTier) -> Duration {
        match tier {
            RiskTier::Normal => self.normal,
            RiskTier::RiskyMount => self.risky_mount,
            RiskTier::VolumeRoot => self.volume_root,
        }
    }
}

/// Result of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tier: RiskTier,
    pub timeout: Duration,
    pub warning: Option<String>,
}

/// Prefix tables and budgets used by [`RiskPolicy::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskPolicy {
    volume_roots: Vec<String>,
    risky_prefixes: Vec<String>,
    warning: String,
    timeouts: RiskTimeouts,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_VOLUME_ROOTS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_RISKY_PREFIXES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_RISKY_WARNING.to_string(),
            RiskTimeouts::default(),
        )
    }
}

impl RiskPolicy {
    pub fn new(
        volume_roots: Vec<String>,
        risky_prefixes: Vec<String>,
        warning: String,
        timeouts: RiskTimeouts,
    ) -> Self {
        Self {
            volume_roots: volume_roots
                .iter()
                .map(|r| trim_separators(r).to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
            risky_prefixes: risky_prefixes
                .into_iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.to_lowercase())
                .collect(),
            warning,
            timeouts,
        }
    }

    pub fn timeouts(&self) -> &RiskTimeouts {
        &self.timeouts
    }

    /// Classify `path`. Total for every input string.
    ///
    /// Volume roots are matched before risky prefixes, so `/Volumes` is a
    /// volume root while `/Volumes/NAS` is a risky mount.
    pub fn classify(&self, path: &str) -> Classification {
        let tier = self.tier_of(path);
        let warning = match tier {
            RiskTier::RiskyMount => Some(self.warning.clone()),
            RiskTier::Normal | RiskTier::VolumeRoot => None,
        };
        Classification {
            tier,
            timeout: self.timeouts.for_tier(tier),
            warning,
        }
    }

    pub fn classify_path(&self, path: &Path) -> Classification {
        self.classify(&path.to_string_lossy())
    }

    fn tier_of(&self, path: &str) -> RiskTier {
        let trimmed = trim_separators(path).to_lowercase();
        if self.volume_roots.iter().any(|root| *root == trimmed) {
            return RiskTier::VolumeRoot;
        }

        let lower = path.to_lowercase();
        if self
            .risky_prefixes
            .iter()
            .any(|prefix| lower.starts_with(prefix.as_str()))
        {
            return RiskTier::RiskyMount;
        }

        RiskTier::Normal
    }
}

/// Strip trailing `/` and `\`, keeping a lone root separator intact.
fn trim_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(&['/', '\\'][..]);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}
