//! Per-path directory state and the pure transitions between its phases.
//!
//! Every transition takes the current state by value and returns the next
//! one. Staleness is not decided here; the store only calls [`settle`]
//! for outcomes whose ticket is still current.
//!
//! [`settle`]: DirectoryState::settle

use std::path::{Path, PathBuf};

use crate::browse::sequencer::Ticket;
use crate::error::BrowseError;
use crate::fs::entry::{sort_entries, DirectoryEntry, ListResponse};
use crate::fs::risk::{Classification, RiskTier};

/// Lifecycle of one directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
    Timeout,
}

impl Phase {
    /// `Error` and `Timeout`: the node shows a message and retries on click.
    pub fn is_failed(self) -> bool {
        matches!(self, Phase::Error | Phase::Timeout)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Loaded => "loaded",
            Phase::Error => "error",
            Phase::Timeout => "timeout",
        }
    }
}

/// How a browse operation ended, as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The backend answered. Its own `error`/`timed_out` fields may still
    /// turn this into a failure.
    Listed(ListResponse),
    /// The request failed, timed out or was cancelled.
    Failed(BrowseError),
}

/// Everything known about one path that has been expanded at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryState {
    pub path: PathBuf,
    pub parent: Option<PathBuf>,
    /// Non-empty only while `phase == Loaded`.
    pub entries: Vec<DirectoryEntry>,
    pub phase: Phase,
    pub error: Option<String>,
    /// Independent of `phase`; collapsing keeps cached entries.
    pub expanded: bool,
    pub risk_tier: RiskTier,
    pub timed_out: bool,
    pub warning: Option<String>,
    /// The ticket of the request that produced (or is producing) this state.
    pub ticket: Option<Ticket>,
}

impl DirectoryState {
    /// A never-listed, collapsed path.
    pub fn idle(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            parent: path.parent().map(Path::to_path_buf),
            entries: Vec::new(),
            phase: Phase::Idle,
            error: None,
            expanded: false,
            risk_tier: RiskTier::Normal,
            timed_out: false,
            warning: None,
            ticket: None,
        }
    }

    /// Whether expanding this path requires a new request.
    pub fn needs_fetch(&self) -> bool {
        self.phase != Phase::Loaded
    }

    /// A timed-out risky path is shown as a warning rather than an error.
    pub fn is_warning_styled(&self) -> bool {
        self.phase == Phase::Timeout && self.risk_tier.is_risky()
    }

    /// Start (or restart) a listing under `ticket`.
    pub fn begin(self, ticket: Ticket, risk: &Classification) -> Self {
        Self {
            entries: Vec::new(),
            phase: Phase::Loading,
            error: None,
            expanded: true,
            risk_tier: risk.tier,
            timed_out: false,
            warning: risk.warning.clone(),
            ticket: Some(ticket),
            ..self
        }
    }

    pub fn expand(self) -> Self {
        Self {
            expanded: true,
            ..self
        }
    }

    pub fn collapse(self) -> Self {
        Self {
            expanded: false,
            ..self
        }
    }

    /// Fold a current outcome into the state. `expanded` is left as is.
    ///
    /// Risk tier, warning and parent reported by the backend replace the
    /// client's own values; an `error` or `timed_out` flag in a response
    /// turns it into a failure.
    pub fn settle(self, outcome: Settlement, dirs_first: bool) -> Self {
        match outcome {
            Settlement::Failed(err) => self.fail(err),
            Settlement::Listed(resp) => {
                let risk_tier = resp.risk_tier.unwrap_or(self.risk_tier);
                let warning = resp.warning.or(self.warning);
                let parent = resp.parent.or(self.parent);
                let state = Self {
                    risk_tier,
                    warning,
                    parent,
                    ..self
                };

                if resp.timed_out.unwrap_or(false) {
                    return state.fail(BrowseError::Timeout {
                        risky: risk_tier.is_risky(),
                    });
                }
                if let Some(message) = resp.error {
                    let err = match BrowseError::from_backend_message(&message) {
                        BrowseError::Timeout { .. } => BrowseError::Timeout {
                            risky: risk_tier.is_risky(),
                        },
                        other => other,
                    };
                    return state.fail(err);
                }

                let mut entries = resp.entries;
                sort_entries(&mut entries, dirs_first);
                Self {
                    entries,
                    phase: Phase::Loaded,
                    error: None,
                    timed_out: false,
                    ..state
                }
            }
        }
    }

    fn fail(self, err: BrowseError) -> Self {
        let timed_out = err.is_timeout();
        Self {
            entries: Vec::new(),
            phase: if timed_out { Phase::Timeout } else { Phase::Error },
            error: Some(err.user_message()),
            timed_out,
            ..self
        }
    }
}
