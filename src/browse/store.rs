use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::browse::sequencer::{RequestSequencer, Ticket};
use crate::browse::state::{DirectoryState, Phase, Settlement};
use crate::fs::entry::EntryKind;
use crate::fs::risk::{RiskPolicy, RiskTier};

/// A listing the store wants performed. Handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub path: PathBuf,
    pub ticket: Ticket,
    pub timeout: Duration,
    pub risk_tier: RiskTier,
}

/// What a toggle did to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    /// Already loaded; shown again without a request.
    Expanded,
    Collapsed,
    /// A new request was started.
    Fetch(BrowseRequest),
}

/// Whether a settled outcome changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied(Phase),
    /// A newer ticket exists for the path; nothing was touched.
    Stale,
}

/// A flattened row of the visible tree, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub depth: usize,
    pub is_last_sibling: bool,
    pub is_expanded: bool,
    /// `None` for files and never-expanded directories.
    pub phase: Option<Phase>,
    /// Error or timeout message for failed directories.
    pub message: Option<String>,
    pub warning_styled: bool,
}

/// Owns the per-path state map. All mutation goes through the transitions
/// below.
#[derive(Debug)]
pub struct DirectoryTreeStore {
    states: HashMap<PathBuf, DirectoryState>,
    sequencer: RequestSequencer,
    policy: RiskPolicy,
    dirs_first: bool,
}

impl Default for DirectoryTreeStore {
    fn default() -> Self {
        Self::new(RiskPolicy::default(), true)
    }
}

impl DirectoryTreeStore {
    pub fn new(policy: RiskPolicy, dirs_first: bool) -> Self {
        Self {
            states: HashMap::new(),
            sequencer: RequestSequencer::new(),
            policy,
            dirs_first,
        }
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    pub fn get(&self, path: &Path) -> Option<&DirectoryState> {
        self.states.get(path)
    }

    pub fn states(&self) -> &HashMap<PathBuf, DirectoryState> {
        &self.states
    }

    pub fn phase(&self, path: &Path) -> Option<Phase> {
        self.states.get(path).map(|s| s.phase)
    }

    /// Expand or collapse `path`.
    ///
    /// An expanded healthy node collapses. A collapsed loaded node expands
    /// from cache. Anything else (unknown, idle, still loading, failed)
    /// starts a fresh request; a failed node retries even while expanded.
    pub fn toggle_expand(&mut self, path: &Path) -> ToggleAction {
        let Some(state) = self.states.remove(path) else {
            return ToggleAction::Fetch(self.begin_fetch(path));
        };

        if state.phase.is_failed() {
            self.states.insert(path.to_path_buf(), state);
            return ToggleAction::Fetch(self.begin_fetch(path));
        }

        if state.expanded {
            self.states.insert(path.to_path_buf(), state.collapse());
            return ToggleAction::Collapsed;
        }

        if !state.needs_fetch() {
            self.states.insert(path.to_path_buf(), state.expand());
            return ToggleAction::Expanded;
        }

        self.states.insert(path.to_path_buf(), state);
        ToggleAction::Fetch(self.begin_fetch(path))
    }

    /// Collapse without touching phase, entries or ticket. No-op for
    /// unknown paths.
    pub fn collapse(&mut self, path: &Path) {
        if let Some(state) = self.states.remove(path) {
            self.states.insert(path.to_path_buf(), state.collapse());
        }
    }

    /// Start a new request for `path` regardless of its current phase.
    pub fn retry(&mut self, path: &Path) -> BrowseRequest {
        self.begin_fetch(path)
    }

    fn begin_fetch(&mut self, path: &Path) -> BrowseRequest {
        let risk = self.policy.classify_path(path);
        let ticket = self.sequencer.issue(path);
        let state = self
            .states
            .remove(path)
            .unwrap_or_else(|| DirectoryState::idle(path));
        self.states
            .insert(path.to_path_buf(), state.begin(ticket, &risk));

        BrowseRequest {
            path: path.to_path_buf(),
            ticket,
            timeout: risk.timeout,
            risk_tier: risk.tier,
        }
    }

    /// Fold an outcome into the map if `ticket` is still current for `path`.
    pub fn apply(&mut self, path: &Path, ticket: Ticket, outcome: Settlement) -> Applied {
        if !self.sequencer.is_current(path, ticket) {
            debug!(path = %path.display(), %ticket, "discarding stale browse outcome");
            return Applied::Stale;
        }
        let Some(state) = self.states.remove(path) else {
            return Applied::Stale;
        };

        let next = state.settle(outcome, self.dirs_first);
        if let Some(ref message) = next.error {
            warn!(path = %path.display(), %ticket, phase = next.phase.label(), "{}", message);
        }
        let phase = next.phase;
        self.states.insert(path.to_path_buf(), next);
        Applied::Applied(phase)
    }

    /// Drop every state. In-flight requests become stale.
    pub fn clear(&mut self) {
        self.states.clear();
        self.sequencer.reset();
    }

    /// Depth-first rows of everything visible under `root`.
    ///
    /// Only expanded, loaded directories contribute children. The root row
    /// is always present. An entry pointing back at one of its ancestors is
    /// shown but not descended into.
    pub fn visible_rows(&self, root: &Path) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut ancestors = HashSet::new();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        self.push_row(root, name, EntryKind::Directory, 0, true, &mut ancestors, &mut rows);
        rows
    }

    #[allow(clippy::too_many_arguments)]
    fn push_row<'a>(
        &'a self,
        path: &'a Path,
        name: String,
        kind: EntryKind,
        depth: usize,
        is_last: bool,
        ancestors: &mut HashSet<&'a Path>,
        rows: &mut Vec<VisibleRow>,
    ) {
        let state = match kind {
            EntryKind::Directory => self.states.get(path),
            EntryKind::File => None,
        };

        rows.push(VisibleRow {
            name,
            path: path.to_path_buf(),
            kind,
            depth,
            is_last_sibling: is_last,
            is_expanded: state.is_some_and(|s| s.expanded),
            phase: state.map(|s| s.phase),
            message: state.and_then(|s| s.error.clone()),
            warning_styled: state.is_some_and(DirectoryState::is_warning_styled),
        });

        if let Some(state) = state {
            if state.expanded && state.phase == Phase::Loaded && ancestors.insert(path) {
                let count = state.entries.len();
                for (i, entry) in state.entries.iter().enumerate() {
                    self.push_row(
                        &entry.path,
                        entry.name.clone(),
                        entry.kind,
                        depth + 1,
                        i == count - 1,
                        ancestors,
                        rows,
                    );
                }
                ancestors.remove(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowseError;
    use crate::fs::entry::{DirectoryEntry, ListResponse};

    fn listing(dir: &str, children: &[(&str, EntryKind)]) -> Settlement {
        let entries = children
            .iter()
            .map(|(n, k)| DirectoryEntry::new(&Path::new(dir).join(n), *k, None))
            .collect();
        Settlement::Listed(ListResponse::with_entries(Path::new(dir), entries))
    }

    fn fetch(action: ToggleAction) -> BrowseRequest {
        match action {
            ToggleAction::Fetch(req) => req,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn first_expand_starts_loading() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/data/clips")));
        assert_eq!(req.timeout, Duration::from_millis(5000));
        let s = store.get(Path::new("/data/clips")).unwrap();
        assert_eq!(s.phase, Phase::Loading);
        assert!(s.expanded);
        assert_eq!(s.ticket, Some(req.ticket));
    }

    #[test]
    fn current_outcome_is_applied() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/d")));
        let applied = store.apply(
            &req.path,
            req.ticket,
            listing("/d", &[("a", EntryKind::File), ("b", EntryKind::File)]),
        );
        assert_eq!(applied, Applied::Applied(Phase::Loaded));
        assert_eq!(store.get(Path::new("/d")).unwrap().entries.len(), 2);
    }

    #[test]
    fn collapse_then_expand_loaded_uses_cache() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/d")));
        store.apply(&req.path, req.ticket, listing("/d", &[("a", EntryKind::File)]));

        assert_eq!(store.toggle_expand(Path::new("/d")), ToggleAction::Collapsed);
        let s = store.get(Path::new("/d")).unwrap();
        assert!(!s.expanded);
        assert_eq!(s.entries.len(), 1);
        assert_eq!(s.ticket, Some(req.ticket));

        assert_eq!(store.toggle_expand(Path::new("/d")), ToggleAction::Expanded);
        assert!(store.get(Path::new("/d")).unwrap().expanded);
    }

    #[test]
    fn reexpand_while_loading_issues_new_ticket() {
        let mut store = DirectoryTreeStore::default();
        let first = fetch(store.toggle_expand(Path::new("/d")));
        assert_eq!(store.toggle_expand(Path::new("/d")), ToggleAction::Collapsed);
        let second = fetch(store.toggle_expand(Path::new("/d")));
        assert!(second.ticket > first.ticket);

        // Second lands first, then the stale first one.
        store.apply(&second.path, second.ticket, listing("/d", &[("new", EntryKind::File)]));
        let applied = store.apply(
            &first.path,
            first.ticket,
            Settlement::Failed(BrowseError::Transport("gone".into())),
        );
        assert_eq!(applied, Applied::Stale);
        let s = store.get(Path::new("/d")).unwrap();
        assert_eq!(s.phase, Phase::Loaded);
        assert_eq!(s.entries[0].name, "new");
        assert_eq!(s.ticket, Some(second.ticket));
    }

    #[test]
    fn clicking_failed_node_retries_even_when_expanded() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/restricted")));
        store.apply(&req.path, req.ticket, Settlement::Failed(BrowseError::AccessDenied));
        assert!(store.get(Path::new("/restricted")).unwrap().expanded);

        let retry = fetch(store.toggle_expand(Path::new("/restricted")));
        assert!(retry.ticket > req.ticket);
        let s = store.get(Path::new("/restricted")).unwrap();
        assert_eq!(s.phase, Phase::Loading);
        assert!(s.error.is_none());
    }

    #[test]
    fn risky_path_gets_short_timeout() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/Volumes/SlowNAS")));
        assert_eq!(req.risk_tier, RiskTier::RiskyMount);
        assert_eq!(req.timeout, Duration::from_millis(2000));
    }

    #[test]
    fn failure_on_one_path_leaves_siblings_alone() {
        let mut store = DirectoryTreeStore::default();
        let a = fetch(store.toggle_expand(Path::new("/a")));
        let b = fetch(store.toggle_expand(Path::new("/b")));
        store.apply(&a.path, a.ticket, listing("/a", &[("x", EntryKind::File)]));
        store.apply(&b.path, b.ticket, Settlement::Failed(BrowseError::NotFound));
        assert_eq!(store.phase(Path::new("/a")), Some(Phase::Loaded));
        assert_eq!(store.phase(Path::new("/b")), Some(Phase::Error));
    }

    #[test]
    fn clear_makes_in_flight_outcomes_stale() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/d")));
        store.clear();
        assert_eq!(
            store.apply(&req.path, req.ticket, listing("/d", &[])),
            Applied::Stale
        );
        assert!(store.states().is_empty());
    }

    #[test]
    fn collapse_unknown_path_is_noop() {
        let mut store = DirectoryTreeStore::default();
        store.collapse(Path::new("/nowhere"));
        assert!(store.get(Path::new("/nowhere")).is_none());
    }

    #[test]
    fn visible_rows_follow_expanded_directories() {
        let mut store = DirectoryTreeStore::default();
        let root = fetch(store.toggle_expand(Path::new("/r")));
        store.apply(
            &root.path,
            root.ticket,
            listing("/r", &[("file.txt", EntryKind::File), ("sub", EntryKind::Directory)]),
        );
        let sub = fetch(store.toggle_expand(Path::new("/r/sub")));
        store.apply(&sub.path, sub.ticket, listing("/r/sub", &[("inner.mov", EntryKind::File)]));

        let rows = store.visible_rows(Path::new("/r"));
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        // Directories sort first.
        assert_eq!(names, vec!["r", "sub", "inner.mov", "file.txt"]);
        assert_eq!(rows[2].depth, 2);
        assert!(rows[3].is_last_sibling);
        assert_eq!(rows[1].phase, Some(Phase::Loaded));
        assert_eq!(rows[3].phase, None);

        store.toggle_expand(Path::new("/r/sub"));
        assert_eq!(store.visible_rows(Path::new("/r")).len(), 3);
    }

    #[test]
    fn visible_rows_stop_at_entries_pointing_back_up() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/r")));
        let entries = vec![
            DirectoryEntry::new(Path::new("/r/a"), EntryKind::File, None),
            DirectoryEntry {
                name: "..".into(),
                ..DirectoryEntry::new(Path::new("/r"), EntryKind::Directory, None)
            },
        ];
        store.apply(
            &req.path,
            req.ticket,
            Settlement::Listed(ListResponse::with_entries(Path::new("/r"), entries)),
        );

        let rows = store.visible_rows(Path::new("/r"));
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["r", "..", "a"]);
        assert_eq!(rows[1].path, PathBuf::from("/r"));
    }

    #[test]
    fn visible_rows_carry_failure_message() {
        let mut store = DirectoryTreeStore::default();
        let req = fetch(store.toggle_expand(Path::new("/Volumes/SlowNAS")));
        store.apply(
            &req.path,
            req.ticket,
            Settlement::Failed(BrowseError::Timeout { risky: true }),
        );
        let rows = store.visible_rows(Path::new("/Volumes/SlowNAS"));
        assert_eq!(rows.len(), 1);
        assert!(rows[0].warning_styled);
        assert_eq!(
            rows[0].message.as_deref(),
            Some("Volume may be slow, disconnected, or unavailable")
        );
    }
}
