use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browse::executor::{BrowseRequestExecutor, CancelToken};
use crate::browse::sequencer::Ticket;
use crate::browse::state::DirectoryState;
use crate::browse::store::{Applied, BrowseRequest, DirectoryTreeStore, ToggleAction, VisibleRow};
use crate::config::BrowserConfig;
use crate::error::{AppError, Result};
use crate::event::BrowseEvent;
use crate::favorites::FavoritesStore;
use crate::fs::backend::{ListingBackend, LocalBackend};
use crate::fs::entry::PathValidation;
use crate::fs::risk::RiskTier;
use crate::selection::{JobSink, SelectionController};

/// What a call to [`Browser::toggle_expand`] did.
#[derive(Debug)]
pub enum Toggle {
    /// Shown again from cache.
    Expanded,
    Collapsed,
    /// A listing was started.
    Dispatched(InFlight),
}

/// Handle to one dispatched listing.
#[derive(Debug)]
pub struct InFlight {
    path: PathBuf,
    ticket: Ticket,
    cancel: CancelToken,
    handle: JoinHandle<Applied>,
}

impl InFlight {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Abort the underlying listing. The path still settles (as a timeout).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the outcome has been applied or discarded.
    ///
    /// A driver that panicked or was aborted reports [`Applied::Stale`].
    pub async fn settled(self) -> Applied {
        match self.handle.await {
            Ok(applied) => applied,
            Err(err) => {
                warn!(path = %self.path.display(), ticket = %self.ticket, "browse driver failed: {}", err);
                Applied::Stale
            }
        }
    }
}

type Pending = HashMap<PathBuf, (Ticket, CancelToken)>;

/// The browsing session: tree state, selection and favorites.
///
/// Listings are spawned onto the current tokio runtime, so the tree methods
/// must be called from within one.
pub struct Browser {
    tree: Arc<Mutex<DirectoryTreeStore>>,
    executor: BrowseRequestExecutor,
    pending: Arc<Mutex<Pending>>,
    events: Option<mpsc::UnboundedSender<BrowseEvent>>,
    selection: SelectionController,
    favorites: FavoritesStore,
}

impl Browser {
    pub fn new(backend: Arc<dyn ListingBackend>, config: &BrowserConfig) -> Self {
        let store = DirectoryTreeStore::new(config.risk_policy(), config.dirs_first());
        Self {
            tree: Arc::new(Mutex::new(store)),
            executor: BrowseRequestExecutor::new(backend),
            pending: Arc::new(Mutex::new(HashMap::new())),
            events: None,
            selection: SelectionController::new(),
            favorites: FavoritesStore::new(),
        }
    }

    /// Browse the local filesystem.
    pub fn local(config: &BrowserConfig) -> Self {
        Self::new(Arc::new(LocalBackend::new(config.show_hidden())), config)
    }

    /// Send settle notifications to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<BrowseEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    // ── Tree ────────────────────────────────────────────────────────────────

    /// Expand or collapse `path`, starting a listing when needed. Clicking a
    /// failed node retries it.
    pub fn toggle_expand(&self, path: &Path) -> Toggle {
        let action = self.tree.lock().toggle_expand(path);
        match action {
            ToggleAction::Expanded => Toggle::Expanded,
            ToggleAction::Collapsed => Toggle::Collapsed,
            ToggleAction::Fetch(request) => Toggle::Dispatched(self.dispatch(request)),
        }
    }

    /// Start a fresh listing for `path` whatever its phase.
    pub fn retry(&self, path: &Path) -> InFlight {
        let request = self.tree.lock().retry(path);
        self.dispatch(request)
    }

    /// Hide `path`'s children. Any listing in flight keeps running.
    pub fn collapse(&self, path: &Path) {
        self.tree.lock().collapse(path);
    }

    /// Abort the current listing for `path`, if there is one.
    pub fn cancel(&self, path: &Path) -> bool {
        match self.pending.lock().get(path) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget all tree state. Listings in flight are aborted and their
    /// outcomes discarded.
    pub fn reset_tree(&self) {
        // Held across the clear: a concurrent dispatch registers either
        // before the drain or after it.
        let mut pending = self.pending.lock();
        self.tree.lock().clear();
        for (_, (_, token)) in pending.drain() {
            token.cancel();
        }
    }

    fn dispatch(&self, request: BrowseRequest) -> InFlight {
        let cancel = CancelToken::new();
        self.pending
            .lock()
            .insert(request.path.clone(), (request.ticket, cancel.clone()));

        let tree = Arc::clone(&self.tree);
        let pending = Arc::clone(&self.pending);
        let executor = self.executor.clone();
        let events = self.events.clone();
        let token = cancel.clone();
        let BrowseRequest {
            path,
            ticket,
            timeout,
            risk_tier,
        } = request;
        let task_path = path.clone();

        let handle = tokio::spawn(async move {
            let settlement = executor
                .execute(&task_path, timeout, risk_tier.is_risky(), &token)
                .await;
            let applied = tree.lock().apply(&task_path, ticket, settlement);

            {
                let mut pending = pending.lock();
                if pending.get(&task_path).map(|(t, _)| *t) == Some(ticket) {
                    pending.remove(&task_path);
                }
            }

            let event = match applied {
                Applied::Applied(phase) => BrowseEvent::Settled {
                    path: task_path,
                    ticket,
                    phase,
                },
                Applied::Stale => BrowseEvent::Discarded {
                    path: task_path,
                    ticket,
                },
            };
            if let Some(tx) = events {
                if tx.send(event).is_err() {
                    debug!("event receiver dropped");
                }
            }
            applied
        });

        InFlight {
            path,
            ticket,
            cancel,
            handle,
        }
    }

    /// Snapshot of one path's state.
    pub fn state(&self, path: &Path) -> Option<DirectoryState> {
        self.tree.lock().get(path).cloned()
    }

    /// Snapshot of the whole state map.
    pub fn snapshot(&self) -> HashMap<PathBuf, DirectoryState> {
        self.tree.lock().states().clone()
    }

    /// Run `f` against the live store without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&DirectoryTreeStore) -> R) -> R {
        f(&self.tree.lock())
    }

    pub fn visible_rows(&self, root: &Path) -> Vec<VisibleRow> {
        self.tree.lock().visible_rows(root)
    }

    /// Check a typed path without listing it.
    pub async fn validate_path(&self, path: &Path) -> PathValidation {
        let mut validation = self.executor.backend().validate(path).await;
        if !validation.is_risky_path {
            let tier = self.tree.lock().policy().classify_path(path).tier;
            validation.is_risky_path = tier != RiskTier::Normal;
        }
        validation
    }

    // ── Selection ───────────────────────────────────────────────────────────

    pub fn select_file(&mut self, path: &Path, is_selected: bool) {
        self.selection.select_file(path, is_selected);
    }

    pub fn select_folder(&mut self, path: Option<&Path>) {
        self.selection.select_folder(path);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Hand the current selection to `sink`.
    pub fn create_job(&self, sink: &mut dyn JobSink) -> Result<()> {
        let input = self.selection.job_input().ok_or(AppError::EmptySelection)?;
        sink.create_job(input)
    }

    // ── Favorites ───────────────────────────────────────────────────────────

    pub fn add_favorite(&mut self, path: &Path) {
        self.favorites.add(path);
    }

    pub fn remove_favorite(&mut self, path: &Path) {
        self.favorites.remove(path);
    }

    pub fn favorites(&self) -> &[PathBuf] {
        self.favorites.list()
    }
}
