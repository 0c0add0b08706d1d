//! Asynchronous directory browsing for remote and local volumes.
//!
//! A [`Browser`] expands directories one level at a time against a
//! [`ListingBackend`], bounding every listing by a timeout picked from the
//! path's risk tier. Slow or unreachable volumes settle into a timeout state
//! instead of blocking the tree, and late responses for superseded requests
//! are discarded.

pub mod app;
pub mod browse;
pub mod config;
pub mod error;
pub mod event;
pub mod favorites;
pub mod fs;
pub mod selection;

pub use app::{Browser, InFlight, Toggle};
pub use browse::state::{DirectoryState, Phase};
pub use browse::store::{Applied, DirectoryTreeStore, VisibleRow};
pub use config::BrowserConfig;
pub use error::{AppError, BrowseError, Result};
pub use event::{BrowseEvent, EventReceiver};
pub use fs::backend::{ListingBackend, LocalBackend};
pub use fs::entry::{DirectoryEntry, EntryKind, ListResponse, PathValidation};
pub use fs::risk::{RiskPolicy, RiskTier};
pub use selection::{JobInput, JobSink, SelectionController};
