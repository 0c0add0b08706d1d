use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Identifies one browse attempt. Strictly increasing across all paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out tickets and remembers which one is current for each path.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: u64,
    current: HashMap<PathBuf, Ticket>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh ticket and make it the current one for `path`.
    pub fn issue(&mut self, path: &Path) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.current.insert(path.to_path_buf(), ticket);
        debug!(path = %path.display(), %ticket, "issued browse ticket");
        ticket
    }

    /// Whether `ticket` is the last one issued for `path`.
    pub fn is_current(&self, path: &Path, ticket: Ticket) -> bool {
        self.current.get(path) == Some(&ticket)
    }

    pub fn current(&self, path: &Path) -> Option<Ticket> {
        self.current.get(path).copied()
    }

    /// Forget every path's current ticket. The counter keeps running, so
    /// tickets issued before the reset can never become current again.
    pub fn reset(&mut self) {
        self.current.clear();
    }
}
