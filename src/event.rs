use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::browse::sequencer::Ticket;
use crate::browse::state::Phase;

/// Notifications the engine sends to an embedding UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEvent {
    /// A current outcome was folded into the path's state.
    Settled {
        path: PathBuf,
        ticket: Ticket,
        phase: Phase,
    },
    /// An outcome arrived for a superseded ticket and was dropped.
    Discarded { path: PathBuf, ticket: Ticket },
}

impl BrowseEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            BrowseEvent::Settled { path, .. } | BrowseEvent::Discarded { path, .. } => path,
        }
    }
}

/// Receiving side of the engine's event stream.
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<BrowseEvent>,
    tx: mpsc::UnboundedSender<BrowseEvent>,
}

impl Default for EventReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReceiver {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx, tx }
    }

    /// Get a sender clone to hand to the engine.
    pub fn sender(&self) -> mpsc::UnboundedSender<BrowseEvent> {
        self.tx.clone()
    }

    /// Receive the next event. Never yields `None` while `self` is alive,
    /// since it holds a sender.
    pub async fn next(&mut self) -> Option<BrowseEvent> {
        self.rx.recv().await
    }

    /// Drain whatever is queued without waiting.
    pub fn drain(&mut self) -> Vec<BrowseEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
