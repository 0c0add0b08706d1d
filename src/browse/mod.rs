//! The asynchronous directory-listing engine.

pub mod executor;
pub mod sequencer;
pub mod state;
pub mod store;
