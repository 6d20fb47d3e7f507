//! Shared application state.

use std::sync::Arc;

use questline_core::clock::Clock;
use questline_core::repository::RecordStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp quest acceptance.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Record store backing characters, quests, and queues.
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, store: Arc<dyn RecordStore>) -> Self {
        Self { clock, store }
    }
}
