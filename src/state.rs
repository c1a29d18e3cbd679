use std::sync::Arc;

use crate::ws::BroadcastRegistry;

/// Shared application state passed to all handlers via axum State
/// extractor. The registry is constructed exactly once at startup and
/// injected here; nothing reaches it through a global.
#[derive(Clone)]
pub struct AppState {
    /// Active broadcast group membership.
    pub registry: Arc<BroadcastRegistry>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(BroadcastRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
