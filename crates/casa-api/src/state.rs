//! Application state for the fulfillment API

use std::sync::Arc;

use casa_bridge::IntentDispatcher;
use casa_core::SessionStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Token-to-session resolution
    sessions: Arc<dyn SessionStore>,
    /// Intent orchestration over the gateway
    dispatcher: Arc<IntentDispatcher>,
}

impl AppState {
    pub fn new(sessions: Arc<dyn SessionStore>, dispatcher: Arc<IntentDispatcher>) -> Self {
        Self {
            sessions,
            dispatcher,
        }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn dispatcher(&self) -> &IntentDispatcher {
        &self.dispatcher
    }
}
