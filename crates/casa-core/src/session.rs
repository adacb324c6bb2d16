//! Authenticated client session context
//!
//! A `Session` binds one inbound assistant request to one gateway: the
//! gateway's base URL, the bearer token it accepts, and the stable
//! account identifier reported back to the assistant. It is resolved
//! once per request and then passed immutably through every collaborator
//! call; there is no shared mutable request configuration.

use serde::{Deserialize, Serialize};

/// Per-request client context resolved from the inbound token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Base URL of the device gateway (e.g. "https://gateway.local")
    pub gateway: String,
    /// Bearer token the gateway accepts for this client
    pub token: String,
    /// Stable per-client account identifier echoed in SYNC responses
    pub agent_user_id: String,
}

impl Session {
    pub fn new(
        gateway: impl Into<String>,
        token: impl Into<String>,
        agent_user_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway: gateway.into(),
            token: token.into(),
            agent_user_id: agent_user_id.into(),
        }
    }
}
