//! Static token-to-gateway session table
//!
//! The daemon's [`SessionStore`] is the config file: a fixed set of
//! long-lived tokens, each bound to one gateway. Anything beyond that
//! (token issuance, refresh, persistence) belongs to an external
//! authorization service, not the bridge.

use std::collections::HashMap;

use async_trait::async_trait;
use casa_core::{Session, SessionStore};

use crate::config::SessionConfig;

pub struct StaticSessionStore {
    sessions: HashMap<String, Session>,
}

impl StaticSessionStore {
    pub fn from_config(entries: &[SessionConfig]) -> Self {
        let sessions = entries
            .iter()
            .map(|entry| {
                let user_id = entry
                    .user_id
                    .clone()
                    .unwrap_or_else(|| entry.gateway.clone());
                (
                    entry.token.clone(),
                    Session::new(entry.gateway.clone(), entry.token.clone(), user_id),
                )
            })
            .collect();

        Self { sessions }
    }
}

#[async_trait]
impl SessionStore for StaticSessionStore {
    async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StaticSessionStore {
        StaticSessionStore::from_config(&[
            SessionConfig {
                token: "tok-1".to_string(),
                gateway: "http://gw-1.local".to_string(),
                user_id: Some("household-1".to_string()),
            },
            SessionConfig {
                token: "tok-2".to_string(),
                gateway: "http://gw-2.local".to_string(),
                user_id: None,
            },
        ])
    }

    #[tokio::test]
    async fn resolves_known_tokens() {
        let session = store().resolve("tok-1").await.unwrap();
        assert_eq!(session.gateway, "http://gw-1.local");
        assert_eq!(session.agent_user_id, "household-1");
    }

    #[tokio::test]
    async fn user_id_defaults_to_the_gateway_url() {
        let session = store().resolve("tok-2").await.unwrap();
        assert_eq!(session.agent_user_id, "http://gw-2.local");
    }

    #[tokio::test]
    async fn unknown_tokens_resolve_to_none() {
        assert!(store().resolve("nope").await.is_none());
    }
}
