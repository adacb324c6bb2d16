//! Collaborator traits consumed by the bridge
//!
//! The translator and dispatcher are written entirely against these
//! contracts. Concrete implementations (the reqwest gateway client, the
//! config-backed session table) live in their own crates; tests provide
//! scripted in-memory implementations.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayResult;
use crate::models::{GatewayDevice, StateSnapshot};
use crate::session::Session;

/// Access to the device gateway's REST surface.
///
/// Every method takes the [`Session`] explicitly: authentication is
/// per-call state, never ambient client state, so concurrent requests
/// for different accounts can share one implementation instance.
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// List the devices visible to the session, optionally restricted
    /// to the given device ids. Devices the gateway does not report
    /// are simply absent from the result.
    async fn list_devices(
        &self,
        session: &Session,
        filter: Option<&[String]>,
    ) -> GatewayResult<Vec<GatewayDevice>>;

    /// Read the current value of one named device property.
    async fn read_property(
        &self,
        session: &Session,
        device: &GatewayDevice,
        name: &str,
    ) -> GatewayResult<Value>;

    /// Write a device property and return the resulting value.
    async fn write_property(
        &self,
        session: &Session,
        device: &GatewayDevice,
        name: &str,
        value: Value,
    ) -> GatewayResult<Value>;
}

/// Resolution of inbound bearer tokens to client sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve a token to its session, or `None` if the token is
    /// unknown or expired (reported upstream as an auth error).
    async fn resolve(&self, token: &str) -> Option<Session>;
}

/// Best-effort sink for post-execute state change notifications.
///
/// The dispatcher reports through this on a detached task and never
/// awaits it on the request path; errors are logged and swallowed.
#[async_trait]
pub trait StateReporter: Send + Sync {
    async fn report_state(
        &self,
        agent_user_id: &str,
        device_id: &str,
        state: &StateSnapshot,
    ) -> Result<(), String>;
}
