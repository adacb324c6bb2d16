//! Gateway HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use casa_core::{DeviceGateway, GatewayDevice, GatewayError, GatewayResult, Session};
use reqwest::{header, Client, Response};
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the gateway's things API.
///
/// One instance serves every session: the connection pool is shared,
/// while base URL and bearer token are taken from the [`Session`]
/// passed to each call.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
}

impl GatewayClient {
    /// Create a client with default timeouts
    pub fn new() -> GatewayResult<Self> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with custom request/connect timeouts
    pub fn with_config(timeout: Duration, connect_timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(transport)?;

        Ok(Self { client })
    }

    /// Resolve a gateway-relative href against the session's base URL.
    ///
    /// Hrefs are concatenated, not joined: a gateway mounted under a
    /// path prefix keeps that prefix.
    fn url(session: &Session, href: &str) -> GatewayResult<Url> {
        let joined = format!("{}{}", session.gateway.trim_end_matches('/'), href);
        Url::parse(&joined).map_err(|err| GatewayError::InvalidUrl(format!("{joined}: {err}")))
    }

    fn property_url(
        session: &Session,
        device: &GatewayDevice,
        name: &str,
    ) -> GatewayResult<Url> {
        let href = device
            .property_href(name)
            .ok_or_else(|| GatewayError::property_not_found(device.id(), name))?;
        Self::url(session, href)
    }

    async fn read_json(response: Response) -> GatewayResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "gateway answered {status}"
            )));
        }
        response.json().await.map_err(transport)
    }

    /// Pull the named field out of a property response body.
    fn property_field(value: Value, name: &str) -> GatewayResult<Value> {
        match value {
            Value::Object(mut map) => map.remove(name).ok_or_else(|| {
                GatewayError::unexpected_value(name, "field missing from property response")
            }),
            other => Err(GatewayError::unexpected_value(
                name,
                format!("expected object, got {other}"),
            )),
        }
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

#[async_trait]
impl DeviceGateway for GatewayClient {
    #[instrument(skip(self, session, filter))]
    async fn list_devices(
        &self,
        session: &Session,
        filter: Option<&[String]>,
    ) -> GatewayResult<Vec<GatewayDevice>> {
        let url = Self::url(session, "/things")?;
        debug!(%url, "listing devices");

        let response = self
            .client
            .get(url)
            .bearer_auth(&session.token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let value = Self::read_json(response).await?;
        let devices: Vec<GatewayDevice> = serde_json::from_value(value)
            .map_err(|err| GatewayError::unexpected_value("things", err.to_string()))?;

        // The gateway has no server-side filter; restrict locally.
        Ok(match filter {
            Some(ids) => devices
                .into_iter()
                .filter(|device| ids.iter().any(|id| id == device.id()))
                .collect(),
            None => devices,
        })
    }

    #[instrument(skip(self, session, device), fields(device = device.id()))]
    async fn read_property(
        &self,
        session: &Session,
        device: &GatewayDevice,
        name: &str,
    ) -> GatewayResult<Value> {
        let url = Self::property_url(session, device, name)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&session.token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let value = Self::read_json(response).await?;
        Self::property_field(value, name)
    }

    #[instrument(skip(self, session, device, value), fields(device = device.id()))]
    async fn write_property(
        &self,
        session: &Session,
        device: &GatewayDevice,
        name: &str,
        value: Value,
    ) -> GatewayResult<Value> {
        let url = Self::property_url(session, device, name)?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&session.token)
            .header(header::ACCEPT, "application/json")
            .json(&json!({ name: value }))
            .send()
            .await
            .map_err(transport)?;

        let value = Self::read_json(response).await?;
        Self::property_field(value, name)
    }
}
