//! End-to-end test fixtures for the casa bridge
//!
//! [`MockGateway`] is an in-process HTTP server speaking the gateway's
//! things API over a scriptable in-memory store. [`TestStack`] wires a
//! mock gateway to the real client, dispatcher and router, so tests
//! exercise the full request path the way the daemon runs it.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use casa_api::{create_router, AppState};
use casa_bridge::testing::RecordingReporter;
use casa_bridge::IntentDispatcher;
use casa_core::{Session, SessionStore};
use casa_gateway_client::GatewayClient;
use parking_lot::Mutex;
use serde_json::{json, Value};

/// The one token the test stack's session store accepts
pub const DEMO_TOKEN: &str = "demo-token";

type PropertyKey = (String, String);

#[derive(Clone, Default)]
struct GatewayState {
    things: Arc<Mutex<Vec<Value>>>,
    values: Arc<Mutex<HashMap<PropertyKey, Value>>>,
    failing: Arc<Mutex<HashSet<PropertyKey>>>,
}

/// In-process mock of the gateway's things API
pub struct MockGateway {
    pub addr: SocketAddr,
    state: GatewayState,
}

impl MockGateway {
    pub async fn start() -> Self {
        let state = GatewayState::default();

        let app = Router::new()
            .route("/things", get(list_things))
            .route(
                "/things/{thing_id}/properties/{property}",
                get(read_property).put(write_property),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_thing(&self, thing: Value) {
        self.state.things.lock().push(thing);
    }

    pub fn set_value(&self, thing_id: &str, property: &str, value: Value) {
        self.state
            .values
            .lock()
            .insert((thing_id.to_string(), property.to_string()), value);
    }

    /// Current stored value of a property, if any write/seed happened
    pub fn value(&self, thing_id: &str, property: &str) -> Option<Value> {
        self.state
            .values
            .lock()
            .get(&(thing_id.to_string(), property.to_string()))
            .cloned()
    }

    /// Make reads and writes of this property answer 500
    pub fn fail_property(&self, thing_id: &str, property: &str) {
        self.state
            .failing
            .lock()
            .insert((thing_id.to_string(), property.to_string()));
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {DEMO_TOKEN}");
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

async fn list_things(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(Value::Array(state.things.lock().clone())))
}

async fn read_property(
    State(state): State<GatewayState>,
    Path((thing_id, property)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let key = (thing_id, property);
    if state.failing.lock().contains(&key) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match state.values.lock().get(&key) {
        Some(value) => Ok(Json(json!({ key.1: value }))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn write_property(
    State(state): State<GatewayState>,
    Path((thing_id, property)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let key = (thing_id, property);
    if state.failing.lock().contains(&key) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let value = body.get(&key.1).cloned().ok_or(StatusCode::BAD_REQUEST)?;
    state.values.lock().insert(key.clone(), value.clone());
    Ok(Json(json!({ key.1: value })))
}

/// Build a thing descriptor in the gateway's wire shape
pub fn thing(id: &str, kind: &str, properties: &[&str]) -> Value {
    let refs: serde_json::Map<String, Value> = properties
        .iter()
        .map(|name| {
            (
                name.to_string(),
                json!({ "href": format!("/things/{id}/properties/{name}") }),
            )
        })
        .collect();

    json!({
        "name": format!("{id} device"),
        "type": kind,
        "href": format!("/things/{id}"),
        "properties": refs
    })
}

struct FixedSessions {
    session: Session,
}

#[async_trait]
impl SessionStore for FixedSessions {
    async fn resolve(&self, token: &str) -> Option<Session> {
        (token == self.session.token).then(|| self.session.clone())
    }
}

/// Mock gateway + real client + real dispatcher + real router
pub struct TestStack {
    pub gateway: MockGateway,
    pub reporter: Arc<RecordingReporter>,
    pub http: reqwest::Client,
    base_url: String,
}

impl TestStack {
    pub async fn start() -> Self {
        let gateway = MockGateway::start().await;

        let session = Session::new(gateway.base_url(), DEMO_TOKEN, "agent-demo");
        let sessions = Arc::new(FixedSessions { session });

        let client = Arc::new(GatewayClient::new().unwrap());
        let reporter = Arc::new(RecordingReporter::new());
        let dispatcher =
            Arc::new(IntentDispatcher::new(client).with_reporter(reporter.clone()));

        let app = create_router(AppState::new(sessions, dispatcher));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            gateway,
            reporter,
            http: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST an intent request with the demo bearer token
    pub async fn intent(&self, body: &Value) -> reqwest::Response {
        self.intent_with_token(Some(DEMO_TOKEN), body).await
    }

    /// POST an intent request with an arbitrary (or no) bearer token
    pub async fn intent_with_token(&self, token: Option<&str>, body: &Value) -> reqwest::Response {
        let mut request = self.http.post(self.url("/smarthome")).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.unwrap()
    }
}
