//! casad - casa bridge daemon
//!
//! Serves the assistant fulfillment endpoint and forwards device
//! operations to the configured WebThings-style gateway.
//!
//! Usage:
//!   casad <config.toml>
//!
//! The config file maps inbound bearer tokens to gateways; see
//! `config.rs` for the format.

mod config;
mod sessions;

use std::net::SocketAddr;
use std::sync::Arc;

use casa_api::{create_router, AppState};
use casa_bridge::IntentDispatcher;
use casa_gateway_client::GatewayClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::sessions::StaticSessionStore;

fn print_help() {
    eprintln!(
        r#"casad - casa bridge daemon

Usage: casad <config.toml>

The config file carries the server port, gateway client timeouts and
the static token-to-gateway session table:

  [server]
  port = 8085

  [[session]]
  token = "long-lived-bearer-token"
  gateway = "https://gateway.local"
  user_id = "household-1"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "casad=info,casa_api=info,casa_bridge=info,casa_gateway_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = match std::env::args().nth(1) {
        Some(arg) if arg == "--help" || arg == "-h" => {
            print_help();
            return Ok(());
        }
        Some(arg) => arg,
        None => {
            print_help();
            anyhow::bail!("missing config file argument");
        }
    };

    tracing::info!("Starting casad (casa bridge daemon)");

    let config = Config::load(&path)?;
    tracing::info!(
        sessions = config.sessions.len(),
        "Loaded config from {path}"
    );

    let gateway = Arc::new(GatewayClient::with_config(
        config.request_timeout(),
        config.connect_timeout(),
    )?);
    let dispatcher = Arc::new(IntentDispatcher::new(gateway));
    let sessions = Arc::new(StaticSessionStore::from_config(&config.sessions));

    let state = AppState::new(sessions, dispatcher);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
