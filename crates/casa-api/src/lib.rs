//! casa-api - Assistant fulfillment HTTP surface
//!
//! Exposes the single `POST /smarthome` intent endpoint over the
//! dispatcher. The layer is collaborator-agnostic: it resolves the
//! inbound bearer token through a [`SessionStore`](casa_core::SessionStore)
//! and hands the session to the dispatcher; it never talks to the
//! gateway itself.
//!
//! # Usage
//!
//! ```ignore
//! use casa_api::{create_router, AppState};
//!
//! let state = AppState::new(sessions, dispatcher);
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the fulfillment router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Intent endpoint
        .route("/smarthome", post(handlers::smarthome::fulfill))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
