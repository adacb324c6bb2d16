//! The intent endpoint
//!
//! One route serves all three intents; the request body's `intent`
//! discriminator selects the dispatcher entry point. Failures follow
//! the protocol's taxonomy: an unresolvable session is a 403 with the
//! `authExpired` envelope, a missing or malformed input is a 400, and
//! device-level failures never surface here at all: the dispatcher
//! absorbs them into the response payload.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use casa_core::models::{IntentInput, IntentRequest, IntentResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /smarthome
pub async fn fulfill(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<IntentRequest>,
) -> Result<Response, ApiError> {
    let request_id = request.request_id;

    // Resolve the session before touching the intent; a dead token
    // means no device work at all.
    let session = match bearer.as_ref() {
        Some(TypedHeader(Authorization(bearer))) => {
            state.sessions().resolve(bearer.token()).await
        }
        None => None,
    };
    let Some(session) = session else {
        return Err(ApiError::AuthExpired { request_id });
    };

    // The protocol sends exactly one input per request.
    let Some(input) = request.inputs.into_iter().next() else {
        return Err(ApiError::BadRequest("missing inputs".to_string()));
    };

    match input {
        IntentInput::Sync => {
            tracing::debug!(request_id = %request_id, "SYNC");
            let payload = state.dispatcher().sync(&session).await?;
            Ok(Json(IntentResponse {
                request_id,
                payload,
            })
            .into_response())
        }
        IntentInput::Query(query) => {
            tracing::debug!(request_id = %request_id, devices = query.devices.len(), "QUERY");
            let payload = state.dispatcher().query(&session, &query.devices).await?;
            Ok(Json(IntentResponse {
                request_id,
                payload,
            })
            .into_response())
        }
        IntentInput::Execute(execute) => {
            tracing::debug!(request_id = %request_id, groups = execute.commands.len(), "EXECUTE");
            let payload = state
                .dispatcher()
                .execute(&session, &execute.commands)
                .await?;
            Ok(Json(IntentResponse {
                request_id,
                payload,
            })
            .into_response())
        }
    }
}
