//! API error types and conversions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use casa_core::GatewayError;
use serde::Serialize;
use serde_json::json;

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 403 with the protocol's `authExpired` envelope; the intent is
    /// never processed
    AuthExpired { request_id: String },
    /// 400 Bad Request (missing inputs, malformed params)
    BadRequest(String),
    /// 502 Bad Gateway (the gateway answered something the bridge
    /// cannot interpret)
    BadGateway(String),
    /// 503 Service Unavailable (the gateway could not be reached)
    ServiceUnavailable(String),
    /// 500 Internal Server Error
    Internal(String),
}

/// Standard error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Auth errors use the assistant protocol's own envelope shape
        if let ApiError::AuthExpired { request_id } = self {
            tracing::debug!(request_id = %request_id, "no session for inbound token");

            let body = Json(json!({
                "requestId": request_id,
                "payload": { "errorCode": "authExpired" }
            }));

            return (StatusCode::FORBIDDEN, body).into_response();
        }

        let (status, error_type, message) = match self {
            ApiError::AuthExpired { .. } => unreachable!(), // Handled above
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        // Log errors at appropriate levels
        if status.is_server_error() {
            tracing::error!(error = error_type, %message, "API error");
        } else {
            tracing::debug!(error = error_type, %message, "API client error");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => ApiError::ServiceUnavailable(msg),
            GatewayError::InvalidUrl(msg) => ApiError::Internal(msg),
            err @ (GatewayError::DeviceNotFound(_)
            | GatewayError::PropertyNotFound { .. }
            | GatewayError::UnexpectedValue { .. }) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<casa_bridge::Error> for ApiError {
    fn from(err: casa_bridge::Error) -> Self {
        match err {
            casa_bridge::Error::Gateway(err) => err.into(),
            casa_bridge::Error::InvalidParams(msg) => ApiError::BadRequest(msg),
        }
    }
}
