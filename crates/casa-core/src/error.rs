//! Common error types for gateway collaborators

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the device gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Device is not known to the gateway
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Device descriptor has no addressable ref for a logical property
    #[error("Device '{device}' has no '{property}' property")]
    PropertyNotFound { device: String, property: String },

    /// Transport/communication error (connection refused, timeout,
    /// non-success HTTP status, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway answered with a value the bridge cannot interpret
    /// (e.g. a non-string color, a non-numeric level)
    #[error("Unexpected value for '{property}': {detail}")]
    UnexpectedValue { property: String, detail: String },

    /// The session's gateway base URL is not a valid URL
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Shorthand for a property the device descriptor does not carry
    pub fn property_not_found(device: &str, property: &str) -> Self {
        Self::PropertyNotFound {
            device: device.to_string(),
            property: property.to_string(),
        }
    }

    /// Shorthand for a value of an unexpected JSON shape
    pub fn unexpected_value(property: &str, detail: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            property: property.to_string(),
            detail: detail.into(),
        }
    }
}
