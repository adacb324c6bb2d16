//! casa-core - Core traits and types for the casa smart-home bridge
//!
//! This crate provides the fundamental abstractions shared by the bridge:
//! the wire models of both protocols (the assistant's intent envelope and
//! the gateway's thing descriptors), the collaborator traits the bridge is
//! built against, and the common error taxonomy.

pub mod error;
pub mod models;
pub mod property;
pub mod session;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use models::*;
pub use session::Session;
pub use traits::{DeviceGateway, SessionStore, StateReporter};
