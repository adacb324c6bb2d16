//! casa-gateway-client - REST client for the device gateway
//!
//! Implements the [`DeviceGateway`](casa_core::DeviceGateway) trait over
//! the gateway's things API: `GET /things` for listings and GET/PUT on
//! each property's href for state. The client instance is shared across
//! sessions; the gateway base URL and bearer token come from the
//! per-call [`Session`](casa_core::Session).

pub mod client;

pub use client::GatewayClient;
