//! casa-bridge - Protocol translation between the assistant and the gateway
//!
//! Two layers, consumed in dependency order:
//!
//! - [`translator`] - pure mapping logic: gateway device descriptors to
//!   assistant capability descriptors, and per-trait state translation
//!   in both directions. Its only I/O is the property read/write
//!   primitives it is handed.
//! - [`dispatcher`] - the three protocol intents (SYNC, QUERY, EXECUTE)
//!   as orchestration over one or many devices, aggregating partial
//!   failures into the response envelope.
//!
//! Both layers are written against the collaborator traits in
//! `casa-core`; nothing here knows about HTTP.

use thiserror::Error;

pub mod color;
pub mod dispatcher;
pub mod testing;
pub mod translator;

pub use dispatcher::IntentDispatcher;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Request-scoped gateway failure (device listing could not be
    /// fetched). Device-scoped failures never surface here; they are
    /// absorbed as offline snapshots.
    #[error(transparent)]
    Gateway(#[from] casa_core::GatewayError),

    /// An execute group's merged params did not decode to a known
    /// change set shape
    #[error("invalid execution params: {0}")]
    InvalidParams(String),
}
