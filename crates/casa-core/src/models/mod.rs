//! Wire models for both sides of the bridge

pub mod capability;
pub mod device;
pub mod intent;
pub mod state;

pub use capability::*;
pub use device::*;
pub use intent::*;
pub use state::*;
