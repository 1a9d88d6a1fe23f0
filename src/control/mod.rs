//! Control-plane client
//!
//! Room lifecycle requests (list, create, join) against the game server's
//! HTTP interface.

pub mod operations;
pub mod results;

pub use operations::{ControlPlane, classify_join};
pub use results::{CreateRoomResponse, JoinOutcome};
