//! Game session
//!
//! The session context object tying the control-plane and the broker
//! together for one player.

pub mod client;
pub mod identity;
pub mod results;
pub mod state;

pub use client::GameSession;
pub use identity::PlayerIdentity;
pub use results::CreateRoomResult;
pub use state::{SessionState, View};
