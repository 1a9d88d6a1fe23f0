pub mod broker;
pub mod config;
pub mod console;
pub mod control;
pub mod error;
pub mod protocol;
pub mod session;
pub mod utils;

pub use session::GameSession;
