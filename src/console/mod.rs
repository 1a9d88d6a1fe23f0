//! Console surface
//!
//! Line-oriented stand-in for the room selection and game controls.

pub mod commands;
pub mod handler;
pub mod view;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handler::{handle_command, run_console};
