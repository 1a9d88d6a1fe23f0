//! Error handlers
//!
//! Logging and console wording for errors.

use crate::error::types::{ClientError, SessionError};
use log::{error, warn};

/// Handle a client error
pub fn handle_error(err: &ClientError) {
    error!("RPS client error: {}", err);
}

/// Log a session error at a level matching its cause.
///
/// Precondition failures are the user's doing and only warrant a warning.
pub fn log_session_error(err: &SessionError) {
    match err {
        SessionError::EmptyRoomName | SessionError::InvalidRoomName(_) | SessionError::NoCurrentRoom => {
            warn!("{}", err)
        }
        _ => error!("{}", err),
    }
}

/// Convert a session error to the line shown on the console
pub fn user_message(err: &SessionError) -> String {
    match err {
        SessionError::EmptyRoomName => "Enter a room name first.".to_string(),
        SessionError::InvalidRoomName(reason) => format!("Invalid room name: {}", reason),
        SessionError::NoCurrentRoom => "Join a room before choosing.".to_string(),
        SessionError::NotConnected => "Not connected to the game server.".to_string(),
        SessionError::Control(e) => format!("Server request failed: {}", e),
        SessionError::Broker(e) => format!("Messaging failed: {}", e),
    }
}
