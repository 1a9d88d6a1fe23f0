//! Input validation utilities
//!
//! Room names end up in a URL path segment and in STOMP destinations.

use crate::error::SessionError;

/// Validates a room name and returns it without surrounding whitespace.
pub fn validate_room_name(input: &str, max_length: usize) -> Result<&str, SessionError> {
    let name = input.trim();

    if name.is_empty() {
        return Err(SessionError::EmptyRoomName);
    }

    if name.chars().count() > max_length {
        return Err(SessionError::InvalidRoomName(format!(
            "longer than {} characters",
            max_length
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(SessionError::InvalidRoomName(
            "contains control characters".into(),
        ));
    }

    // A slash would move the room's topic and choice destinations
    if name.contains('/') {
        return Err(SessionError::InvalidRoomName("contains '/'".into()));
    }

    Ok(name)
}
