//! Control-plane result types
//!
//! Defines result structures returned by control-plane operations.

/// Response to a room creation request.
///
/// The server answers with free text whether or not the room was created;
/// the text is kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoomResponse {
    pub status: u16,
    pub message: String,
}

/// Outcome of a join request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { message: String },
    RoomNotFound,
    RoomFull,
    /// Refused for a reason the server did not make structured.
    Rejected { status: u16, message: String },
}

impl JoinOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, JoinOutcome::Joined { .. })
    }
}
