//! Session result types
//!
//! Defines result structures returned by session operations.

/// Result of creating a room
#[derive(Debug, Clone)]
pub struct CreateRoomResult {
    /// Server's reply, shown verbatim
    pub message: String,
    /// HTTP status of the creation request
    pub status: u16,
    /// Room list fetched right after the request
    pub rooms: Vec<String>,
}
