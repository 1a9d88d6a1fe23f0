//! Module `state`
//!
//! Defines `SessionState`, the client-side view of one game session:
//! who we are, which room we are in and what the room list last looked like.

use crate::session::identity::PlayerIdentity;

/// Which set of controls the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Room list with create/join controls
    RoomSelection,
    /// Rock/paper/scissors controls for the current room
    InGame,
}

/// Represents the state of a game session.
#[derive(Debug, Clone)]
pub struct SessionState {
    player: PlayerIdentity,
    current_room: Option<String>,
    rooms: Vec<String>,
    view: View,
}

impl SessionState {
    pub fn new(player: PlayerIdentity) -> Self {
        Self {
            player,
            current_room: None,
            rooms: Vec::new(),
            view: View::RoomSelection,
        }
    }

    /// Clears the current room and returns to room selection.
    ///
    /// The identity and the last room list are kept.
    pub fn leave(&mut self) {
        self.current_room = None;
        self.view = View::RoomSelection;
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn player(&self) -> &PlayerIdentity {
        &self.player
    }

    /// Returns the room joined last, if any.
    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    /// Returns the room list as of the latest listing response.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn view(&self) -> View {
        self.view
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Replaces the room list wholesale.
    pub fn set_rooms(&mut self, rooms: Vec<String>) {
        self.rooms = rooms;
    }

    /// Records a successful join and switches to the in-game controls.
    pub fn enter_room(&mut self, room: String) {
        self.current_room = Some(room);
        self.view = View::InGame;
    }
}
