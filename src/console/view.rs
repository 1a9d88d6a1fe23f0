//! Console rendering
//!
//! Text versions of the room list, the room status line and the result
//! region, plus which commands each view offers.

use crate::console::commands::Command;
use crate::control::JoinOutcome;
use crate::session::View;

/// Room creation and joining are only offered during room selection,
/// choices only inside a room.
pub fn allows(view: View, command: &Command) -> bool {
    match command {
        Command::Create(_) | Command::Join(_) => view == View::RoomSelection,
        Command::Choose(_) => view == View::InGame,
        _ => true,
    }
}

/// Explains why a command is not offered in `view`.
pub fn hidden_reason(view: View) -> &'static str {
    match view {
        View::RoomSelection => "Join a room before choosing.\n",
        View::InGame => "Leave the current room before creating or joining another.\n",
    }
}

pub fn render_rooms(rooms: &[String]) -> String {
    if rooms.is_empty() {
        return "Rooms: (none)\n".to_string();
    }
    let mut out = String::from("Rooms:\n");
    for room in rooms {
        out.push_str("  - ");
        out.push_str(room);
        out.push('\n');
    }
    out
}

pub fn render_status(room: Option<&str>) -> String {
    match room {
        Some(room) => format!("Room: {}\n", room),
        None => "Room: -\n".to_string(),
    }
}

pub fn render_result(result: &str) -> String {
    format!(">> {}\n", result)
}

pub fn render_join(room: &str, outcome: &JoinOutcome) -> String {
    match outcome {
        JoinOutcome::Joined { .. } => format!(
            "{}Choose: rock | paper | scissors (or leave)\n",
            render_status(Some(room))
        ),
        JoinOutcome::RoomNotFound => format!("Room '{}' does not exist.\n", room),
        JoinOutcome::RoomFull => format!("Room '{}' is full.\n", room),
        JoinOutcome::Rejected { message, .. } => format!("Could not join '{}': {}\n", room, message),
    }
}

pub fn help_text(view: View) -> &'static str {
    match view {
        View::RoomSelection => {
            "Commands: list | create <room> | join <room> | whoami | help | quit\n"
        }
        View::InGame => "Commands: rock | paper | scissors | leave | list | whoami | help | quit\n",
    }
}
