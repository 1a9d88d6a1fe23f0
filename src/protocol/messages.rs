//! Game payloads and broker destinations
//!
//! Choices are published as JSON objects `{"player": ..., "choice": ...}`
//! to a room-scoped destination; results arrive as plain text on the
//! room's topic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A move in rock-paper-scissors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Rock => "Rock",
            Choice::Paper => "Paper",
            Choice::Scissors => "Scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    /// Case-insensitive; single-letter shorthands are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" | "r" => Ok(Choice::Rock),
            "paper" | "p" => Ok(Choice::Paper),
            "scissors" | "s" => Ok(Choice::Scissors),
            other => Err(format!("unknown choice '{}'", other)),
        }
    }
}

/// Body of the SEND frame carrying a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePayload {
    pub player: String,
    pub choice: Choice,
}

impl ChoicePayload {
    pub fn new(player: impl Into<String>, choice: Choice) -> Self {
        Self {
            player: player.into(),
            choice,
        }
    }
}

/// Topic carrying a room's join notices, move notices and results.
pub fn topic_destination(room: &str) -> String {
    format!("/topic/{}", room)
}

/// Destination a room's moves are published to.
pub fn choice_destination(room: &str) -> String {
    format!("/rooms/{}/choice", room)
}
