//! Module `commands`
//!
//! Parses console input lines into [`Command`]s and defines the result
//! returned by command handlers.

use crate::protocol::Choice;

/// A console command typed by the user.
///
/// `Create` and `Join` carry whatever followed the keyword, possibly
/// nothing; the session decides whether the name is usable.
#[derive(Debug, PartialEq)]
pub enum Command {
    List,
    Create(String),
    Join(String),
    Choose(Choice),
    Leave,
    WhoAmI,
    Help,
    Quit,
    Unknown(String),
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    Quit,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn failure(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }
}

/// Parses a raw input line into the `Command` enum.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "list" | "rooms" | "ls" => Command::List,
        "create" => Command::Create(arg.to_string()),
        "join" => Command::Join(arg.to_string()),
        "leave" => Command::Leave,
        "whoami" => Command::WhoAmI,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => match other.parse::<Choice>() {
            Ok(choice) => Command::Choose(choice),
            Err(_) => Command::Unknown(trimmed.to_string()),
        },
    }
}
