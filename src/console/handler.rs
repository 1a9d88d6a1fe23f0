//! Console session loop
//!
//! Reads command lines, dispatches them against the [`GameSession`] and
//! writes the responses. New result texts from the joined room are
//! printed as soon as they arrive.

use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::console::commands::{Command, CommandResult, CommandStatus, parse_command};
use crate::console::view::{
    allows, help_text, hidden_reason, render_join, render_result, render_rooms,
};
use crate::error::ClientError;
use crate::error::handlers::{log_session_error, user_message};
use crate::error::SessionError;
use crate::session::GameSession;

/// Runs the console until `quit` or end of input.
pub async fn run_console<R, W>(
    session: &mut GameSession,
    reader: R,
    mut writer: W,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut results = session.results();

    let banner = format!(
        "Playing as {}\n{}{}",
        session.player(),
        render_rooms(session.rooms()),
        help_text(session.view())
    );
    write_out(&mut writer, &banner).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Console input closed");
                    break;
                };

                let command = parse_command(&line);
                debug!("Console command: {:?}", command);
                let result = handle_command(session, command).await;

                if let Some(message) = &result.message {
                    write_out(&mut writer, message).await?;
                }
                if result.status == CommandStatus::Quit {
                    break;
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = results.borrow_and_update().clone();
                if let Some(text) = latest {
                    write_out(&mut writer, &render_result(&text)).await?;
                }
            }
        }
    }

    Ok(())
}

/// Executes one console command against the session.
pub async fn handle_command(session: &mut GameSession, command: Command) -> CommandResult {
    if !allows(session.view(), &command) {
        return CommandResult::failure("Hidden in current view", hidden_reason(session.view()));
    }

    match command {
        Command::List => match session.list_rooms().await {
            Ok(rooms) => CommandResult::success(render_rooms(&rooms)),
            Err(e) => session_failure(e),
        },
        Command::Create(name) => match session.create_room(&name).await {
            Ok(result) => {
                let text = format!("{}\n{}", result.message.trim_end(), render_rooms(&result.rooms));
                if (200..300).contains(&result.status) {
                    CommandResult::success(text)
                } else {
                    CommandResult::failure(format!("HTTP {}", result.status), text)
                }
            }
            Err(e) => session_failure(e),
        },
        Command::Join(name) => match session.join_room(&name).await {
            Ok(outcome) if outcome.is_joined() => {
                CommandResult::success(render_join(name.trim(), &outcome))
            }
            Ok(outcome) => CommandResult::failure(
                format!("{:?}", outcome),
                render_join(name.trim(), &outcome),
            ),
            Err(e) => session_failure(e),
        },
        Command::Choose(choice) => match session.make_choice(choice) {
            Ok(()) => CommandResult::success(format!("You chose {}.\n", choice)),
            Err(e) => session_failure(e),
        },
        Command::Leave => match session.leave_room() {
            Some(room) => CommandResult::success(format!(
                "Left room {}.\n{}{}",
                room,
                render_rooms(session.rooms()),
                help_text(session.view())
            )),
            None => CommandResult::failure("Not in a room", "You are not in a room.\n"),
        },
        Command::WhoAmI => CommandResult::success(format!("You are {}.\n", session.player())),
        Command::Help => CommandResult::success(help_text(session.view())),
        Command::Quit => CommandResult {
            status: CommandStatus::Quit,
            message: Some("Bye.\n".to_string()),
        },
        Command::Unknown(input) if input.is_empty() => CommandResult::silent(),
        Command::Unknown(input) => CommandResult::failure(
            "Unknown command",
            format!("Unknown command '{}'. Type 'help'.\n", input),
        ),
    }
}

fn session_failure(err: SessionError) -> CommandResult {
    log_session_error(&err);
    CommandResult::failure(err.to_string(), format!("{}\n", user_message(&err)))
}

async fn write_out<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<(), ClientError> {
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
