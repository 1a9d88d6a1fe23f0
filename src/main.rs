//! RPS Room Client - Entry Point
//!
//! Terminal client for a rock-paper-scissors room server.

use log::info;
use std::process::ExitCode;
use tokio::io::BufReader;

use rps_room_client::config::ClientConfig;
use rps_room_client::console::run_console;
use rps_room_client::error::ClientError;
use rps_room_client::error::handlers::handle_error;
use rps_room_client::session::GameSession;
use rps_room_client::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    info!("Launching RPS room client...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ClientError> {
    let config = ClientConfig::load()?;
    let mut session = GameSession::new(config)?;

    let rooms = session.connect().await?;
    info!(
        "Connected as {} ({} room(s) open)",
        session.player(),
        rooms.len()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let outcome = run_console(&mut session, stdin, tokio::io::stdout()).await;

    session.disconnect().await;
    outcome
}
