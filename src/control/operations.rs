//! Control-plane operations
//!
//! | Operation   | Method | Path                       | Body          |
//! |-------------|--------|----------------------------|---------------|
//! | List rooms  | GET    | `/game/rooms`              | -             |
//! | Create room | POST   | `/game/rooms`              | `name=<v>`    |
//! | Join room   | POST   | `/game/rooms/{room}/join`  | `player=<v>`  |

use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};

use crate::config::ControlConfig;
use crate::control::results::{CreateRoomResponse, JoinOutcome};
use crate::error::ControlError;

/// Text the game server answers with, under a success status, when a join
/// is refused.
const JOIN_REFUSED_TEXT: &str = "Room is full or does not exist.";

/// HTTP client bound to one game server.
#[derive(Debug, Clone)]
pub struct ControlPlane {
    http: Client,
    base_url: Url,
}

impl ControlPlane {
    pub fn new(config: &ControlConfig) -> Result<Self, ControlError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ControlError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ControlError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ControlError::Transport)?;

        Ok(Self { http, base_url })
    }

    /// Fetches the current room names, in server order.
    pub async fn list_rooms(&self) -> Result<Vec<String>, ControlError> {
        let url = self.endpoint(&["game", "rooms"])?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ControlError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Room listing failed with status {}", status);
            return Err(ControlError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let rooms = response
            .json::<Vec<String>>()
            .await
            .map_err(ControlError::Decode)?;
        debug!("Server reports {} room(s)", rooms.len());
        Ok(rooms)
    }

    /// Asks the server to create `name`. The reply text is returned as-is.
    pub async fn create_room(&self, name: &str) -> Result<CreateRoomResponse, ControlError> {
        let url = self.endpoint(&["game", "rooms"])?;
        debug!("POST {} name={}", url, name);

        let response = self
            .http
            .post(url)
            .form(&[("name", name)])
            .send()
            .await
            .map_err(ControlError::Transport)?;

        let status = response.status().as_u16();
        let message = response.text().await.map_err(ControlError::Transport)?;
        info!("Create room '{}' answered {}: {}", name, status, message);

        Ok(CreateRoomResponse { status, message })
    }

    /// Asks the server to seat `player` in `room`.
    pub async fn join_room(&self, room: &str, player: &str) -> Result<JoinOutcome, ControlError> {
        let url = self.endpoint(&["game", "rooms", room, "join"])?;
        debug!("POST {} player={}", url, player);

        let response = self
            .http
            .post(url)
            .form(&[("player", player)])
            .send()
            .await
            .map_err(ControlError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ControlError::Transport)?;
        let outcome = classify_join(status, body);
        info!("Join room '{}' as {}: {:?}", room, player, outcome);

        Ok(outcome)
    }

    /// Resolves path segments against the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ControlError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ControlError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Maps a join response onto a structured outcome.
pub fn classify_join(status: StatusCode, body: String) -> JoinOutcome {
    match status {
        StatusCode::NOT_FOUND => JoinOutcome::RoomNotFound,
        StatusCode::CONFLICT => JoinOutcome::RoomFull,
        s if !s.is_success() => JoinOutcome::Rejected {
            status: s.as_u16(),
            message: body,
        },
        s if body.trim() == JOIN_REFUSED_TEXT => JoinOutcome::Rejected {
            status: s.as_u16(),
            message: body,
        },
        _ => JoinOutcome::Joined { message: body },
    }
}
