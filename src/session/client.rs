//! Module `client`
//!
//! [`GameSession`] bridges user actions to the two channels of the game
//! server: room lifecycle requests on the HTTP control-plane and moves and
//! results on the STOMP data-plane. All session state lives in the value
//! itself, so independent sessions can run side by side.

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::broker::{BrokerConnection, StompMessage, Subscription};
use crate::config::ClientConfig;
use crate::control::{ControlPlane, JoinOutcome};
use crate::error::SessionError;
use crate::protocol::{Choice, ChoicePayload, choice_destination, topic_destination};
use crate::session::identity::PlayerIdentity;
use crate::session::results::CreateRoomResult;
use crate::session::state::{SessionState, View};
use crate::utils::validation::validate_room_name;

/// The joined room's topic subscription and the task copying its messages
/// into the result cell. Dropping it releases both.
struct ActiveRoom {
    name: String,
    subscription: Subscription,
    forwarder: JoinHandle<()>,
}

impl Drop for ActiveRoom {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// One player's session against a game server.
pub struct GameSession {
    config: ClientConfig,
    control: ControlPlane,
    broker: Option<BrokerConnection>,
    state: SessionState,
    active_room: Option<ActiveRoom>,
    results: Arc<watch::Sender<Option<String>>>,
}

impl GameSession {
    /// Builds a session with a freshly chosen identity. Nothing is contacted
    /// until [`GameSession::connect`].
    pub fn new(config: ClientConfig) -> Result<Self, SessionError> {
        let player = PlayerIdentity::from_config(&config.player);
        Self::with_identity(config, player)
    }

    pub fn with_identity(config: ClientConfig, player: PlayerIdentity) -> Result<Self, SessionError> {
        let control = ControlPlane::new(&config.control)?;
        let (results, _) = watch::channel(None);
        info!("Session identity: {}", player);

        Ok(Self {
            config,
            control,
            broker: None,
            state: SessionState::new(player),
            active_room: None,
            results: Arc::new(results),
        })
    }

    /// Establishes the broker connection, then refreshes the room list.
    ///
    /// A session already holding a live connection only refreshes.
    pub async fn connect(&mut self) -> Result<Vec<String>, SessionError> {
        if !self.is_connected() {
            let broker = BrokerConnection::connect(&self.config.broker).await?;
            self.broker = Some(broker);
        }
        self.list_rooms().await
    }

    /// Replaces the stored room list with the server's current one.
    pub async fn list_rooms(&mut self) -> Result<Vec<String>, SessionError> {
        let rooms = self.control.list_rooms().await?;
        self.state.set_rooms(rooms);
        Ok(self.state.rooms().to_vec())
    }

    /// Requests a new room and refreshes the room list whatever the server
    /// answered.
    pub async fn create_room(&mut self, name: &str) -> Result<CreateRoomResult, SessionError> {
        let name = validate_room_name(name, self.config.console.max_room_name_length)?;
        let response = self.control.create_room(name).await?;
        let rooms = self.list_rooms().await?;

        Ok(CreateRoomResult {
            message: response.message,
            status: response.status,
            rooms,
        })
    }

    /// Subscribes to the room's topic, then asks the server to seat us.
    ///
    /// Only a `Joined` outcome commits: the previous room is released, the
    /// new one becomes current and its messages start reaching the result
    /// cell. Any other outcome, or an error, drops the new subscription
    /// unread and leaves the session as it was.
    pub async fn join_room(&mut self, name: &str) -> Result<JoinOutcome, SessionError> {
        let name = validate_room_name(name, self.config.console.max_room_name_length)?.to_string();
        let broker = self
            .broker
            .as_ref()
            .filter(|broker| broker.is_connected())
            .ok_or(SessionError::NotConnected)?;

        // Messages arriving before the answer stay queued on `messages`
        let (subscription, messages) = broker.subscribe(&topic_destination(&name))?;

        let outcome = self
            .control
            .join_room(&name, self.state.player().as_str())
            .await?;

        if outcome.is_joined() {
            let forwarder = tokio::spawn(forward_results(
                name.clone(),
                messages,
                Arc::clone(&self.results),
            ));
            let joined = ActiveRoom {
                name: name.clone(),
                subscription,
                forwarder,
            };
            if let Some(previous) = self.active_room.replace(joined) {
                debug!(
                    "Leaving room {} ({}) for {}",
                    previous.name,
                    previous.subscription.id(),
                    name
                );
            }
            self.state.enter_room(name);
        } else {
            warn!("Join of room {} refused: {:?}", name, outcome);
        }

        Ok(outcome)
    }

    /// Publishes a move to the current room. No acknowledgement is awaited.
    pub fn make_choice(&self, choice: Choice) -> Result<(), SessionError> {
        let room = self
            .state
            .current_room()
            .ok_or(SessionError::NoCurrentRoom)?;
        let broker = self.broker.as_ref().ok_or(SessionError::NotConnected)?;

        let payload = ChoicePayload::new(self.state.player().as_str(), choice);
        broker.publish_json(&choice_destination(room), &payload)?;
        info!("{} chose {} in room {}", self.state.player(), choice, room);
        Ok(())
    }

    /// Releases the current room's subscription and returns to room
    /// selection. Returns the room left, if any.
    pub fn leave_room(&mut self) -> Option<String> {
        let left = self.active_room.take().map(|room| {
            debug!("Releasing {}", room.subscription.id());
            room.name.clone()
        });
        self.state.leave();
        if let Some(room) = &left {
            info!("Left room {}", room);
        }
        left
    }

    /// Leaves the current room and closes the broker connection.
    pub async fn disconnect(mut self) {
        self.leave_room();
        if let Some(broker) = self.broker.take() {
            broker.disconnect().await;
        }
    }

    /// Watches the latest result text of the joined room.
    pub fn results(&self) -> watch::Receiver<Option<String>> {
        self.results.subscribe()
    }

    pub fn last_result(&self) -> Option<String> {
        self.results.borrow().clone()
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn is_connected(&self) -> bool {
        self.broker
            .as_ref()
            .is_some_and(BrokerConnection::is_connected)
    }

    pub fn player(&self) -> &PlayerIdentity {
        self.state.player()
    }

    pub fn current_room(&self) -> Option<&str> {
        self.state.current_room()
    }

    pub fn rooms(&self) -> &[String] {
        self.state.rooms()
    }

    pub fn view(&self) -> View {
        self.state.view()
    }
}

/// Copies each message body into the result cell, replacing what was there.
async fn forward_results(
    room: String,
    mut messages: mpsc::UnboundedReceiver<StompMessage>,
    results: Arc<watch::Sender<Option<String>>>,
) {
    while let Some(message) = messages.recv().await {
        debug!("Room {}: {}", room, message.body);
        results.send_replace(Some(message.body));
    }
    debug!("Result stream of room {} ended", room);
}
