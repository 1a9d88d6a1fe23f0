//! Shared fakes for the integration tests: an in-process STOMP broker and
//! a stateful stand-in for the game server's HTTP interface.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use rps_room_client::config::ClientConfig;
use rps_room_client::protocol::{Frame, StompCommand, parse_frames};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// How the fake broker answers CONNECT.
#[derive(Clone)]
pub enum Handshake {
    Accept,
    /// Accepts with the given `heart-beat` header value
    Heartbeat(String),
    Reject(String),
    Ignore,
}

/// Single-connection STOMP broker recording every frame the client sends
/// after CONNECT.
pub struct FakeBroker {
    pub url: String,
    frames: mpsc::UnboundedReceiver<Frame>,
    heartbeats: mpsc::UnboundedReceiver<()>,
    deliveries: mpsc::UnboundedSender<(String, String)>,
}

impl FakeBroker {
    pub async fn start() -> Self {
        Self::start_with(Handshake::Accept).await
    }

    pub async fn start_with(handshake: Handshake) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames_tx, frames) = mpsc::unbounded_channel();
        let (heartbeats_tx, heartbeats) = mpsc::unbounded_channel();
        let (deliveries, mut deliveries_rx) = mpsc::unbounded_channel::<(String, String)>();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            let mut subscriptions: HashMap<String, String> = HashMap::new();
            let mut message_id = 0u64;

            loop {
                tokio::select! {
                    incoming = stream.next() => {
                        let text = match incoming {
                            Some(Ok(Message::Text(text))) => text.to_string(),
                            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                            Some(Ok(_)) => continue,
                        };
                        if text.trim_matches(['\r', '\n']).is_empty() {
                            let _ = heartbeats_tx.send(());
                            continue;
                        }

                        for frame in parse_frames(&text).unwrap() {
                            match frame.command {
                                StompCommand::Connect => {
                                    let reply = match &handshake {
                                        Handshake::Accept => Frame::new(StompCommand::Connected)
                                            .header("version", "1.2")
                                            .header("heart-beat", "0,0"),
                                        Handshake::Heartbeat(value) => Frame::new(StompCommand::Connected)
                                            .header("version", "1.2")
                                            .header("heart-beat", value.as_str()),
                                        Handshake::Reject(reason) => Frame::new(StompCommand::Error)
                                            .header("message", reason.as_str()),
                                        Handshake::Ignore => continue,
                                    };
                                    let _ = sink.send(Message::text(reply.encode())).await;
                                    continue;
                                }
                                StompCommand::Subscribe => {
                                    let destination = frame.get_header("destination").unwrap().to_string();
                                    let id = frame.get_header("id").unwrap().to_string();
                                    subscriptions.insert(destination, id);
                                }
                                StompCommand::Unsubscribe => {
                                    let id = frame.get_header("id").unwrap().to_string();
                                    subscriptions.retain(|_, existing| *existing != id);
                                }
                                _ => {}
                            }
                            let _ = frames_tx.send(frame);
                        }
                    }
                    delivery = deliveries_rx.recv() => {
                        let Some((destination, body)) = delivery else {
                            break;
                        };
                        if let Some(id) = subscriptions.get(&destination) {
                            message_id += 1;
                            let frame = Frame::new(StompCommand::Message)
                                .header("destination", destination.as_str())
                                .header("subscription", id.as_str())
                                .header("message-id", message_id.to_string())
                                .with_body(body);
                            let _ = sink.send(Message::text(frame.encode())).await;
                        }
                    }
                }
            }
        });

        Self {
            url: format!("ws://{}", addr),
            frames,
            heartbeats,
            deliveries,
        }
    }

    /// Next frame the client sent, CONNECT excluded.
    pub async fn next_frame(&mut self) -> Frame {
        tokio::time::timeout(TIMEOUT, self.frames.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("fake broker stopped")
    }

    /// Waits for an EOL heart-beat from the client.
    pub async fn next_heartbeat(&mut self) {
        tokio::time::timeout(TIMEOUT, self.heartbeats.recv())
            .await
            .expect("timed out waiting for a heart-beat")
            .expect("fake broker stopped");
    }

    /// Pushes a MESSAGE to whoever subscribed to `destination`.
    pub fn deliver(&self, destination: &str, body: &str) {
        self.deliveries
            .send((destination.to_string(), body.to_string()))
            .unwrap();
    }
}

/// In-memory game server answering like the real one: free-text replies,
/// two seats per room.
#[derive(Clone, Default)]
pub struct FakeGameServer {
    rooms: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    join_delays: Arc<Mutex<HashMap<String, Duration>>>,
}

impl FakeGameServer {
    /// Seats players directly, bypassing HTTP.
    pub fn seat(&self, room: &str, players: &[&str]) {
        let mut rooms = self.rooms.lock().unwrap();
        rooms.push((
            room.to_string(),
            players.iter().map(|p| p.to_string()).collect(),
        ));
    }

    /// Holds back the answer to joins of `room` for `delay`.
    pub fn delay_joins(&self, room: &str, delay: Duration) {
        self.join_delays
            .lock()
            .unwrap()
            .insert(room.to_string(), delay);
    }
}

impl Respond for FakeGameServer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        let mut rooms = self.rooms.lock().unwrap();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["game", "rooms"]) => {
                let names: Vec<&String> = rooms.iter().map(|(name, _)| name).collect();
                ResponseTemplate::new(200).set_body_json(names)
            }
            ("POST", ["game", "rooms"]) => {
                let name = form_value(&request.body, "name").unwrap_or_default();
                if rooms.iter().any(|(existing, _)| *existing == name) {
                    ResponseTemplate::new(200).set_body_string("Room already exists.")
                } else {
                    rooms.push((name.clone(), Vec::new()));
                    ResponseTemplate::new(200).set_body_string(format!("Room created: {}", name))
                }
            }
            ("POST", ["game", "rooms", room, "join"]) => {
                let player = form_value(&request.body, "player").unwrap_or_default();
                let reply = match rooms.iter_mut().find(|(name, _)| name.as_str() == *room) {
                    Some((_, players)) if players.len() < 2 => {
                        players.push(player.clone());
                        ResponseTemplate::new(200)
                            .set_body_string(format!("Player {} joined room {}", player, room))
                    }
                    _ => ResponseTemplate::new(200).set_body_string("Room is full or does not exist."),
                };
                match self.join_delays.lock().unwrap().get(*room) {
                    Some(delay) => reply.set_delay(*delay),
                    None => reply,
                }
            }
            _ => ResponseTemplate::new(404),
        }
    }
}

fn form_value(body: &[u8], key: &str) -> Option<String> {
    std::str::from_utf8(body)
        .ok()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.replace('+', " "))
}

/// Starts a mock server backed by `game`.
pub async fn start_game_server(game: &FakeGameServer) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(game.clone())
        .mount(&server)
        .await;
    server
}

/// Requests the client sent to a join endpoint.
pub async fn join_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path().ends_with("/join"))
        .collect()
}

pub fn test_config(http: &MockServer, broker_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.control.base_url = http.uri();
    config.broker.url = broker_url.to_string();
    config.broker.connect_timeout_secs = 2;
    config.control.request_timeout_secs = 5;
    config
}
