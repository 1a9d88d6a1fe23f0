//! Module `connection`
//!
//! STOMP session over a WebSocket. [`BrokerConnection::connect`] performs
//! the CONNECT/CONNECTED handshake and then hands the socket to a
//! background transport loop. The handle talks to the loop over a single
//! unbounded channel, so frames leave in the order they were requested.

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::broker::registry::SubscriptionRegistry;
use crate::broker::subscription::{StompMessage, Subscription};
use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::protocol::{Frame, StompCommand, parse_frames};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Requests from the handle to the transport loop.
#[derive(Debug)]
pub(crate) enum Outbound {
    Frame(Frame),
    Subscribe {
        id: String,
        destination: String,
        sink: mpsc::UnboundedSender<StompMessage>,
    },
    Unsubscribe {
        id: String,
    },
    Disconnect,
}

/// Heart-beat intervals agreed during the handshake. `None` disables a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Heartbeat {
    pub send: Option<Duration>,
    pub expect: Option<Duration>,
}

impl Heartbeat {
    /// How often the loop needs to wake up to honour the agreement.
    fn tick(&self) -> Option<Duration> {
        match (self.send, self.expect) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Applies the STOMP heart-beat rules to our `cx,cy` and the server's `sx,sy`.
pub fn negotiate_heartbeat(client_send_ms: u64, client_recv_ms: u64, server: Option<&str>) -> Heartbeat {
    let (server_send_ms, server_recv_ms) = server
        .and_then(|value| value.split_once(','))
        .and_then(|(sx, sy)| Some((sx.trim().parse::<u64>().ok()?, sy.trim().parse::<u64>().ok()?)))
        .unwrap_or((0, 0));

    let agree = |ours: u64, theirs: u64| {
        (ours != 0 && theirs != 0).then(|| Duration::from_millis(ours.max(theirs)))
    };

    Heartbeat {
        send: agree(client_send_ms, server_recv_ms),
        expect: agree(client_recv_ms, server_send_ms),
    }
}

/// Handle to a live broker session.
pub struct BrokerConnection {
    outbound: mpsc::UnboundedSender<Outbound>,
    connected: Arc<AtomicBool>,
    next_subscription: AtomicU64,
    heartbeat: Heartbeat,
    task: Option<JoinHandle<()>>,
}

impl BrokerConnection {
    /// Opens the WebSocket and completes the STOMP handshake within the
    /// configured connect timeout.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let limit = config.connect_timeout();
        let (socket, heartbeat) = tokio::time::timeout(limit, handshake(config))
            .await
            .map_err(|_| BrokerError::Timeout(limit))??;

        let (outbound, commands) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(transport_loop(
            socket,
            commands,
            heartbeat,
            Arc::clone(&connected),
        ));

        Ok(Self {
            outbound,
            connected,
            next_subscription: AtomicU64::new(0),
            heartbeat,
            task: Some(task),
        })
    }

    /// Whether the transport loop is still running.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.outbound.is_closed()
    }

    pub fn heartbeat(&self) -> Heartbeat {
        self.heartbeat
    }

    /// Subscribes to `destination`.
    ///
    /// Message bodies arrive on the returned receiver in broker order until
    /// the [`Subscription`] is released or the connection closes.
    pub fn subscribe(
        &self,
        destination: &str,
    ) -> Result<(Subscription, mpsc::UnboundedReceiver<StompMessage>), BrokerError> {
        let id = format!(
            "sub-{}",
            self.next_subscription.fetch_add(1, Ordering::Relaxed)
        );
        let (sink, messages) = mpsc::unbounded_channel();

        self.send(Outbound::Subscribe {
            id: id.clone(),
            destination: destination.to_string(),
            sink,
        })?;
        info!("Subscribed to {} as {}", destination, id);

        let subscription = Subscription::new(id, destination.to_string(), self.outbound.clone());
        Ok((subscription, messages))
    }

    /// Queues a SEND frame. No receipt is requested.
    pub fn publish(&self, destination: &str, content_type: &str, body: String) -> Result<(), BrokerError> {
        let frame = Frame::new(StompCommand::Send)
            .header("destination", destination)
            .header("content-type", content_type)
            .with_body(body);
        self.send(Outbound::Frame(frame))
    }

    /// Serializes `payload` as JSON and publishes it.
    pub fn publish_json<T: Serialize>(&self, destination: &str, payload: &T) -> Result<(), BrokerError> {
        let body = serde_json::to_string(payload)?;
        self.publish(destination, "application/json", body)
    }

    /// Sends DISCONNECT, closes the socket and waits for the loop to finish.
    pub async fn disconnect(mut self) {
        let _ = self.outbound.send(Outbound::Disconnect);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Broker transport task ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: Outbound) -> Result<(), BrokerError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(BrokerError::NotConnected);
        }
        self.outbound
            .send(command)
            .map_err(|_| BrokerError::NotConnected)
    }
}

impl Drop for BrokerConnection {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.outbound.send(Outbound::Disconnect);
        }
    }
}

/// Upgrades to WebSocket, sends CONNECT and waits for CONNECTED.
async fn handshake(config: &BrokerConfig) -> Result<(WsStream, Heartbeat), BrokerError> {
    info!("Connecting to broker at {}", config.url);
    let (mut socket, _response) = connect_async(config.url.as_str()).await?;

    let connect = Frame::new(StompCommand::Connect)
        .header("accept-version", "1.2")
        .header("host", config.host.as_str())
        .header("heart-beat", config.heartbeat_header());
    socket.send(Message::text(connect.encode())).await?;

    while let Some(message) = socket.next().await {
        let text = match message? {
            Message::Text(text) => text.to_string(),
            Message::Binary(bytes) => match decode_binary(&bytes) {
                Some(text) => text.to_string(),
                None => continue,
            },
            Message::Close(close) => {
                return Err(BrokerError::Handshake(format!(
                    "socket closed before CONNECTED: {:?}",
                    close
                )));
            }
            _ => continue,
        };

        for frame in parse_frames(&text)? {
            match frame.command {
                StompCommand::Connected => {
                    info!(
                        "Connected: STOMP {} (server {})",
                        frame.get_header("version").unwrap_or("1.0"),
                        frame.get_header("server").unwrap_or("unknown")
                    );
                    let heartbeat = negotiate_heartbeat(
                        config.heartbeat_send_ms,
                        config.heartbeat_recv_ms,
                        frame.get_header("heart-beat"),
                    );
                    return Ok((socket, heartbeat));
                }
                StompCommand::Error => {
                    let reason = frame
                        .get_header("message")
                        .map(str::to_string)
                        .unwrap_or_else(|| frame.body.clone());
                    return Err(BrokerError::Rejected(reason));
                }
                other => debug!("Ignoring {} frame before CONNECTED", other.as_str()),
            }
        }
    }

    Err(BrokerError::Handshake(
        "socket closed before CONNECTED".into(),
    ))
}

/// Owns the socket: writes queued frames, routes incoming MESSAGE frames
/// and keeps heart-beats flowing.
async fn transport_loop(
    socket: WsStream,
    mut commands: mpsc::UnboundedReceiver<Outbound>,
    heartbeat: Heartbeat,
    connected: Arc<AtomicBool>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut registry = SubscriptionRegistry::new();

    let tick = heartbeat.tick();
    let mut ticker = tokio::time::interval(tick.unwrap_or(Duration::from_secs(3600)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_sent = Instant::now();
    let mut last_received = Instant::now();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let frame = match command {
                    Some(Outbound::Frame(frame)) => frame,
                    Some(Outbound::Subscribe { id, destination, sink: messages }) => {
                        registry.insert(id.clone(), destination.clone(), messages);
                        Frame::new(StompCommand::Subscribe)
                            .header("id", id)
                            .header("destination", destination)
                            .header("ack", "auto")
                    }
                    Some(Outbound::Unsubscribe { id }) => {
                        if registry.remove(&id).is_none() {
                            continue;
                        }
                        Frame::new(StompCommand::Unsubscribe).header("id", id)
                    }
                    Some(Outbound::Disconnect) | None => {
                        let disconnect = Frame::new(StompCommand::Disconnect);
                        if let Err(e) = send_frame(&mut sink, &disconnect).await {
                            debug!("DISCONNECT not delivered: {}", e);
                        }
                        let _ = sink.close().await;
                        info!("Disconnected from broker");
                        break;
                    }
                };

                if let Err(e) = send_frame(&mut sink, &frame).await {
                    error!("Failed to send {} frame: {}", frame.command.as_str(), e);
                    break;
                }
                last_sent = Instant::now();
            }
            incoming = stream.next() => {
                last_received = Instant::now();
                match incoming {
                    Some(Ok(Message::Text(text))) => dispatch(&registry, text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => {
                        if let Some(text) = decode_binary(&bytes) {
                            dispatch(&registry, text);
                        }
                    }
                    Some(Ok(Message::Close(close))) => {
                        info!("Broker closed the connection: {:?}", close);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Broker connection failed: {}", e);
                        break;
                    }
                    None => {
                        info!("Broker connection ended");
                        break;
                    }
                }
            }
            _ = ticker.tick(), if tick.is_some() => {
                if let Some(every) = heartbeat.send {
                    if last_sent.elapsed() >= every {
                        if let Err(e) = sink.send(Message::text(String::from("\n"))).await {
                            error!("Failed to send heart-beat: {}", e);
                            break;
                        }
                        last_sent = Instant::now();
                    }
                }
                if let Some(every) = heartbeat.expect {
                    if last_received.elapsed() > every * 2 {
                        warn!("No data from broker for {:?}, closing", last_received.elapsed());
                        let _ = sink.close().await;
                        break;
                    }
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    registry.clear();
}

async fn send_frame(
    sink: &mut WsSink,
    frame: &Frame,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    debug!("-> {}", frame.command.as_str());
    sink.send(Message::text(frame.encode())).await
}

/// STOMP text carried in a binary message. Invalid UTF-8 is dropped whole.
fn decode_binary(bytes: &[u8]) -> Option<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Discarding non-UTF-8 broker data ({} bytes): {}", bytes.len(), e);
            None
        }
    }
}

/// Routes the frames of one incoming WebSocket message.
fn dispatch(registry: &SubscriptionRegistry, text: &str) {
    let frames = match parse_frames(text) {
        Ok(frames) => frames,
        Err(e) => {
            warn!("Discarding unparseable broker data: {}", e);
            return;
        }
    };

    for frame in frames {
        match frame.command {
            StompCommand::Message => {
                let Some(subscription) = frame.get_header("subscription").map(str::to_string) else {
                    warn!("MESSAGE frame without subscription header");
                    continue;
                };
                let message = StompMessage {
                    subscription,
                    destination: frame.get_header("destination").unwrap_or_default().to_string(),
                    message_id: frame.get_header("message-id").map(str::to_string),
                    body: frame.body,
                };
                debug!("<- MESSAGE {} ({} bytes)", message.destination, message.body.len());
                registry.route(message);
            }
            StompCommand::Error => {
                error!(
                    "Broker ERROR: {} {}",
                    frame.get_header("message").unwrap_or("(no message)"),
                    frame.body
                );
            }
            StompCommand::Receipt => {
                debug!("<- RECEIPT {}", frame.get_header("receipt-id").unwrap_or("?"));
            }
            other => debug!("Ignoring {} frame", other.as_str()),
        }
    }
}
