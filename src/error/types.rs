//! Error types
//!
//! Defines domain-specific error types for each layer of the client.

use std::fmt;
use std::io;
use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// STOMP frame codec errors
#[derive(Debug, PartialEq)]
pub enum FrameError {
    Empty,
    UnknownCommand(String),
    MalformedHeader(String),
    InvalidEscape(String),
    MissingTerminator,
    InvalidContentLength(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Empty => write!(f, "Empty frame"),
            FrameError::UnknownCommand(c) => write!(f, "Unknown STOMP command: {}", c),
            FrameError::MalformedHeader(h) => write!(f, "Malformed header line: {}", h),
            FrameError::InvalidEscape(h) => write!(f, "Invalid escape sequence in header: {}", h),
            FrameError::MissingTerminator => write!(f, "Frame is missing its NUL terminator"),
            FrameError::InvalidContentLength(v) => write!(f, "Invalid content-length: {}", v),
        }
    }
}

impl std::error::Error for FrameError {}

/// HTTP control-plane errors
#[derive(Debug)]
pub enum ControlError {
    InvalidBaseUrl(String),
    Transport(reqwest::Error),
    UnexpectedStatus { status: u16, body: String },
    Decode(reqwest::Error),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::InvalidBaseUrl(u) => write!(f, "Invalid control-plane URL: {}", u),
            ControlError::Transport(e) => write!(f, "Request failed: {}", e),
            ControlError::UnexpectedStatus { status, body } => {
                write!(f, "Unexpected HTTP status {}: {}", status, body)
            }
            ControlError::Decode(e) => write!(f, "Failed to decode response: {}", e),
        }
    }
}

impl std::error::Error for ControlError {}

/// Broker (STOMP over WebSocket) errors
#[derive(Debug)]
pub enum BrokerError {
    Connect(tungstenite::Error),
    Rejected(String),
    Handshake(String),
    Timeout(Duration),
    NotConnected,
    Frame(FrameError),
    Encode(serde_json::Error),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::Connect(e) => write!(f, "WebSocket connection failed: {}", e),
            BrokerError::Rejected(msg) => write!(f, "Broker rejected the connection: {}", msg),
            BrokerError::Handshake(msg) => write!(f, "STOMP handshake failed: {}", msg),
            BrokerError::Timeout(d) => write!(f, "Timed out after {:?} waiting for broker", d),
            BrokerError::NotConnected => write!(f, "Not connected to the broker"),
            BrokerError::Frame(e) => write!(f, "Frame error: {}", e),
            BrokerError::Encode(e) => write!(f, "Failed to encode payload: {}", e),
        }
    }
}

impl std::error::Error for BrokerError {}

impl From<tungstenite::Error> for BrokerError {
    fn from(error: tungstenite::Error) -> Self {
        BrokerError::Connect(error)
    }
}

impl From<FrameError> for BrokerError {
    fn from(error: FrameError) -> Self {
        BrokerError::Frame(error)
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(error: serde_json::Error) -> Self {
        BrokerError::Encode(error)
    }
}

/// Game session errors
#[derive(Debug)]
pub enum SessionError {
    EmptyRoomName,
    InvalidRoomName(String),
    NoCurrentRoom,
    NotConnected,
    Control(ControlError),
    Broker(BrokerError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyRoomName => write!(f, "Room name is empty"),
            SessionError::InvalidRoomName(reason) => write!(f, "Invalid room name: {}", reason),
            SessionError::NoCurrentRoom => write!(f, "Not in a room"),
            SessionError::NotConnected => write!(f, "Session is not connected"),
            SessionError::Control(e) => write!(f, "Control-plane error: {}", e),
            SessionError::Broker(e) => write!(f, "Broker error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ControlError> for SessionError {
    fn from(error: ControlError) -> Self {
        SessionError::Control(error)
    }
}

impl From<BrokerError> for SessionError {
    fn from(error: BrokerError) -> Self {
        SessionError::Broker(error)
    }
}

/// Top-level client error that encompasses all error types
#[derive(Debug)]
pub enum ClientError {
    Config(config::ConfigError),
    Session(SessionError),
    IoError(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Config(e) => write!(f, "Configuration error: {}", e),
            ClientError::Session(e) => write!(f, "Session error: {}", e),
            ClientError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<config::ConfigError> for ClientError {
    fn from(error: config::ConfigError) -> Self {
        ClientError::Config(error)
    }
}

impl From<SessionError> for ClientError {
    fn from(error: SessionError) -> Self {
        ClientError::Session(error)
    }
}

impl From<ControlError> for ClientError {
    fn from(error: ControlError) -> Self {
        ClientError::Session(SessionError::Control(error))
    }
}

impl From<BrokerError> for ClientError {
    fn from(error: BrokerError) -> Self {
        ClientError::Session(SessionError::Broker(error))
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        ClientError::IoError(error)
    }
}
