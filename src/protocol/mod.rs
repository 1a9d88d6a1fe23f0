//! Wire protocol
//!
//! STOMP framing for the broker connection and the game payloads carried
//! over it.

pub mod frame;
pub mod messages;

pub use frame::{Frame, StompCommand, parse_frame, parse_frames};
pub use messages::{Choice, ChoicePayload, choice_destination, topic_destination};
