//! Broker client
//!
//! Publish/subscribe data-plane: STOMP over WebSocket with scoped
//! subscriptions.

pub mod connection;
pub mod registry;
pub mod subscription;

pub use connection::{BrokerConnection, Heartbeat, negotiate_heartbeat};
pub use registry::SubscriptionRegistry;
pub use subscription::{StompMessage, Subscription};
