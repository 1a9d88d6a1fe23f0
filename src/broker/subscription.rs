//! Scoped subscriptions
//!
//! A [`Subscription`] stays active until it is released, either with
//! [`Subscription::unsubscribe`] or by being dropped. Releasing queues an
//! UNSUBSCRIBE behind every frame already requested on the connection.

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

use crate::broker::connection::Outbound;

/// A MESSAGE frame delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompMessage {
    pub subscription: String,
    pub destination: String,
    pub message_id: Option<String>,
    pub body: String,
}

/// Handle to an active broker subscription.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    destination: String,
    outbound: UnboundedSender<Outbound>,
    released: bool,
}

impl Subscription {
    pub(crate) fn new(id: String, destination: String, outbound: UnboundedSender<Outbound>) -> Self {
        Self {
            id,
            destination,
            outbound,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Releases the subscription now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // A closed connection has already forgotten the subscription.
        if self
            .outbound
            .send(Outbound::Unsubscribe {
                id: self.id.clone(),
            })
            .is_ok()
        {
            debug!("Released subscription {} ({})", self.id, self.destination);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
