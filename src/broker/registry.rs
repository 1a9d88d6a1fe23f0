//! Module `registry`
//!
//! Maps STOMP subscription ids to the channels their MESSAGE frames are
//! delivered on. Owned by the transport loop, so it needs no locking.

use log::{debug, warn};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

use crate::broker::subscription::StompMessage;

/// Delivery target of a single subscription.
struct SubscriptionEntry {
    destination: String,
    sink: UnboundedSender<StompMessage>,
}

/// Registry of live subscriptions, keyed by subscription id.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: HashMap<String, SubscriptionEntry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscription, replacing any entry with the same id.
    pub fn insert(&mut self, id: String, destination: String, sink: UnboundedSender<StompMessage>) {
        if self
            .entries
            .insert(id.clone(), SubscriptionEntry { destination, sink })
            .is_some()
        {
            warn!("Subscription {} was registered twice, replacing", id);
        }
    }

    /// Removes a subscription and returns its destination.
    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.entries.remove(id).map(|entry| entry.destination)
    }

    pub fn destination(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|entry| entry.destination.as_str())
    }

    /// Hands a message to its subscriber.
    ///
    /// Returns `false` when the subscription is unknown or its receiver is gone.
    pub fn route(&self, message: StompMessage) -> bool {
        match self.entries.get(&message.subscription) {
            Some(entry) => entry.sink.send(message).is_ok(),
            None => {
                debug!(
                    "Dropping message for unknown subscription {} ({})",
                    message.subscription, message.destination
                );
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, ending all subscriber streams.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
