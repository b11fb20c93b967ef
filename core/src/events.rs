use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const INSTANCE_LAUNCHED: &str = "instance.launched";
pub const INSTANCE_KILL_REQUESTED: &str = "instance.kill_requested";
pub const INSTANCE_EXITED: &str = "instance.exited";
pub const WORKSPACE_SAVE_ALL: &str = "workspace.save_all";

/// A lifecycle notification published by the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: String,
    pub payload: Value,
}

/// Topic based event bus. Delivery never blocks and publishing to a topic
/// nobody listens on is a no-op.
pub struct EventBus {
    subscribers: HashMap<String, Vec<UnboundedSender<Event>>>,
    wildcard: Vec<UnboundedSender<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
            wildcard: Vec::new(),
        }
    }

    /// Subscribe to a topic, returning a receiver for events.
    pub fn subscribe(&mut self, topic: &str) -> UnboundedReceiver<Event> {
        let (tx, rx) = unbounded_channel();
        self.subscribers
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Subscribe to every topic.
    pub fn subscribe_all(&mut self) -> UnboundedReceiver<Event> {
        let (tx, rx) = unbounded_channel();
        self.wildcard.push(tx);
        rx
    }

    /// Publish a payload on a topic. Closed receivers are dropped.
    pub fn publish(&mut self, topic: &str, payload: Value) {
        let event = Event {
            topic: topic.to_string(),
            payload,
        };
        if let Some(list) = self.subscribers.get_mut(topic) {
            list.retain(|tx| tx.send(event.clone()).is_ok());
        }
        self.wildcard.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
