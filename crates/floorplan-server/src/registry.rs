//! Publish/subscribe registry: one topic per project id.

use dashmap::DashMap;
use floorplan_core::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Identifies one WebSocket connection.
pub type ConnectionId = Uuid;

/// Sender half feeding a connection's outgoing queue.
pub type Outbox = UnboundedSender<ServerMessage>;

/// Subscribers per project id.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    topics: DashMap<String, HashMap<ConnectionId, Outbox>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, project_id: &str, conn: ConnectionId, outbox: Outbox) {
        self.topics.entry(project_id.to_string()).or_default().insert(conn, outbox);
    }

    pub fn remove(&self, project_id: &str, conn: ConnectionId) {
        if let Some(mut subscribers) = self.topics.get_mut(project_id) {
            subscribers.remove(&conn);
        }
        self.topics.remove_if(project_id, |_, subscribers| subscribers.is_empty());
    }

    /// Drop a connection from every topic. Called when a socket closes.
    pub fn remove_connection(&self, conn: ConnectionId) {
        self.topics.retain(|_, subscribers| {
            subscribers.remove(&conn);
            !subscribers.is_empty()
        });
    }

    /// Queue `msg` for every subscriber of the project, pruning closed ones.
    /// Returns the number of subscribers reached.
    pub fn broadcast(&self, project_id: &str, msg: &ServerMessage) -> usize {
        let Some(mut subscribers) = self.topics.get_mut(project_id) else {
            return 0;
        };
        subscribers.retain(|_, outbox| outbox.send(msg.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self, project_id: &str) -> usize {
        self.topics.get(project_id).map_or(0, |s| s.len())
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}
