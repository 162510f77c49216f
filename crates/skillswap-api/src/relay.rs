// Relay: per-user WebSocket connection registry
//
// Every open socket that joined as a user gets a ConnectionHandle with an
// unbounded sender; the socket's send task drains it. Publishing serializes the
// event once and hands the text to each of the user's connections. A user with
// no connections simply receives nothing.

use axum::extract::ws::Message;
use parking_lot::Mutex;
use serde::Serialize;
use skillswap_core::{EventPublisher, RelayEvent};
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

struct ConnectionHandle {
    user_id: Uuid,
    tx: mpsc::UnboundedSender<Message>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<Uuid, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to a user; returns the connection id
    pub fn register(&self, user_id: Uuid, tx: mpsc::UnboundedSender<Message>) -> Uuid {
        let conn_id = Uuid::now_v7();
        self.connections
            .lock()
            .insert(conn_id, ConnectionHandle { user_id, tx });
        tracing::debug!(%conn_id, %user_id, "Relay connection registered");
        conn_id
    }

    pub fn unregister(&self, conn_id: Uuid) {
        if let Some(handle) = self.connections.lock().remove(&conn_id) {
            tracing::debug!(%conn_id, user_id = %handle.user_id, "Relay connection removed");
        }
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections
            .lock()
            .values()
            .any(|h| h.user_id == user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Send a serializable payload to every connection of one user
    pub fn send_to_user<T: Serialize>(&self, user_id: Uuid, payload: &T) -> usize {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%user_id, "Failed to serialize relay payload: {}", e);
                return 0;
            }
        };

        self.connections
            .lock()
            .values()
            .filter(|h| h.user_id == user_id)
            .filter(|h| h.tx.send(Message::Text(text.clone())).is_ok())
            .count()
    }
}

impl EventPublisher for ConnectionRegistry {
    fn publish(&self, user_id: Uuid, event: &RelayEvent) -> usize {
        self.send_to_user(user_id, event)
    }
}
