use livetranslate_protocol::ServerMessage;
use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Tracks the outbound sender channel for every live WebSocket connection.
///
/// Routing decisions (who is in which room) belong to the
/// [`RoomRegistry`](crate::rooms::RoomRegistry); this type only delivers.
pub struct ConnectionManager {
    senders: RwLock<HashMap<Uuid, mpsc::UnboundedSender<String>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_connection(
        &self,
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<String>,
    ) {
        self.senders.write().await.insert(connection_id, sender);
        tracing::debug!("connection {} registered", connection_id);
    }

    pub async fn remove_connection(&self, connection_id: Uuid) {
        self.senders.write().await.remove(&connection_id);
        tracing::debug!("connection {} removed", connection_id);
    }

    pub async fn send_to_connection(&self, connection_id: Uuid, message: &ServerMessage) {
        let json = match serde_json::to_string(message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("failed to serialize message: {}", e);
                return;
            }
        };

        let senders = self.senders.read().await;
        if let Some(sender) = senders.get(&connection_id) {
            if let Err(e) = sender.send(json) {
                tracing::error!("failed to send message to {}: {}", connection_id, e);
            }
        }
    }

    /// Fan a message out to a pre-computed audience of connections.
    pub async fn send_to_many(&self, connection_ids: &[Uuid], message: &ServerMessage) {
        if connection_ids.is_empty() {
            return;
        }

        let json = match serde_json::to_string(message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("failed to serialize message: {}", e);
                return;
            }
        };

        let senders = self.senders.read().await;
        for connection_id in connection_ids {
            if let Some(sender) = senders.get(connection_id) {
                if let Err(e) = sender.send(json.clone()) {
                    tracing::error!("failed to send message to {}: {}", connection_id, e);
                }
            }
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fan_out_skips_missing_connections() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let live = Uuid::new_v4();
        let gone = Uuid::new_v4();
        manager.add_connection(live, tx).await;

        manager
            .send_to_many(&[live, gone], &ServerMessage::Pong)
            .await;

        let raw = rx.recv().await.unwrap();
        assert_eq!(raw, r#"{"type":"pong"}"#);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn removed_connection_receives_nothing() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        manager.add_connection(id, tx).await;
        manager.remove_connection(id).await;

        manager.send_to_connection(id, &ServerMessage::Pong).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(manager.connection_count().await, 0);
    }
}
