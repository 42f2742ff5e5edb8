//! WebSocket-backed MessagePusher implementation.
//!
//! Owns the `UnboundedSender` handles of all open connections together with
//! their room subscription. WebSocket creation happens in the UI layer; this
//! implementation only manages the senders and delivers outbound frames.
//! Closing a connection from here means dropping its sender: the writer task
//! on the socket side observes the closed channel and winds down.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomId};

struct ConnectionEntry {
    sender: PusherChannel,
    room: Option<RoomId>,
}

/// WebSocket [`MessagePusher`] implementation.
pub struct WebSocketMessagePusher {
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Number of registered connections, subscribed or not.
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, ConnectionEntry { sender, room: None });
        tracing::debug!("Connection '{}' registered", connection_id);
    }

    async fn subscribe(&self, connection_id: ConnectionId, room_id: RoomId) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(&connection_id) {
            tracing::debug!("Connection '{}' subscribed to room '{}'", connection_id, room_id);
            entry.room = Some(room_id);
        } else {
            tracing::warn!(
                "Cannot subscribe unknown connection '{}' to room '{}'",
                connection_id,
                room_id
            );
        }
    }

    async fn unregister_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
    }

    async fn push_to(
        &self,
        connection_id: ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;
        let entry = connections.get(&connection_id).ok_or_else(|| {
            MessagePushError::ConnectionNotFound(connection_id.to_string())
        })?;
        entry
            .sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }

    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;
        for (connection_id, entry) in connections.iter() {
            if entry.room.as_ref() != Some(room_id) {
                continue;
            }
            // a dead receiver must not affect the other subscribers
            if let Err(e) = entry.sender.send(content.to_string()) {
                tracing::warn!(
                    "Failed to push message to connection '{}': {}",
                    connection_id,
                    e
                );
            }
        }
        Ok(())
    }

    async fn close_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(&connection_id).is_some() {
            tracing::info!("Connection '{}' force-closed", connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    async fn register(
        pusher: &WebSocketMessagePusher,
        room: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_connection(connection_id, tx).await;
        pusher.subscribe(connection_id, room_id(room)).await;
        (connection_id, rx)
    }

    #[tokio::test]
    async fn test_push_to_delivers_to_single_connection() {
        let pusher = WebSocketMessagePusher::new();
        let (connection_id, mut rx) = register(&pusher, "ABCD").await;

        let result = pusher.push_to(connection_id, "hello").await;

        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        let pusher = WebSocketMessagePusher::new();

        let result = pusher.push_to(ConnectionId::generate(), "hello").await;

        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_the_room_subscribers() {
        let pusher = WebSocketMessagePusher::new();
        let (_, mut rx_a) = register(&pusher, "ABCD").await;
        let (_, mut rx_b) = register(&pusher, "ABCD").await;
        let (_, mut rx_other) = register(&pusher, "WXYZ").await;

        pusher
            .broadcast_to_room(&room_id("ABCD"), "round update")
            .await
            .unwrap();

        assert_eq!(rx_a.recv().await, Some("round update".to_string()));
        assert_eq!(rx_b.recv().await, Some("round update".to_string()));
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_unsubscribed_connections() {
        let pusher = WebSocketMessagePusher::new();
        let connection_id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(connection_id, tx).await;

        pusher
            .broadcast_to_room(&room_id("ABCD"), "round update")
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_dead_receiver() {
        let pusher = WebSocketMessagePusher::new();
        let (_, mut rx_alive) = register(&pusher, "ABCD").await;
        let (_, rx_dead) = register(&pusher, "ABCD").await;
        drop(rx_dead);

        let result = pusher.broadcast_to_room(&room_id("ABCD"), "still going").await;

        assert!(result.is_ok());
        assert_eq!(rx_alive.recv().await, Some("still going".to_string()));
    }

    #[tokio::test]
    async fn test_close_connection_drops_the_sender() {
        let pusher = WebSocketMessagePusher::new();
        let (connection_id, mut rx) = register(&pusher, "ABCD").await;

        pusher.close_connection(connection_id).await;

        // channel closes once the registry held the only sender
        assert_eq!(rx.recv().await, None);
        assert_eq!(pusher.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_resubscribe_moves_connection_between_rooms() {
        let pusher = WebSocketMessagePusher::new();
        let (connection_id, mut rx) = register(&pusher, "ABCD").await;

        pusher.subscribe(connection_id, room_id("WXYZ")).await;
        pusher
            .broadcast_to_room(&room_id("ABCD"), "old room")
            .await
            .unwrap();
        pusher
            .broadcast_to_room(&room_id("WXYZ"), "new room")
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some("new room".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let pusher = WebSocketMessagePusher::new();
        let (connection_id, _rx) = register(&pusher, "ABCD").await;

        pusher.unregister_connection(connection_id).await;
        pusher.unregister_connection(connection_id).await;

        assert_eq!(pusher.connection_count().await, 0);
    }
}
