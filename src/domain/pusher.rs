//! Message pusher trait.
//!
//! Abstracts the outbound side of every connection: registration of the
//! per-connection sender channel, room subscription, targeted pushes,
//! room-wide fan-out, and forced termination. The WebSocket implementation
//! lives in the infrastructure layer.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::{ConnectionId, RoomId};

/// Channel used to hand outbound frames to a connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection's sender channel. Called once per connection,
    /// before any room subscription.
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Subscribe a connection to a room's broadcasts. A second call replaces
    /// the previous subscription.
    async fn subscribe(&self, connection_id: ConnectionId, room_id: RoomId);

    /// Drop a connection's registration. Idempotent.
    async fn unregister_connection(&self, connection_id: ConnectionId);

    /// Push a message to a single connection.
    async fn push_to(&self, connection_id: ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push a message to every connection subscribed to the room.
    ///
    /// Best-effort: a failed delivery to one connection is logged and does
    /// not affect the others.
    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Force-terminate a connection by dropping its sender channel; the
    /// connection's socket task winds down on its own. Idempotent.
    async fn close_connection(&self, connection_id: ConnectionId);
}
