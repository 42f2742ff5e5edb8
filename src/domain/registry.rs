//! Room registry trait.
//!
//! The use-case layer depends on this interface; the concrete in-memory
//! implementation lives in the infrastructure layer.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::entity::Room;
use super::value_object::RoomId;

/// Handle to a room. All mutations of one room are serialized through its
/// mutex; broadcasts derived from a mutation happen inside the same critical
/// section.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Owns the mapping from room identifier to room state.
///
/// Rooms are created lazily on first reference and are never evicted; they
/// live for the lifetime of the process.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Fetch the room, creating it empty on first reference. Idempotent.
    async fn get_or_create(&self, room_id: &RoomId) -> SharedRoom;

    /// Read-only lookup. Never creates a room.
    async fn get(&self, room_id: &RoomId) -> Option<SharedRoom>;

    /// All known rooms, ordered by room id.
    async fn list(&self) -> Vec<SharedRoom>;

    /// Number of rooms currently tracked.
    async fn room_count(&self) -> usize;
}
