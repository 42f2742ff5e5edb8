//! In-memory room registry.
//!
//! A process-lifetime map from room id to room state. Rooms are created
//! lazily on first reference and never evicted; the accepted trade-off is
//! unbounded growth over the life of the process.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::Clock;
use crate::domain::{Room, RoomId, RoomRegistry, SharedRoom, Timestamp};

/// In-memory [`RoomRegistry`] implementation.
///
/// Constructed once in the composition root and shared behind an `Arc`;
/// there is no module-level singleton, so tests get isolated registries.
pub struct InMemoryRoomRegistry {
    rooms: Mutex<BTreeMap<RoomId, SharedRoom>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(BTreeMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn get_or_create(&self, room_id: &RoomId) -> SharedRoom {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                tracing::info!("Room '{}' created", room_id);
                Arc::new(Mutex::new(Room::new(
                    room_id.clone(),
                    Timestamp::new(self.clock.now_millis()),
                )))
            })
            .clone()
    }

    async fn get(&self, room_id: &RoomId) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn list(&self) -> Vec<SharedRoom> {
        let rooms = self.rooms.lock().await;
        // BTreeMap iteration order gives the id-sorted listing
        rooms.values().cloned().collect()
    }

    async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}
