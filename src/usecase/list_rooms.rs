//! UseCase: list all known rooms (HTTP inspection API).

use std::sync::Arc;

use crate::domain::{Room, RoomRegistry};

pub struct ListRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl ListRoomsUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshot of every room, ordered by room id.
    pub async fn execute(&self) -> Vec<Room> {
        let mut rooms = Vec::new();
        for handle in self.registry.list().await {
            rooms.push(handle.lock().await.clone());
        }
        rooms
    }
}
