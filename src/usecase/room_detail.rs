//! UseCase: fetch one room's state (HTTP inspection API).

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRegistry};

use super::error::SessionError;

pub struct GetRoomDetailUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, room_id: RoomId) -> Result<Room, SessionError> {
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::UnknownRoom(room_id.as_str().to_string()))?;
        let room = room.lock().await;
        Ok(room.clone())
    }
}
