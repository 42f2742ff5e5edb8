//! UseCase: reset the current round without saving it.
//!
//! Clears the vote map; history stays as it is. Gated on the facilitator
//! flag of the requesting member.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRegistry, Username};
use crate::infrastructure::dto::conversion::{encode, vote_update};

use super::error::SessionError;
use super::require_facilitator;

pub struct ResetRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ResetRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    pub async fn execute(&self, room_id: RoomId, sender: Username) -> Result<(), SessionError> {
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::UnknownRoom(room_id.as_str().to_string()))?;
        let mut room = room.lock().await;

        require_facilitator(&room, &sender)?;

        room.clear_votes();

        let votes_json = encode(&vote_update(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &votes_json)
            .await
        {
            tracing::warn!("Failed to broadcast vote-update for room '{}': {}", room_id, e);
        }

        tracing::info!("'{}' reset the round in room '{}'", sender, room_id);

        Ok(())
    }
}
