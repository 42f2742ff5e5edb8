//! UseCase: reveal the current round (the `request-votes` event).
//!
//! No state mutation; broadcasts the full membership-pruned vote map to the
//! room. Gated on the facilitator flag of the requesting member.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRegistry, Username};
use crate::infrastructure::dto::conversion::{encode, vote_update};

use super::error::SessionError;
use super::require_facilitator;

pub struct RevealVotesUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RevealVotesUseCase {
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
        let room = room.lock().await;

        require_facilitator(&room, &sender)?;

        let votes_json = encode(&vote_update(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &votes_json)
            .await
        {
            tracing::warn!("Failed to broadcast vote-update for room '{}': {}", room_id, e);
        }

        tracing::info!("'{}' revealed votes in room '{}'", sender, room_id);

        Ok(())
    }
}
