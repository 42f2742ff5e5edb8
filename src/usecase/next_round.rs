//! UseCase: advance to the next round.
//!
//! Freezes the current vote map into history (when non-empty), clears the
//! votes, and broadcasts both the emptied vote map and the full history.
//! Gated on the facilitator flag of the requesting member.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRegistry, Username};
use crate::infrastructure::dto::conversion::{encode, vote_history, vote_update};

use super::error::SessionError;
use super::require_facilitator;

pub struct NextRoundUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl NextRoundUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// Returns whether a snapshot was appended to history.
    pub async fn execute(&self, room_id: RoomId, sender: Username) -> Result<bool, SessionError> {
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::UnknownRoom(room_id.as_str().to_string()))?;
        let mut room = room.lock().await;

        require_facilitator(&room, &sender)?;

        let appended = room.close_round();

        let votes_json = encode(&vote_update(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &votes_json)
            .await
        {
            tracing::warn!("Failed to broadcast vote-update for room '{}': {}", room_id, e);
        }

        let history_json = encode(&vote_history(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &history_json)
            .await
        {
            tracing::warn!(
                "Failed to broadcast vote-history for room '{}': {}",
                room_id,
                e
            );
        }

        tracing::info!(
            "'{}' advanced room '{}' to the next round ({} rounds played)",
            sender,
            room_id,
            room.rounds_played()
        );

        Ok(appended)
    }
}
