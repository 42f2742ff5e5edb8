//! UseCase: remove a member from a room.
//!
//! Gated on the facilitator flag of the requesting member. The target's
//! connection is force-closed, the roster entry deleted, and the updated
//! roster broadcast. The closed connection's own teardown finds no matching
//! member and so neither removes nor re-broadcasts anything.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRegistry, Username};
use crate::infrastructure::dto::conversion::{encode, user_list};

use super::error::SessionError;
use super::require_facilitator;

pub struct RemoveMemberUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RemoveMemberUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        room_id: RoomId,
        sender: Username,
        target: Username,
    ) -> Result<(), SessionError> {
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::UnknownRoom(room_id.as_str().to_string()))?;
        let mut room = room.lock().await;

        require_facilitator(&room, &sender)?;

        let removed = room
            .remove_member(&target)
            .ok_or_else(|| SessionError::NotAMember {
                room_id: room_id.as_str().to_string(),
                username: target.as_str().to_string(),
            })?;

        self.message_pusher
            .close_connection(removed.connection_id)
            .await;

        let roster_json = encode(&user_list(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &roster_json)
            .await
        {
            tracing::warn!("Failed to broadcast user-list for room '{}': {}", room_id, e);
        }

        tracing::info!("'{}' removed '{}' from room '{}'", sender, target, room_id);

        Ok(())
    }
}
