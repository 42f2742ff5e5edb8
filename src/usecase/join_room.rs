//! UseCase: join a room.
//!
//! Fetches or lazily creates the room, admits (or replaces) the member,
//! force-closes a replaced entry's stale connection, sends the room snapshot
//! to the joiner, and broadcasts the updated roster.

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{
    AdmitOutcome, ConnectionId, MessagePusher, Role, RoomId, RoomRegistry, SessionPolicy,
    Timestamp, Username,
};
use crate::infrastructure::dto::conversion::{encode, room_joined, user_list};

pub struct JoinRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
            policy,
        }
    }

    /// Admit `username` into `room_id` on behalf of `connection_id`.
    ///
    /// The very first joiner of a room gets the facilitator flag, as does any
    /// joiner claiming the facilitator role (subject to the
    /// exclusive-facilitator policy). A join cannot fail: an unknown room is
    /// created on the spot, and an occupied username is replaced.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        username: Username,
        role: Role,
    ) -> AdmitOutcome {
        let room = self.registry.get_or_create(&room_id).await;
        let mut room = room.lock().await;

        let outcome = room.admit(
            username.clone(),
            role,
            connection_id,
            Timestamp::new(self.clock.now_millis()),
            self.policy.exclusive_facilitator,
        );

        // rejoin: the replaced entry's connection must not linger in the room
        if let Some(replaced) = outcome.replaced_connection
            && replaced != connection_id
        {
            tracing::info!(
                "'{}' rejoined room '{}', closing stale connection '{}'",
                username,
                room_id,
                replaced
            );
            self.message_pusher.close_connection(replaced).await;
        }

        self.message_pusher
            .subscribe(connection_id, room_id.clone())
            .await;

        let snapshot_json = encode(&room_joined(&room));
        if let Err(e) = self
            .message_pusher
            .push_to(connection_id, &snapshot_json)
            .await
        {
            tracing::warn!("Failed to send room snapshot to '{}': {}", connection_id, e);
        }

        let roster_json = encode(&user_list(&room));
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &roster_json)
            .await
        {
            tracing::warn!("Failed to broadcast user-list for room '{}': {}", room_id, e);
        }

        tracing::info!(
            "'{}' joined room '{}' as {} (facilitator: {})",
            username,
            room_id,
            role,
            outcome.is_facilitator
        );

        outcome
    }
}
