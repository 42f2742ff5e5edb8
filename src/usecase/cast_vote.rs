//! UseCase: cast a vote in the current round.
//!
//! Votes are recorded for current members only; the room must already exist.
//! Under the default policy the broadcast is masked (who has voted, not
//! what); the open-ballots policy additionally broadcasts the raw vote map
//! on every cast.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRegistry, SessionPolicy, Username, VoteValue};
use crate::infrastructure::dto::conversion::{encode, vote_update, voting_status};

use super::error::SessionError;

pub struct CastVoteUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    policy: SessionPolicy,
}

impl CastVoteUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            policy,
        }
    }

    /// Record `vote` for `username` and broadcast the round progress.
    ///
    /// Returns whether every eligible voter has now voted.
    pub async fn execute(
        &self,
        room_id: RoomId,
        username: Username,
        vote: VoteValue,
    ) -> Result<bool, SessionError> {
        let room = self
            .registry
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::UnknownRoom(room_id.as_str().to_string()))?;
        let mut room = room.lock().await;

        if !room.record_vote(&username, vote) {
            return Err(SessionError::NotAMember {
                room_id: room_id.as_str().to_string(),
                username: username.as_str().to_string(),
            });
        }

        if self.policy.open_ballots {
            let votes_json = encode(&vote_update(&room));
            if let Err(e) = self
                .message_pusher
                .broadcast_to_room(&room_id, &votes_json)
                .await
            {
                tracing::warn!("Failed to broadcast vote-update for room '{}': {}", room_id, e);
            }
        }

        let status = voting_status(&room);
        let all_have_voted = status.all_have_voted;
        let status_json = encode(&status);
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&room_id, &status_json)
            .await
        {
            tracing::warn!(
                "Failed to broadcast voting-status for room '{}': {}",
                room_id,
                e
            );
        }

        tracing::debug!(
            "'{}' voted in room '{}' (all voted: {})",
            username,
            room_id,
            all_have_voted
        );

        Ok(all_have_voted)
    }
}
