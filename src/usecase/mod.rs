//! Use-case layer: one use case per inbound session event.
//!
//! Each use case owns the registry and pusher behind their domain traits,
//! applies the room mutation, and fans the resulting broadcasts out inside
//! the same critical section, so no two events interleave their
//! mutation/broadcast pairs for a room.

pub mod cast_vote;
pub mod disconnect;
pub mod error;
pub mod join_room;
pub mod list_rooms;
pub mod next_round;
pub mod remove_member;
pub mod reset_room;
pub mod reveal_votes;
pub mod room_detail;

pub use cast_vote::CastVoteUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::SessionError;
pub use join_room::JoinRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use next_round::NextRoundUseCase;
pub use remove_member::RemoveMemberUseCase;
pub use reset_room::ResetRoomUseCase;
pub use reveal_votes::RevealVotesUseCase;
pub use room_detail::GetRoomDetailUseCase;

use crate::domain::{Room, Username};

/// Gate for privileged events: the sender must currently hold the
/// facilitator flag in this room.
pub(crate) fn require_facilitator(room: &Room, username: &Username) -> Result<(), SessionError> {
    if room.is_facilitator(username) {
        Ok(())
    } else {
        Err(SessionError::Unauthorized {
            room_id: room.id.as_str().to_string(),
            username: username.as_str().to_string(),
        })
    }
}
