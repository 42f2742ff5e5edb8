//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::usecase::{
    CastVoteUseCase, DisconnectUseCase, GetRoomDetailUseCase, JoinRoomUseCase, ListRoomsUseCase,
    NextRoundUseCase, RemoveMemberUseCase, ResetRoomUseCase, RevealVotesUseCase,
};

/// Shared application state
pub struct AppState {
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub cast_vote_usecase: Arc<CastVoteUseCase>,
    pub reveal_votes_usecase: Arc<RevealVotesUseCase>,
    pub reset_room_usecase: Arc<ResetRoomUseCase>,
    pub next_round_usecase: Arc<NextRoundUseCase>,
    pub remove_member_usecase: Arc<RemoveMemberUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    pub room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Raw pusher handle for connection registration and targeted rejections.
    pub message_pusher: Arc<dyn MessagePusher>,
}
