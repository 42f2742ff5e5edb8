//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    common::time::timestamp_to_rfc3339,
    domain::RoomId,
    infrastructure::dto::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    usecase::SessionError,
};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.list_rooms_usecase.execute().await;

    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            id: room.id.as_str().to_string(),
            member_count: room.member_count(),
            rounds_played: room.rounds_played(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state.room_detail_usecase.execute(room_id).await {
        Ok(room) => {
            let room_detail = RoomDetailDto {
                id: room.id.as_str().to_string(),
                members: room
                    .members()
                    .iter()
                    .map(|member| MemberDetailDto {
                        username: member.username.as_str().to_string(),
                        role: member.role,
                        is_facilitator: member.is_facilitator,
                        joined_at: timestamp_to_rfc3339(member.joined_at.value()),
                    })
                    .collect(),
                votes_cast: room.votes_cast(),
                rounds_played: room.rounds_played(),
                created_at: timestamp_to_rfc3339(room.created_at.value()),
            };
            Ok(Json(room_detail))
        }
        Err(SessionError::UnknownRoom(_)) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
