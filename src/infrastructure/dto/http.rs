//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// One entry of the `/api/rooms` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub member_count: usize,
    pub rounds_played: usize,
    pub created_at: String,
}

/// Roster entry of a room detail response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetailDto {
    pub username: String,
    pub role: Role,
    pub is_facilitator: bool,
    pub joined_at: String,
}

/// Response of `/api/rooms/{room_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub members: Vec<MemberDetailDto>,
    pub votes_cast: usize,
    pub rounds_played: usize,
    pub created_at: String,
}
