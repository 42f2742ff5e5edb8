//! WebSocket event DTOs.
//!
//! Inbound events are internally tagged on `type` with camelCase payload
//! fields; outbound events carry the same framing so a client can switch on
//! one field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Outbound event discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    RoomJoined,
    UserList,
    VoteUpdate,
    VotingStatus,
    VoteHistory,
    ActionRejected,
}

/// Inbound session events (client -> server).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        username: String,
        #[serde(default)]
        role: Option<Role>,
    },
    #[serde(rename_all = "camelCase")]
    CastVote {
        room_id: String,
        username: String,
        vote: String,
    },
    #[serde(rename_all = "camelCase")]
    RequestVotes { room_id: String },
    #[serde(rename_all = "camelCase")]
    ResetRoom { room_id: String },
    #[serde(rename_all = "camelCase")]
    NextRound { room_id: String },
    #[serde(rename_all = "camelCase")]
    RemoveUser {
        room_id: String,
        target_username: String,
    },
}

/// One roster entry of a `user-list` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub username: String,
    pub role: Role,
    pub is_facilitator: bool,
}

/// Snapshot sent to a connection right after it joins a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedMessage {
    pub r#type: EventType,
    pub room_id: String,
    pub members: Vec<MemberInfo>,
    pub all_have_voted: bool,
    pub voted: BTreeMap<String, bool>,
    pub history: Vec<BTreeMap<String, String>>,
}

/// Full roster broadcast, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListMessage {
    pub r#type: EventType,
    pub members: Vec<MemberInfo>,
}

/// Current-round vote values (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdateMessage {
    pub r#type: EventType,
    pub votes: BTreeMap<String, String>,
}

/// Masked per-member progress of the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatusMessage {
    pub r#type: EventType,
    pub all_have_voted: bool,
    pub voted: BTreeMap<String, bool>,
}

/// Completed rounds, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteHistoryMessage {
    pub r#type: EventType,
    pub history: Vec<BTreeMap<String, String>>,
}

/// Sent only to the offending connection when an event is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRejectedMessage {
    pub r#type: EventType,
    pub code: String,
    pub reason: String,
}
