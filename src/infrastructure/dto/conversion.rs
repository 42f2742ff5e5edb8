//! Conversion logic between domain entities and wire DTOs.
//!
//! Every outbound payload is derived here from a locked `Room`, so the
//! use-case layer builds broadcasts inside the same critical section as the
//! mutation that caused them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Member, Room, RoundSnapshot};

use super::websocket::{
    EventType, MemberInfo, RoomJoinedMessage, UserListMessage, VoteHistoryMessage,
    VoteUpdateMessage, VotingStatusMessage,
};

impl From<&Member> for MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username.as_str().to_string(),
            role: member.role,
            is_facilitator: member.is_facilitator,
        }
    }
}

fn snapshot_to_map(snapshot: &RoundSnapshot) -> BTreeMap<String, String> {
    snapshot
        .votes()
        .iter()
        .map(|(username, vote)| (username.as_str().to_string(), vote.as_str().to_string()))
        .collect()
}

fn voted_map(room: &Room) -> BTreeMap<String, bool> {
    room.ballot_status()
        .into_iter()
        .map(|(username, voted)| (username.into_string(), voted))
        .collect()
}

fn history_maps(room: &Room) -> Vec<BTreeMap<String, String>> {
    room.history().iter().map(snapshot_to_map).collect()
}

/// Roster broadcast, in join order.
pub fn user_list(room: &Room) -> UserListMessage {
    UserListMessage {
        r#type: EventType::UserList,
        members: room.members().iter().map(MemberInfo::from).collect(),
    }
}

/// Current-round vote values, membership-pruned.
pub fn vote_update(room: &Room) -> VoteUpdateMessage {
    VoteUpdateMessage {
        r#type: EventType::VoteUpdate,
        votes: snapshot_to_map(&room.votes_view()),
    }
}

/// Masked voting progress of the current round.
pub fn voting_status(room: &Room) -> VotingStatusMessage {
    VotingStatusMessage {
        r#type: EventType::VotingStatus,
        all_have_voted: room.all_have_voted(),
        voted: voted_map(room),
    }
}

/// Completed rounds, oldest first.
pub fn vote_history(room: &Room) -> VoteHistoryMessage {
    VoteHistoryMessage {
        r#type: EventType::VoteHistory,
        history: history_maps(room),
    }
}

/// Snapshot for a freshly joined connection: roster, voting progress, and
/// the rounds played so far. Vote values are not included; they arrive via
/// `vote-update` according to the reveal policy.
pub fn room_joined(room: &Room) -> RoomJoinedMessage {
    RoomJoinedMessage {
        r#type: EventType::RoomJoined,
        room_id: room.id.as_str().to_string(),
        members: room.members().iter().map(MemberInfo::from).collect(),
        all_have_voted: room.all_have_voted(),
        voted: voted_map(room),
        history: history_maps(room),
    }
}

/// Serialize an outbound event to its wire form.
///
/// Outbound DTOs contain only maps with string keys and plain fields, so
/// serialization cannot fail.
pub fn encode<T: Serialize>(event: &T) -> String {
    serde_json::to_string(event).expect("outbound event serializes")
}
