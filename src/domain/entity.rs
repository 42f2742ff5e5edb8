//! Session entities: rooms, members, and round snapshots.
//!
//! All state transitions of a voting round live here as synchronous methods
//! on [`Room`], so the rules can be unit-tested without any transport.

use std::collections::BTreeMap;

use super::value_object::{ConnectionId, Role, RoomId, Timestamp, Username, VoteValue};

/// A participant bound to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub username: Username,
    pub role: Role,
    pub is_facilitator: bool,
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

/// A frozen copy of the vote map at the moment a round was closed.
/// Never mutated after it is appended to the room history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundSnapshot(BTreeMap<Username, VoteValue>);

impl RoundSnapshot {
    pub fn votes(&self) -> &BTreeMap<Username, VoteValue> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of admitting a member into a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmitOutcome {
    /// Whether the admitted member holds the facilitator flag.
    pub is_facilitator: bool,
    /// Connection of a prior entry replaced by this join, if any.
    pub replaced_connection: Option<ConnectionId>,
}

/// An isolated voting session.
///
/// Membership is kept in join order and is unique by username; a second join
/// with the same username replaces the prior entry in place. The current vote
/// map may briefly hold entries for departed members; reads go through
/// [`Room::votes_view`], which prunes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    members: Vec<Member>,
    current_votes: BTreeMap<Username, VoteValue>,
    history: Vec<RoundSnapshot>,
    seen_first_join: bool,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            members: Vec::new(),
            current_votes: BTreeMap::new(),
            history: Vec::new(),
            seen_first_join: false,
        }
    }

    /// Current roster in join order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, username: &Username) -> Option<&Member> {
        self.members.iter().find(|m| &m.username == username)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_facilitator(&self, username: &Username) -> bool {
        self.member(username).is_some_and(|m| m.is_facilitator)
    }

    /// Admit a member, or replace the member currently holding that username.
    ///
    /// The very first joiner of a room is always granted the facilitator
    /// flag. Later joiners get it by claiming the facilitator role; under
    /// `exclusive_facilitator` the claim is honored only while no other
    /// member holds the flag.
    ///
    /// A replacement keeps the roster position and any pending vote of the
    /// prior entry; role and facilitator flag are taken from the new join.
    pub fn admit(
        &mut self,
        username: Username,
        role: Role,
        connection_id: ConnectionId,
        joined_at: Timestamp,
        exclusive_facilitator: bool,
    ) -> AdmitOutcome {
        let is_facilitator = if !self.seen_first_join {
            true
        } else if role == Role::Facilitator {
            !(exclusive_facilitator
                && self
                    .members
                    .iter()
                    .any(|m| m.is_facilitator && m.username != username))
        } else {
            false
        };
        self.seen_first_join = true;

        let member = Member {
            username: username.clone(),
            role,
            is_facilitator,
            connection_id,
            joined_at,
        };
        let replaced_connection = match self.members.iter_mut().find(|m| m.username == username) {
            Some(existing) => {
                let old = existing.connection_id;
                *existing = member;
                Some(old)
            }
            None => {
                self.members.push(member);
                None
            }
        };

        AdmitOutcome {
            is_facilitator,
            replaced_connection,
        }
    }

    /// Remove a member by username. Returns the removed entry, if present.
    pub fn remove_member(&mut self, username: &Username) -> Option<Member> {
        let index = self.members.iter().position(|m| &m.username == username)?;
        Some(self.members.remove(index))
    }

    /// Remove a member only if it still belongs to the given connection.
    ///
    /// Used for disconnect reconciliation: when a user has rejoined from a
    /// new connection, the stale connection's teardown must not evict the
    /// fresh entry.
    pub fn remove_member_connection(
        &mut self,
        username: &Username,
        connection_id: ConnectionId,
    ) -> bool {
        let index = self
            .members
            .iter()
            .position(|m| &m.username == username && m.connection_id == connection_id);
        match index {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Record a vote for a current member. Returns false for non-members.
    pub fn record_vote(&mut self, username: &Username, vote: VoteValue) -> bool {
        if self.member(username).is_none() {
            return false;
        }
        self.current_votes.insert(username.clone(), vote);
        true
    }

    /// Clear the current vote map. History is untouched.
    pub fn clear_votes(&mut self) {
        self.current_votes.clear();
    }

    /// Membership-pruned copy of the current vote map.
    ///
    /// Entries of departed members stay in `current_votes` until a read like
    /// this one; they never reach a broadcast or a snapshot.
    pub fn votes_view(&self) -> RoundSnapshot {
        RoundSnapshot(
            self.current_votes
                .iter()
                .filter(|(username, _)| self.member(username).is_some())
                .map(|(username, vote)| (username.clone(), vote.clone()))
                .collect(),
        )
    }

    /// Number of votes cast by current members this round.
    pub fn votes_cast(&self) -> usize {
        self.current_votes
            .keys()
            .filter(|username| self.member(username).is_some())
            .count()
    }

    /// Per-member "has voted" view of the current round.
    pub fn ballot_status(&self) -> BTreeMap<Username, bool> {
        self.members
            .iter()
            .map(|m| {
                (
                    m.username.clone(),
                    self.current_votes.contains_key(&m.username),
                )
            })
            .collect()
    }

    /// True iff every eligible voter (role other than observer) has a current
    /// vote and there is at least one eligible voter.
    pub fn all_have_voted(&self) -> bool {
        let mut eligible = self
            .members
            .iter()
            .filter(|m| m.role.is_eligible_voter())
            .peekable();
        if eligible.peek().is_none() {
            return false;
        }
        eligible.all(|m| self.current_votes.contains_key(&m.username))
    }

    /// Close the round: append the pruned vote map to history when non-empty,
    /// then clear current votes. Returns whether a snapshot was appended.
    pub fn close_round(&mut self) -> bool {
        let snapshot = self.votes_view();
        let appended = !snapshot.is_empty();
        if appended {
            self.history.push(snapshot);
        }
        self.current_votes.clear();
        appended
    }

    /// Completed rounds, oldest first.
    pub fn history(&self) -> &[RoundSnapshot] {
        &self.history
    }

    pub fn rounds_played(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomId::new("ABCD".to_string()).unwrap(), Timestamp::new(0))
    }

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn vote(value: &str) -> VoteValue {
        VoteValue::new(value.to_string()).unwrap()
    }

    fn admit(room: &mut Room, name: &str, role: Role) -> AdmitOutcome {
        room.admit(
            username(name),
            role,
            ConnectionId::generate(),
            Timestamp::new(1000),
            false,
        )
    }

    #[test]
    fn test_first_joiner_becomes_facilitator() {
        let mut room = room();

        let outcome = admit(&mut room, "alice", Role::Developer);

        assert!(outcome.is_facilitator);
        assert!(room.is_facilitator(&username("alice")));
    }

    #[test]
    fn test_second_joiner_without_claim_is_not_facilitator() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);

        let outcome = admit(&mut room, "bob", Role::Developer);

        assert!(!outcome.is_facilitator);
    }

    #[test]
    fn test_facilitator_claim_grants_flag_to_later_joiner() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);

        let outcome = admit(&mut room, "bob", Role::Facilitator);

        assert!(outcome.is_facilitator);
        // co-facilitation: both hold the flag
        assert!(room.is_facilitator(&username("alice")));
        assert!(room.is_facilitator(&username("bob")));
    }

    #[test]
    fn test_exclusive_policy_denies_second_facilitator() {
        let mut room = room();
        admit(&mut room, "alice", Role::Facilitator);

        let outcome = room.admit(
            username("bob"),
            Role::Facilitator,
            ConnectionId::generate(),
            Timestamp::new(1000),
            true,
        );

        assert!(!outcome.is_facilitator);
        assert!(room.is_facilitator(&username("alice")));
    }

    #[test]
    fn test_exclusive_policy_allows_claim_when_flag_is_unheld() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        room.remove_member(&username("alice"));
        admit(&mut room, "bob", Role::Developer);

        let outcome = room.admit(
            username("carol"),
            Role::Facilitator,
            ConnectionId::generate(),
            Timestamp::new(1000),
            true,
        );

        assert!(outcome.is_facilitator);
    }

    #[test]
    fn test_exclusive_policy_lets_holder_rejoin_as_facilitator() {
        let mut room = room();
        admit(&mut room, "alice", Role::Facilitator);
        admit(&mut room, "bob", Role::Developer);

        let outcome = room.admit(
            username("alice"),
            Role::Facilitator,
            ConnectionId::generate(),
            Timestamp::new(2000),
            true,
        );

        assert!(outcome.is_facilitator);
    }

    #[test]
    fn test_first_joiner_of_emptied_room_is_not_refounded() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        room.remove_member(&username("alice"));

        // the room has seen a member before; bob is not "the first ever"
        let outcome = admit(&mut room, "bob", Role::Developer);

        assert!(!outcome.is_facilitator);
    }

    #[test]
    fn test_rejoin_replaces_entry_in_place() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        admit(&mut room, "bob", Role::Developer);
        let old_connection = room.member(&username("alice")).unwrap().connection_id;

        let new_connection = ConnectionId::generate();
        let outcome = room.admit(
            username("alice"),
            Role::Qa,
            new_connection,
            Timestamp::new(2000),
            false,
        );

        assert_eq!(outcome.replaced_connection, Some(old_connection));
        assert_eq!(room.member_count(), 2);
        // roster position preserved
        assert_eq!(room.members()[0].username, username("alice"));
        assert_eq!(room.members()[0].role, Role::Qa);
        assert_eq!(room.members()[0].connection_id, new_connection);
        // a rejoin without a facilitator claim loses the flag
        assert!(!room.members()[0].is_facilitator);
    }

    #[test]
    fn test_rejoin_preserves_pending_vote() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        assert!(room.record_vote(&username("alice"), vote("5")));

        room.admit(
            username("alice"),
            Role::Developer,
            ConnectionId::generate(),
            Timestamp::new(2000),
            false,
        );

        assert_eq!(
            room.votes_view().votes().get(&username("alice")),
            Some(&vote("5"))
        );
    }

    #[test]
    fn test_record_vote_rejects_non_member() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);

        assert!(!room.record_vote(&username("mallory"), vote("13")));
        assert!(room.votes_view().is_empty());
    }

    #[test]
    fn test_votes_view_prunes_departed_members() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        admit(&mut room, "bob", Role::Developer);
        room.record_vote(&username("alice"), vote("5"));
        room.record_vote(&username("bob"), vote("8"));

        room.remove_member(&username("bob"));

        let view = room.votes_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view.votes().get(&username("alice")), Some(&vote("5")));
        assert_eq!(room.votes_cast(), 1);
    }

    #[test]
    fn test_all_have_voted_requires_every_eligible_voter() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        admit(&mut room, "bob", Role::Developer);

        room.record_vote(&username("alice"), vote("5"));
        assert!(!room.all_have_voted());

        room.record_vote(&username("bob"), vote("8"));
        assert!(room.all_have_voted());
    }

    #[test]
    fn test_all_have_voted_excludes_observers() {
        let mut room = room();
        admit(&mut room, "alice", Role::Facilitator);
        admit(&mut room, "carol", Role::Observer);

        // no votes cast by anyone
        assert!(!room.all_have_voted());

        // alice is the sole eligible voter
        room.record_vote(&username("alice"), vote("3"));
        assert!(room.all_have_voted());
    }

    #[test]
    fn test_all_have_voted_is_false_without_eligible_voters() {
        let mut room = room();
        admit(&mut room, "carol", Role::Observer);
        room.record_vote(&username("carol"), vote("1"));

        assert!(!room.all_have_voted());
    }

    #[test]
    fn test_ballot_status_tracks_each_member() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        admit(&mut room, "bob", Role::Developer);
        room.record_vote(&username("alice"), vote("5"));

        let status = room.ballot_status();

        assert_eq!(status.get(&username("alice")), Some(&true));
        assert_eq!(status.get(&username("bob")), Some(&false));
    }

    #[test]
    fn test_clear_votes_leaves_history_untouched() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        room.record_vote(&username("alice"), vote("5"));
        room.close_round();
        room.record_vote(&username("alice"), vote("8"));

        room.clear_votes();

        assert!(room.votes_view().is_empty());
        assert_eq!(room.rounds_played(), 1);
    }

    #[test]
    fn test_close_round_appends_snapshot_and_clears() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);
        admit(&mut room, "bob", Role::Developer);
        room.record_vote(&username("alice"), vote("5"));
        room.record_vote(&username("bob"), vote("8"));

        let appended = room.close_round();

        assert!(appended);
        assert!(room.votes_view().is_empty());
        assert_eq!(room.rounds_played(), 1);
        let snapshot = &room.history()[0];
        assert_eq!(snapshot.votes().get(&username("alice")), Some(&vote("5")));
        assert_eq!(snapshot.votes().get(&username("bob")), Some(&vote("8")));
    }

    #[test]
    fn test_close_round_without_votes_appends_nothing() {
        let mut room = room();
        admit(&mut room, "alice", Role::Developer);

        let appended = room.close_round();

        assert!(!appended);
        assert_eq!(room.rounds_played(), 0);
    }

    #[test]
    fn test_remove_member_connection_requires_matching_connection() {
        let mut room = room();
        let stale = ConnectionId::generate();
        room.admit(
            username("alice"),
            Role::Developer,
            stale,
            Timestamp::new(1000),
            false,
        );
        // alice rejoins from a fresh connection
        let fresh = ConnectionId::generate();
        room.admit(
            username("alice"),
            Role::Developer,
            fresh,
            Timestamp::new(2000),
            false,
        );

        // the stale connection's teardown must not evict the fresh entry
        assert!(!room.remove_member_connection(&username("alice"), stale));
        assert_eq!(room.member_count(), 1);

        assert!(room.remove_member_connection(&username("alice"), fresh));
        assert_eq!(room.member_count(), 0);
    }
}
