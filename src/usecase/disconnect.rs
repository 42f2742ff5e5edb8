//! UseCase: reconcile a closed connection with its room.
//!
//! Runs when a socket winds down (or when a bound connection re-joins a
//! different room). The member is removed only if the roster entry still
//! belongs to the closing connection, so a user who already rejoined from a
//! fresh connection is left alone.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRegistry, Username};
use crate::infrastructure::dto::conversion::{encode, user_list};

pub struct DisconnectUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// Returns whether a member was actually removed from the roster.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        username: Username,
    ) -> bool {
        let Some(room) = self.registry.get(&room_id).await else {
            // a binding always refers to a created room; log and move on
            tracing::warn!(
                "Disconnect of '{}' references unknown room '{}'",
                username,
                room_id
            );
            return false;
        };
        let mut room = room.lock().await;

        let removed = room.remove_member_connection(&username, connection_id);
        if removed {
            let roster_json = encode(&user_list(&room));
            if let Err(e) = self
                .message_pusher
                .broadcast_to_room(&room_id, &roster_json)
                .await
            {
                tracing::warn!("Failed to broadcast user-list for room '{}': {}", room_id, e);
            }
            tracing::info!("'{}' left room '{}'", username, room_id);
        } else {
            tracing::debug!(
                "Stale disconnect of '{}' in room '{}' ignored",
                username,
                room_id
            );
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::FixedClock;
    use crate::domain::{Role, Timestamp, VoteValue};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
    };
    use serde_json::Value;
    use tokio::sync::mpsc;

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    struct Fixture {
        usecase: DisconnectUseCase,
        registry: Arc<InMemoryRoomRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn create_fixture() -> Fixture {
        let registry = Arc::new(InMemoryRoomRegistry::new(Arc::new(FixedClock::new(1000))));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectUseCase::new(registry.clone(), pusher.clone());
        Fixture {
            usecase,
            registry,
            pusher,
        }
    }

    impl Fixture {
        async fn join(
            &self,
            room: &str,
            name: &str,
        ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
            let connection_id = ConnectionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            self.pusher.register_connection(connection_id, tx).await;
            self.pusher.subscribe(connection_id, room_id(room)).await;
            let handle = self.registry.get_or_create(&room_id(room)).await;
            handle.lock().await.admit(
                username(name),
                Role::Developer,
                connection_id,
                Timestamp::new(1000),
                false,
            );
            (connection_id, rx)
        }
    }

    fn parse(raw: String) -> Value {
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_disconnect_removes_member_and_broadcasts_roster() {
        let fixture = create_fixture();
        let (alice_conn, _alice_rx) = fixture.join("ABCD", "alice").await;
        let (_, mut bob_rx) = fixture.join("ABCD", "bob").await;

        let removed = fixture
            .usecase
            .execute(alice_conn, room_id("ABCD"), username("alice"))
            .await;

        assert!(removed);
        let roster = parse(bob_rx.recv().await.unwrap());
        assert_eq!(roster["type"], "user-list");
        assert_eq!(roster["members"].as_array().unwrap().len(), 1);
        assert_eq!(roster["members"][0]["username"], "bob");
    }

    #[tokio::test]
    async fn test_stale_disconnect_leaves_rejoined_member_alone() {
        let fixture = create_fixture();
        let (stale_conn, _stale_rx) = fixture.join("ABCD", "alice").await;
        // alice rejoins from a fresh connection; the roster entry is replaced
        let (_fresh_conn, mut fresh_rx) = fixture.join("ABCD", "alice").await;

        let removed = fixture
            .usecase
            .execute(stale_conn, room_id("ABCD"), username("alice"))
            .await;

        assert!(!removed);
        assert!(fresh_rx.try_recv().is_err());
        let room = fixture.registry.get(&room_id("ABCD")).await.unwrap();
        assert_eq!(room.lock().await.member_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_does_not_touch_other_rooms() {
        let fixture = create_fixture();
        let (alice_conn, _alice_rx) = fixture.join("ABCD", "alice").await;
        let (_, mut carol_rx) = fixture.join("WXYZ", "carol").await;

        fixture
            .usecase
            .execute(alice_conn, room_id("ABCD"), username("alice"))
            .await;

        assert!(carol_rx.try_recv().is_err());
        let other = fixture.registry.get(&room_id("WXYZ")).await.unwrap();
        assert_eq!(other.lock().await.member_count(), 1);
    }

    #[tokio::test]
    async fn test_departed_members_vote_is_pruned_from_views() {
        let fixture = create_fixture();
        let (alice_conn, _alice_rx) = fixture.join("ABCD", "alice").await;
        let (_, _bob_rx) = fixture.join("ABCD", "bob").await;
        {
            let room = fixture.registry.get(&room_id("ABCD")).await.unwrap();
            let mut room = room.lock().await;
            room.record_vote(&username("alice"), VoteValue::new("5".to_string()).unwrap());
            room.record_vote(&username("bob"), VoteValue::new("8".to_string()).unwrap());
        }

        fixture
            .usecase
            .execute(alice_conn, room_id("ABCD"), username("alice"))
            .await;

        let room = fixture.registry.get(&room_id("ABCD")).await.unwrap();
        let room = room.lock().await;
        let view = room.votes_view();
        assert_eq!(view.len(), 1);
        assert_eq!(
            view.votes().get(&username("bob")).map(|v| v.as_str()),
            Some("8")
        );
    }

    #[tokio::test]
    async fn test_disconnect_with_unknown_room_is_a_no_op() {
        let fixture = create_fixture();

        let removed = fixture
            .usecase
            .execute(ConnectionId::generate(), room_id("NOPE"), username("alice"))
            .await;

        assert!(!removed);
    }
}
