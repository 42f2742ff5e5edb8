//! WebSocket connection gateway.
//!
//! Each connection gets a fresh [`ConnectionId`], an outbound channel
//! registered with the pusher, and a pair of tasks: one draining inbound
//! events into the use-case layer, one pushing outbound frames to the
//! socket. The identity a connection acts under (room + username) is bound
//! by its first `join-room` event and re-bound by later ones.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, RoomId, Username, VoteValue},
    infrastructure::dto::{
        conversion::encode,
        websocket::{ActionRejectedMessage, ClientEvent, EventType},
    },
    usecase::SessionError,
};

use super::super::state::AppState;

/// The identity a connection acts under once it has joined a room.
#[derive(Debug, Clone)]
struct SessionBinding {
    room_id: RoomId,
    username: Username,
}

type SharedBinding = Arc<Mutex<Option<SessionBinding>>>;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns the task that drains the outbound channel into the WebSocket.
///
/// The loop ends when the pusher drops the sender (force-close or
/// unregistration); the socket is then closed so the client notices.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // Create and register the channel this connection receives events on
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_connection(connection_id, tx)
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let binding: SharedBinding = Arc::new(Mutex::new(None));

    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_binding = binding.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_event(&recv_state, connection_id, &recv_binding, &text).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Reconcile the room the connection was bound to, then drop the channel
    let bound = binding.lock().await.take();
    if let Some(bound) = bound {
        state
            .disconnect_usecase
            .execute(connection_id, bound.room_id, bound.username)
            .await;
    }
    state
        .message_pusher
        .unregister_connection(connection_id)
        .await;
    tracing::info!("Connection '{}' closed", connection_id);
}

async fn handle_event(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    binding: &SharedBinding,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse event from '{}': {}", connection_id, e);
            let error = SessionError::Malformed(e.to_string());
            reject(state, connection_id, &error).await;
            return;
        }
    };

    if let Err(error) = dispatch(state, connection_id, binding, event).await {
        tracing::debug!("Event from '{}' rejected: {}", connection_id, error);
        reject(state, connection_id, &error).await;
    }
}

async fn dispatch(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    binding: &SharedBinding,
    event: ClientEvent,
) -> Result<(), SessionError> {
    match event {
        ClientEvent::JoinRoom {
            room_id,
            username,
            role,
        } => {
            let room_id = RoomId::new(room_id)?;
            let username = Username::new(username)?;
            let role = role.unwrap_or_default();

            // A bound connection that joins elsewhere departs its old room first
            let previous = binding.lock().await.clone();
            if let Some(previous) = previous
                && (previous.room_id != room_id || previous.username != username)
            {
                state
                    .disconnect_usecase
                    .execute(connection_id, previous.room_id, previous.username)
                    .await;
            }

            state
                .join_room_usecase
                .execute(connection_id, room_id.clone(), username.clone(), role)
                .await;
            *binding.lock().await = Some(SessionBinding { room_id, username });
            Ok(())
        }
        ClientEvent::CastVote {
            room_id,
            username,
            vote,
        } => {
            let room_id = RoomId::new(room_id)?;
            let username = Username::new(username)?;
            let vote = VoteValue::new(vote)?;
            state
                .cast_vote_usecase
                .execute(room_id, username, vote)
                .await?;
            Ok(())
        }
        ClientEvent::RequestVotes { room_id } => {
            let room_id = RoomId::new(room_id)?;
            let sender = bound_username(binding).await?;
            state.reveal_votes_usecase.execute(room_id, sender).await
        }
        ClientEvent::ResetRoom { room_id } => {
            let room_id = RoomId::new(room_id)?;
            let sender = bound_username(binding).await?;
            state.reset_room_usecase.execute(room_id, sender).await
        }
        ClientEvent::NextRound { room_id } => {
            let room_id = RoomId::new(room_id)?;
            let sender = bound_username(binding).await?;
            state.next_round_usecase.execute(room_id, sender).await?;
            Ok(())
        }
        ClientEvent::RemoveUser {
            room_id,
            target_username,
        } => {
            let room_id = RoomId::new(room_id)?;
            let target = Username::new(target_username)?;
            let sender = bound_username(binding).await?;
            state
                .remove_member_usecase
                .execute(room_id, sender, target)
                .await
        }
    }
}

/// Identity the connection is currently acting under; privileged events from
/// an unbound connection are refused.
async fn bound_username(binding: &SharedBinding) -> Result<Username, SessionError> {
    binding
        .lock()
        .await
        .as_ref()
        .map(|b| b.username.clone())
        .ok_or(SessionError::NotJoined)
}

/// Report a refused event to the offending connection only.
async fn reject(state: &Arc<AppState>, connection_id: ConnectionId, error: &SessionError) {
    let message = ActionRejectedMessage {
        r#type: EventType::ActionRejected,
        code: error.code().to_string(),
        reason: error.to_string(),
    };
    if let Err(e) = state
        .message_pusher
        .push_to(connection_id, &encode(&message))
        .await
    {
        tracing::debug!(
            "Failed to send action-rejected to '{}': {}",
            connection_id,
            e
        );
    }
}
