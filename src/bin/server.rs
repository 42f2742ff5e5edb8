//! Planning poker session server.
//!
//! Members join named rooms over WebSocket, cast hidden votes, and reveal
//! them in synchronized rounds.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! cargo run --bin server -- --open-ballots
//! ```

use std::sync::Arc;

use clap::Parser;
use planning_poker_rs::{
    common::{logger::setup_logger, time::SystemClock},
    domain::SessionPolicy,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
    },
    ui::{Server, state::AppState},
    usecase::{
        CastVoteUseCase, DisconnectUseCase, GetRoomDetailUseCase, JoinRoomUseCase,
        ListRoomsUseCase, NextRoundUseCase, RemoveMemberUseCase, ResetRoomUseCase,
        RevealVotesUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Planning poker session server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Broadcast raw vote values on every cast instead of masking them
    /// until a reveal is requested
    #[arg(long)]
    open_ballots: bool,

    /// Allow only one member at a time to hold the facilitator flag
    #[arg(long)]
    exclusive_facilitator: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let policy = SessionPolicy {
        open_ballots: args.open_ballots,
        exclusive_facilitator: args.exclusive_facilitator,
    };

    // Initialize dependencies in order:
    // 1. Clock and registry
    // 2. MessagePusher
    // 3. UseCases
    // 4. AppState and server

    let clock = Arc::new(SystemClock);
    let registry = Arc::new(InMemoryRoomRegistry::new(clock.clone()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    let state = AppState {
        join_room_usecase: Arc::new(JoinRoomUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
            policy,
        )),
        cast_vote_usecase: Arc::new(CastVoteUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            policy,
        )),
        reveal_votes_usecase: Arc::new(RevealVotesUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        reset_room_usecase: Arc::new(ResetRoomUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        next_round_usecase: Arc::new(NextRoundUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        remove_member_usecase: Arc::new(RemoveMemberUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        disconnect_usecase: Arc::new(DisconnectUseCase::new(
            registry.clone(),
            message_pusher.clone(),
        )),
        list_rooms_usecase: Arc::new(ListRoomsUseCase::new(registry.clone())),
        room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(registry)),
        message_pusher,
    };

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
