//! UI layer: the axum server, its routes, and the per-connection WebSocket
//! gateway.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, build_router};
