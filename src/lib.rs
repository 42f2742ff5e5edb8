//! Planning poker session server library.
//!
//! This library implements the room session core of a real-time collaborative
//! estimation tool: members join named rooms, cast hidden votes, and reveal
//! them in synchronized rounds over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
