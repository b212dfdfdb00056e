//! WebSocket layer: connection handling, commands and subscriptions.
//!
//! The endpoint at `/ws` streams economy events for the accounts a client
//! subscribes to and answers a few read-only commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
