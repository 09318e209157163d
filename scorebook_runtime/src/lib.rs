#![forbid(unsafe_code)]

//! Scorebook runtime
//!
//! Wraps the deterministic engine with persistence: game documents, a
//! binary event log, state snapshots, replay and drift checks, and the
//! `GameSession` that turns recording actions into events.
//!
//! No scoring logic lives here; every transition is delegated to the engine.

pub mod config;
pub mod proto_types;
pub mod proto_bridge;
pub mod event_store;
pub mod game_store;
pub mod snapshot_codec;
pub mod snapshot;
pub mod replay;
pub mod drift;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::RuntimeConfig;
pub use game_store::{GameRepository, InMemoryRepository, JsonDirRepository};
pub use session::{GameSession, SessionError};
