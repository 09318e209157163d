#![forbid(unsafe_code)]

//! Scorebook engine: the deterministic kernel of an event-sourced
//! baseball scorebook. A game is an append-only log of events; every
//! derived view (state, line score, stats) is a pure function of it.

/// Version of the scoring rules baked into the projector. Part of the
/// canonical state hash, so a behavioral change must bump it.
pub const RULES_VERSION: u32 = 1;

pub mod arithmetic;
pub mod domain;
pub mod events;
pub mod catalog;
pub mod state;
pub mod advancement;
pub mod transitions;
pub mod invariants;
pub mod inning;
pub mod factory;
pub mod stats;
pub mod scoresheet;
pub mod hashing;
pub mod engine;

#[cfg(test)]
mod fixtures;

pub use catalog::{ResultCatalog, ResultOption, TableCatalog};
pub use domain::{Game, GameState};
pub use engine::{Engine, Projection};
pub use events::GameEvent;
