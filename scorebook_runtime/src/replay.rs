//! Replay orchestrator: rebuild a game's state from its event log.
//!
//! All scoring logic is delegated to the engine. A snapshot only ever
//! shortens the fold; it never changes its result.

use std::path::Path;

use tracing::{debug, warn};

use scorebook_engine::catalog::ResultCatalog;
use scorebook_engine::engine::{Engine, Projection};
use scorebook_engine::hashing::canonical_hash;
use scorebook_engine::{Game, GameState};

use crate::snapshot::{load_latest_snapshot, verify_snapshot};

/// Rebuild the state from the full log and return it with its canonical hash.
pub fn rebuild_state<C: ResultCatalog>(game: &Game, engine: &Engine<C>) -> (GameState, String) {
    let state = engine.project(game);
    let hash = canonical_hash(&state);
    (state, hash)
}

pub fn rebuild_hash<C: ResultCatalog>(game: &Game, engine: &Engine<C>) -> String {
    rebuild_state(game, engine).1
}

/// Where a resumed projection started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaySource {
    Full,
    Snapshot { event_count: u64 },
}

/// Resume from the newest usable snapshot in `snapshot_dir` and replay
/// the tail. An unreadable or stale snapshot falls back to full replay.
pub fn resume_or_rebuild<C: ResultCatalog>(
    game: &Game,
    engine: &Engine<C>,
    snapshot_dir: &Path,
) -> (Projection, ReplaySource) {
    let snap = match load_latest_snapshot(snapshot_dir, game.events.len() as u64) {
        Ok(snap) => snap,
        Err(e) => {
            warn!(game_id = %game.id, "snapshot unreadable, replaying in full: {}", e);
            None
        }
    };

    if let Some(snap) = snap {
        match verify_snapshot(&snap, game) {
            Ok(state) => {
                debug!(
                    game_id = %game.id,
                    event_count = snap.event_count,
                    tail = game.events.len() as u64 - snap.event_count,
                    "resuming from snapshot"
                );
                let projection = engine.resume(game, state, snap.event_count as usize);
                return (
                    projection,
                    ReplaySource::Snapshot {
                        event_count: snap.event_count,
                    },
                );
            }
            Err(e) => {
                warn!(
                    game_id = %game.id,
                    event_count = snap.event_count,
                    "snapshot rejected, replaying in full: {}",
                    e
                );
            }
        }
    }

    (engine.project_with_diagnostics(game), ReplaySource::Full)
}
