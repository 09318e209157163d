//! Snapshot layer: derived-state checkpoints for a game's event log.
//!
//! A snapshot records the state after the first `event_count` events,
//! the id of the last of them, and the canonical replay hash. No
//! timestamps in snapshot content.
//!
//! A snapshot is only a cache: if its hash, rules version or last event
//! id disagree with what is on file, the caller falls back to full replay.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use scorebook_engine::hashing::canonical_hash;
use scorebook_engine::{Game, GameState, RULES_VERSION};

use crate::snapshot_codec::{encode_state, restore_state, SnapshotError};

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Number of events folded into `state_json`.
    pub event_count: u64,
    /// Id of event `event_count - 1`; empty for the opening state.
    pub last_event_id: String,
    /// Encoded `GameState`.
    pub state_json: String,
    /// Canonical replay hash of the state.
    pub hash: String,
    pub rules_version: u32,
}

fn file_name(event_count: u64) -> String {
    format!("snapshot_{:06}.json", event_count)
}

fn parse_file_name(name: &str) -> Option<u64> {
    name.strip_prefix("snapshot_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Save a snapshot of `state` taken after the first `event_count` events
/// of `game`.
pub fn save_snapshot(
    dir: &Path,
    game: &Game,
    event_count: usize,
    state: &GameState,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let last_event_id = event_count
        .checked_sub(1)
        .and_then(|i| game.events.get(i))
        .map(|e| e.id().to_string())
        .unwrap_or_default();

    let snap = Snapshot {
        event_count: event_count as u64,
        last_event_id,
        state_json: encode_state(state)?,
        hash: canonical_hash(state),
        rules_version: RULES_VERSION,
    };

    let path = dir.join(file_name(snap.event_count));
    let content = serde_json::to_string(&snap).map_err(SnapshotError::Serialization)?;
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    debug!(event_count, path = %path.display(), "snapshot saved");
    Ok(path)
}

/// Load the snapshot taken at `event_count`, if present.
pub fn load_snapshot(dir: &Path, event_count: u64) -> Result<Option<Snapshot>, SnapshotError> {
    let path = dir.join(file_name(event_count));
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let snap = serde_json::from_str(&content).map_err(SnapshotError::Deserialization)?;
    Ok(Some(snap))
}

fn snapshot_counts(dir: &Path) -> Result<Vec<u64>, SnapshotError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut counts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if let Some(count) = parse_file_name(&name.to_string_lossy()) {
            counts.push(count);
        }
    }
    counts.sort_unstable();
    Ok(counts)
}

/// Load the newest snapshot covering at most `max_count` events.
pub fn load_latest_snapshot(dir: &Path, max_count: u64) -> Result<Option<Snapshot>, SnapshotError> {
    match snapshot_counts(dir)?.into_iter().filter(|c| *c <= max_count).max() {
        Some(count) => load_snapshot(dir, count),
        None => Ok(None),
    }
}

/// Check a snapshot against the current rules and the game's log, and
/// decode its state.
pub fn verify_snapshot(snap: &Snapshot, game: &Game) -> Result<GameState, SnapshotError> {
    if snap.rules_version != RULES_VERSION {
        return Err(SnapshotError::RulesVersion {
            found: snap.rules_version,
            current: RULES_VERSION,
        });
    }

    let logged_id = (snap.event_count as usize)
        .checked_sub(1)
        .and_then(|i| game.events.get(i))
        .map(|e| e.id())
        .unwrap_or("");
    if snap.event_count as usize > game.events.len() || logged_id != snap.last_event_id {
        return Err(SnapshotError::LogMismatch {
            event_count: snap.event_count,
            expected: snap.last_event_id.clone(),
            found: logged_id.to_string(),
        });
    }

    let state = restore_state(&snap.state_json, game)?;
    let computed = canonical_hash(&state);
    if computed != snap.hash {
        return Err(SnapshotError::HashMismatch {
            stored: snap.hash.clone(),
            computed,
        });
    }
    Ok(state)
}

/// Remove snapshots covering more than `event_count` events. Used after
/// undo, when they describe events that no longer exist.
pub fn discard_snapshots_after(dir: &Path, event_count: u64) -> Result<usize, SnapshotError> {
    let mut removed = 0;
    for count in snapshot_counts(dir)?.into_iter().filter(|c| *c > event_count) {
        fs::remove_file(dir.join(file_name(count)))?;
        removed += 1;
    }
    if removed > 0 {
        debug!(event_count, removed, "stale snapshots discarded");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_game;
    use scorebook_engine::engine::Engine;
    use scorebook_engine::events::PlateAppearanceResult;
    use scorebook_engine::factory::{current_pitcher_id, new_plate_appearance};
    use scorebook_engine::catalog::ResultCatalog;

    fn game_with_walks(n: usize) -> Game {
        let engine = Engine::standard();
        let mut game = sample_game("g");
        let walk = engine.catalog().lookup("BB").unwrap().clone();
        for i in 0..n {
            let state = engine.project(&game);
            game.events.push(new_plate_appearance(
                &state,
                &format!("a{}", i + 1),
                current_pitcher_id(&state),
                PlateAppearanceResult {
                    category: walk.category,
                    code: walk.code.clone(),
                    label: walk.label.clone(),
                },
                Vec::new(),
                Vec::new(),
                i as u32 + 1,
            ));
        }
        game
    }

    #[test]
    fn save_then_verify() {
        let game = game_with_walks(2);
        let state = Engine::standard().project(&game);
        let dir = tempfile::tempdir().unwrap();

        save_snapshot(dir.path(), &game, 2, &state).unwrap();
        let snap = load_snapshot(dir.path(), 2).unwrap().expect("written");
        assert_eq!(snap.last_event_id, game.events[1].id());
        assert_eq!(verify_snapshot(&snap, &game).unwrap(), state);
    }

    #[test]
    fn latest_respects_the_event_bound() {
        let game = game_with_walks(3);
        let engine = Engine::standard();
        let dir = tempfile::tempdir().unwrap();
        for n in 1..=3 {
            save_snapshot(dir.path(), &game, n, &engine.project_prefix(&game, n)).unwrap();
        }

        assert_eq!(load_latest_snapshot(dir.path(), 10).unwrap().unwrap().event_count, 3);
        assert_eq!(load_latest_snapshot(dir.path(), 2).unwrap().unwrap().event_count, 2);
        assert!(load_latest_snapshot(dir.path(), 0).unwrap().is_none());
    }

    #[test]
    fn tampered_hash_is_detected() {
        let game = game_with_walks(1);
        let state = Engine::standard().project(&game);
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), &game, 1, &state).unwrap();

        let mut snap = load_snapshot(dir.path(), 1).unwrap().unwrap();
        snap.hash = "0".repeat(64);
        assert!(matches!(
            verify_snapshot(&snap, &game),
            Err(SnapshotError::HashMismatch { .. })
        ));
    }

    #[test]
    fn diverged_log_is_detected() {
        let game = game_with_walks(2);
        let engine = Engine::standard();
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), &game, 2, &engine.project(&game)).unwrap();

        let mut rewritten = game.clone();
        rewritten.events[1].header_mut().id = "other".into();
        let snap = load_snapshot(dir.path(), 2).unwrap().unwrap();
        assert!(matches!(
            verify_snapshot(&snap, &rewritten),
            Err(SnapshotError::LogMismatch { event_count: 2, .. })
        ));
    }

    #[test]
    fn discard_removes_only_newer_snapshots() {
        let game = game_with_walks(3);
        let engine = Engine::standard();
        let dir = tempfile::tempdir().unwrap();
        for n in 1..=3 {
            save_snapshot(dir.path(), &game, n, &engine.project_prefix(&game, n)).unwrap();
        }

        assert_eq!(discard_snapshots_after(dir.path(), 1).unwrap(), 2);
        assert!(load_snapshot(dir.path(), 1).unwrap().is_some());
        assert!(load_snapshot(dir.path(), 2).unwrap().is_none());
    }
}
