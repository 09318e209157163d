//! Drift detection: determinism verification and state comparison.
//!
//! Replaying a log must always give the same state. These checks catch
//! a nondeterministic rule or a snapshot that no longer matches its log.

use std::path::Path;

use thiserror::Error;

use scorebook_engine::catalog::ResultCatalog;
use scorebook_engine::domain::TeamSide;
use scorebook_engine::engine::Engine;
use scorebook_engine::hashing::canonical_hash;
use scorebook_engine::{Game, GameState};

use crate::replay;
use crate::snapshot::{load_latest_snapshot, verify_snapshot};
use crate::snapshot_codec::SnapshotError;

#[derive(Debug, Error)]
pub enum DeterminismError {
    #[error("two replays produced different hashes: {first} vs {second}")]
    ReplayDiverged { first: String, second: String },
    #[error("snapshot at {event_count} events drifted from replay: {report}")]
    SnapshotDrift { event_count: u64, report: DriftReport },
    #[error("newest snapshot is unusable: {0}")]
    UnusableSnapshot(#[from] SnapshotError),
}

/// Replay the log twice and require identical hashes. Returns the hash.
pub fn verify_determinism<C: ResultCatalog>(
    game: &Game,
    engine: &Engine<C>,
) -> Result<String, DeterminismError> {
    let first = replay::rebuild_hash(game, engine);
    let second = replay::rebuild_hash(game, engine);
    if first != second {
        return Err(DeterminismError::ReplayDiverged { first, second });
    }
    Ok(first)
}

/// Compare the newest valid snapshot against a replay of the same prefix.
/// `Ok(None)` when there is no snapshot at all. A snapshot that cannot
/// be read or fails verification is reported, not skipped.
pub fn verify_snapshot_consistency<C: ResultCatalog>(
    game: &Game,
    engine: &Engine<C>,
    snapshot_dir: &Path,
) -> Result<Option<u64>, DeterminismError> {
    let Some(snap) = load_latest_snapshot(snapshot_dir, game.events.len() as u64)? else {
        return Ok(None);
    };
    let stored = verify_snapshot(&snap, game)?;
    let replayed = engine.project_prefix(game, snap.event_count as usize);
    let report = compare_states(&stored, &replayed);
    if !report.is_clean() {
        return Err(DeterminismError::SnapshotDrift {
            event_count: snap.event_count,
            report,
        });
    }
    Ok(Some(snap.event_count))
}

/// One field that differs between two states, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub field: String,
    pub left: String,
    pub right: String,
}

/// Field-by-field comparison of two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub hash_left: String,
    pub hash_right: String,
    pub differences: Vec<Difference>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.differences.is_empty() && self.hash_left == self.hash_right
    }
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.differences.is_empty() {
            return write!(f, "no field differences");
        }
        let parts: Vec<String> = self
            .differences
            .iter()
            .map(|d| format!("{}: {} != {}", d.field, d.left, d.right))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

struct Collector(Vec<Difference>);

impl Collector {
    fn check<T: std::fmt::Debug + PartialEq>(&mut self, field: &str, left: &T, right: &T) {
        if left != right {
            self.0.push(Difference {
                field: field.to_string(),
                left: format!("{:?}", left),
                right: format!("{:?}", right),
            });
        }
    }
}

pub fn compare_states(left: &GameState, right: &GameState) -> DriftReport {
    let mut c = Collector(Vec::new());
    c.check("inning", &left.inning, &right.inning);
    c.check("halfInning", &left.half_inning, &right.half_inning);
    c.check("outs", &left.outs, &right.outs);
    c.check("runners.first", &left.runners.first, &right.runners.first);
    c.check("runners.second", &left.runners.second, &right.runners.second);
    c.check("runners.third", &left.runners.third, &right.runners.third);
    for side in [TeamSide::Home, TeamSide::Away] {
        let name = match side {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        };
        c.check(&format!("score.{}", name), left.score.get(side), right.score.get(side));
        c.check(
            &format!("inningScores.{}", name),
            left.inning_scores.get(side),
            right.inning_scores.get(side),
        );
        c.check(
            &format!("currentBatterIndex.{}", name),
            left.current_batter_index.get(side),
            right.current_batter_index.get(side),
        );
        c.check(
            &format!("currentPitcher.{}", name),
            left.current_pitcher.get(side),
            right.current_pitcher.get(side),
        );
    }

    DriftReport {
        hash_left: canonical_hash(left),
        hash_right: canonical_hash(right),
        differences: c.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_store::InMemoryRepository;
    use crate::session::GameSession;
    use crate::snapshot::save_snapshot;
    use crate::test_support::sample_game;

    fn played_game() -> Game {
        let mut s = GameSession::new(sample_game("g"), InMemoryRepository::new());
        s.record_plate_appearance("BB").unwrap();
        s.record_plate_appearance("H2-L").unwrap();
        s.game().clone()
    }

    #[test]
    fn identical_states_are_clean() {
        let game = sample_game("g");
        let state = Engine::standard().project(&game);
        let report = compare_states(&state, &state.clone());
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "no field differences");
    }

    #[test]
    fn differences_are_named() {
        let game = sample_game("g");
        let left = Engine::standard().project(&game);
        let mut right = left.clone();
        right.score.away = 3;
        right.runners.second = Some("a2".into());

        let report = compare_states(&left, &right);
        assert!(!report.is_clean());
        let fields: Vec<&str> = report.differences.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["runners.second", "score.away"]);
        assert_ne!(report.hash_left, report.hash_right);
    }

    #[test]
    fn replay_is_deterministic() {
        let game = sample_game("g");
        let engine = Engine::standard();
        let hash = verify_determinism(&game, &engine).unwrap();
        assert_eq!(hash, canonical_hash(&engine.project(&game)));
    }

    #[test]
    fn no_snapshot_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let game = played_game();
        let result = verify_snapshot_consistency(&game, &Engine::standard(), dir.path());
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn consistent_snapshot_reports_its_count() {
        let dir = tempfile::tempdir().unwrap();
        let game = played_game();
        let engine = Engine::standard();
        save_snapshot(dir.path(), &game, 2, &engine.project(&game)).unwrap();
        assert_eq!(verify_snapshot_consistency(&game, &engine, dir.path()).unwrap(), Some(2));
    }

    #[test]
    fn unreadable_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let game = played_game();
        let engine = Engine::standard();
        let path = save_snapshot(dir.path(), &game, 1, &engine.project_prefix(&game, 1)).unwrap();
        std::fs::write(&path, "{ broken").unwrap();

        assert!(matches!(
            verify_snapshot_consistency(&game, &engine, dir.path()),
            Err(DeterminismError::UnusableSnapshot(SnapshotError::Deserialization(_)))
        ));
    }

    #[test]
    fn snapshot_from_another_log_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let game = played_game();
        let engine = Engine::standard();
        save_snapshot(dir.path(), &game, 2, &engine.project(&game)).unwrap();

        let mut rewritten = game.clone();
        rewritten.events[1].header_mut().id = "other".into();
        assert!(matches!(
            verify_snapshot_consistency(&rewritten, &engine, dir.path()),
            Err(DeterminismError::UnusableSnapshot(SnapshotError::LogMismatch { .. }))
        ));
    }
}
