//! Game session: the recording surface over one game.
//!
//! A session owns the game document, its derived state and, optionally,
//! a binary event log with snapshots. Every action builds an event from
//! the current state, applies it, persists it, then runs the inning
//! policy.
//!
//! Apply-before-persist order:
//!   1. engine.step(state, event)   pure; anomalies are logged, never fatal
//!   2. event_store.append()        only if step 1 produced a state
//!   3. repository.save_game()
//!   4. snapshot if the interval is reached

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use scorebook_engine::advancement::{resolve, Advancement, Resolution};
use scorebook_engine::catalog::{ResultCatalog, TableCatalog};
use scorebook_engine::domain::{Base, Destination, GameStatus, PlayerId};
use scorebook_engine::engine::Engine;
use scorebook_engine::events::{PlateAppearanceResult, Rbi, RunnerEventKind, RunnerMovement};
use scorebook_engine::factory::{
    current_batter_id, current_pitcher_id, defense_team, new_game, new_inning_change,
    new_pitcher_change, new_plate_appearance, new_runner_event, order_in_inning, GameSetup,
};
use scorebook_engine::hashing::canonical_hash;
use scorebook_engine::inning::{next_half, should_transition};
use scorebook_engine::invariants::SetupError;
use scorebook_engine::scoresheet::ScoreSheet;
use scorebook_engine::transitions::{Anomaly, TransitionOutcome};
use scorebook_engine::{Game, GameEvent, GameState};

use crate::config::{event_log_path, snapshot_dir, RuntimeConfig};
use crate::event_store::{EventStore, EventStoreError};
use crate::game_store::{GameRepository, RepositoryError};
use crate::replay::resume_or_rebuild;
use crate::snapshot::{discard_snapshots_after, save_snapshot};
use crate::snapshot_codec::SnapshotError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("game {0} is finished")]
    GameFinished(String),
    #[error("game {0} not found")]
    NotFound(String),
    #[error("the batting side has no batting order")]
    NoBatter,
    #[error("no runner {runner_id:?} on {base:?}")]
    NoRunnerOnBase { runner_id: PlayerId, base: Base },
    #[error("unknown result code {0:?}")]
    UnknownResultCode(String),
    #[error("result {0:?} with runners on base needs operator-entered movements")]
    OperatorMovementsRequired(String),
    #[error("player {0:?} is not on the fielding team's roster")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    EventStore(#[from] EventStoreError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type SessionResult<T> = Result<T, SessionError>;

struct EventLog {
    store: EventStore,
    snapshot_dir: PathBuf,
    snapshot_interval: u64,
}

/// An open game with its derived state kept current.
pub struct GameSession<R: GameRepository, C: ResultCatalog = TableCatalog> {
    game: Game,
    state: GameState,
    anomalies: Vec<Anomaly>,
    engine: Engine<C>,
    repo: R,
    log: Option<EventLog>,
}

impl<R: GameRepository> GameSession<R> {
    /// Session over an already loaded game, standard result codes, no log.
    pub fn new(game: Game, repo: R) -> Self {
        Self::with_engine(game, repo, Engine::standard())
    }

    /// Load `game_id` from the repository and attach its event log.
    pub fn open(repo: R, game_id: &str, config: &RuntimeConfig) -> SessionResult<Self> {
        let game = repo
            .load_game(game_id)?
            .ok_or_else(|| SessionError::NotFound(game_id.to_string()))?;
        info!(game_id, events = game.events.len(), "opening game");
        Self::new(game, repo).with_event_log(&config.log_dir(game_id), config.snapshot_interval)
    }

    /// Create, validate and store a new game, then open it.
    pub fn create(mut repo: R, setup: GameSetup, config: &RuntimeConfig) -> SessionResult<Self> {
        let mut game = new_game(setup)?;
        repo.save_game(&mut game)?;
        info!(game_id = %game.id, innings = game.innings, "game created");
        let log_dir = config.log_dir(&game.id);
        Self::new(game, repo).with_event_log(&log_dir, config.snapshot_interval)
    }
}

impl<R: GameRepository, C: ResultCatalog> GameSession<R, C> {
    pub fn with_engine(game: Game, repo: R, engine: Engine<C>) -> Self {
        let projection = engine.project_with_diagnostics(&game);
        Self {
            game,
            state: projection.state,
            anomalies: projection.anomalies,
            engine,
            repo,
            log: None,
        }
    }

    /// Attach the binary event log in `log_dir`.
    ///
    /// An empty log is filled from the game document. A non-empty log is
    /// fsynced per event and therefore wins over the document when the
    /// two disagree. The state is then resumed from the newest usable
    /// snapshot.
    pub fn with_event_log(mut self, log_dir: &Path, snapshot_interval: u64) -> SessionResult<Self> {
        let mut store = EventStore::open(&event_log_path(log_dir))?;
        if store.is_empty() {
            if !self.game.events.is_empty() {
                store.rewrite(&self.game.events)?;
            }
        } else {
            let logged = store.load_all()?;
            if logged != self.game.events {
                warn!(
                    game_id = %self.game.id,
                    logged = logged.len(),
                    stored = self.game.events.len(),
                    "game document disagrees with event log; using the log"
                );
                self.game.events = logged;
                self.repo.save_game(&mut self.game)?;
            }
        }

        let snapshot_dir = snapshot_dir(log_dir);
        let (projection, source) = resume_or_rebuild(&self.game, &self.engine, &snapshot_dir);
        debug!(game_id = %self.game.id, ?source, "state restored");
        self.state = projection.state;
        self.anomalies = projection.anomalies;
        self.log = Some(EventLog {
            store,
            snapshot_dir,
            snapshot_interval,
        });
        Ok(self)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Anomalies met while deriving the current state.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn engine(&self) -> &Engine<C> {
        &self.engine
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn state_hash(&self) -> String {
        canonical_hash(&self.state)
    }

    pub fn score_sheet(&self) -> ScoreSheet<'_> {
        ScoreSheet::build(&self.game, &self.state, self.engine.catalog())
    }

    pub fn current_batter(&self) -> Option<&PlayerId> {
        current_batter_id(&self.game, &self.state)
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// `preparing → in_progress`. Recording an event does this implicitly.
    pub fn start(&mut self) -> SessionResult<()> {
        self.ensure_open()?;
        if self.game.status == GameStatus::Preparing {
            self.game.status = GameStatus::InProgress;
            self.repo.save_game(&mut self.game)?;
            info!(game_id = %self.game.id, "game started");
        }
        Ok(())
    }

    pub fn finish(&mut self) -> SessionResult<()> {
        if self.game.status != GameStatus::Finished {
            self.game.status = GameStatus::Finished;
            self.repo.save_game(&mut self.game)?;
            info!(game_id = %self.game.id, "game finished");
        }
        Ok(())
    }

    /// Opponent runs for the 0-based inning `inning_index`, padding
    /// earlier innings with 0.
    pub fn set_opponent_score(&mut self, inning_index: usize, runs: u32) -> SessionResult<()> {
        let line = &mut self.game.opponent_score_by_inning;
        if line.len() <= inning_index {
            line.resize(inning_index + 1, 0);
        }
        line[inning_index] = runs;
        self.repo.save_game(&mut self.game)?;
        Ok(())
    }

    // ── Recording ──────────────────────────────────────────────

    /// Record the current batter's result, advancing runners
    /// automatically. Results whose runner outcome depends on the defense
    /// are refused while runners are on base; use
    /// [`record_plate_appearance_with`](Self::record_plate_appearance_with).
    pub fn record_plate_appearance(&mut self, code: &str) -> SessionResult<TransitionOutcome> {
        self.ensure_open()?;
        let option = self
            .engine
            .catalog()
            .lookup(code)
            .cloned()
            .ok_or_else(|| SessionError::UnknownResultCode(code.to_string()))?;
        let batter = self.current_batter().cloned().ok_or(SessionError::NoBatter)?;

        let advancement = match resolve(&self.state.runners, &batter, &option) {
            Resolution::Resolved(advancement) => advancement,
            Resolution::NeedsOperator => {
                return Err(SessionError::OperatorMovementsRequired(code.to_string()))
            }
        };
        self.plate_appearance(&batter, code, advancement)
    }

    /// Record the current batter's result with operator-entered runner
    /// movements and RBI.
    pub fn record_plate_appearance_with(
        &mut self,
        code: &str,
        movements: Vec<RunnerMovement>,
        rbis: Vec<Rbi>,
    ) -> SessionResult<TransitionOutcome> {
        self.ensure_open()?;
        if self.engine.catalog().lookup(code).is_none() {
            return Err(SessionError::UnknownResultCode(code.to_string()));
        }
        let batter = self.current_batter().cloned().ok_or(SessionError::NoBatter)?;
        for m in &movements {
            self.ensure_on_base(&m.runner_id, m.from_base)?;
        }
        self.plate_appearance(&batter, code, Advancement { movements, rbis })
    }

    fn plate_appearance(
        &mut self,
        batter: &str,
        code: &str,
        advancement: Advancement,
    ) -> SessionResult<TransitionOutcome> {
        let option = self
            .engine
            .catalog()
            .lookup(code)
            .ok_or_else(|| SessionError::UnknownResultCode(code.to_string()))?;
        let result = PlateAppearanceResult {
            category: option.category,
            code: option.code.clone(),
            label: option.label.clone(),
        };
        let event = new_plate_appearance(
            &self.state,
            batter,
            current_pitcher_id(&self.state),
            result,
            advancement.movements,
            advancement.rbis,
            order_in_inning(&self.game, &self.state),
        );
        self.record(event)
    }

    /// Steal, caught stealing, pickoff, wild pitch, passed ball, balk or a
    /// plain advance for the runner on `from`.
    pub fn record_runner_event(
        &mut self,
        runner_id: &str,
        kind: RunnerEventKind,
        from: Base,
        to: Destination,
    ) -> SessionResult<TransitionOutcome> {
        self.ensure_open()?;
        self.ensure_on_base(runner_id, from)?;
        let event = new_runner_event(&self.state, runner_id, kind, from, to);
        self.record(event)
    }

    /// Bring in `in_pitcher_id` for the fielding team.
    pub fn change_pitcher(&mut self, in_pitcher_id: &str) -> SessionResult<TransitionOutcome> {
        self.ensure_open()?;
        let team = defense_team(&self.game, &self.state);
        if !team.has_player(in_pitcher_id) {
            return Err(SessionError::UnknownPlayer(in_pitcher_id.to_string()));
        }
        let event = new_pitcher_change(
            &self.state,
            &team.id,
            current_pitcher_id(&self.state),
            in_pitcher_id,
        );
        self.record(event)
    }

    /// Remove the last event. `None` on an empty log. A finished game is
    /// reopened, since its final out no longer stands.
    ///
    /// The log is truncated before anything else changes. Once the event
    /// is gone from the log, the document and state follow it even if a
    /// later step fails; a stale document is repaired from the log on open.
    pub fn undo(&mut self) -> SessionResult<Option<GameEvent>> {
        if self.game.events.is_empty() {
            return Ok(None);
        }
        if let Some(log) = self.log.as_mut() {
            log.store.truncate_last()?;
        }
        let Some(removed) = self.game.events.pop() else {
            return Ok(None);
        };
        if self.game.status == GameStatus::Finished {
            self.game.status = GameStatus::InProgress;
        }
        let projection = self.engine.project_with_diagnostics(&self.game);
        self.state = projection.state;
        self.anomalies = projection.anomalies;

        if let Some(log) = self.log.as_ref() {
            discard_snapshots_after(&log.snapshot_dir, self.game.events.len() as u64)?;
        }
        self.repo.save_game(&mut self.game)?;

        info!(
            game_id = %self.game.id,
            event_id = removed.id(),
            event_type = removed.kind_tag(),
            "event undone"
        );
        Ok(Some(removed))
    }

    // ── Internals ──────────────────────────────────────────────

    fn ensure_open(&self) -> SessionResult<()> {
        if self.game.status == GameStatus::Finished {
            return Err(SessionError::GameFinished(self.game.id.clone()));
        }
        Ok(())
    }

    fn ensure_on_base(&self, runner_id: &str, base: Base) -> SessionResult<()> {
        match self.state.runners.get(base) {
            Some(on_base) if on_base == runner_id => Ok(()),
            _ => Err(SessionError::NoRunnerOnBase {
                runner_id: runner_id.to_string(),
                base,
            }),
        }
    }

    /// Append `event`, then close the half-inning if it produced the third out.
    fn record(&mut self, event: GameEvent) -> SessionResult<TransitionOutcome> {
        let outcome = self.append(event)?;

        if should_transition(&self.state) {
            match next_half(&self.state, &self.game) {
                Some(next) => {
                    let change = new_inning_change(&self.state, next.inning, next.half_inning);
                    self.append(change)?;
                }
                None => {
                    self.game.status = GameStatus::Finished;
                    self.repo.save_game(&mut self.game)?;
                    info!(
                        game_id = %self.game.id,
                        home = self.state.score.home,
                        away = self.state.score.away,
                        "final inning complete"
                    );
                }
            }
        }
        Ok(outcome)
    }

    fn append(&mut self, event: GameEvent) -> SessionResult<TransitionOutcome> {
        let (next, outcome) = self.engine.step(&self.state, &event, &self.game);

        if let Some(log) = self.log.as_mut() {
            log.store.append(&event)?;
        }
        self.game.events.push(event);
        if self.game.status == GameStatus::Preparing {
            self.game.status = GameStatus::InProgress;
        }
        self.state = next;
        self.anomalies.extend(outcome.anomalies.iter().cloned());
        self.repo.save_game(&mut self.game)?;

        if let Some(log) = self.log.as_ref() {
            let count = self.game.events.len();
            if log.snapshot_interval > 0 && count as u64 % log.snapshot_interval == 0 {
                if let Err(e) = save_snapshot(&log.snapshot_dir, &self.game, count, &self.state) {
                    warn!(game_id = %self.game.id, count, "snapshot failed: {}", e);
                }
            }
        }
        Ok(outcome)
    }
}
