//! Scorebook: Engine
//!
//! Top-level projector. Folds a game's event log through the pure
//! transitions, checks state invariants after every event and collects
//! the anomalies met along the way. The engine owns nothing but its
//! result catalog, so it can be shared freely.

use tracing::{debug, warn};

use crate::catalog::{ResultCatalog, TableCatalog};
use crate::domain::{Game, GameState};
use crate::events::GameEvent;
use crate::invariants::check_state;
use crate::state::create_initial_state;
use crate::transitions::{apply_event, Anomaly, TransitionOutcome};

/// Derived state plus everything the fold had to paper over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub state: GameState,
    pub anomalies: Vec<Anomaly>,
}

pub struct Engine<C: ResultCatalog = TableCatalog> {
    catalog: C,
}

impl Engine<TableCatalog> {
    /// Engine over the standard result codes.
    pub fn standard() -> Self {
        Self::new(TableCatalog::standard())
    }
}

impl Default for Engine<TableCatalog> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<C: ResultCatalog> Engine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Apply one event and check the result:
    ///   1. Delegate to `transitions::apply_event`
    ///   2. Check state invariants on the new state
    ///   3. Log the outcome
    pub fn step(
        &self,
        state: &GameState,
        event: &GameEvent,
        game: &Game,
    ) -> (GameState, TransitionOutcome) {
        let (next, mut outcome) = apply_event(state, event, game, &self.catalog);

        if let Err(violation) = check_state(&next, game) {
            outcome.anomalies.push(Anomaly::InvariantBroken {
                event_id: event.id().to_string(),
                message: violation.to_string(),
            });
        }

        debug!(
            event_id = event.id(),
            event_type = outcome.event_type,
            runs = outcome.runs_scored,
            outs = next.outs,
            "applied event"
        );
        for anomaly in &outcome.anomalies {
            warn!(game_id = %game.id, "{}", anomaly);
        }

        (next, outcome)
    }

    /// Event-sourced reconstruction: initial state, then every event in
    /// log order.
    pub fn project(&self, game: &Game) -> GameState {
        self.project_with_diagnostics(game).state
    }

    pub fn project_with_diagnostics(&self, game: &Game) -> Projection {
        self.resume(game, create_initial_state(game), 0)
    }

    /// Continue a fold from `state`, which must be the projection of the
    /// first `start_index` events. Used for snapshot + tail replay.
    pub fn resume(&self, game: &Game, state: GameState, start_index: usize) -> Projection {
        let tail = game.events.get(start_index..).unwrap_or(&[]);
        let mut projection = Projection {
            state,
            anomalies: Vec::new(),
        };
        for event in tail {
            let (next, outcome) = self.step(&projection.state, event, game);
            projection.state = next;
            projection.anomalies.extend(outcome.anomalies);
        }
        projection
    }

    /// State after only the first `len` events.
    pub fn project_prefix(&self, game: &Game, len: usize) -> GameState {
        let mut state = create_initial_state(game);
        for event in game.events.iter().take(len) {
            state = self.step(&state, event, game).0;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Base, Destination, HalfInning};
    use crate::fixtures::{inning_change, pa, pa_with, sample_game};

    #[test]
    fn empty_log_projects_initial_state() {
        let game = sample_game();
        let engine = Engine::standard();
        assert_eq!(engine.project(&game), create_initial_state(&game));
    }

    #[test]
    fn replay_is_deterministic() {
        let mut game = sample_game();
        game.events = vec![
            pa("e1", "a1", "H1-L"),
            pa_with(
                "e2",
                "a2",
                "H2-C",
                vec![("a1", Base::First, Destination::Third)],
                vec![],
            ),
            pa("e3", "a3", "K"),
        ];
        let engine = Engine::standard();
        assert_eq!(engine.project(&game), engine.project(&game));
    }

    #[test]
    fn resume_matches_full_replay() {
        let mut game = sample_game();
        game.events = vec![
            pa("e1", "a1", "BB"),
            pa("e2", "a2", "K"),
            pa_with(
                "e3",
                "a3",
                "H1-R",
                vec![("a1", Base::First, Destination::Second)],
                vec![],
            ),
            inning_change("e4", 1, HalfInning::Bottom),
        ];
        let engine = Engine::standard();
        let mid = engine.project_prefix(&game, 2);
        let resumed = engine.resume(&game, mid, 2);
        assert_eq!(resumed.state, engine.project(&game));
    }

    #[test]
    fn diagnostics_collect_anomalies_in_log_order() {
        let mut game = sample_game();
        game.events = vec![pa("e1", "a1", "??"), pa("e2", "a2", "X")];
        let projection = Engine::standard().project_with_diagnostics(&game);
        let ids: Vec<&str> = projection.anomalies.iter().map(Anomaly::event_id).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn custom_catalog() {
        let catalog = TableCatalog::from_json(
            r#"[{"code":"1B","label":"Single","category":"hit","hitBases":1,"isOut":false,"isAtBat":true}]"#,
        )
        .unwrap();
        let engine = Engine::new(catalog);
        let mut game = sample_game();
        game.events = vec![pa("e1", "a1", "1B")];
        let state = engine.project(&game);
        assert_eq!(state.runners.first.as_deref(), Some("a1"));
    }
}
