//! Scorebook: Centralized Transition Logic
//!
//! ALL state-mutation logic lives here. `apply_event` is a pure function:
//! it clones the incoming state, applies one event and returns the new
//! state together with a `TransitionOutcome`. No clock, no randomness.
//!
//! Data anomalies never abort the fold. They are absorbed into the state
//! the same way every time and reported as `Anomaly` values.

use std::fmt;

use crate::catalog::ResultCatalog;
use crate::domain::{Base, Bases, Destination, Game, GameState, TeamSide};
use crate::events::{
    GameEvent, InningChangeEvent, PitcherChangeEvent, PlateAppearanceEvent, RunnerEvent,
    RunnerMovement,
};

/// Outs that end a half-inning. Derived outs never exceed this.
pub const MAX_OUTS: u8 = 3;

/// Something in the log that the projector had to paper over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// The result code is not in the catalog; the batter was neither put
    /// out nor placed on base.
    UnknownResultCode { event_id: String, code: String },
    /// The event pushed the out count past three; the surplus was dropped.
    ExcessOuts { event_id: String, discarded: u8 },
    /// A movement named a runner who was not on its origin base. The
    /// origin keeps whoever holds it and the named runner is still moved,
    /// so an inconsistent log replays without losing a runner.
    RunnerNotOnBase {
        event_id: String,
        runner_id: String,
        base: Base,
    },
    /// A pitcher change named a team that plays in neither side; the
    /// defending side was assumed.
    UnknownPitchingTeam { event_id: String, team_id: String },
    /// The batting side has no batting order; the index was left alone.
    EmptyBattingOrder { event_id: String, side: TeamSide },
    /// A state invariant failed after the event was applied.
    InvariantBroken { event_id: String, message: String },
}

impl Anomaly {
    pub fn event_id(&self) -> &str {
        match self {
            Anomaly::UnknownResultCode { event_id, .. }
            | Anomaly::ExcessOuts { event_id, .. }
            | Anomaly::RunnerNotOnBase { event_id, .. }
            | Anomaly::UnknownPitchingTeam { event_id, .. }
            | Anomaly::EmptyBattingOrder { event_id, .. }
            | Anomaly::InvariantBroken { event_id, .. } => event_id,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnknownResultCode { event_id, code } => {
                write!(f, "event {}: unknown result code {:?}", event_id, code)
            }
            Anomaly::ExcessOuts {
                event_id,
                discarded,
            } => write!(f, "event {}: {} out(s) beyond three discarded", event_id, discarded),
            Anomaly::RunnerNotOnBase {
                event_id,
                runner_id,
                base,
            } => write!(
                f,
                "event {}: runner {} is not on {} base",
                event_id,
                runner_id,
                base.label()
            ),
            Anomaly::UnknownPitchingTeam { event_id, team_id } => write!(
                f,
                "event {}: pitcher change for unknown team {:?}",
                event_id, team_id
            ),
            Anomaly::EmptyBattingOrder { event_id, side } => {
                write!(f, "event {}: {:?} has no batting order", event_id, side)
            }
            Anomaly::InvariantBroken { event_id, message } => {
                write!(f, "event {}: {}", event_id, message)
            }
        }
    }
}

/// What a single transition did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub event_type: &'static str,
    pub runs_scored: u32,
    /// Outs credited after clamping.
    pub outs_recorded: u8,
    pub outs_discarded: u8,
    pub anomalies: Vec<Anomaly>,
}

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `event` to `state` and return `(new_state, outcome)`.
/// The original state is never mutated.
pub fn apply_event<C: ResultCatalog + ?Sized>(
    state: &GameState,
    event: &GameEvent,
    game: &Game,
    catalog: &C,
) -> (GameState, TransitionOutcome) {
    let mut new_state = state.clone();
    let mut outcome = TransitionOutcome {
        event_type: event.kind_tag(),
        ..Default::default()
    };

    match event {
        GameEvent::PlateAppearance(e) => {
            apply_plate_appearance(&mut new_state, e, game, catalog, &mut outcome)
        }
        GameEvent::RunnerEvent(e) => apply_runner_event(&mut new_state, e, &mut outcome),
        GameEvent::InningChange(e) => apply_inning_change(&mut new_state, e),
        GameEvent::PitcherChange(e) => {
            apply_pitcher_change(&mut new_state, e, game, &mut outcome)
        }
    }

    (new_state, outcome)
}

// ---------------------------------------------------------------------------
// Individual transition handlers (private)
// ---------------------------------------------------------------------------

/// Runs and outs accrued while applying one event.
#[derive(Default)]
struct Tally {
    runs: u32,
    outs: u32,
}

fn apply_plate_appearance<C: ResultCatalog + ?Sized>(
    state: &mut GameState,
    event: &PlateAppearanceEvent,
    game: &Game,
    catalog: &C,
    outcome: &mut TransitionOutcome,
) {
    let event_id = event.header.id.as_str();
    let side = state.batting_side();
    let mut tally = Tally::default();

    // Lead runner first so a trailing runner never lands on a base that
    // is still occupied by the runner ahead.
    let mut movements: Vec<&RunnerMovement> = event.runner_movements.iter().collect();
    movements.sort_by_key(|m| lead_rank(m.from_base));
    for m in movements {
        move_runner(
            &mut state.runners,
            &m.runner_id,
            m.from_base,
            m.to_base,
            &mut tally,
            event_id,
            &mut outcome.anomalies,
        );
    }

    match catalog.lookup(&event.result.code) {
        None => outcome.anomalies.push(Anomaly::UnknownResultCode {
            event_id: event_id.to_string(),
            code: event.result.code.clone(),
        }),
        Some(opt) if opt.is_out => tally.outs += 1,
        Some(opt) => {
            if opt.is_home_run() {
                state.runners.remove_runner(&event.batter_id);
                tally.runs += 1;
            } else if let Some(base) = opt.hit_bases.and_then(Base::from_hit_bases) {
                state.runners.occupy(base, &event.batter_id);
            } else if opt.category.awards_first_base() {
                state.runners.occupy(Base::First, &event.batter_id);
            }
        }
    }

    credit(state, side, tally, event_id, outcome);

    let order_len = game.team(side).batting_order.len();
    if order_len == 0 {
        outcome.anomalies.push(Anomaly::EmptyBattingOrder {
            event_id: event_id.to_string(),
            side,
        });
    } else {
        let idx = state.current_batter_index.get_mut(side);
        *idx = (*idx + 1) % order_len;
    }
}

fn apply_runner_event(
    state: &mut GameState,
    event: &RunnerEvent,
    outcome: &mut TransitionOutcome,
) {
    let event_id = event.header.id.as_str();
    let side = state.batting_side();
    let mut tally = Tally::default();

    move_runner(
        &mut state.runners,
        &event.runner_id,
        event.from_base,
        event.to_base,
        &mut tally,
        event_id,
        &mut outcome.anomalies,
    );

    credit(state, side, tally, event_id, outcome);
}

fn apply_inning_change(state: &mut GameState, event: &InningChangeEvent) {
    state.inning = event.new_inning;
    state.half_inning = event.new_half_inning;
    state.outs = 0;
    state.runners = Bases::default();
}

fn apply_pitcher_change(
    state: &mut GameState,
    event: &PitcherChangeEvent,
    game: &Game,
    outcome: &mut TransitionOutcome,
) {
    let side = match game.side_of_team(&event.team_id) {
        Some(side) => side,
        None => {
            outcome.anomalies.push(Anomaly::UnknownPitchingTeam {
                event_id: event.header.id.clone(),
                team_id: event.team_id.clone(),
            });
            state.fielding_side()
        }
    };
    *state.current_pitcher.get_mut(side) = event.in_pitcher_id.clone();
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lead_rank(base: Base) -> u8 {
    match base {
        Base::Third => 0,
        Base::Second => 1,
        Base::First => 2,
        Base::Home => 3,
    }
}

/// Move one runner: vacate the origin, then score, retire, or place them.
/// The origin is only vacated if it actually holds this runner.
fn move_runner(
    bases: &mut Bases,
    runner: &str,
    from: Base,
    to: Destination,
    tally: &mut Tally,
    event_id: &str,
    anomalies: &mut Vec<Anomaly>,
) {
    if from != Base::Home {
        if bases.get(from).map(String::as_str) == Some(runner) {
            bases.clear(from);
        } else {
            anomalies.push(Anomaly::RunnerNotOnBase {
                event_id: event_id.to_string(),
                runner_id: runner.to_string(),
                base: from,
            });
        }
    }

    match to {
        Destination::Score => {
            bases.remove_runner(runner);
            tally.runs += 1;
        }
        Destination::Out => {
            bases.remove_runner(runner);
            tally.outs += 1;
        }
        other => {
            if let Some(base) = other.base() {
                bases.occupy(base, runner);
            }
        }
    }
}

/// Add the tally's runs to the batting side and its outs to the count.
fn credit(
    state: &mut GameState,
    side: TeamSide,
    tally: Tally,
    event_id: &str,
    outcome: &mut TransitionOutcome,
) {
    *state.score.get_mut(side) += tally.runs;

    let idx = state.inning.saturating_sub(1) as usize;
    let line = state.inning_scores.get_mut(side);
    if line.len() <= idx {
        line.resize(idx + 1, 0);
    }
    line[idx] += tally.runs;

    let total = u32::from(state.outs) + tally.outs;
    let clamped = total.min(u32::from(MAX_OUTS)) as u8;
    let discarded = (total - u32::from(clamped)) as u8;
    if discarded > 0 {
        outcome.anomalies.push(Anomaly::ExcessOuts {
            event_id: event_id.to_string(),
            discarded,
        });
    }

    outcome.runs_scored += tally.runs;
    outcome.outs_recorded += clamped - state.outs;
    outcome.outs_discarded += discarded;
    state.outs = clamped;
}
