//! Scorebook: Invariant Checks
//!
//! Two families of checks:
//!   - setup checks on a `Game` before play (roster references)
//!   - state checks on a derived `GameState` after every transition
//!
//! Checks never panic; they return the first violation found.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::{Game, GameState, Team, TeamSide};
use crate::transitions::MAX_OUTS;

/// Game setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{side:?} batting order lists {player_id:?}, who is not on the roster")]
    BattingOrderNotOnRoster { side: TeamSide, player_id: String },

    #[error("{side:?} starting pitcher {player_id:?} is not on the roster")]
    StartingPitcherNotOnRoster { side: TeamSide, player_id: String },

    #[error("{side:?} batting order is empty")]
    EmptyBattingOrder { side: TeamSide },

    #[error("{side:?} batting order lists {player_id:?} more than once")]
    DuplicateInBattingOrder { side: TeamSide, player_id: String },

    #[error("scheduled innings must be at least 1")]
    NoInnings,
}

/// Derived-state invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("[INVARIANT:outs_bound] outs={0} exceeds 3")]
    OutsOutOfRange(u8),

    #[error("[INVARIANT:base_exclusivity] runner {0:?} occupies more than one base")]
    RunnerOnTwoBases(String),

    #[error("[INVARIANT:batting_index] {side:?} index {index} outside order of length {len}")]
    BattingIndexOutOfRange {
        side: TeamSide,
        index: usize,
        len: usize,
    },

    #[error("[INVARIANT:inning_number] inning must start at 1")]
    InningZero,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Every batting-order id and the starting pitcher must be on the roster.
pub fn check_setup(game: &Game) -> Result<(), SetupError> {
    if game.innings == 0 {
        return Err(SetupError::NoInnings);
    }
    check_team(&game.home_team, TeamSide::Home)?;
    check_team(&game.away_team, TeamSide::Away)?;
    Ok(())
}

fn check_team(team: &Team, side: TeamSide) -> Result<(), SetupError> {
    if team.batting_order.is_empty() {
        return Err(SetupError::EmptyBattingOrder { side });
    }

    let mut seen = BTreeSet::new();
    for id in &team.batting_order {
        if !team.has_player(id) {
            return Err(SetupError::BattingOrderNotOnRoster {
                side,
                player_id: id.clone(),
            });
        }
        if !seen.insert(id.as_str()) {
            return Err(SetupError::DuplicateInBattingOrder {
                side,
                player_id: id.clone(),
            });
        }
    }

    if !team.has_player(&team.starting_pitcher) {
        return Err(SetupError::StartingPitcherNotOnRoster {
            side,
            player_id: team.starting_pitcher.clone(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Derived state
// ---------------------------------------------------------------------------

pub fn check_state(state: &GameState, game: &Game) -> Result<(), InvariantViolation> {
    check_outs(state)?;
    check_base_exclusivity(state)?;
    check_batting_index(state, game, TeamSide::Home)?;
    check_batting_index(state, game, TeamSide::Away)?;
    if state.inning == 0 {
        return Err(InvariantViolation::InningZero);
    }
    Ok(())
}

fn check_outs(state: &GameState) -> Result<(), InvariantViolation> {
    if state.outs > MAX_OUTS {
        return Err(InvariantViolation::OutsOutOfRange(state.outs));
    }
    Ok(())
}

fn check_base_exclusivity(state: &GameState) -> Result<(), InvariantViolation> {
    let mut seen = BTreeSet::new();
    for (_, runner) in state.runners.occupied_lead_first() {
        if !seen.insert(runner.as_str()) {
            return Err(InvariantViolation::RunnerOnTwoBases(runner.clone()));
        }
    }
    Ok(())
}

fn check_batting_index(
    state: &GameState,
    game: &Game,
    side: TeamSide,
) -> Result<(), InvariantViolation> {
    let len = game.team(side).batting_order.len();
    let index = *state.current_batter_index.get(side);
    // An empty order can only ever sit at index 0.
    if index >= len.max(1) {
        return Err(InvariantViolation::BattingIndexOutOfRange { side, index, len });
    }
    Ok(())
}
