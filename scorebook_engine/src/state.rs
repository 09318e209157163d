//! Scorebook: Initial State
//!
//! The canonical starting point of every replay.

use crate::domain::{Bases, Game, GameState, HalfInning, PerSide};

/// Top of the first, nobody out, bases empty, 0–0, both lineups at their
/// leadoff hitter, each side's starting pitcher on the mound.
pub fn create_initial_state(game: &Game) -> GameState {
    GameState {
        inning: 1,
        half_inning: HalfInning::Top,
        outs: 0,
        runners: Bases::default(),
        score: PerSide::default(),
        inning_scores: PerSide::default(),
        current_batter_index: PerSide::default(),
        current_pitcher: PerSide {
            home: game.home_team.starting_pitcher.clone(),
            away: game.away_team.starting_pitcher.clone(),
        },
    }
}
