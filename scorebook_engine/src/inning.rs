//! Scorebook: Inning Transition Policy

use crate::domain::{Game, GameState, HalfInning};
use crate::transitions::MAX_OUTS;

/// The half-inning that follows the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHalf {
    pub inning: u32,
    pub half_inning: HalfInning,
}

/// Three outs end the half-inning.
pub fn should_transition(state: &GameState) -> bool {
    state.outs >= MAX_OUTS
}

/// Top → bottom of the same inning; bottom → top of the next inning.
/// `None` once the bottom of the last scheduled inning is over: the game
/// is complete. There are no extra innings.
pub fn next_half(state: &GameState, game: &Game) -> Option<NextHalf> {
    match state.half_inning {
        HalfInning::Top => Some(NextHalf {
            inning: state.inning,
            half_inning: HalfInning::Bottom,
        }),
        HalfInning::Bottom if state.inning >= game.innings => None,
        HalfInning::Bottom => Some(NextHalf {
            inning: state.inning + 1,
            half_inning: HalfInning::Top,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_game;
    use crate::state::create_initial_state;

    #[test]
    fn transition_only_at_three_outs() {
        let game = sample_game();
        let mut state = create_initial_state(&game);
        state.outs = 2;
        assert!(!should_transition(&state));
        state.outs = 3;
        assert!(should_transition(&state));
    }

    #[test]
    fn top_goes_to_bottom_of_same_inning() {
        let game = sample_game();
        let mut state = create_initial_state(&game);
        state.inning = 9;
        assert_eq!(
            next_half(&state, &game),
            Some(NextHalf {
                inning: 9,
                half_inning: HalfInning::Bottom
            })
        );
    }

    #[test]
    fn bottom_goes_to_next_top() {
        let game = sample_game();
        let mut state = create_initial_state(&game);
        state.inning = 4;
        state.half_inning = HalfInning::Bottom;
        assert_eq!(
            next_half(&state, &game),
            Some(NextHalf {
                inning: 5,
                half_inning: HalfInning::Top
            })
        );
    }

    #[test]
    fn bottom_of_last_inning_ends_the_game() {
        let mut game = sample_game();
        game.innings = 7;
        let mut state = create_initial_state(&game);
        state.inning = 7;
        state.half_inning = HalfInning::Bottom;
        state.outs = 3;
        assert!(should_transition(&state));
        assert_eq!(next_half(&state, &game), None);
    }
}
