//! Scorebook: Scoreboard and Score Sheet
//!
//! Read-only views handed to renderers and document exporters.

use serde::{Deserialize, Serialize};

use crate::catalog::ResultCatalog;
use crate::domain::{Game, GameState, TeamSide};
use crate::stats::{batting_stats, pitching_stats, BattingLine, PitchingLine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineScoreRow {
    pub side: TeamSide,
    pub team_name: String,
    /// One cell per column; `None` for a half-inning not yet reached.
    pub innings: Vec<Option<u32>>,
    pub total: u32,
}

/// Scoreboard: visitors first, then home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineScore {
    pub columns: usize,
    pub away: LineScoreRow,
    pub home: LineScoreRow,
}

/// Per-inning runs padded to the scheduled length (or longer, if the
/// derived arrays already are).
pub fn line_score(game: &Game, state: &GameState) -> LineScore {
    let columns = (game.innings as usize)
        .max(state.inning_scores.home.len())
        .max(state.inning_scores.away.len());

    let row = |side: TeamSide| {
        let scores = state.inning_scores.get(side);
        LineScoreRow {
            side,
            team_name: game.team(side).name.clone(),
            innings: (0..columns).map(|i| scores.get(i).copied()).collect(),
            total: *state.score.get(side),
        }
    };

    LineScore {
        columns,
        away: row(TeamSide::Away),
        home: row(TeamSide::Home),
    }
}

/// My team's derived runs against the opponent's hand-entered runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTeamSummary {
    pub my_team_name: String,
    pub opponent_name: String,
    pub my_runs: u32,
    pub opponent_runs: u32,
}

pub fn my_team_summary(game: &Game, state: &GameState) -> MyTeamSummary {
    MyTeamSummary {
        my_team_name: game.my_team_name.clone(),
        opponent_name: game.opponent_team().name.clone(),
        my_runs: *state.score.get(game.my_team_side),
        opponent_runs: game.opponent_score_by_inning.iter().sum(),
    }
}

/// Everything a document exporter needs for one game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet<'a> {
    pub game: &'a Game,
    pub state: &'a GameState,
    pub line_score: LineScore,
    pub summary: MyTeamSummary,
    /// My team's batters, in order.
    pub batting: Vec<BattingLine>,
    pub pitching: Vec<PitchingLine>,
}

impl<'a> ScoreSheet<'a> {
    pub fn build<C: ResultCatalog + ?Sized>(
        game: &'a Game,
        state: &'a GameState,
        catalog: &C,
    ) -> Self {
        let my_team = game.my_team();
        Self {
            game,
            state,
            line_score: line_score(game, state),
            summary: my_team_summary(game, state),
            batting: batting_stats(&game.events, &my_team.players, &my_team.batting_order, catalog),
            pitching: pitching_stats(game, catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableCatalog;
    use crate::fixtures::sample_game;
    use crate::state::create_initial_state;

    #[test]
    fn pads_to_scheduled_innings() {
        let game = sample_game();
        let mut state = create_initial_state(&game);
        state.inning_scores.away = vec![0, 2];
        state.inning_scores.home = vec![1];
        state.score.away = 2;
        state.score.home = 1;

        let ls = line_score(&game, &state);
        assert_eq!(ls.columns, 9);
        assert_eq!(ls.away.innings[1], Some(2));
        assert_eq!(ls.away.innings[2], None);
        assert_eq!(ls.home.innings[0], Some(1));
        assert_eq!(ls.home.total, 1);
        assert_eq!(ls.away.team_name, "Owls");
    }

    #[test]
    fn summary_uses_manual_opponent_runs() {
        let mut game = sample_game();
        game.opponent_score_by_inning = vec![1, 0, 3];
        let mut state = create_initial_state(&game);
        state.score.home = 5;
        state.score.away = 9;

        let s = my_team_summary(&game, &state);
        assert_eq!(s.my_runs, 5);
        assert_eq!(s.opponent_runs, 4);
        assert_eq!(s.opponent_name, "Owls");
    }

    #[test]
    fn sheet_serializes() {
        let game = sample_game();
        let state = create_initial_state(&game);
        let sheet = ScoreSheet::build(&game, &state, &TableCatalog::standard());
        assert_eq!(sheet.batting.len(), 9);
        assert_eq!(sheet.pitching.len(), 1);
        let json = serde_json::to_value(&sheet).unwrap();
        assert!(json.get("lineScore").is_some());
        assert_eq!(json["batting"][0]["playerId"], "h1");
    }
}
