//! Scorebook: Stats Aggregator
//!
//! Batting and pitching lines computed by a full rescan of the event log.
//! Nothing is cached; every call reads the log from the start.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arithmetic::Rate;
use crate::catalog::{is_strikeout_code, ResultCatalog};
use crate::domain::{Destination, Game, Player, PlayerId, PLACEHOLDER_NAME};
use crate::events::{GameEvent, PlateAppearanceEvent, ResultCategory, RunnerEventKind};
use crate::transitions::MAX_OUTS;

// ── Batting ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingLine {
    pub player_id: PlayerId,
    pub player_name: String,
    /// 1-based slot in the batting order.
    pub order: usize,
    pub plate_appearances: u32,
    pub at_bats: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub runs: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub strikeouts: u32,
    pub sacrifice_bunts: u32,
    pub sacrifice_flies: u32,
    pub stolen_bases: u32,
    pub batting_average: Rate,
    pub on_base_percentage: Rate,
    pub slugging_percentage: Rate,
}

impl BattingLine {
    pub fn singles(&self) -> u32 {
        self.hits - self.doubles - self.triples - self.home_runs
    }

    pub fn total_bases(&self) -> u32 {
        self.singles() + 2 * self.doubles + 3 * self.triples + 4 * self.home_runs
    }

    fn finish_rates(&mut self) {
        self.batting_average = Rate::of(self.hits, self.at_bats);
        self.on_base_percentage = Rate::of(
            self.hits + self.walks + self.hit_by_pitch,
            self.at_bats + self.walks + self.hit_by_pitch + self.sacrifice_flies,
        );
        self.slugging_percentage = Rate::of(self.total_bases(), self.at_bats);
    }
}

/// Runners who crossed the plate on this plate appearance, each once.
/// A runner may appear both as a scoring movement and in the RBI list;
/// a home-run batter scores too.
fn scorers<'a, C: ResultCatalog + ?Sized>(
    pa: &'a PlateAppearanceEvent,
    catalog: &C,
) -> BTreeSet<&'a str> {
    let mut set: BTreeSet<&str> = pa
        .runner_movements
        .iter()
        .filter(|m| m.to_base == Destination::Score)
        .map(|m| m.runner_id.as_str())
        .collect();
    set.extend(pa.rbi_list.iter().map(|r| r.runner_id.as_str()));
    if catalog
        .lookup(&pa.result.code)
        .is_some_and(|o| o.is_home_run())
    {
        set.insert(pa.batter_id.as_str());
    }
    set
}

/// One line per batting-order slot, in order.
pub fn batting_stats<C: ResultCatalog + ?Sized>(
    events: &[GameEvent],
    roster: &[Player],
    batting_order: &[PlayerId],
    catalog: &C,
) -> Vec<BattingLine> {
    batting_order
        .iter()
        .enumerate()
        .map(|(i, id)| batting_line(events, roster, id, i + 1, catalog))
        .collect()
}

fn batting_line<C: ResultCatalog + ?Sized>(
    events: &[GameEvent],
    roster: &[Player],
    player_id: &str,
    order: usize,
    catalog: &C,
) -> BattingLine {
    let mut line = BattingLine {
        player_id: player_id.to_string(),
        player_name: roster
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
        order,
        ..Default::default()
    };

    for event in events {
        match event {
            GameEvent::PlateAppearance(pa) => {
                if scorers(pa, catalog).contains(player_id) {
                    line.runs += 1;
                }
                if pa.batter_id == player_id {
                    count_plate_appearance(&mut line, pa, catalog);
                }
            }
            GameEvent::RunnerEvent(re) if re.runner_id == player_id => {
                if re.to_base == Destination::Score {
                    line.runs += 1;
                }
                if re.event_kind == RunnerEventKind::StolenBase {
                    line.stolen_bases += 1;
                }
            }
            GameEvent::RunnerEvent(_)
            | GameEvent::InningChange(_)
            | GameEvent::PitcherChange(_) => {}
        }
    }

    line.finish_rates();
    line
}

fn count_plate_appearance<C: ResultCatalog + ?Sized>(
    line: &mut BattingLine,
    pa: &PlateAppearanceEvent,
    catalog: &C,
) {
    line.plate_appearances += 1;

    // Unknown codes count as neither an at-bat nor a hit.
    if let Some(opt) = catalog.lookup(&pa.result.code) {
        if opt.is_at_bat {
            line.at_bats += 1;
        }
        if opt.category == ResultCategory::Hit {
            line.hits += 1;
            match opt.hit_bases {
                Some(2) => line.doubles += 1,
                Some(3) => line.triples += 1,
                Some(4) => line.home_runs += 1,
                _ => {}
            }
        }
    }

    match pa.result.category {
        ResultCategory::Walk => line.walks += 1,
        ResultCategory::HitByPitch => line.hit_by_pitch += 1,
        ResultCategory::SacrificeBunt => line.sacrifice_bunts += 1,
        ResultCategory::SacrificeFly => line.sacrifice_flies += 1,
        _ => {}
    }
    if is_strikeout_code(&pa.result.code) {
        line.strikeouts += 1;
    }
    line.rbi += pa.rbi_list.iter().filter(|r| r.earned).count() as u32;
}

// ── Pitching ───────────────────────────────────────────────────────

/// Innings pitched, kept as outs. Displays as whole innings plus a
/// remainder-outs digit: 5 outs → `1.2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InningsPitched {
    pub outs: u32,
}

impl InningsPitched {
    pub fn from_outs(outs: u32) -> Self {
        Self { outs }
    }

    pub fn whole_innings(self) -> u32 {
        self.outs / u32::from(MAX_OUTS)
    }

    pub fn remainder_outs(self) -> u32 {
        self.outs % u32::from(MAX_OUTS)
    }
}

impl fmt::Display for InningsPitched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole_innings(), self.remainder_outs())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchingLine {
    pub player_id: PlayerId,
    pub player_name: String,
    pub innings_pitched: InningsPitched,
    pub hits: u32,
    /// Walks plus hit batters.
    pub walks: u32,
    pub strikeouts: u32,
    pub runs: u32,
    /// Equal to `runs`: the log carries no earned-run judgement.
    pub earned_runs: u32,
}

/// Lines for my team's pitchers: the starter, then every incoming pitcher
/// from my roster in order of first appearance.
pub fn pitching_stats<C: ResultCatalog + ?Sized>(game: &Game, catalog: &C) -> Vec<PitchingLine> {
    let my_side = game.my_team_side;
    let my_team = game.my_team();
    let defending_half = my_side.fielding_half();

    let mut pitchers: Vec<PlayerId> = vec![my_team.starting_pitcher.clone()];
    for event in &game.events {
        if let GameEvent::PitcherChange(pc) = event {
            if my_team.has_player(&pc.in_pitcher_id) && !pitchers.contains(&pc.in_pitcher_id) {
                pitchers.push(pc.in_pitcher_id.clone());
            }
        }
    }

    let mut lines: Vec<PitchingLine> = pitchers
        .iter()
        .map(|id| PitchingLine {
            player_id: id.clone(),
            player_name: my_team
                .player(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            ..Default::default()
        })
        .collect();
    let mut outs = vec![0u32; lines.len()];

    // Runner events go to whoever is pitching for my side at that point.
    let mut active = my_team.starting_pitcher.clone();

    for event in &game.events {
        match event {
            GameEvent::PitcherChange(pc) => {
                let mine = match game.side_of_team(&pc.team_id) {
                    Some(side) => side == my_side,
                    None => my_team.has_player(&pc.in_pitcher_id),
                };
                if mine {
                    active = pc.in_pitcher_id.clone();
                }
            }
            GameEvent::PlateAppearance(pa) if pa.header.half_inning == defending_half => {
                let Some(idx) = pitchers.iter().position(|p| *p == pa.pitcher_id) else {
                    continue;
                };
                let line = &mut lines[idx];
                let opt = catalog.lookup(&pa.result.code);

                if opt.is_some_and(|o| o.category == ResultCategory::Hit) {
                    line.hits += 1;
                }
                if matches!(
                    pa.result.category,
                    ResultCategory::Walk | ResultCategory::HitByPitch
                ) {
                    line.walks += 1;
                }
                if is_strikeout_code(&pa.result.code) {
                    line.strikeouts += 1;
                }
                if opt.is_some_and(|o| o.is_out) {
                    outs[idx] += 1;
                }
                outs[idx] += pa
                    .runner_movements
                    .iter()
                    .filter(|m| m.to_base == Destination::Out)
                    .count() as u32;
                line.runs += scorers(pa, catalog).len() as u32;
            }
            GameEvent::RunnerEvent(re) if re.header.half_inning == defending_half => {
                let Some(idx) = pitchers.iter().position(|p| *p == active) else {
                    continue;
                };
                match re.to_base {
                    Destination::Out => outs[idx] += 1,
                    Destination::Score => lines[idx].runs += 1,
                    _ => {}
                }
            }
            GameEvent::PlateAppearance(_)
            | GameEvent::RunnerEvent(_)
            | GameEvent::InningChange(_) => {}
        }
    }

    for (line, outs) in lines.iter_mut().zip(outs) {
        line.innings_pitched = InningsPitched::from_outs(outs);
        line.earned_runs = line.runs;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableCatalog;
    use crate::domain::{Base, HalfInning};
    use crate::fixtures::{
        during, pa, pa_with, pitcher_change, runner_event, sample_game, thrown_by,
    };

    fn away_lines(game: &Game) -> Vec<BattingLine> {
        batting_stats(
            &game.events,
            &game.away_team.players,
            &game.away_team.batting_order,
            &TableCatalog::standard(),
        )
    }

    #[test]
    fn one_line_per_order_slot() {
        let game = sample_game();
        let lines = away_lines(&game);
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0].player_id, "a1");
        assert_eq!(lines[0].order, 1);
        assert_eq!(lines[8].order, 9);
        assert_eq!(lines[0].batting_average, Rate::ZERO);
    }

    #[test]
    fn batting_counts_and_rates() {
        let mut game = sample_game();
        game.events = vec![
            pa("e1", "a1", "H2-L"),
            pa("e2", "a1", "K"),
            pa("e3", "a1", "BB"),
            pa("e4", "a1", "SF"),
            pa("e5", "a1", "HR-C"),
            pa("e6", "a1", "GO-6"),
        ];
        let line = &away_lines(&game)[0];
        assert_eq!(line.plate_appearances, 6);
        assert_eq!(line.at_bats, 4);
        assert_eq!(line.hits, 2);
        assert_eq!(line.doubles, 1);
        assert_eq!(line.home_runs, 1);
        assert_eq!(line.walks, 1);
        assert_eq!(line.strikeouts, 1);
        assert_eq!(line.sacrifice_flies, 1);
        assert_eq!(line.runs, 1);
        assert_eq!(line.total_bases(), 6);
        assert_eq!(line.batting_average.to_string(), ".500");
        // (2 + 1) / (4 + 1 + 1)
        assert_eq!(line.on_base_percentage.to_string(), ".500");
        assert_eq!(line.slugging_percentage.to_string(), "1.500");
    }

    #[test]
    fn run_counted_once_when_listed_as_movement_and_rbi() {
        let mut game = sample_game();
        game.events = vec![pa_with(
            "e1",
            "a2",
            "H1-L",
            vec![("a1", Base::Third, Destination::Score)],
            vec!["a1"],
        )];
        let lines = away_lines(&game);
        assert_eq!(lines[0].runs, 1);
        assert_eq!(lines[1].rbi, 1);
        assert_eq!(lines[1].runs, 0);
    }

    #[test]
    fn runner_events_add_runs_and_steals() {
        let mut game = sample_game();
        game.events = vec![
            runner_event("e1", "a1", RunnerEventKind::StolenBase, Base::First, Destination::Second),
            runner_event("e2", "a1", RunnerEventKind::StolenBase, Base::Second, Destination::Third),
            runner_event("e3", "a1", RunnerEventKind::WildPitch, Base::Third, Destination::Score),
        ];
        let line = &away_lines(&game)[0];
        assert_eq!(line.stolen_bases, 2);
        assert_eq!(line.runs, 1);
    }

    #[test]
    fn unknown_code_is_neither_hit_nor_at_bat() {
        let mut game = sample_game();
        game.events = vec![pa("e1", "a1", "ZZ")];
        let line = &away_lines(&game)[0];
        assert_eq!(line.plate_appearances, 1);
        assert_eq!(line.at_bats, 0);
        assert_eq!(line.hits, 0);
    }

    #[test]
    fn unresolved_player_uses_placeholder_name() {
        let game = sample_game();
        let lines = batting_stats(
            &game.events,
            &[],
            &["ghost".to_string()],
            &TableCatalog::standard(),
        );
        assert_eq!(lines[0].player_name, PLACEHOLDER_NAME);
    }

    #[test]
    fn innings_pitched_display() {
        assert_eq!(InningsPitched::from_outs(5).to_string(), "1.2");
        assert_eq!(InningsPitched::from_outs(27).to_string(), "9.0");
        assert_eq!(InningsPitched::from_outs(0).to_string(), "0.0");
    }

    #[test]
    fn pitching_attribution_across_a_change() {
        let mut game = sample_game();
        // Home is my side, so my pitchers work the top halves.
        game.events = vec![
            pa("e1", "a1", "K"),
            pa("e2", "a2", "H1-C"),
            pa_with(
                "e3",
                "a3",
                "GO-6",
                vec![("a2", Base::First, Destination::Out)],
                vec![],
            ),
            pitcher_change("e4", "team-h", "h-p", "h-r"),
            thrown_by(pa("e5", "a4", "BB"), "h-r"),
            runner_event(
                "e6",
                "a4",
                RunnerEventKind::CaughtStealing,
                Base::First,
                Destination::Out,
            ),
            thrown_by(
                pa_with(
                    "e7",
                    "a5",
                    "HR-R",
                    vec![("a9", Base::Third, Destination::Score)],
                    vec!["a9", "a5"],
                ),
                "h-r",
            ),
            // my side batting: ignored
            during(pa("e8", "h1", "H1-L"), 1, HalfInning::Bottom),
        ];

        let lines = pitching_stats(&game, &TableCatalog::standard());
        assert_eq!(lines.len(), 2);

        let starter = &lines[0];
        assert_eq!(starter.player_id, "h-p");
        assert_eq!(starter.innings_pitched.outs, 3);
        assert_eq!(starter.strikeouts, 1);
        assert_eq!(starter.hits, 1);

        let reliever = &lines[1];
        assert_eq!(reliever.player_name, "Hawks Reliever");
        assert_eq!(reliever.walks, 1);
        assert_eq!(reliever.hits, 1);
        assert_eq!(reliever.innings_pitched.to_string(), "0.1");
        assert_eq!(reliever.runs, 2);
        assert_eq!(reliever.earned_runs, 2);
    }

    #[test]
    fn opponent_pitching_change_is_not_listed() {
        let mut game = sample_game();
        game.events = vec![pitcher_change("e1", "team-a", "a-p", "a-r")];
        let lines = pitching_stats(&game, &TableCatalog::standard());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].player_id, "h-p");
    }
}
