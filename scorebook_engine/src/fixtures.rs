//! Shared builders for unit tests.

use crate::catalog::{ResultCatalog, TableCatalog};
use crate::domain::{
    Base, Destination, Game, GameStatus, HalfInning, Player, Position, Team, TeamSide,
};
use crate::events::{
    EventHeader, GameEvent, InningChangeEvent, MovementReason, PitcherChangeEvent,
    PlateAppearanceEvent, PlateAppearanceResult, Rbi, ResultCategory, RunnerEvent,
    RunnerEventKind, RunnerMovement,
};

const POSITIONS: [Position; 9] = [
    Position::Center,
    Position::Second,
    Position::Shortstop,
    Position::First,
    Position::Third,
    Position::Left,
    Position::Right,
    Position::Catcher,
    Position::Dh,
];

fn team(prefix: &str, name: &str) -> Team {
    let mut players: Vec<Player> = POSITIONS
        .iter()
        .enumerate()
        .map(|(i, pos)| Player {
            id: format!("{}{}", prefix, i + 1),
            name: format!("{} {}", name, i + 1),
            number: (i + 1) as u32,
            position: *pos,
        })
        .collect();
    players.push(Player {
        id: format!("{}-p", prefix),
        name: format!("{} Starter", name),
        number: 18,
        position: Position::Pitcher,
    });
    players.push(Player {
        id: format!("{}-r", prefix),
        name: format!("{} Reliever", name),
        number: 41,
        position: Position::Pitcher,
    });

    Team {
        id: format!("team-{}", prefix),
        name: name.to_string(),
        batting_order: (1..=9).map(|i| format!("{}{}", prefix, i)).collect(),
        starting_pitcher: format!("{}-p", prefix),
        players,
    }
}

/// Nine-inning game, home side ("Hawks", ids `h1`..`h9`, `h-p`, `h-r`) is
/// my team; visitors are "Owls" (`a1`..`a9`, `a-p`, `a-r`).
pub fn sample_game() -> Game {
    Game {
        id: "game-1".to_string(),
        date: "2024-05-01".to_string(),
        venue: "Riverside Park".to_string(),
        home_team: team("h", "Hawks"),
        away_team: team("a", "Owls"),
        innings: 9,
        status: GameStatus::InProgress,
        events: Vec::new(),
        my_team_name: "Hawks".to_string(),
        my_team_side: TeamSide::Home,
        opponent_score_by_inning: Vec::new(),
        created_at: "2024-05-01T09:00:00.000Z".to_string(),
        updated_at: "2024-05-01T09:00:00.000Z".to_string(),
    }
}

pub fn header(id: &str) -> EventHeader {
    EventHeader {
        id: id.to_string(),
        timestamp: "2024-05-01T10:00:00.000Z".to_string(),
        inning: 1,
        half_inning: HalfInning::Top,
        outs: 0,
    }
}

pub fn pa(id: &str, batter: &str, code: &str) -> GameEvent {
    pa_with(id, batter, code, vec![], vec![])
}

pub fn pa_with(
    id: &str,
    batter: &str,
    code: &str,
    movements: Vec<(&str, Base, Destination)>,
    rbis: Vec<&str>,
) -> GameEvent {
    let catalog = TableCatalog::standard();
    let (category, label) = catalog
        .lookup(code)
        .map(|o| (o.category, o.label.clone()))
        .unwrap_or((ResultCategory::Out, code.to_string()));

    GameEvent::PlateAppearance(PlateAppearanceEvent {
        header: header(id),
        batter_id: batter.to_string(),
        pitcher_id: "h-p".to_string(),
        order_in_inning: 1,
        result: PlateAppearanceResult {
            category,
            code: code.to_string(),
            label,
        },
        rbi_list: rbis
            .into_iter()
            .map(|r| Rbi {
                runner_id: r.to_string(),
                earned: true,
            })
            .collect(),
        runner_movements: movements
            .into_iter()
            .map(|(r, from, to)| RunnerMovement {
                runner_id: r.to_string(),
                from_base: from,
                to_base: to,
                reason: MovementReason::BattedBall,
            })
            .collect(),
    })
}

pub fn runner_event(
    id: &str,
    runner: &str,
    kind: RunnerEventKind,
    from: Base,
    to: Destination,
) -> GameEvent {
    GameEvent::RunnerEvent(RunnerEvent {
        header: header(id),
        runner_id: runner.to_string(),
        event_kind: kind,
        from_base: from,
        to_base: to,
    })
}

pub fn inning_change(id: &str, inning: u32, half: HalfInning) -> GameEvent {
    GameEvent::InningChange(InningChangeEvent {
        header: header(id),
        new_inning: inning,
        new_half_inning: half,
    })
}

pub fn pitcher_change(id: &str, team_id: &str, out: &str, incoming: &str) -> GameEvent {
    GameEvent::PitcherChange(PitcherChangeEvent {
        header: header(id),
        team_id: team_id.to_string(),
        out_pitcher_id: out.to_string(),
        in_pitcher_id: incoming.to_string(),
    })
}

/// Re-stamp an event as having happened in `half` of `inning`.
pub fn during(mut event: GameEvent, inning: u32, half: HalfInning) -> GameEvent {
    let h = match &mut event {
        GameEvent::PlateAppearance(e) => &mut e.header,
        GameEvent::RunnerEvent(e) => &mut e.header,
        GameEvent::InningChange(e) => &mut e.header,
        GameEvent::PitcherChange(e) => &mut e.header,
    };
    h.inning = inning;
    h.half_inning = half;
    event
}

/// Replace the pitcher of a plate appearance.
pub fn thrown_by(mut event: GameEvent, pitcher: &str) -> GameEvent {
    if let GameEvent::PlateAppearance(e) = &mut event {
        e.pitcher_id = pitcher.to_string();
    }
    event
}
