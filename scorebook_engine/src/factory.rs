//! Scorebook: Event Factory
//!
//! Builds well-formed events from the current derived state. Every event
//! gets a fresh UUID v4 id and a millisecond-precision UTC timestamp; the
//! header's inning, half and outs are copied from the state at creation.
//!
//! Also hosts the read helpers the recording surface needs (whose turn it
//! is, who is pitching, what a logged event means in words).

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::domain::{
    Base, Destination, Game, GameState, GameStatus, HalfInning, Player, PlayerId, Team, TeamSide,
};
use crate::events::{
    EventHeader, GameEvent, InningChangeEvent, PitcherChangeEvent, PlateAppearanceEvent,
    PlateAppearanceResult, Rbi, RunnerEvent, RunnerEventKind, RunnerMovement,
};
use crate::invariants::SetupError;

/// Default scheduled length of a game.
pub const DEFAULT_INNINGS: u32 = 9;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time, RFC 3339 with milliseconds (`2024-05-01T10:00:00.000Z`).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn stamp(state: &GameState) -> EventHeader {
    EventHeader {
        id: new_id(),
        timestamp: now_timestamp(),
        inning: state.inning,
        half_inning: state.half_inning,
        outs: state.outs,
    }
}

// ── Event constructors ─────────────────────────────────────────────

pub fn new_plate_appearance(
    state: &GameState,
    batter_id: &str,
    pitcher_id: &str,
    result: PlateAppearanceResult,
    runner_movements: Vec<RunnerMovement>,
    rbi_list: Vec<Rbi>,
    order_in_inning: u32,
) -> GameEvent {
    GameEvent::PlateAppearance(PlateAppearanceEvent {
        header: stamp(state),
        batter_id: batter_id.to_string(),
        pitcher_id: pitcher_id.to_string(),
        order_in_inning,
        result,
        rbi_list,
        runner_movements,
    })
}

pub fn new_runner_event(
    state: &GameState,
    runner_id: &str,
    event_kind: RunnerEventKind,
    from_base: Base,
    to_base: Destination,
) -> GameEvent {
    GameEvent::RunnerEvent(RunnerEvent {
        header: stamp(state),
        runner_id: runner_id.to_string(),
        event_kind,
        from_base,
        to_base,
    })
}

pub fn new_inning_change(
    state: &GameState,
    new_inning: u32,
    new_half_inning: HalfInning,
) -> GameEvent {
    GameEvent::InningChange(InningChangeEvent {
        header: stamp(state),
        new_inning,
        new_half_inning,
    })
}

pub fn new_pitcher_change(
    state: &GameState,
    team_id: &str,
    out_pitcher_id: &str,
    in_pitcher_id: &str,
) -> GameEvent {
    GameEvent::PitcherChange(PitcherChangeEvent {
        header: stamp(state),
        team_id: team_id.to_string(),
        out_pitcher_id: out_pitcher_id.to_string(),
        in_pitcher_id: in_pitcher_id.to_string(),
    })
}

// ── New game ───────────────────────────────────────────────────────

/// One side's lineup as entered before the game.
#[derive(Debug, Clone)]
pub struct TeamSetup {
    pub name: String,
    pub players: Vec<Player>,
    pub batting_order: Vec<PlayerId>,
    pub starting_pitcher: PlayerId,
}

#[derive(Debug, Clone)]
pub struct GameSetup {
    pub home: TeamSetup,
    pub away: TeamSetup,
    pub innings: u32,
    /// `YYYY-MM-DD`; today (UTC) when absent.
    pub date: Option<String>,
    pub venue: Option<String>,
    /// Defaults to the home team's name.
    pub my_team_name: Option<String>,
    /// Defaults to home.
    pub my_team_side: Option<TeamSide>,
}

impl GameSetup {
    pub fn new(home: TeamSetup, away: TeamSetup) -> Self {
        Self {
            home,
            away,
            innings: DEFAULT_INNINGS,
            date: None,
            venue: None,
            my_team_name: None,
            my_team_side: None,
        }
    }
}

fn build_team(setup: TeamSetup) -> Team {
    Team {
        id: new_id(),
        name: setup.name,
        players: setup.players,
        batting_order: setup.batting_order,
        starting_pitcher: setup.starting_pitcher,
    }
}

/// A fresh game in `preparing` status with an empty log. Roster
/// references are checked before the game is returned.
pub fn new_game(setup: GameSetup) -> Result<Game, SetupError> {
    let now = now_timestamp();
    let my_team_name = setup
        .my_team_name
        .unwrap_or_else(|| setup.home.name.clone());

    let game = Game {
        id: new_id(),
        date: setup
            .date
            .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        venue: setup.venue.unwrap_or_default(),
        home_team: build_team(setup.home),
        away_team: build_team(setup.away),
        innings: setup.innings,
        status: GameStatus::Preparing,
        events: Vec::new(),
        my_team_name,
        my_team_side: setup.my_team_side.unwrap_or_default(),
        opponent_score_by_inning: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    game.validate_setup()?;
    Ok(game)
}

// ── Read helpers ───────────────────────────────────────────────────

/// 1-based number of the next plate appearance in the current half.
pub fn order_in_inning(game: &Game, state: &GameState) -> u32 {
    let logged = game
        .events
        .iter()
        .filter(|e| {
            matches!(e, GameEvent::PlateAppearance(_))
                && e.occurred_in(state.inning, state.half_inning)
        })
        .count();
    logged as u32 + 1
}

pub fn offense_team<'a>(game: &'a Game, state: &GameState) -> &'a Team {
    game.team(state.batting_side())
}

pub fn defense_team<'a>(game: &'a Game, state: &GameState) -> &'a Team {
    game.team(state.fielding_side())
}

/// The batter due up, or `None` when the batting side has no order.
pub fn current_batter_id<'a>(game: &'a Game, state: &GameState) -> Option<&'a PlayerId> {
    let side = state.batting_side();
    game.team(side)
        .batting_order
        .get(*state.current_batter_index.get(side))
}

/// The defending side's pitcher.
pub fn current_pitcher_id(state: &GameState) -> &PlayerId {
    state.current_pitcher.get(state.fielding_side())
}

/// 1-based slot of `player_id` in the offense's order, 0 if absent.
pub fn batting_order_number(game: &Game, state: &GameState, player_id: &str) -> usize {
    offense_team(game, state)
        .batting_order_number(player_id)
        .unwrap_or(0)
}

fn half_label(inning: u32, half: HalfInning) -> String {
    format!("{} {}", half.label(), inning)
}

/// One-line summary of a logged event, for the log view and the CLI.
pub fn describe_event(game: &Game, event: &GameEvent) -> String {
    match event {
        GameEvent::PlateAppearance(e) => {
            let mut desc = format!("{}: {}", game.player_name(&e.batter_id), e.result.label);
            if !e.rbi_list.is_empty() {
                desc.push_str(&format!(" ({} RBI)", e.rbi_list.len()));
            }
            desc
        }
        GameEvent::RunnerEvent(e) => format!(
            "{}: {} ({} → {})",
            game.player_name(&e.runner_id),
            e.event_kind.label(),
            e.from_base.label(),
            e.to_base.label()
        ),
        GameEvent::InningChange(e) => {
            format!("→ {}", half_label(e.new_inning, e.new_half_inning))
        }
        GameEvent::PitcherChange(e) => format!(
            "pitching change: {} → {}",
            game.player_name(&e.out_pitcher_id),
            game.player_name(&e.in_pitcher_id)
        ),
    }
}
