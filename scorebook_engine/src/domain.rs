//! Scorebook: Core Domain Types
//!
//! Pure data: players, teams, the game record and the derived game state.
//! Field names serialize in camelCase so stored games stay readable by
//! every collaborator that shares the JSON shape.

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::invariants::{check_setup, SetupError};

/// Opaque identifier of a player (UUID string in practice).
pub type PlayerId = String;
/// Opaque identifier of a team.
pub type TeamId = String;

/// Name returned whenever a player reference cannot be resolved.
pub const PLACEHOLDER_NAME: &str = "Unknown";

// ── Roster ─────────────────────────────────────────────────────────

/// Fielding position. Scorer's numbers 1–9; the designated hitter is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pitcher,
    Catcher,
    First,
    Second,
    Third,
    Shortstop,
    Left,
    Center,
    Right,
    Dh,
}

impl Position {
    pub fn scorer_number(self) -> u8 {
        match self {
            Position::Pitcher => 1,
            Position::Catcher => 2,
            Position::First => 3,
            Position::Second => 4,
            Position::Third => 5,
            Position::Shortstop => 6,
            Position::Left => 7,
            Position::Center => 8,
            Position::Right => 9,
            Position::Dh => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Pitcher => "pitcher",
            Position::Catcher => "catcher",
            Position::First => "first baseman",
            Position::Second => "second baseman",
            Position::Third => "third baseman",
            Position::Shortstop => "shortstop",
            Position::Left => "left fielder",
            Position::Center => "center fielder",
            Position::Right => "right fielder",
            Position::Dh => "designated hitter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub number: u32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<Player>,
    /// Player ids in batting order. Need not cover the whole roster.
    pub batting_order: Vec<PlayerId>,
    pub starting_pitcher: PlayerId,
}

impl Team {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    /// 1-based slot of `id` in the batting order.
    pub fn batting_order_number(&self, id: &str) -> Option<usize> {
        self.batting_order.iter().position(|p| p == id).map(|i| i + 1)
    }
}

// ── Game record ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Preparing,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub fn opposite(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// The half-inning in which this side is at bat.
    pub fn batting_half(self) -> HalfInning {
        match self {
            TeamSide::Away => HalfInning::Top,
            TeamSide::Home => HalfInning::Bottom,
        }
    }

    /// The half-inning in which this side is in the field.
    pub fn fielding_half(self) -> HalfInning {
        self.opposite().batting_half()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfInning {
    Top,
    Bottom,
}

impl HalfInning {
    /// Visitors bat in the top, the home side in the bottom.
    pub fn batting_side(self) -> TeamSide {
        match self {
            HalfInning::Top => TeamSide::Away,
            HalfInning::Bottom => TeamSide::Home,
        }
    }

    pub fn fielding_side(self) -> TeamSide {
        self.batting_side().opposite()
    }

    pub fn label(self) -> &'static str {
        match self {
            HalfInning::Top => "top",
            HalfInning::Bottom => "bottom",
        }
    }
}

/// Complete game record. `events` is the single source of truth: it only
/// grows by append and only shrinks by dropping its last element (undo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    /// Game date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub home_team: Team,
    pub away_team: Team,
    /// Scheduled number of innings (usually 7 or 9).
    pub innings: u32,
    pub status: GameStatus,
    #[serde(default)]
    pub events: Vec<GameEvent>,
    #[serde(default)]
    pub my_team_name: String,
    #[serde(default)]
    pub my_team_side: TeamSide,
    /// Opponent runs per inning, entered by hand.
    #[serde(default)]
    pub opponent_score_by_inning: Vec<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl Game {
    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn my_team(&self) -> &Team {
        self.team(self.my_team_side)
    }

    pub fn opponent_team(&self) -> &Team {
        self.team(self.my_team_side.opposite())
    }

    /// Side whose team id is `team_id`, if either.
    pub fn side_of_team(&self, team_id: &str) -> Option<TeamSide> {
        if self.home_team.id == team_id {
            Some(TeamSide::Home)
        } else if self.away_team.id == team_id {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn find_player(&self, id: &str) -> Option<&Player> {
        self.home_team
            .player(id)
            .or_else(|| self.away_team.player(id))
    }

    /// Display name for `id`; unresolved references yield [`PLACEHOLDER_NAME`].
    pub fn player_name(&self, id: &str) -> &str {
        self.find_player(id)
            .map(|p| p.name.as_str())
            .unwrap_or(PLACEHOLDER_NAME)
    }

    /// Roster references and scheduled innings, checked before play.
    pub fn validate_setup(&self) -> Result<(), SetupError> {
        check_setup(self)
    }

    /// Fill fields that older stored games do not carry.
    ///
    /// A missing side already defaults to home through serde, so only the
    /// name is filled, from the team on the stored side. A missing opponent
    /// line score is already empty.
    pub fn normalize_legacy(&mut self) -> bool {
        if self.my_team_name.is_empty() {
            self.my_team_name = self.my_team().name.clone();
            return true;
        }
        false
    }
}

// ── Bases ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    First,
    Second,
    Third,
    Home,
}

impl Base {
    /// Base reached by an `n`-base hit (1–3). Home runs have no base.
    pub fn from_hit_bases(n: u8) -> Option<Base> {
        match n {
            1 => Some(Base::First),
            2 => Some(Base::Second),
            3 => Some(Base::Third),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Base::First => "first",
            Base::Second => "second",
            Base::Third => "third",
            Base::Home => "home",
        }
    }
}

/// Where a runner ends up: a base, put out, or across the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    First,
    Second,
    Third,
    Home,
    Out,
    Score,
}

impl Destination {
    pub fn base(self) -> Option<Base> {
        match self {
            Destination::First => Some(Base::First),
            Destination::Second => Some(Base::Second),
            Destination::Third => Some(Base::Third),
            Destination::Home => Some(Base::Home),
            Destination::Out | Destination::Score => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Destination::Out => "out",
            Destination::Score => "score",
            other => other.base().map(Base::label).unwrap_or("?"),
        }
    }
}

impl From<Base> for Destination {
    fn from(base: Base) -> Self {
        match base {
            Base::First => Destination::First,
            Base::Second => Destination::Second,
            Base::Third => Destination::Third,
            Base::Home => Destination::Home,
        }
    }
}

/// Base occupancy. Home is never occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bases {
    pub first: Option<PlayerId>,
    pub second: Option<PlayerId>,
    pub third: Option<PlayerId>,
}

impl Bases {
    pub fn get(&self, base: Base) -> Option<&PlayerId> {
        match base {
            Base::First => self.first.as_ref(),
            Base::Second => self.second.as_ref(),
            Base::Third => self.third.as_ref(),
            Base::Home => None,
        }
    }

    fn slot_mut(&mut self, base: Base) -> Option<&mut Option<PlayerId>> {
        match base {
            Base::First => Some(&mut self.first),
            Base::Second => Some(&mut self.second),
            Base::Third => Some(&mut self.third),
            Base::Home => None,
        }
    }

    /// Put `runner` on `base`, first removing them from any other base.
    pub fn occupy(&mut self, base: Base, runner: &str) {
        if base == Base::Home {
            return;
        }
        self.remove_runner(runner);
        if let Some(slot) = self.slot_mut(base) {
            *slot = Some(runner.to_string());
        }
    }

    pub fn clear(&mut self, base: Base) -> Option<PlayerId> {
        self.slot_mut(base).and_then(Option::take)
    }

    pub fn remove_runner(&mut self, runner: &str) {
        for slot in [&mut self.first, &mut self.second, &mut self.third] {
            if slot.as_deref() == Some(runner) {
                *slot = None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none() && self.third.is_none()
    }

    /// Occupied bases, third first (closest to scoring).
    pub fn occupied_lead_first(&self) -> Vec<(Base, &PlayerId)> {
        [Base::Third, Base::Second, Base::First]
            .into_iter()
            .filter_map(|b| self.get(b).map(|r| (b, r)))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.occupied_lead_first().len()
    }
}

// ── Derived state ──────────────────────────────────────────────────

/// A value kept once per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub home: T,
    pub away: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn get_mut(&mut self, side: TeamSide) -> &mut T {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }
}

/// Game state derived from the event log. Never stored as truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub inning: u32,
    pub half_inning: HalfInning,
    /// 0–3, clamped.
    pub outs: u8,
    pub runners: Bases,
    pub score: PerSide<u32>,
    /// Runs per inning, index 0 = first inning. Grows on demand.
    pub inning_scores: PerSide<Vec<u32>>,
    pub current_batter_index: PerSide<usize>,
    pub current_pitcher: PerSide<PlayerId>,
}

impl GameState {
    pub fn batting_side(&self) -> TeamSide {
        self.half_inning.batting_side()
    }

    pub fn fielding_side(&self) -> TeamSide {
        self.half_inning.fielding_side()
    }
}
