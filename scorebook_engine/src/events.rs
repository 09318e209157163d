//! Scorebook: Event Definitions
//!
//! Events are pure data. They carry what happened and nothing else;
//! all state-mutation logic lives in `transitions`.
//!
//! Wire shape: one JSON object per event, discriminated by `type`
//! (`plate_appearance`, `runner_event`, `inning_change`,
//! `pitcher_change`), every kind carrying the common header fields
//! `id`, `timestamp`, `inning`, `halfInning`, `outs`. Field names and
//! tags must not change: persisted logs depend on them.

use serde::{Deserialize, Serialize};

use crate::domain::{Base, Destination, HalfInning, PlayerId, TeamId};

/// Fields shared by every event kind. `inning`, `halfInning` and `outs`
/// describe the state at the moment the event was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHeader {
    pub id: String,
    /// RFC 3339 / ISO 8601 UTC.
    pub timestamp: String,
    pub inning: u32,
    pub half_inning: HalfInning,
    pub outs: u8,
}

// ── Plate appearance ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Hit,
    Out,
    Error,
    FieldersChoice,
    Walk,
    HitByPitch,
    SacrificeBunt,
    SacrificeFly,
    Interference,
}

impl ResultCategory {
    /// Categories whose batter is simply awarded first base.
    pub fn awards_first_base(self) -> bool {
        matches!(
            self,
            ResultCategory::Walk
                | ResultCategory::HitByPitch
                | ResultCategory::Error
                | ResultCategory::FieldersChoice
                | ResultCategory::Interference
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateAppearanceResult {
    pub category: ResultCategory,
    /// Catalog code, e.g. `GO-6`, `H1-L`.
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    BattedBall,
    Force,
    Tag,
    Error,
}

/// A runner's movement caused by a plate appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerMovement {
    pub runner_id: PlayerId,
    pub from_base: Base,
    pub to_base: Destination,
    /// Informational only; the projector ignores it.
    pub reason: MovementReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rbi {
    /// The runner who scored.
    pub runner_id: PlayerId,
    /// Only earned entries count toward the batter's RBI total.
    pub earned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateAppearanceEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub batter_id: PlayerId,
    pub pitcher_id: PlayerId,
    /// 1-based plate appearance number within the half-inning.
    pub order_in_inning: u32,
    pub result: PlateAppearanceResult,
    #[serde(default)]
    pub rbi_list: Vec<Rbi>,
    #[serde(default)]
    pub runner_movements: Vec<RunnerMovement>,
}

// ── Runner event (between plate appearances) ───────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerEventKind {
    StolenBase,
    CaughtStealing,
    Pickoff,
    WildPitch,
    PassedBall,
    Balk,
    Advance,
}

impl RunnerEventKind {
    pub fn label(self) -> &'static str {
        match self {
            RunnerEventKind::StolenBase => "stolen base",
            RunnerEventKind::CaughtStealing => "caught stealing",
            RunnerEventKind::Pickoff => "picked off",
            RunnerEventKind::WildPitch => "advance on wild pitch",
            RunnerEventKind::PassedBall => "advance on passed ball",
            RunnerEventKind::Balk => "advance on balk",
            RunnerEventKind::Advance => "advance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub runner_id: PlayerId,
    pub event_kind: RunnerEventKind,
    pub from_base: Base,
    pub to_base: Destination,
}

// ── Inning change ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningChangeEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub new_inning: u32,
    pub new_half_inning: HalfInning,
}

// ── Pitcher change ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitcherChangeEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub team_id: TeamId,
    pub out_pitcher_id: PlayerId,
    pub in_pitcher_id: PlayerId,
}

// ── Union ──────────────────────────────────────────────────────────

/// Closed set of event kinds. Every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlateAppearance(PlateAppearanceEvent),
    RunnerEvent(RunnerEvent),
    InningChange(InningChangeEvent),
    PitcherChange(PitcherChangeEvent),
}

impl GameEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            GameEvent::PlateAppearance(e) => &e.header,
            GameEvent::RunnerEvent(e) => &e.header,
            GameEvent::InningChange(e) => &e.header,
            GameEvent::PitcherChange(e) => &e.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut EventHeader {
        match self {
            GameEvent::PlateAppearance(e) => &mut e.header,
            GameEvent::RunnerEvent(e) => &mut e.header,
            GameEvent::InningChange(e) => &mut e.header,
            GameEvent::PitcherChange(e) => &mut e.header,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }

    /// The wire tag of this event kind.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            GameEvent::PlateAppearance(_) => "plate_appearance",
            GameEvent::RunnerEvent(_) => "runner_event",
            GameEvent::InningChange(_) => "inning_change",
            GameEvent::PitcherChange(_) => "pitcher_change",
        }
    }

    /// True if the event happened while `half` of `inning` was being played.
    pub fn occurred_in(&self, inning: u32, half: HalfInning) -> bool {
        let h = self.header();
        h.inning == inning && h.half_inning == half
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header() -> EventHeader {
        EventHeader {
            id: "e1".to_string(),
            timestamp: "2024-05-01T10:00:00.000Z".to_string(),
            inning: 2,
            half_inning: HalfInning::Bottom,
            outs: 1,
        }
    }

    #[test]
    fn plate_appearance_wire_shape() {
        let event = GameEvent::PlateAppearance(PlateAppearanceEvent {
            header: header(),
            batter_id: "b1".to_string(),
            pitcher_id: "p1".to_string(),
            order_in_inning: 3,
            result: PlateAppearanceResult {
                category: ResultCategory::Hit,
                code: "H1-L".to_string(),
                label: "Single to left".to_string(),
            },
            rbi_list: vec![Rbi {
                runner_id: "r3".to_string(),
                earned: true,
            }],
            runner_movements: vec![RunnerMovement {
                runner_id: "r3".to_string(),
                from_base: Base::Third,
                to_base: Destination::Score,
                reason: MovementReason::BattedBall,
            }],
        });

        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["type"], "plate_appearance");
        assert_eq!(v["halfInning"], "bottom");
        assert_eq!(v["orderInInning"], 3);
        assert_eq!(v["result"]["category"], "hit");
        assert_eq!(v["rbiList"][0]["runnerId"], "r3");
        assert_eq!(v["runnerMovements"][0]["toBase"], "score");
        assert_eq!(v["runnerMovements"][0]["reason"], "batted_ball");
    }

    #[test]
    fn parses_stored_runner_event() {
        let v = json!({
            "id": "e9",
            "type": "runner_event",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "inning": 1,
            "halfInning": "top",
            "outs": 0,
            "runnerId": "r1",
            "eventKind": "stolen_base",
            "fromBase": "first",
            "toBase": "second"
        });
        let event: GameEvent = serde_json::from_value(v).unwrap();
        match &event {
            GameEvent::RunnerEvent(e) => {
                assert_eq!(e.event_kind, RunnerEventKind::StolenBase);
                assert_eq!(e.to_base, Destination::Second);
            }
            other => panic!("expected runner_event, got {:?}", other),
        }
        assert_eq!(event.kind_tag(), "runner_event");
        assert!(event.occurred_in(1, HalfInning::Top));
    }

    #[test]
    fn pitcher_change_tag_and_fields() {
        let event = GameEvent::PitcherChange(PitcherChangeEvent {
            header: header(),
            team_id: "t1".to_string(),
            out_pitcher_id: "p1".to_string(),
            in_pitcher_id: "p2".to_string(),
        });
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["type"], "pitcher_change");
        assert_eq!(v["outPitcherId"], "p1");
        assert_eq!(v["inPitcherId"], "p2");
    }
}
