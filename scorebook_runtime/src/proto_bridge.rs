//! Proto ↔ GameEvent conversion bridge.
//!
//! Converts between the protobuf wire types (proto_types.rs) and the
//! engine's typed `GameEvent`. Enumerations are written with their serde
//! tags, so a tag the engine does not know is rejected on the way back
//! in rather than silently mapped.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use scorebook_engine::events::{
    EventHeader, GameEvent, InningChangeEvent, PitcherChangeEvent, PlateAppearanceEvent,
    PlateAppearanceResult, Rbi, RunnerEvent, RunnerMovement,
};

use crate::proto_types::*;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("record {0} carries no event")]
    MissingEvent(u64),
    #[error("record {0} carries no event kind")]
    MissingKind(u64),
    #[error("record {0} carries no header")]
    MissingHeader(u64),
    #[error("unknown value {value:?} for field {field}")]
    UnknownTag { field: &'static str, value: String },
    #[error("outs value {0} out of range")]
    OutsOutOfRange(u32),
}

fn tag_of<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn parse_tag<T: DeserializeOwned>(field: &'static str, raw: &str) -> Result<T, BridgeError> {
    serde_json::from_value(Value::String(raw.to_string())).map_err(|_| BridgeError::UnknownTag {
        field,
        value: raw.to_string(),
    })
}

// ── GameEvent → proto ──────────────────────────────────────────

/// Convert an engine event to a protobuf record for the binary log.
pub fn event_to_proto(sequence: u64, event: &GameEvent) -> ProtoEventRecord {
    let header = header_to_proto(event.header());
    let kind = match event {
        GameEvent::PlateAppearance(pa) => EventKind::PlateAppearance(ProtoPlateAppearance {
            batter_id: pa.batter_id.clone(),
            pitcher_id: pa.pitcher_id.clone(),
            order_in_inning: pa.order_in_inning,
            category: tag_of(&pa.result.category),
            code: pa.result.code.clone(),
            label: pa.result.label.clone(),
            rbi_list: pa
                .rbi_list
                .iter()
                .map(|r| ProtoRbi {
                    runner_id: r.runner_id.clone(),
                    earned: r.earned,
                })
                .collect(),
            runner_movements: pa
                .runner_movements
                .iter()
                .map(|m| ProtoRunnerMovement {
                    runner_id: m.runner_id.clone(),
                    from_base: tag_of(&m.from_base),
                    to_base: tag_of(&m.to_base),
                    reason: tag_of(&m.reason),
                })
                .collect(),
        }),
        GameEvent::RunnerEvent(re) => EventKind::RunnerEvent(ProtoRunnerEvent {
            runner_id: re.runner_id.clone(),
            event_kind: tag_of(&re.event_kind),
            from_base: tag_of(&re.from_base),
            to_base: tag_of(&re.to_base),
        }),
        GameEvent::InningChange(ic) => EventKind::InningChange(ProtoInningChange {
            new_inning: ic.new_inning,
            new_half_inning: tag_of(&ic.new_half_inning),
        }),
        GameEvent::PitcherChange(pc) => EventKind::PitcherChange(ProtoPitcherChange {
            team_id: pc.team_id.clone(),
            out_pitcher_id: pc.out_pitcher_id.clone(),
            in_pitcher_id: pc.in_pitcher_id.clone(),
        }),
    };

    ProtoEventRecord {
        sequence,
        event: Some(ProtoGameEvent {
            header: Some(header),
            kind: Some(kind),
        }),
    }
}

fn header_to_proto(h: &EventHeader) -> ProtoEventHeader {
    ProtoEventHeader {
        id: h.id.clone(),
        timestamp: h.timestamp.clone(),
        inning: h.inning,
        half_inning: tag_of(&h.half_inning),
        outs: u32::from(h.outs),
    }
}

// ── proto → GameEvent ──────────────────────────────────────────

/// Convert a protobuf record back into an engine event.
pub fn proto_to_event(record: &ProtoEventRecord) -> Result<GameEvent, BridgeError> {
    let seq = record.sequence;
    let event = record.event.as_ref().ok_or(BridgeError::MissingEvent(seq))?;
    let kind = event.kind.as_ref().ok_or(BridgeError::MissingKind(seq))?;
    let header = header_from_proto(event.header.as_ref().ok_or(BridgeError::MissingHeader(seq))?)?;

    let out = match kind {
        EventKind::PlateAppearance(pa) => GameEvent::PlateAppearance(PlateAppearanceEvent {
            header,
            batter_id: pa.batter_id.clone(),
            pitcher_id: pa.pitcher_id.clone(),
            order_in_inning: pa.order_in_inning,
            result: PlateAppearanceResult {
                category: parse_tag("category", &pa.category)?,
                code: pa.code.clone(),
                label: pa.label.clone(),
            },
            rbi_list: pa
                .rbi_list
                .iter()
                .map(|r| Rbi {
                    runner_id: r.runner_id.clone(),
                    earned: r.earned,
                })
                .collect(),
            runner_movements: pa
                .runner_movements
                .iter()
                .map(|m| {
                    Ok(RunnerMovement {
                        runner_id: m.runner_id.clone(),
                        from_base: parse_tag("fromBase", &m.from_base)?,
                        to_base: parse_tag("toBase", &m.to_base)?,
                        reason: parse_tag("reason", &m.reason)?,
                    })
                })
                .collect::<Result<Vec<_>, BridgeError>>()?,
        }),
        EventKind::RunnerEvent(re) => GameEvent::RunnerEvent(RunnerEvent {
            header,
            runner_id: re.runner_id.clone(),
            event_kind: parse_tag("eventKind", &re.event_kind)?,
            from_base: parse_tag("fromBase", &re.from_base)?,
            to_base: parse_tag("toBase", &re.to_base)?,
        }),
        EventKind::InningChange(ic) => GameEvent::InningChange(InningChangeEvent {
            header,
            new_inning: ic.new_inning,
            new_half_inning: parse_tag("newHalfInning", &ic.new_half_inning)?,
        }),
        EventKind::PitcherChange(pc) => GameEvent::PitcherChange(PitcherChangeEvent {
            header,
            team_id: pc.team_id.clone(),
            out_pitcher_id: pc.out_pitcher_id.clone(),
            in_pitcher_id: pc.in_pitcher_id.clone(),
        }),
    };
    Ok(out)
}

fn header_from_proto(h: &ProtoEventHeader) -> Result<EventHeader, BridgeError> {
    Ok(EventHeader {
        id: h.id.clone(),
        timestamp: h.timestamp.clone(),
        inning: h.inning,
        half_inning: parse_tag("halfInning", &h.half_inning)?,
        outs: u8::try_from(h.outs).map_err(|_| BridgeError::OutsOutOfRange(h.outs))?,
    })
}
