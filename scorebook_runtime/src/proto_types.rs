//! Hand-written protobuf types for the binary game event log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers are part of the on-disk format and must not change.
//! Enumerations travel as their JSON tag strings (`"stolen_base"`,
//! `"score"`, ...), so the binary and JSON shapes share one vocabulary.

use prost::Message;

// ── Record ─────────────────────────────────────────────────────

/// One frame of the log: a sequence number plus the event.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventRecord {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(message, optional, tag = "2")]
    pub event: Option<ProtoGameEvent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoGameEvent {
    #[prost(message, optional, tag = "1")]
    pub header: Option<ProtoEventHeader>,
    #[prost(oneof = "EventKind", tags = "2, 3, 4, 5")]
    pub kind: Option<EventKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventKind {
    #[prost(message, tag = "2")]
    PlateAppearance(ProtoPlateAppearance),
    #[prost(message, tag = "3")]
    RunnerEvent(ProtoRunnerEvent),
    #[prost(message, tag = "4")]
    InningChange(ProtoInningChange),
    #[prost(message, tag = "5")]
    PitcherChange(ProtoPitcherChange),
}

// ── Header ─────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventHeader {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub timestamp: String,
    #[prost(uint32, tag = "3")]
    pub inning: u32,
    #[prost(string, tag = "4")]
    pub half_inning: String,
    #[prost(uint32, tag = "5")]
    pub outs: u32,
}

// ── Plate appearance ───────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoPlateAppearance {
    #[prost(string, tag = "1")]
    pub batter_id: String,
    #[prost(string, tag = "2")]
    pub pitcher_id: String,
    #[prost(uint32, tag = "3")]
    pub order_in_inning: u32,
    #[prost(string, tag = "4")]
    pub category: String,
    #[prost(string, tag = "5")]
    pub code: String,
    #[prost(string, tag = "6")]
    pub label: String,
    #[prost(message, repeated, tag = "7")]
    pub rbi_list: Vec<ProtoRbi>,
    #[prost(message, repeated, tag = "8")]
    pub runner_movements: Vec<ProtoRunnerMovement>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRbi {
    #[prost(string, tag = "1")]
    pub runner_id: String,
    #[prost(bool, tag = "2")]
    pub earned: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRunnerMovement {
    #[prost(string, tag = "1")]
    pub runner_id: String,
    #[prost(string, tag = "2")]
    pub from_base: String,
    #[prost(string, tag = "3")]
    pub to_base: String,
    #[prost(string, tag = "4")]
    pub reason: String,
}

// ── Between plate appearances ──────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRunnerEvent {
    #[prost(string, tag = "1")]
    pub runner_id: String,
    #[prost(string, tag = "2")]
    pub event_kind: String,
    #[prost(string, tag = "3")]
    pub from_base: String,
    #[prost(string, tag = "4")]
    pub to_base: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoInningChange {
    #[prost(uint32, tag = "1")]
    pub new_inning: u32,
    #[prost(string, tag = "2")]
    pub new_half_inning: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoPitcherChange {
    #[prost(string, tag = "1")]
    pub team_id: String,
    #[prost(string, tag = "2")]
    pub out_pitcher_id: String,
    #[prost(string, tag = "3")]
    pub in_pitcher_id: String,
}
