//! Scorebook: Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing of a derived
//! `GameState`. Two replays of the same log hash identically.
//!
//! Rules:
//!   - `rules_version` first, then the state fields in fixed order
//!   - home before away in every per-side value
//!   - empty bases serialize as `null`
//!   - UTF-8 JSON, no whitespace, integers only

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{GameState, PerSide};
use crate::RULES_VERSION;

/// Canonical serialization of a `GameState` to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &GameState) -> Vec<u8> {
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex.
pub fn canonical_hash(state: &GameState) -> String {
    hex_digest(&canonical_serialize(state))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn per_side(value: &PerSide<Value>) -> Value {
    let mut map = Map::new();
    map.insert("home".to_string(), value.home.clone());
    map.insert("away".to_string(), value.away.clone());
    Value::Object(map)
}

fn runs(line: &[u32]) -> Value {
    Value::Array(line.iter().map(|r| Value::from(*r)).collect())
}

fn occupant(runner: &Option<String>) -> Value {
    runner.clone().map(Value::String).unwrap_or(Value::Null)
}

/// Field order: rules_version, inning, half_inning, outs, runners, score,
/// inning_scores, current_batter_index, current_pitcher.
fn build_canonical_value(state: &GameState) -> Value {
    let mut bases = Map::new();
    bases.insert("first".to_string(), occupant(&state.runners.first));
    bases.insert("second".to_string(), occupant(&state.runners.second));
    bases.insert("third".to_string(), occupant(&state.runners.third));

    let mut root = Map::new();
    root.insert("rules_version".to_string(), Value::from(RULES_VERSION));
    root.insert("inning".to_string(), Value::from(state.inning));
    root.insert(
        "half_inning".to_string(),
        Value::String(state.half_inning.label().to_string()),
    );
    root.insert("outs".to_string(), Value::from(state.outs));
    root.insert("runners".to_string(), Value::Object(bases));
    root.insert(
        "score".to_string(),
        per_side(&PerSide {
            home: Value::from(state.score.home),
            away: Value::from(state.score.away),
        }),
    );
    root.insert(
        "inning_scores".to_string(),
        per_side(&PerSide {
            home: runs(&state.inning_scores.home),
            away: runs(&state.inning_scores.away),
        }),
    );
    root.insert(
        "current_batter_index".to_string(),
        per_side(&PerSide {
            home: Value::from(state.current_batter_index.home as u64),
            away: Value::from(state.current_batter_index.away as u64),
        }),
    );
    root.insert(
        "current_pitcher".to_string(),
        per_side(&PerSide {
            home: Value::String(state.current_pitcher.home.clone()),
            away: Value::String(state.current_pitcher.away.clone()),
        }),
    );

    Value::Object(root)
}
