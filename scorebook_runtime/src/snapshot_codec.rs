//! Snapshot Codec: GameState encoder/decoder.
//!
//! Pure codec layer. No timestamps, no envelope.
//!
//! - `encode_state`:  GameState → JSON string (serde shape, camelCase)
//! - `decode_state`:  JSON string → GameState
//! - `restore_state`: decode + invariant validation against the game
//! - `export_state_to_file` / `import_state_from_file`: file I/O
//! - `state_digest`:  SHA-256 of the encoded JSON (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use scorebook_engine::invariants::{check_state, InvariantViolation};
use scorebook_engine::{Game, GameState};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("snapshot deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("snapshot state is invalid: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("snapshot I/O: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch { stored: String, computed: String },
    #[error("snapshot at {event_count} events was taken after {expected:?}, log has {found:?}")]
    LogMismatch {
        event_count: u64,
        expected: String,
        found: String,
    },
    #[error("snapshot written under rules version {found}, current is {current}")]
    RulesVersion { found: u32, current: u32 },
}

pub fn encode_state(state: &GameState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Serialization)
}

/// Decode without validation. Use [`restore_state`] for untrusted input.
pub fn decode_state(json: &str) -> Result<GameState, SnapshotError> {
    serde_json::from_str(json).map_err(SnapshotError::Deserialization)
}

/// Decode and check the derived-state invariants against `game`.
pub fn restore_state(json: &str, game: &Game) -> Result<GameState, SnapshotError> {
    let state = decode_state(json)?;
    check_state(&state, game)?;
    Ok(state)
}

/// Write the encoded state to `path`, creating parent directories.
/// Identical states produce identical files.
pub fn export_state_to_file(state: &GameState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_state(state)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_state_from_file(path: &Path, game: &Game) -> Result<GameState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_state(&content, game)
}

/// SHA-256 of the serde encoding. This guards snapshot files against
/// corruption; it is not the canonical replay hash from `hashing`.
pub fn state_digest(state: &GameState) -> Result<String, SnapshotError> {
    let digest = Sha256::digest(encode_state(state)?.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
