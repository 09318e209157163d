//! Runtime configuration read from the environment.
use std::env;
use std::path::{Path, PathBuf};

use scorebook_engine::factory::{GameSetup, TeamSetup, DEFAULT_INNINGS};

/// Where games live on disk and how often sessions snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Root of the game files, event logs and snapshots.
    pub data_dir: PathBuf,
    /// Snapshot after every N events. 0 disables snapshots.
    pub snapshot_interval: u64,
    /// Innings for newly created games.
    pub default_innings: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./scorebook-data"),
            snapshot_interval: 25,
            default_innings: DEFAULT_INNINGS,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SCOREBOOK_DATA_DIR` - data directory (default: `./scorebook-data`)
    /// - `SCOREBOOK_SNAPSHOT_INTERVAL` - events between snapshots (default: 25)
    /// - `SCOREBOOK_DEFAULT_INNINGS` - innings for new games (default: 9)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("SCOREBOOK_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(interval) = parse::<u64, _>(&lookup, "SCOREBOOK_SNAPSHOT_INTERVAL") {
            config.snapshot_interval = interval;
        }
        if let Some(innings) = parse::<u32, _>(&lookup, "SCOREBOOK_DEFAULT_INNINGS") {
            config.default_innings = innings.max(1);
        }

        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Setup for a new game using the configured inning count.
    pub fn game_setup(&self, home: TeamSetup, away: TeamSetup) -> GameSetup {
        let mut setup = GameSetup::new(home, away);
        setup.innings = self.default_innings;
        setup
    }

    /// Directory holding one JSON document per game.
    pub fn games_dir(&self) -> PathBuf {
        self.data_dir.join("games")
    }

    /// Directory holding a game's binary event log and snapshots.
    pub fn log_dir(&self, game_id: &str) -> PathBuf {
        self.data_dir.join("logs").join(file_safe_id(game_id))
    }

    pub fn snapshots_enabled(&self) -> bool {
        self.snapshot_interval > 0
    }
}

/// `id` reduced to ASCII letters, digits, `-` and `_`; anything else
/// becomes `_`, so an id never names a path outside its directory.
pub fn file_safe_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Path of the binary event log inside a game's log directory.
pub fn event_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join("events.bin")
}

/// Snapshot directory inside a game's log directory.
pub fn snapshot_dir(log_dir: &Path) -> PathBuf {
    log_dir.join("snapshots")
}

fn parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)?.trim().parse().ok()
}
