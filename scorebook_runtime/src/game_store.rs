//! Game documents: one record per game holding setup, status and the
//! full event list.
//!
//! `JsonDirRepository` keeps one pretty-printed JSON file per game under a
//! directory; `InMemoryRepository` backs tests and throwaway sessions.
//! Legacy documents are normalized on load.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use scorebook_engine::factory::now_timestamp;
use scorebook_engine::Game;

use crate::config::file_safe_id;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("game store I/O: {0}")]
    Io(#[from] io::Error),
    #[error("game serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupted game file {path}: {source}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistence seam for game documents.
pub trait GameRepository {
    /// Every stored game, most recently updated first.
    fn list_games(&self) -> Result<Vec<Game>, RepositoryError>;

    fn load_game(&self, id: &str) -> Result<Option<Game>, RepositoryError>;

    /// Insert or replace by id. Stamps `updated_at`.
    fn save_game(&mut self, game: &mut Game) -> Result<(), RepositoryError>;

    /// Returns whether a game was removed.
    fn delete_game(&mut self, id: &str) -> Result<bool, RepositoryError>;
}

fn newest_first(games: &mut [Game]) {
    games.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

fn normalized(mut game: Game) -> Game {
    if game.normalize_legacy() {
        debug!(game_id = %game.id, "filled legacy my-team fields");
    }
    game
}

// ── JSON directory ─────────────────────────────────────────────

pub struct JsonDirRepository {
    dir: PathBuf,
}

impl JsonDirRepository {
    pub fn open(dir: &Path) -> Result<Self, RepositoryError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_safe_id(id)))
    }

    fn read(path: &Path) -> Result<Game, RepositoryError> {
        let data = fs::read_to_string(path)?;
        let game: Game = serde_json::from_str(&data).map_err(|source| RepositoryError::Corrupted {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(normalized(game))
    }
}

impl GameRepository for JsonDirRepository {
    fn list_games(&self) -> Result<Vec<Game>, RepositoryError> {
        let mut games = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(game) => games.push(game),
                Err(e) => warn!(path = %path.display(), "skipping unreadable game: {}", e),
            }
        }
        newest_first(&mut games);
        Ok(games)
    }

    fn load_game(&self, id: &str) -> Result<Option<Game>, RepositoryError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn save_game(&mut self, game: &mut Game) -> Result<(), RepositoryError> {
        game.updated_at = now_timestamp();
        let json = serde_json::to_string_pretty(game)?;
        let path = self.path_for(&game.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!(game_id = %game.id, events = game.events.len(), "game saved");
        Ok(())
    }

    fn delete_game(&mut self, id: &str) -> Result<bool, RepositoryError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!(game_id = %id, "game deleted");
        Ok(true)
    }
}

// ── In memory ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    games: BTreeMap<String, Game>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for InMemoryRepository {
    fn list_games(&self) -> Result<Vec<Game>, RepositoryError> {
        let mut games: Vec<Game> = self.games.values().cloned().collect();
        newest_first(&mut games);
        Ok(games)
    }

    fn load_game(&self, id: &str) -> Result<Option<Game>, RepositoryError> {
        Ok(self.games.get(id).cloned().map(normalized))
    }

    fn save_game(&mut self, game: &mut Game) -> Result<(), RepositoryError> {
        game.updated_at = now_timestamp();
        self.games.insert(game.id.clone(), game.clone());
        Ok(())
    }

    fn delete_game(&mut self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.games.remove(id).is_some())
    }
}
