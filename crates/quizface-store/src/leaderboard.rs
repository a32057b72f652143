//! Per-player quiz statistics, persisted as a JSON `name → entry` mapping.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cumulative quiz statistics for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub games_played: u32,
    pub total_score: u32,
    /// RFC 3339 timestamp of the most recently completed quiz.
    pub last_played: String,
}

/// The full leaderboard, keyed by player name.
pub type Leaderboard = BTreeMap<String, LeaderboardEntry>;

/// Record a completed quiz: create the entry on a player's first game,
/// otherwise accumulate. Entries are never deleted.
pub fn apply_game(board: &mut Leaderboard, player: &str, score: u32, timestamp: String) {
    let entry = board.entry(player.to_string()).or_insert(LeaderboardEntry {
        games_played: 0,
        total_score: 0,
        last_played: String::new(),
    });
    entry.games_played += 1;
    entry.total_score += score;
    entry.last_played = timestamp;
}

/// JSON-file-backed store for the leaderboard.
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the leaderboard; missing, empty, or malformed files reset to an
    /// empty board with a warning.
    pub fn load(&self) -> Leaderboard {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Leaderboard::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read leaderboard; starting empty");
                return Leaderboard::new();
            }
        };

        if raw.trim().is_empty() {
            return Leaderboard::new();
        }

        match serde_json::from_str(&raw) {
            Ok(board) => board,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "malformed leaderboard; resetting to empty");
                Leaderboard::new()
            }
        }
    }

    /// Write the full leaderboard, overwriting prior contents.
    /// Failure is logged, not propagated.
    pub fn save(&self, board: &Leaderboard) {
        if let Err(err) = self.try_save(board) {
            tracing::error!(path = %self.path.display(), error = %err, "failed to save leaderboard");
        }
    }

    /// Apply a completed game for `player` and persist immediately.
    pub fn record_game(&self, board: &mut Leaderboard, player: &str, score: u32) {
        let timestamp = chrono::Local::now().to_rfc3339();
        apply_game(board, player, score, timestamp);
        self.save(board);
        tracing::info!(player, score, "recorded completed quiz");
    }

    fn try_save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(board)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> LeaderboardStore {
        let path = std::env::temp_dir()
            .join(format!("quizface-test-{}", Uuid::new_v4()))
            .join("leaderboard.json");
        LeaderboardStore::new(path)
    }

    #[test]
    fn missing_file_loads_empty() {
        assert!(temp_store().load().is_empty());
    }

    #[test]
    fn malformed_file_resets_to_empty() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "[1, 2, oops").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn first_game_creates_entry() {
        let mut board = Leaderboard::new();
        apply_game(&mut board, "bob", 10, "2024-05-01T12:00:00+00:00".into());

        let entry = &board["bob"];
        assert_eq!(entry.games_played, 1);
        assert_eq!(entry.total_score, 10);
        assert_eq!(entry.last_played, "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn repeat_games_accumulate() {
        let mut board = Leaderboard::new();
        apply_game(&mut board, "bob", 10, "t1".into());
        apply_game(&mut board, "bob", 4, "t2".into());

        let entry = &board["bob"];
        assert_eq!(entry.games_played, 2);
        assert_eq!(entry.total_score, 14);
        assert_eq!(entry.last_played, "t2");
    }

    #[test]
    fn record_game_persists() {
        let store = temp_store();
        let mut board = store.load();
        store.record_game(&mut board, "bob", 10);

        let reloaded = store.load();
        assert_eq!(reloaded["bob"].games_played, 1);
        assert_eq!(reloaded["bob"].total_score, 10);
        assert!(!reloaded["bob"].last_played.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store();
        let mut board = Leaderboard::new();
        apply_game(&mut board, "alice", 12, "t1".into());
        apply_game(&mut board, "bob", 7, "t2".into());
        store.save(&board);

        assert_eq!(store.load(), board);
    }
}
