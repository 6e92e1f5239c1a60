//! Persist the top-10 score list to disk (XDG config or ~/.config/stacktui).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILENAME: &str = "scores.json";

/// Entries kept after every save.
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid score file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returns the default score file path (config dir / stacktui / scores.json).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("stacktui").join(FILENAME)
}

/// Highest score first; ties go to the most recent entry.
fn sort_and_truncate(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.date.cmp(&a.date)));
    entries.truncate(MAX_ENTRIES);
}

/// Insert `entry` and keep the top ten.
pub fn rank(mut entries: Vec<ScoreEntry>, entry: ScoreEntry) -> Vec<ScoreEntry> {
    entries.push(entry);
    sort_and_truncate(&mut entries);
    entries
}

/// JSON-backed high-score list. I/O failures never reach the caller: loading
/// degrades to an empty list and a failed write is only logged.
#[derive(Debug, Clone)]
pub struct HighScores {
    path: PathBuf,
}

impl HighScores {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored scores, best first. Empty on missing or unreadable file.
    pub fn load(&self) -> Vec<ScoreEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(ScoreStoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("failed to load scores from {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Record `name` with `score` now and return the new top ten.
    pub fn save(&self, name: &str, score: u32) -> Vec<ScoreEntry> {
        self.save_at(name, score, Utc::now())
    }

    pub fn save_at(&self, name: &str, score: u32, date: DateTime<Utc>) -> Vec<ScoreEntry> {
        let entry = ScoreEntry {
            name: name.to_string(),
            score,
            date,
        };
        let entries = rank(self.load(), entry);
        match self.write(&entries) {
            Ok(()) => log::info!("saved score {score} for {name}"),
            Err(e) => log::warn!("failed to save scores to {}: {e}", self.path.display()),
        }
        entries
    }

    fn read(&self) -> Result<Vec<ScoreEntry>, ScoreStoreError> {
        let content = fs::read_to_string(&self.path)?;
        let mut entries: Vec<ScoreEntry> = serde_json::from_str(&content)?;
        sort_and_truncate(&mut entries);
        Ok(entries)
    }

    /// Creates the config directory if needed.
    fn write(&self, entries: &[ScoreEntry]) -> Result<(), ScoreStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn store() -> (tempfile::TempDir, HighScores) {
        let dir = tempfile::tempdir().unwrap();
        let scores = HighScores::new(dir.path().join("nested").join(FILENAME));
        (dir, scores)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, scores) = store();
        assert!(scores.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let (dir, _) = store();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "not json").unwrap();
        assert!(HighScores::new(path).load().is_empty());
    }

    #[test]
    fn test_save_orders_by_score_then_newest() {
        let (_dir, scores) = store();
        scores.save_at("a", 50, at(0));
        scores.save_at("b", 200, at(10));
        let list = scores.save_at("c", 200, at(20));
        let names: Vec<_> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["c", "b", "a"]);
        assert_eq!(scores.load(), list);
    }

    #[test]
    fn test_save_keeps_top_ten() {
        let (_dir, scores) = store();
        for i in 0..15u32 {
            scores.save_at(&format!("p{i}"), i * 10, at(i64::from(i)));
        }
        let list = scores.load();
        assert_eq!(list.len(), MAX_ENTRIES);
        assert_eq!(list[0].score, 140);
        assert_eq!(list[MAX_ENTRIES - 1].score, 50);
    }

    #[test]
    fn test_low_score_not_kept_when_full() {
        let (_dir, scores) = store();
        for i in 0..10u32 {
            scores.save_at("hi", 1000 + i, at(i64::from(i)));
        }
        let list = scores.save_at("lo", 1, at(100));
        assert_eq!(list.len(), MAX_ENTRIES);
        assert!(list.iter().all(|e| e.name == "hi"));
    }

    #[test]
    fn test_unwritable_path_still_returns_ranking() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let scores = HighScores::new(blocker.join(FILENAME));
        let list = scores.save("solo", 300);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].score, 300);
        assert!(scores.load().is_empty());
    }

    #[test]
    fn test_rank_tie_break() {
        let older = ScoreEntry {
            name: "old".into(),
            score: 100,
            date: at(0),
        };
        let newer = ScoreEntry {
            name: "new".into(),
            score: 100,
            date: at(1),
        };
        let ranked = rank(vec![older], newer);
        assert_eq!(ranked[0].name, "new");
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        let p = default_path();
        assert!(p.ends_with(Path::new("stacktui").join(FILENAME)));
    }
}
