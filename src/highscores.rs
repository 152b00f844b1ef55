//! High score table
//!
//! Every finished run is recorded (wins and losses alike); the table keeps
//! the best 50, newest first among equal scores.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, StorageError};
use crate::settings::MAX_NAME_LEN;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 50;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Upper-cased, at most 8 characters
    pub name: String,
    pub score: u64,
    /// Level reached
    pub level: u32,
    pub won: bool,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    pub fn new(name: &str, score: u64, level: u32, won: bool, timestamp: f64) -> Self {
        let name: String = name.chars().take(MAX_NAME_LEN).collect::<String>().to_uppercase();
        Self {
            name: if name.is_empty() { "---".to_string() } else { name },
            score,
            level,
            won,
            timestamp,
        }
    }

    /// Whether `self` sorts above `other`
    fn ranks_above(&self, other: &HighScoreEntry) -> bool {
        self.score > other.score || (self.score == other.score && self.timestamp >= other.timestamp)
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "parade_drill_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an entry; returns its 1-based rank, or None if it did not make the table
    pub fn add_entry(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.ranks_above(e))
            .unwrap_or(self.entries.len());
        if pos >= MAX_HIGH_SCORES {
            return None;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering, name format and size on data read back from storage
    fn normalized(self) -> Self {
        let mut table = Self::new();
        for e in self.entries {
            table.add_entry(HighScoreEntry::new(&e.name, e.score, e.level, e.won, e.timestamp));
        }
        table
    }

    /// Load high scores, starting fresh on any storage problem
    pub fn load() -> Self {
        match storage::load::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(scores)) => {
                let scores = scores.normalized();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding stored high scores: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        storage::save(Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64, timestamp: f64) -> HighScoreEntry {
        HighScoreEntry::new("jpm", score, 1, false, timestamp)
    }

    #[test]
    fn test_name_normalized() {
        let e = HighScoreEntry::new("candice-marie", 3, 2, false, 0.0);
        assert_eq!(e.name, "CANDICE-");
        assert_eq!(HighScoreEntry::new("", 0, 1, false, 0.0).name, "---");
    }

    #[test]
    fn test_sorted_by_score_then_newest() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_entry(entry(10, 1.0)), Some(1));
        assert_eq!(hs.add_entry(entry(30, 2.0)), Some(1));
        assert_eq!(hs.add_entry(entry(10, 3.0)), Some(2));
        assert_eq!(hs.add_entry(entry(0, 4.0)), Some(4));

        let order: Vec<(u64, f64)> = hs.entries.iter().map(|e| (e.score, e.timestamp)).collect();
        assert_eq!(order, vec![(30, 2.0), (10, 3.0), (10, 1.0), (0, 4.0)]);
        assert_eq!(hs.top_score(), Some(30));
    }

    #[test]
    fn test_table_capped() {
        let mut hs = HighScores::new();
        for i in 0..MAX_HIGH_SCORES as u64 {
            hs.add_entry(entry(100 + i, i as f64));
        }
        assert_eq!(hs.add_entry(entry(1, 999.0)), None);
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);

        assert_eq!(hs.add_entry(entry(1000, 999.0)), Some(1));
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.entries.last().map(|e| e.score), Some(101));
    }

    #[test]
    fn test_normalize_stored_table() {
        let stored = HighScores {
            entries: vec![
                HighScoreEntry {
                    name: "lowercase name".to_string(),
                    score: 1,
                    level: 1,
                    won: false,
                    timestamp: 0.0,
                },
                entry(5, 0.0),
            ],
        };
        let hs = stored.normalized();
        assert_eq!(hs.entries[0].score, 5);
        assert_eq!(hs.entries[1].name, "LOWERCAS");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut hs = HighScores::new();
        hs.add_entry(HighScoreEntry::new("jpm", 42, 7, true, 1.5));
        let json = serde_json::to_string(&hs).unwrap();
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, hs.entries);
    }
}
