//! High-score persistence.
//!
//! Scores live in a small JSON file. A missing file means an empty table;
//! malformed JSON or an IO failure is reported, and callers treat it as
//! non-fatal (a run is never blocked on the score file).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Maximum entries kept in the table.
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read score file: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub level: u32,
}

/// Sorted high-score table, best first, capped at [`MAX_ENTRIES`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Load the table. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let mut scores: HighScores = serde_json::from_str(&data)?;
        scores.normalize();
        Ok(scores)
    }

    /// Write the table as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ScoreError> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Record a run. Returns true if it made the table.
    pub fn record(&mut self, score: u32, level: u32) -> bool {
        // Ties sort behind existing entries, so matching the lowest score
        // on a full table is not enough to stay on it.
        let qualifies = self.entries.len() < MAX_ENTRIES
            || self.entries.last().is_some_and(|tail| score > tail.score);
        self.entries.push(ScoreEntry { score, level });
        self.normalize();
        qualifies
    }

    /// Best score on the table, if any.
    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

/// Load-record-save in one step, logging instead of failing: a broken score
/// file should never take the game down with it.
pub fn record_score(path: &Path, score: u32, level: u32) {
    let mut scores = match HighScores::load(path) {
        Ok(scores) => scores,
        Err(err) => {
            warn!(%err, "could not load high scores, starting fresh");
            HighScores::default()
        }
    };
    scores.record(score, level);
    if let Err(err) = scores.save(path) {
        warn!(%err, "could not save high scores");
    }
}
