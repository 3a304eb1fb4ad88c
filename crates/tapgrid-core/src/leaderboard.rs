//! Ranked top-N leaderboard rules and the persisted document layout.
//!
//! Persistence lives with the service; this module only decides what a valid
//! submission is and how the ranked list changes when one arrives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entries kept on the board.
pub const MAX_ENTRIES: usize = 10;

/// Longest display name, in characters. Longer names are cut.
pub const MAX_NAME_LEN: usize = 15;

/// Rows shown when the board is displayed after a game.
pub const DISPLAY_ROWS: usize = 8;

/// One ranked score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// Raw `{name, score}` payload as it arrives at the store boundary.
///
/// Anything that does not deserialize into this shape is a client error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Name is required, but got an empty string")]
    EmptyName,

    #[error("Score must not be negative: {0}")]
    NegativeScore(i64),

    #[error("Score is out of range: {0}")]
    ScoreOutOfRange(i64),
}

impl ScoreSubmission {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Trims and caps the name and checks the score.
    pub fn validate(self) -> Result<LeaderboardEntry, SubmissionError> {
        let name: String = self.name.trim().chars().take(MAX_NAME_LEN).collect();
        // Cutting can expose trailing whitespace again.
        let name = name.trim_end().to_string();
        if name.is_empty() {
            return Err(SubmissionError::EmptyName);
        }
        if self.score < 0 {
            return Err(SubmissionError::NegativeScore(self.score));
        }
        let score =
            u32::try_from(self.score).map_err(|_| SubmissionError::ScoreOutOfRange(self.score))?;
        Ok(LeaderboardEntry { name, score })
    }
}

/// The persisted document: `{ "scores": [ {name, score}, ... ] }`.
///
/// Always ranked and at most [`MAX_ENTRIES`] long, however it was built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Document")]
pub struct Leaderboard {
    scores: Vec<LeaderboardEntry>,
}

#[derive(Deserialize)]
struct Document {
    scores: Vec<LeaderboardEntry>,
}

impl From<Document> for Leaderboard {
    fn from(document: Document) -> Self {
        let mut board = Leaderboard {
            scores: document.scores,
        };
        board.normalize();
        board
    }
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored document, restoring ordering and the size bound.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Appends `entry`, re-ranks and drops everything past [`MAX_ENTRIES`].
    ///
    /// The sort is stable, so a new entry lands after existing equal scores.
    pub fn insert(&mut self, entry: LeaderboardEntry) {
        self.scores.push(entry);
        self.normalize();
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.scores
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn normalize(&mut self) {
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(MAX_ENTRIES);
    }
}

/// A leaderboard row prepared for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedRow {
    /// 1-based rank.
    pub rank: usize,
    pub entry: LeaderboardEntry,
    /// Score equals the player's score.
    pub highlighted: bool,
}

/// Picks the rows to show a player who just scored `current_score`.
///
/// The window is centred on the first entry the player's score reaches;
/// a zero score shows the top of the board.
pub fn display_window(entries: &[LeaderboardEntry], current_score: u32) -> Vec<RankedRow> {
    let anchor = if current_score > 0 {
        entries.iter().position(|e| e.score <= current_score)
    } else {
        None
    };

    let start = anchor.map_or(0, |idx| {
        let centred = idx.saturating_sub(DISPLAY_ROWS / 2);
        centred.min(entries.len().saturating_sub(DISPLAY_ROWS))
    });

    entries
        .iter()
        .enumerate()
        .skip(start)
        .take(DISPLAY_ROWS)
        .map(|(idx, entry)| RankedRow {
            rank: idx + 1,
            entry: entry.clone(),
            highlighted: current_score > 0 && entry.score == current_score,
        })
        .collect()
}
