use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use tapgrid_core::{Leaderboard, LeaderboardEntry, ScoreSubmission, SubmissionError};
use thiserror::Error;

use crate::handler::ErrorBody;

/// File-backed top-N leaderboard shared by every request.
///
/// Submissions are serialized through `write_lock`; each write lands in a
/// temporary file that is renamed over the document, so readers see either
/// the old or the new board.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] SubmissionError),

    #[error("Failed to persist leaderboard: {0}")]
    Persist(#[from] io::Error),

    #[error("Failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn to_status(&self) -> StatusCode {
        match self {
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            StoreError::Persist(_) | StoreError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Leaderboard submission failed");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current ranking. A missing or unreadable document reads as empty.
    pub fn get_top(&self) -> Vec<LeaderboardEntry> {
        self.load().into_entries()
    }

    /// Validates and merges a submission, returning the updated ranking.
    ///
    /// Nothing is written when validation fails.
    pub fn submit(&self, submission: ScoreSubmission) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let entry = submission.validate()?;

        let _guard = self.write_lock.lock();
        let mut board = self.load();
        board.insert(entry.clone());
        self.persist(&board)?;

        tracing::info!(name = %entry.name, score = entry.score, "Score submitted");
        Ok(board.into_entries())
    }

    fn load(&self) -> Leaderboard {
        let bytes = match fs::read(self.path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Leaderboard::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Leaderboard unreadable, treating as empty"
                );
                return Leaderboard::new();
            }
        };

        Leaderboard::from_json(&bytes).unwrap_or_else(|err| {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Leaderboard corrupt, treating as empty"
            );
            Leaderboard::new()
        })
    }

    fn persist(&self, board: &Leaderboard) -> Result<(), StoreError> {
        let bytes = board.to_json_pretty()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.temp_path();
        let result = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, self.path()));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map_err(StoreError::from)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "leaderboard".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
    }

    /// Holds the submission lock, stalling writers until the guard drops.
    #[cfg(test)]
    pub(crate) fn lock_writes(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.write_lock.lock()
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
