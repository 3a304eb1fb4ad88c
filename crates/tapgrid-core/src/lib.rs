//! Tapgrid Core Library
//!
//! Round-based scoring, spawn/expiry scheduling and leaderboard ranking for
//! the tapgrid arcade game. Everything here is deterministic for a given
//! seed; time is supplied by the caller through [`GameEngine::advance`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod game;
pub mod leaderboard;
pub mod name_entry;
pub mod scheduler;
pub mod target;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use game::{GameEngine, GameEvent, GamePhase, GameSession, ROUND_DURATION, ROUNDS};
pub use leaderboard::{
    Leaderboard, LeaderboardEntry, MAX_ENTRIES, MAX_NAME_LEN, RankedRow, ScoreSubmission,
    SubmissionError, display_window,
};
pub use name_entry::NameEntry;
pub use scheduler::{ScheduledAction, Scheduler};
pub use target::{GRID_SIZE, Target, TargetId, TargetKind};
