//! Tappable targets and the 4x4 grid they occupy.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for a target.
pub type TargetId = u32;

/// Number of cells in the play grid (4x4).
pub const GRID_SIZE: usize = 16;

/// Chance that a spawned target is a bonus.
pub const BONUS_CHANCE: f64 = 0.1;

/// Chance that a non-bonus target is negative (18% overall).
pub const NEGATIVE_CHANCE: f64 = 0.2;

/// Chance that a target bounces, from round 2 onward.
pub const BOUNCE_CHANCE: f64 = 0.3;

/// Scoring kind of a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Positive,
    Negative,
    Bonus,
}

impl TargetKind {
    /// Score delta applied when the target is tapped.
    pub const fn points(self) -> i32 {
        match self {
            TargetKind::Positive => 10,
            TargetKind::Negative => -15,
            TargetKind::Bonus => 20,
        }
    }

    /// Resolves a kind from two independent uniform rolls in `[0, 1)`.
    ///
    /// The bonus roll is checked first; the negative roll only matters when
    /// the bonus roll misses, so negatives land 18% of the time overall.
    pub fn from_rolls(bonus_roll: f64, negative_roll: f64) -> Self {
        if bonus_roll < BONUS_CHANCE {
            TargetKind::Bonus
        } else if negative_roll < NEGATIVE_CHANCE {
            TargetKind::Negative
        } else {
            TargetKind::Positive
        }
    }

    /// Samples a kind, drawing the second roll only when the first misses.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        let bonus_roll: f64 = rng.random();
        if bonus_roll < BONUS_CHANCE {
            return TargetKind::Bonus;
        }
        Self::from_rolls(bonus_roll, rng.random())
    }

    /// Applies this kind's points to `score`, never dropping below zero.
    pub fn apply(self, score: u32) -> u32 {
        let points = self.points();
        if points >= 0 {
            score.saturating_add(points.unsigned_abs())
        } else {
            score.saturating_sub(points.unsigned_abs())
        }
    }
}

/// A live target on the grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
    /// Grid cell index in `0..GRID_SIZE`.
    pub cell: usize,
    /// Cosmetic only.
    pub bouncing: bool,
    /// Engine clock time (ms) at which the target disappears.
    pub expires_at: u64,
}

/// Picks a uniformly random cell that is not in `occupied`.
///
/// Returns `None` when every cell is taken.
pub fn pick_free_cell<R: Rng>(
    rng: &mut R,
    occupied: impl IntoIterator<Item = usize>,
) -> Option<usize> {
    let mut taken = [false; GRID_SIZE];
    for cell in occupied {
        if let Some(slot) = taken.get_mut(cell) {
            *slot = true;
        }
    }

    let free: Vec<usize> = (0..GRID_SIZE).filter(|&cell| !taken[cell]).collect();
    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_range(0..free.len())])
}
