//! Game state machine, round timer and spawn scheduling.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::scheduler::{ScheduledAction, Scheduler};
use crate::target::{self, BOUNCE_CHANCE, Target, TargetId, TargetKind};

/// Rounds per session.
pub const ROUNDS: u32 = 3;

/// Length of one round in seconds.
pub const ROUND_DURATION: u32 = 30;

/// Round timer period in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 1_000;

const BASE_SPAWN_INTERVAL_MS: u64 = 1_000;
const SPAWN_INTERVAL_STEP_MS: u64 = 100;
/// Lower bound for the spawn cadence.
pub const MIN_SPAWN_INTERVAL_MS: u64 = 100;

const BASE_TARGET_LIFETIME_MS: u64 = 2_000;
const TARGET_LIFETIME_STEP_MS: u64 = 300;
/// Lower bound for how long a target stays on the grid.
pub const MIN_TARGET_LIFETIME_MS: u64 = 100;

/// Time between spawns in `round`. Shrinks as rounds advance.
pub fn spawn_interval_ms(round: u32) -> u64 {
    BASE_SPAWN_INTERVAL_MS
        .saturating_sub(u64::from(round) * SPAWN_INTERVAL_STEP_MS)
        .max(MIN_SPAWN_INTERVAL_MS)
}

/// How long a target spawned in `round` stays alive.
pub fn target_lifetime_ms(round: u32) -> u64 {
    BASE_TARGET_LIFETIME_MS
        .saturating_sub(u64::from(round) * TARGET_LIFETIME_STEP_MS)
        .max(MIN_TARGET_LIFETIME_MS)
}

/// Client-visible phase of a session.
///
/// Round transitions happen inside [`GameEngine::tick`] and never surface as
/// a separate phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Idle,
    Playing,
    Ended,
}

/// Things that happened while the engine ran, for the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted { round: u32 },
    TargetSpawned { target: Target },
    TargetExpired { id: TargetId },
    TargetTapped { id: TargetId, kind: TargetKind, score: u32 },
    GameEnded { score: u32 },
}

/// Snapshot of one player's session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    phase: GamePhase,
    round: u32,
    time_remaining: u32,
    score: u32,
    targets: BTreeMap<TargetId, Target>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            round: 1,
            time_remaining: ROUND_DURATION,
            score: 0,
            targets: BTreeMap::new(),
        }
    }
}

impl GameSession {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seconds left in the current round.
    pub fn time_left(&self) -> u32 {
        self.time_remaining
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Live targets ordered by id.
    pub fn active_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(&id)
    }

    /// Target occupying `cell`, if any.
    pub fn target_at(&self, cell: usize) -> Option<&Target> {
        self.targets.values().find(|t| t.cell == cell)
    }
}

/// Owns a [`GameSession`] and everything that mutates it.
///
/// Time only moves through [`GameEngine::advance`], so every schedule is
/// deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct GameEngine {
    session: GameSession,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    now_ms: u64,
    next_target_id: TargetId,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Creates an idle engine with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        Self {
            session: GameSession::default(),
            scheduler: Scheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            now_ms: 0,
            next_target_id: 0,
            events: Vec::new(),
        }
    }

    /// Creates an idle engine seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn round(&self) -> u32 {
        self.session.round
    }

    pub fn time_left(&self) -> u32 {
        self.session.time_remaining
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn active_targets(&self) -> impl Iterator<Item = &Target> {
        self.session.active_targets()
    }

    /// Engine clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Starts a fresh session from any phase.
    pub fn start(&mut self) {
        self.scheduler.cancel_all();
        self.session = GameSession {
            phase: GamePhase::Playing,
            ..GameSession::default()
        };
        tracing::debug!(at_ms = self.now_ms, "Game started");
        self.schedule_round();
        self.events.push(GameEvent::RoundStarted { round: 1 });
    }

    /// Returns to idle, dropping the session and all schedules.
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.session = GameSession::default();
    }

    /// Forces the session to end. No-op if it already has.
    pub fn end(&mut self) {
        if self.session.phase == GamePhase::Ended {
            return;
        }
        self.finish();
    }

    /// One second of the round elapsed.
    ///
    /// This is the only path that advances rounds or ends the game on time.
    pub fn tick(&mut self) {
        if self.session.phase != GamePhase::Playing {
            return;
        }

        self.session.time_remaining = self.session.time_remaining.saturating_sub(1);
        if self.session.time_remaining > 0 {
            return;
        }

        if self.session.round < ROUNDS {
            self.session.round += 1;
            self.session.time_remaining = ROUND_DURATION;
            self.session.targets.clear();
            self.scheduler.cancel_all();
            self.schedule_round();
            tracing::debug!(round = self.session.round, "Round started");
            self.events.push(GameEvent::RoundStarted {
                round: self.session.round,
            });
        } else {
            self.finish();
        }
    }

    /// Spawns a target in a random free cell.
    ///
    /// Returns `None` when not playing or when the grid is full.
    pub fn spawn_target(&mut self) -> Option<Target> {
        if self.session.phase != GamePhase::Playing {
            return None;
        }

        let occupied: Vec<usize> = self.session.targets.values().map(|t| t.cell).collect();
        let Some(cell) = target::pick_free_cell(&mut self.rng, occupied) else {
            tracing::debug!(round = self.session.round, "Grid full, spawn skipped");
            return None;
        };
        let kind = TargetKind::sample(&mut self.rng);
        let bouncing = self.session.round > 1 && self.rng.random_bool(BOUNCE_CHANCE);

        let id = self.next_target_id;
        self.next_target_id = self.next_target_id.wrapping_add(1);
        let expires_at = self.now_ms.saturating_add(target_lifetime_ms(self.session.round));

        let target = Target {
            id,
            kind,
            cell,
            bouncing,
            expires_at,
        };
        self.session.targets.insert(id, target.clone());
        self.scheduler.schedule(expires_at, ScheduledAction::Expire(id));
        self.events.push(GameEvent::TargetSpawned {
            target: target.clone(),
        });
        Some(target)
    }

    /// Player tapped target `id`. Returns the new score on a hit.
    ///
    /// Unknown or already-expired ids are ignored.
    pub fn tap_target(&mut self, id: TargetId) -> Option<u32> {
        if self.session.phase != GamePhase::Playing {
            return None;
        }
        let target = self.session.targets.remove(&id)?;

        self.session.score = target.kind.apply(self.session.score);
        self.events.push(GameEvent::TargetTapped {
            id,
            kind: target.kind,
            score: self.session.score,
        });
        Some(self.session.score)
    }

    /// Runs the clock forward by `dt_ms`, firing every due action in order.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<GameEvent> {
        let until = self.now_ms.saturating_add(dt_ms);
        while let Some((fire_at, action)) = self.scheduler.pop_due(until) {
            self.now_ms = fire_at;
            self.dispatch(action);
        }
        self.now_ms = until;
        self.drain_events()
    }

    /// Takes events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn dispatch(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::RoundTick => {
                let round = self.session.round;
                self.tick();
                // A round change already rescheduled both cadences.
                if self.session.phase == GamePhase::Playing && self.session.round == round {
                    self.schedule_tick();
                }
            }
            ScheduledAction::Spawn => {
                let _ = self.spawn_target();
                if self.session.phase == GamePhase::Playing {
                    self.schedule_spawn();
                }
            }
            ScheduledAction::Expire(id) => self.expire_target(id),
        }
    }

    fn expire_target(&mut self, id: TargetId) {
        if self.session.phase != GamePhase::Playing {
            return;
        }
        if self.session.targets.remove(&id).is_some() {
            self.events.push(GameEvent::TargetExpired { id });
        }
    }

    fn schedule_round(&mut self) {
        self.schedule_tick();
        self.schedule_spawn();
    }

    fn schedule_tick(&mut self) {
        let fire_at = self.now_ms.saturating_add(TICK_INTERVAL_MS);
        self.scheduler.schedule(fire_at, ScheduledAction::RoundTick);
    }

    fn schedule_spawn(&mut self) {
        let fire_at = self.now_ms.saturating_add(spawn_interval_ms(self.session.round));
        self.scheduler.schedule(fire_at, ScheduledAction::Spawn);
    }

    fn finish(&mut self) {
        self.scheduler.cancel_all();
        self.session.phase = GamePhase::Ended;
        self.session.targets.clear();
        tracing::debug!(score = self.session.score, "Game ended");
        self.events.push(GameEvent::GameEnded {
            score: self.session.score,
        });
    }

    #[cfg(test)]
    fn insert_target(&mut self, kind: TargetKind, cell: usize) -> TargetId {
        let id = self.next_target_id;
        self.next_target_id += 1;
        let _ = self.session.targets.insert(
            id,
            Target {
                id,
                kind,
                cell,
                bouncing: false,
                expires_at: u64::MAX,
            },
        );
        id
    }

    #[cfg(test)]
    fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }
}
