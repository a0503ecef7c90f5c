//! Timed, probabilistic pickup spawner plus the reward drops for boss kills
//! and cleared waves.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::entities::{Difficulty, GameState, PowerUp, PowerUpKind};

pub const BASE_SPAWN_INTERVAL_MS: f64 = 15_000.0;
pub const BASE_SPAWN_CHANCE: f64 = 0.3;
pub const MAX_ACTIVE_POWER_UPS: usize = 3;

pub const MAX_SPAWN_INTERVAL_MS: f64 = 30_000.0;
pub const MIN_SPAWN_CHANCE: f64 = 0.1;

const BOSS_WEAPON_CHANCE: f64 = 0.5;
const BOSS_MULTIPLIER_CHANCE: f64 = 0.3;
const WAVE_REWARD_CHANCE: f64 = 0.25;
/// Horizontal spread of the boss reward drops around the death position.
const BOSS_REWARD_SPACING: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct PowerUpSpawner {
    spawn_interval_ms: f64,
    spawn_chance: f64,
    last_spawn_ms: f64,
    difficulty: Difficulty,
}

impl Default for PowerUpSpawner {
    fn default() -> Self {
        PowerUpSpawner {
            spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            spawn_chance: BASE_SPAWN_CHANCE,
            last_spawn_ms: 0.0,
            difficulty: Difficulty::Medium,
        }
    }
}

impl PowerUpSpawner {
    pub fn new(difficulty: Difficulty) -> Self {
        let mut spawner = PowerUpSpawner::default();
        spawner.adjust_spawn_rate(difficulty);
        spawner
    }

    /// Explicit thresholds, bypassing the difficulty table.
    pub fn with_tuning(interval_ms: f64, spawn_chance: f64) -> Self {
        PowerUpSpawner {
            spawn_interval_ms: interval_ms,
            spawn_chance: spawn_chance.clamp(0.0, 1.0),
            ..PowerUpSpawner::default()
        }
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    pub fn spawn_chance(&self) -> f64 {
        self.spawn_chance
    }

    /// Timed spawn: at most one power-up per call.
    ///
    /// Once the interval has elapsed and there is room on screen, a single
    /// draw against the spawn chance decides; either way the interval
    /// restarts.
    pub fn update(&mut self, state: &mut GameState, rng: &mut impl Rng) -> Option<PowerUp> {
        let now = state.time_elapsed;
        if now - self.last_spawn_ms < self.spawn_interval_ms
            || state.active_power_up_count() >= MAX_ACTIVE_POWER_UPS
        {
            return None;
        }

        self.last_spawn_ms = now;
        if !rng.gen_bool(self.spawn_chance.clamp(0.0, 1.0)) {
            return None;
        }

        let kind = random_kind(rng);
        let margin = kind.size().half_width();
        let x = if margin < state.width - margin {
            rng.gen_range(margin..state.width - margin)
        } else {
            state.width / 2.0
        };
        let power_up = PowerUp::new(state.ids.next_id(), kind, Vec2::new(x, -margin));
        debug!(?kind, x, "power-up spawned");
        Some(power_up)
    }

    /// Drops for a defeated boss: always a health pickup, sometimes a weapon
    /// upgrade and a score multiplier, fanned out around `position`.
    pub fn spawn_boss_reward(
        &self,
        state: &mut GameState,
        position: Vec2,
        rng: &mut impl Rng,
    ) -> Vec<PowerUp> {
        let mut rewards = vec![PowerUp::new(state.ids.next_id(), PowerUpKind::Health, position)];

        if rng.gen_bool(BOSS_WEAPON_CHANCE) {
            let at = Vec2::new(position.x - BOSS_REWARD_SPACING, position.y);
            rewards.push(PowerUp::new(state.ids.next_id(), PowerUpKind::WeaponUpgrade, at));
        }
        if rng.gen_bool(BOSS_MULTIPLIER_CHANCE) {
            let at = Vec2::new(position.x + BOSS_REWARD_SPACING, position.y);
            rewards.push(PowerUp::new(state.ids.next_id(), PowerUpKind::ScoreMultiplier, at));
        }

        debug!(count = rewards.len(), "boss reward dropped");
        rewards
    }

    /// A cleared wave has a small chance of dropping one random power-up.
    pub fn spawn_wave_reward(&self, state: &mut GameState, rng: &mut impl Rng) -> Option<PowerUp> {
        if !rng.gen_bool(WAVE_REWARD_CHANCE) {
            return None;
        }
        let kind = random_kind(rng);
        let position = Vec2::new(state.width / 2.0, -kind.size().half_height());
        Some(PowerUp::new(state.ids.next_id(), kind, position))
    }

    /// Re-seed interval and chance from a difficulty level.
    pub fn adjust_spawn_rate(&mut self, difficulty: Difficulty) {
        let tuning = difficulty.power_up_tuning();
        self.difficulty = difficulty;
        self.spawn_interval_ms = tuning.interval_ms.min(MAX_SPAWN_INTERVAL_MS);
        self.spawn_chance = tuning.spawn_chance.max(MIN_SPAWN_CHANCE);
    }

    /// Progression throttle: pickups get rarer as the game goes on.
    pub fn increase_difficulty(&mut self) {
        self.spawn_interval_ms = (self.spawn_interval_ms * 1.1).min(MAX_SPAWN_INTERVAL_MS);
        self.spawn_chance = (self.spawn_chance * 0.9).max(MIN_SPAWN_CHANCE);
    }

    pub fn reset(&mut self) {
        self.last_spawn_ms = 0.0;
        self.adjust_spawn_rate(self.difficulty);
    }
}

fn random_kind(rng: &mut impl Rng) -> PowerUpKind {
    PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())]
}
