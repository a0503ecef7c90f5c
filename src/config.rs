//! Construction-time configuration.
//!
//! [`GameConfig`] can be built in code or loaded from a TOML file.  Every
//! field has a default, so a file only needs the keys it wants to override:
//!
//! ```toml
//! screen_width = 1024
//! difficulty = "hard"
//! ```
//!
//! The difficulty and spawn rate do not act on their own; they seed the
//! thresholds of the enemy and power-up spawners.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::Difficulty;
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Playfield ────────────────────────────────────────────────────────────
    pub screen_width: f32,
    pub screen_height: f32,

    // ── Base speeds (px/s) ───────────────────────────────────────────────────
    pub player_speed: f32,
    pub bullet_speed: f32,
    pub enemy_speed: f32,

    // ── Spawning ─────────────────────────────────────────────────────────────
    /// Base interval between regular enemy spawns, ms.
    pub spawn_rate: f64,
    pub difficulty: Difficulty,

    // ── Limits ───────────────────────────────────────────────────────────────
    /// Bullets beyond this count are not created.
    pub max_bullets: usize,
    /// Clearing this wave ends the game in victory.  `None` plays forever.
    pub victory_wave: Option<u32>,

    /// Seed for the simulation RNG.  `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            screen_width: 800.0,
            screen_height: 600.0,
            player_speed: 300.0,
            bullet_speed: 500.0,
            enemy_speed: 100.0,
            spawn_rate: 2000.0,
            difficulty: Difficulty::Medium,
            max_bullets: 512,
            victory_wave: None,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> GameResult<()> {
        let positive: [(&'static str, f64); 6] = [
            ("screen_width", self.screen_width as f64),
            ("screen_height", self.screen_height as f64),
            ("player_speed", self.player_speed as f64),
            ("bullet_speed", self.bullet_speed as f64),
            ("enemy_speed", self.enemy_speed as f64),
            ("spawn_rate", self.spawn_rate),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(GameError::InvalidConfig {
                    field,
                    value: value.to_string(),
                    reason: "must be a positive number",
                });
            }
        }
        if self.max_bullets == 0 {
            return Err(GameError::InvalidConfig {
                field: "max_bullets",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

// ── Difficulty tables ────────────────────────────────────────────────────────

/// Enemy spawner thresholds seeded by a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTuning {
    /// Multiplier on the configured base spawn interval.
    pub interval_factor: f64,
    pub max_enemies_per_wave: u32,
    pub wave_delay_ms: f64,
}

/// Power-up spawner thresholds seeded by a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpTuning {
    pub interval_ms: f64,
    pub spawn_chance: f64,
}

impl Difficulty {
    pub fn enemy_tuning(self) -> EnemyTuning {
        let (interval_factor, max_enemies_per_wave, wave_delay_ms) = match self {
            Difficulty::Easy => (1.25, 4, 6000.0),
            Difficulty::Medium => (1.0, 5, 5000.0),
            Difficulty::Hard => (0.75, 7, 4000.0),
            Difficulty::Expert => (0.5, 9, 3000.0),
        };
        EnemyTuning {
            interval_factor,
            max_enemies_per_wave,
            wave_delay_ms,
        }
    }

    pub fn power_up_tuning(self) -> PowerUpTuning {
        let (interval_ms, spawn_chance) = match self {
            Difficulty::Easy => (12_000.0, 0.4),
            Difficulty::Medium => (15_000.0, 0.3),
            Difficulty::Hard => (18_000.0, 0.25),
            Difficulty::Expert => (20_000.0, 0.2),
        };
        PowerUpTuning {
            interval_ms,
            spawn_chance,
        }
    }
}
