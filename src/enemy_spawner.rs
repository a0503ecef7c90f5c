//! Wave / difficulty state machine deciding when, and what, to spawn.
//!
//! The spawner never touches the enemy collection itself: `update` hands the
//! new enemies back and the engine appends them.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::entities::{AttackPattern, Difficulty, Enemy, EnemyKind, GameState};

pub const MIN_SPAWN_INTERVAL_MS: f64 = 500.0;
pub const MAX_ENEMIES_PER_WAVE_CAP: u32 = 15;
pub const MIN_WAVE_DELAY_MS: f64 = 2000.0;

/// Every n-th wave ends with a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 5;
/// Share of the regular quota that must be out before the boss appears.
const BOSS_QUOTA_FRACTION: f64 = 0.8;

const SPAWN_INTERVAL_DECAY: f64 = 0.9;
const WAVE_DELAY_DECAY: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    wave_number: u32,
    enemies_in_current_wave: u32,
    max_enemies_per_wave: u32,
    spawn_interval_ms: f64,
    wave_delay_ms: f64,
    boss_spawned: bool,
    last_spawn_ms: f64,
    wave_start_ms: f64,

    base_interval_ms: f64,
    enemy_speed: f32,
    difficulty: Difficulty,
}

impl EnemySpawner {
    pub fn new(config: &GameConfig) -> Self {
        let mut spawner = EnemySpawner {
            wave_number: 1,
            enemies_in_current_wave: 0,
            max_enemies_per_wave: 0,
            spawn_interval_ms: 0.0,
            wave_delay_ms: 0.0,
            boss_spawned: false,
            last_spawn_ms: 0.0,
            wave_start_ms: 0.0,
            base_interval_ms: config.spawn_rate,
            enemy_speed: config.enemy_speed,
            difficulty: config.difficulty,
        };
        spawner.set_difficulty(config.difficulty);
        spawner
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn enemies_in_current_wave(&self) -> u32 {
        self.enemies_in_current_wave
    }

    pub fn max_enemies_per_wave(&self) -> u32 {
        self.max_enemies_per_wave
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    pub fn wave_delay_ms(&self) -> f64 {
        self.wave_delay_ms
    }

    pub fn boss_spawned_this_wave(&self) -> bool {
        self.boss_spawned
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    // ── Configuration hooks ──────────────────────────────────────────────────

    /// Re-seed the tunable thresholds from a difficulty level.
    pub fn set_difficulty(&mut self, level: Difficulty) {
        let tuning = level.enemy_tuning();
        self.difficulty = level;
        self.spawn_interval_ms =
            (self.base_interval_ms * tuning.interval_factor).max(MIN_SPAWN_INTERVAL_MS);
        self.max_enemies_per_wave = tuning.max_enemies_per_wave.min(MAX_ENEMIES_PER_WAVE_CAP);
        self.wave_delay_ms = tuning.wave_delay_ms.max(MIN_WAVE_DELAY_MS);
    }

    /// Back to wave 1 at the current difficulty.
    pub fn reset(&mut self) {
        self.wave_number = 1;
        self.enemies_in_current_wave = 0;
        self.boss_spawned = false;
        self.last_spawn_ms = 0.0;
        self.wave_start_ms = 0.0;
        self.set_difficulty(self.difficulty);
    }

    /// Jump to `wave` as if it began at `now_ms`.  Thresholds are tightened
    /// once per skipped wave, matching a spawner that played through them.
    pub fn sync_to_wave(&mut self, wave: u32, now_ms: f64) {
        if wave == self.wave_number {
            return;
        }
        if wave < self.wave_number {
            self.reset();
        }
        while self.wave_number < wave {
            self.start_next_wave(now_ms);
        }
        self.wave_start_ms = now_ms;
        self.last_spawn_ms = now_ms;
    }

    // ── Per-tick ─────────────────────────────────────────────────────────────

    /// Decide this tick's spawns.  Returns the new enemies for the caller to
    /// append; ids are drawn from the state's allocator.
    pub fn update(&mut self, state: &mut GameState, rng: &mut impl Rng) -> Vec<Enemy> {
        let now = state.time_elapsed;
        let mut spawned = Vec::new();

        if self.wave_complete(state, now) {
            self.start_next_wave(now);
            return spawned;
        }

        if self.boss_due() {
            spawned.push(self.spawn_boss(state, now));
        }

        if now - self.last_spawn_ms > self.spawn_interval_ms
            && self.enemies_in_current_wave < self.max_enemies_per_wave
        {
            spawned.push(self.spawn_regular(state, now, rng));
            self.last_spawn_ms = now;
            self.enemies_in_current_wave += 1;
        }

        spawned
    }

    /// A wave is over once its quota is out, nothing is left alive, and the
    /// inter-wave delay has passed since it began.
    fn wave_complete(&self, state: &GameState, now: f64) -> bool {
        state.active_enemy_count() == 0
            && now - self.wave_start_ms >= self.wave_delay_ms
            && self.enemies_in_current_wave >= self.max_enemies_per_wave
    }

    fn start_next_wave(&mut self, now: f64) {
        self.wave_number += 1;
        self.enemies_in_current_wave = 0;
        self.boss_spawned = false;
        self.wave_start_ms = now;
        self.last_spawn_ms = now;

        self.spawn_interval_ms =
            (self.spawn_interval_ms * SPAWN_INTERVAL_DECAY).max(MIN_SPAWN_INTERVAL_MS);
        self.max_enemies_per_wave = (self.max_enemies_per_wave + 1).min(MAX_ENEMIES_PER_WAVE_CAP);
        self.wave_delay_ms = (self.wave_delay_ms * WAVE_DELAY_DECAY).max(MIN_WAVE_DELAY_MS);

        info!(
            wave = self.wave_number,
            quota = self.max_enemies_per_wave,
            interval_ms = self.spawn_interval_ms,
            "wave started"
        );
    }

    fn boss_due(&self) -> bool {
        self.wave_number % BOSS_WAVE_INTERVAL == 0
            && !self.boss_spawned
            && self.enemies_in_current_wave as f64
                >= self.max_enemies_per_wave as f64 * BOSS_QUOTA_FRACTION
    }

    fn spawn_boss(&mut self, state: &mut GameState, now: f64) -> Enemy {
        self.boss_spawned = true;
        let size = EnemyKind::Boss.stats().size;
        let position = Vec2::new(state.width / 2.0, -size.half_height());
        let mut boss = Enemy::new(
            state.ids.next_id(),
            EnemyKind::Boss,
            position,
            self.wave_number,
            self.enemy_speed,
        )
        .with_pattern(AttackPattern::Circular);
        boss.last_shot_ms = now;

        info!(wave = self.wave_number, health = boss.entity.health, "boss spawned");
        boss
    }

    fn spawn_regular(&self, state: &mut GameState, now: f64, rng: &mut impl Rng) -> Enemy {
        let kinds = unlocked_kinds(self.wave_number);
        let kind = kinds[rng.gen_range(0..kinds.len())];
        let size = kind.stats().size;

        let lo = size.half_width();
        let hi = state.width - size.half_width();
        let x = if lo < hi { rng.gen_range(lo..hi) } else { state.width / 2.0 };
        let position = Vec2::new(x, -size.half_height());

        let id = state.ids.next_id();
        let mut enemy = Enemy::new(id, kind, position, self.wave_number, self.enemy_speed)
            .with_pattern(pick_pattern(kind, rng));
        enemy.last_shot_ms = now;

        debug!(?kind, pattern = ?enemy.pattern, x, "enemy spawned");
        enemy
    }
}

/// Kinds that may appear as regular spawns on a given wave.
pub fn unlocked_kinds(wave: u32) -> &'static [EnemyKind] {
    match wave {
        0 | 1 => &[EnemyKind::Basic],
        2 => &[EnemyKind::Basic, EnemyKind::Fast],
        _ => &[EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Heavy],
    }
}

/// Type-specific weighted choice of attack pattern.
pub fn pick_pattern(kind: EnemyKind, rng: &mut impl Rng) -> AttackPattern {
    match kind {
        EnemyKind::Basic => {
            if rng.gen_bool(0.7) {
                AttackPattern::Straight
            } else {
                AttackPattern::Zigzag
            }
        }
        EnemyKind::Fast => {
            if rng.gen_bool(0.5) {
                AttackPattern::Straight
            } else {
                AttackPattern::Zigzag
            }
        }
        EnemyKind::Heavy => {
            if rng.gen_bool(0.5) {
                AttackPattern::Straight
            } else {
                AttackPattern::Homing
            }
        }
        EnemyKind::Boss => AttackPattern::Circular,
    }
}
