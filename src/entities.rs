//! All game entity types, pure data plus the closed behavior tables that
//! replace per-kind branching.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::vector::Size;

// ── Tuning constants ─────────────────────────────────────────────────────────

pub const PLAYER_SIZE: Size = Size::square(40.0);
pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const STARTING_LIVES: u32 = 3;
pub const MAX_WEAPON_LEVEL: u32 = 3;

pub const PLAYER_BULLET_SIZE: Size = Size::new(5.0, 15.0);
pub const PLAYER_BULLET_DAMAGE: i32 = 10;
pub const ENEMY_BULLET_SIZE: Size = Size::new(6.0, 12.0);

/// Downward drift of a freshly spawned power-up, px/s.
pub const POWER_UP_DRIFT_SPEED: f32 = 50.0;

pub const EXPLOSION_DURATION_MS: f64 = 500.0;

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Identifier of one entity instance.  The generation changes with every new
/// game session, so a serial reused after a restart never aliases an old id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub generation: u32,
    pub serial: u32,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}#{}", self.generation, self.serial)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdAllocator {
    generation: u32,
    next_serial: u32,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId {
            generation: self.generation,
            serial: self.next_serial,
        };
        self.next_serial = self.next_serial.wrapping_add(1);
        id
    }

    /// Start a new generation; serials restart from zero.
    pub fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.next_serial = 0;
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
    /// Multiplayer lobby: registered but not yet started.
    Waiting,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// One bullet straight up.
    #[default]
    Basic,
    /// Three bullets fanned by fixed horizontal velocity offsets.
    Spread,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    Straight,
    Zigzag,
    Circular,
    Homing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Heavy,
    Boss,
}

/// Wave-1 stats of an enemy kind, before difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub health: i32,
    pub damage: i32,
    /// Multiplier on the configured base enemy speed.
    pub speed_factor: f32,
    pub points: u32,
    pub size: Size,
    pub fire_interval_ms: f64,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                health: 10,
                damage: 10,
                speed_factor: 1.0,
                points: 100,
                size: Size::square(30.0),
                fire_interval_ms: 2000.0,
            },
            EnemyKind::Fast => EnemyStats {
                health: 5,
                damage: 5,
                speed_factor: 2.0,
                points: 150,
                size: Size::square(25.0),
                fire_interval_ms: 1500.0,
            },
            EnemyKind::Heavy => EnemyStats {
                health: 30,
                damage: 20,
                speed_factor: 0.5,
                points: 300,
                size: Size::square(45.0),
                fire_interval_ms: 3000.0,
            },
            EnemyKind::Boss => EnemyStats {
                health: 500,
                damage: 50,
                speed_factor: 0.3,
                points: 5000,
                size: Size::new(100.0, 80.0),
                fire_interval_ms: 1000.0,
            },
        }
    }

    /// Linear stat multiplier for a given wave.
    pub fn difficulty_multiplier(self, wave: u32) -> f32 {
        let step = match self {
            EnemyKind::Boss => 0.15,
            _ => 0.1,
        };
        1.0 + wave.saturating_sub(1) as f32 * step
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    WeaponUpgrade,
    Shield,
    SpeedBoost,
    ScoreMultiplier,
}

/// Magnitude and lifetime of a power-up.  `duration_ms == 0` is instantaneous.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpEffect {
    pub magnitude: f32,
    pub duration_ms: f64,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::WeaponUpgrade,
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ScoreMultiplier,
    ];

    pub fn size(self) -> Size {
        match self {
            PowerUpKind::Health => Size::square(25.0),
            PowerUpKind::WeaponUpgrade => Size::square(30.0),
            PowerUpKind::Shield => Size::square(30.0),
            PowerUpKind::SpeedBoost => Size::square(25.0),
            PowerUpKind::ScoreMultiplier => Size::square(28.0),
        }
    }

    pub fn effect(self) -> PowerUpEffect {
        let (magnitude, duration_ms) = match self {
            PowerUpKind::Health => (50.0, 0.0),
            PowerUpKind::WeaponUpgrade => (1.0, 10_000.0),
            PowerUpKind::Shield => (100.0, 8_000.0),
            PowerUpKind::SpeedBoost => (1.5, 6_000.0),
            PowerUpKind::ScoreMultiplier => (2.0, 12_000.0),
        };
        PowerUpEffect { magnitude, duration_ms }
    }
}

// ── Shared body ──────────────────────────────────────────────────────────────

/// Physical body shared by players, enemies, bullets and power-ups.
/// `size` is the full AABB extent centered on `position`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
    pub size: Size,
    /// Radians; derived from the velocity heading.
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
    /// `false` marks the entity for removal at the next cleanup pass.
    pub active: bool,
}

impl Entity {
    pub fn new(id: EntityId, position: Vec2, size: Size, health: i32) -> Self {
        Entity {
            id,
            position,
            velocity: Vec2::ZERO,
            size,
            rotation: 0.0,
            health,
            max_health: health,
            active: true,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.size.half_width()
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.half_width()
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.size.half_height()
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.half_height()
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// A timed power-up currently applied to a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub magnitude: f32,
    pub remaining_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub entity: Entity,
    /// Owning identity as known to the input / network layers.
    pub player_id: String,
    pub name: String,
    pub score: u32,
    pub lives: u32,
    pub weapon: WeaponKind,
    pub weapon_level: u32,
    pub effects: Vec<ActiveEffect>,
    /// Damage-absorbing pool granted by the shield power-up.
    pub shield: i32,
    /// Exactly one player per client is locally controlled.
    pub is_local: bool,
}

impl Player {
    pub fn new(id: EntityId, player_id: &str, name: &str, position: Vec2, is_local: bool) -> Self {
        Player {
            entity: Entity::new(id, position, PLAYER_SIZE, PLAYER_MAX_HEALTH),
            player_id: player_id.to_string(),
            name: name.to_string(),
            score: 0,
            lives: STARTING_LIVES,
            weapon: WeaponKind::Basic,
            weapon_level: 1,
            effects: Vec::new(),
            shield: 0,
            is_local,
        }
    }

    pub fn is_active(&self) -> bool {
        self.entity.active
    }

    /// Apply incoming damage.  Returns `true` when a life was lost.
    ///
    /// The shield pool soaks damage first.  Health never drops below zero:
    /// the hit that would take it there costs a life and refills health, and
    /// the player only deactivates once the last life is gone.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.entity.active || amount <= 0 {
            return false;
        }

        let absorbed = amount.min(self.shield.max(0));
        self.shield -= absorbed;
        let remaining = amount - absorbed;
        if remaining == 0 {
            return false;
        }

        let health = self.entity.health - remaining;
        if health > 0 {
            self.entity.health = health;
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        self.entity.health = self.entity.max_health;
        if self.lives == 0 {
            self.entity.active = false;
        }
        true
    }

    pub fn apply_power_up(&mut self, kind: PowerUpKind, effect: PowerUpEffect) {
        match kind {
            PowerUpKind::Health => {
                let restored = self.entity.health + effect.magnitude as i32;
                self.entity.health = restored.min(self.entity.max_health);
            }
            PowerUpKind::WeaponUpgrade => {
                self.weapon_level =
                    (self.weapon_level + effect.magnitude.max(0.0) as u32).min(MAX_WEAPON_LEVEL);
                self.weapon = weapon_for_level(self.weapon_level);
            }
            PowerUpKind::Shield => {
                self.shield = effect.magnitude as i32;
            }
            PowerUpKind::SpeedBoost | PowerUpKind::ScoreMultiplier => {}
        }

        if effect.duration_ms > 0.0 {
            self.refresh_effect(kind, effect);
        }
    }

    fn refresh_effect(&mut self, kind: PowerUpKind, effect: PowerUpEffect) {
        match self.effects.iter_mut().find(|e| e.kind == kind) {
            Some(active) => {
                active.magnitude = effect.magnitude;
                active.remaining_ms = effect.duration_ms;
            }
            None => self.effects.push(ActiveEffect {
                kind,
                magnitude: effect.magnitude,
                remaining_ms: effect.duration_ms,
            }),
        }
    }

    /// Count down timed effects, undoing the ones that run out.
    pub fn tick_effects(&mut self, delta_ms: f64) {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.remaining_ms -= delta_ms;
            if effect.remaining_ms <= 0.0 {
                expired.push(effect.kind);
            }
        }
        if expired.is_empty() {
            return;
        }

        self.effects.retain(|e| e.remaining_ms > 0.0);
        for kind in expired {
            match kind {
                PowerUpKind::WeaponUpgrade => {
                    self.weapon_level = 1;
                    self.weapon = WeaponKind::Basic;
                }
                PowerUpKind::Shield => self.shield = 0,
                _ => {}
            }
        }
    }

    fn effect_magnitude(&self, kind: PowerUpKind) -> Option<f32> {
        self.effects.iter().find(|e| e.kind == kind).map(|e| e.magnitude)
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.effect_magnitude(PowerUpKind::SpeedBoost).unwrap_or(1.0)
    }

    pub fn score_multiplier(&self) -> f32 {
        self.effect_magnitude(PowerUpKind::ScoreMultiplier).unwrap_or(1.0)
    }
}

fn weapon_for_level(level: u32) -> WeaponKind {
    if level >= 2 {
        WeaponKind::Spread
    } else {
        WeaponKind::Basic
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub entity: Entity,
    pub kind: EnemyKind,
    /// Contact damage; also used for the bullets this enemy fires.
    pub damage: i32,
    /// Score awarded when destroyed by a player bullet.
    pub points: u32,
    pub pattern: AttackPattern,
    /// Simulation time (ms) of the last shot.
    pub last_shot_ms: f64,
}

impl Enemy {
    /// Build an enemy of `kind` with its stats scaled for `wave`.
    /// Moves straight down at the scaled speed until given another pattern.
    pub fn new(id: EntityId, kind: EnemyKind, position: Vec2, wave: u32, base_speed: f32) -> Self {
        let stats = kind.stats();
        let mult = kind.difficulty_multiplier(wave);

        let health = ((stats.health as f32 * mult).round() as i32).max(1);
        let damage = (stats.damage as f32 * mult).round() as i32;
        let speed = base_speed * stats.speed_factor * mult;
        let mut points = (stats.points as f32 * mult).floor() as u32;
        if kind == EnemyKind::Boss {
            points *= (wave / 5).max(1);
        }

        let mut entity = Entity::new(id, position, stats.size, health);
        entity.velocity = Vec2::new(0.0, speed);

        Enemy {
            entity,
            kind,
            damage,
            points,
            pattern: AttackPattern::Straight,
            last_shot_ms: 0.0,
        }
    }

    pub fn with_pattern(mut self, pattern: AttackPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn fire_interval_ms(&self) -> f64 {
        self.kind.stats().fire_interval_ms
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub entity: Entity,
    pub damage: i32,
    pub owner: EntityId,
    /// Routes the bullet to the player-vs-enemy or enemy-vs-player pass.
    pub kind: BulletKind,
}

impl Bullet {
    pub fn new(
        id: EntityId,
        kind: BulletKind,
        owner: EntityId,
        position: Vec2,
        velocity: Vec2,
        damage: i32,
    ) -> Self {
        let size = match kind {
            BulletKind::Player => PLAYER_BULLET_SIZE,
            BulletKind::Enemy => ENEMY_BULLET_SIZE,
        };
        let mut entity = Entity::new(id, position, size, 1);
        entity.velocity = velocity;
        if velocity != Vec2::ZERO {
            entity.rotation = velocity.to_angle() + std::f32::consts::FRAC_PI_2;
        }
        Bullet {
            entity,
            damage,
            owner,
            kind,
        }
    }
}

// ── Power-ups ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub entity: Entity,
    pub kind: PowerUpKind,
    pub effect: PowerUpEffect,
}

impl PowerUp {
    pub fn new(id: EntityId, kind: PowerUpKind, position: Vec2) -> Self {
        let mut entity = Entity::new(id, position, kind.size(), 1);
        entity.velocity = Vec2::new(0.0, POWER_UP_DRIFT_SPEED);
        PowerUp {
            entity,
            kind,
            effect: kind.effect(),
        }
    }
}

// ── Explosions ───────────────────────────────────────────────────────────────

/// Short-lived visual marker left behind by a kill or a contact hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub position: Vec2,
    pub size: f32,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
    /// `elapsed / duration`, clamped to [0, 1].
    pub progress: f32,
}

impl Explosion {
    pub fn new(position: Vec2, size: f32) -> Self {
        Explosion {
            position,
            size,
            duration_ms: EXPLOSION_DURATION_MS,
            elapsed_ms: 0.0,
            progress: 0.0,
        }
    }

    /// Age the explosion.  Returns `true` once it has run its course.
    pub fn advance(&mut self, delta_ms: f64) -> bool {
        self.elapsed_ms += delta_ms.max(0.0);
        self.progress = if self.duration_ms > 0.0 {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

// ── Master game state ────────────────────────────────────────────────────────

/// The entire game state.  Cloneable and serializable so it can be handed
/// out as a snapshot or shipped to peers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    pub score: u32,
    /// Incremented every time a boss goes down.
    pub level: u32,
    pub wave: u32,
    pub enemies_killed: u32,
    pub power_ups_collected: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    /// Percentage of player bullets that hit an enemy.
    pub accuracy: f32,
    pub status: GameStatus,
    pub paused: bool,
    /// Accumulated simulation time in milliseconds.
    pub time_elapsed: f64,
    pub is_multiplayer: bool,
    pub width: f32,
    pub height: f32,
    pub ids: IdAllocator,
}

impl GameState {
    pub fn new(width: f32, height: f32) -> Self {
        GameState {
            players: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            power_ups: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            level: 1,
            wave: 1,
            enemies_killed: 0,
            power_ups_collected: 0,
            shots_fired: 0,
            shots_hit: 0,
            accuracy: 0.0,
            status: GameStatus::Menu,
            paused: false,
            time_elapsed: 0.0,
            is_multiplayer: false,
            width,
            height,
            ids: IdAllocator::default(),
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_local)
    }

    pub fn active_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.entity.active).count()
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.entity.active).count()
    }

    pub fn active_power_up_count(&self) -> usize {
        self.power_ups.iter().filter(|p| p.entity.active).count()
    }

    /// Cleanup pass: drop every inactive player, enemy, bullet and power-up.
    pub fn remove_inactive(&mut self) {
        self.players.retain(|p| p.entity.active);
        self.enemies.retain(|e| e.entity.active);
        self.bullets.retain(|b| b.entity.active);
        self.power_ups.retain(|p| p.entity.active);
    }
}
