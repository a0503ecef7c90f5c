//! The simulation core.
//!
//! [`Engine`] exclusively owns the authoritative [`GameState`].  Input calls
//! mutate it synchronously; an external fixed-rate scheduler calls
//! [`Engine::update`] once per frame, which lends the state to physics, the
//! spawners and collision resolution in turn and then hands a snapshot copy
//! to the registered listener.
//!
//! Commands that name an unknown player are silently ignored: a late network
//! command for a player who already left must not disturb the loop.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::audio::{NullSound, SoundCue, SoundSink};
use crate::collision::check_collision;
use crate::config::GameConfig;
use crate::enemy_spawner::EnemySpawner;
use crate::entities::{
    Bullet, BulletKind, Difficulty, EnemyKind, EntityId, Explosion, GameState,
    GameStatus, Player, WeaponKind, PLAYER_BULLET_DAMAGE, PLAYER_SIZE,
};
use crate::physics::Physics;
use crate::powerup_spawner::PowerUpSpawner;

/// Receives an owned snapshot after every simulation step.
pub type StateListener = Box<dyn FnMut(GameState)>;

/// Horizontal velocity offsets of the three spread-shot bullets, px/s.
pub const SPREAD_OFFSETS: [f32; 3] = [-100.0, 0.0, 100.0];

/// Players spawn this far above the bottom edge.
const PLAYER_SPAWN_INSET: f32 = 60.0;
/// Horizontal gap between successive player spawn points.
const PLAYER_SPAWN_SPACING: f32 = 60.0;

/// Who joined the session, so a restart can bring everyone back.
#[derive(Debug, Clone)]
struct RosterEntry {
    player_id: String,
    name: String,
    is_local: bool,
}

pub struct Engine {
    state: GameState,
    config: GameConfig,
    physics: Physics,
    enemy_spawner: EnemySpawner,
    power_up_spawner: PowerUpSpawner,
    rng: StdRng,
    sound: Box<dyn SoundSink>,
    listener: Option<StateListener>,
    roster: Vec<RosterEntry>,
    last_tick_ms: Option<f64>,
    running: bool,
}

impl Engine {
    /// Build an engine in the `Menu` state.  The RNG is seeded from
    /// `config.seed` when present, from entropy otherwise.
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Engine {
            state: GameState::new(config.screen_width, config.screen_height),
            physics: Physics::new(config.max_bullets),
            enemy_spawner: EnemySpawner::new(&config),
            power_up_spawner: PowerUpSpawner::new(config.difficulty),
            config,
            rng,
            sound: Box::new(NullSound),
            listener: None,
            roster: Vec::new(),
            last_tick_ms: None,
            running: false,
        }
    }

    pub fn with_sound(mut self, sound: impl SoundSink + 'static) -> Self {
        self.sound = Box::new(sound);
        self
    }

    /// Register the snapshot consumer.  Replaces any previous listener.
    pub fn on_state_update(&mut self, listener: impl FnMut(GameState) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for harnesses and scripted scenarios.  Normal play goes
    /// through the command API.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn enemy_spawner(&self) -> &EnemySpawner {
        &self.enemy_spawner
    }

    pub fn power_up_spawner(&self) -> &PowerUpSpawner {
        &self.power_up_spawner
    }

    /// Whether the external scheduler should keep delivering ticks.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn local_player_id(&self) -> Option<&str> {
        self.roster
            .iter()
            .find(|r| r.is_local)
            .map(|r| r.player_id.as_str())
    }

    /// Re-seed both spawners for a difficulty level.
    pub fn set_difficulty(&mut self, level: Difficulty) {
        self.config.difficulty = level;
        self.enemy_spawner.set_difficulty(level);
        self.power_up_spawner.adjust_spawn_rate(level);
    }

    pub fn set_multiplayer(&mut self, multiplayer: bool) {
        self.state.is_multiplayer = multiplayer;
    }

    // ── Player commands ──────────────────────────────────────────────────────

    /// Register a player and place it near the bottom of the playfield.
    /// Returns `None` if `player_id` is already present.
    pub fn add_player(&mut self, player_id: &str, name: &str, is_local: bool) -> Option<EntityId> {
        if self.state.player(player_id).is_some() {
            trace!(player_id, "add_player: already present");
            return None;
        }

        let slot = self.state.players.len();
        let id = self.spawn_player(player_id, name, is_local, slot);

        self.roster.retain(|r| r.player_id != player_id);
        if is_local {
            for entry in &mut self.roster {
                entry.is_local = false;
            }
        }
        self.roster.push(RosterEntry {
            player_id: player_id.to_string(),
            name: name.to_string(),
            is_local,
        });

        debug!(player_id, name, %id, "player added");
        Some(id)
    }

    fn spawn_player(
        &mut self,
        player_id: &str,
        name: &str,
        is_local: bool,
        slot: usize,
    ) -> EntityId {
        let id = self.state.ids.next_id();
        let position = self.spawn_point(slot);
        if is_local {
            for player in &mut self.state.players {
                player.is_local = false;
            }
        }
        self.state
            .players
            .push(Player::new(id, player_id, name, position, is_local));
        id
    }

    fn spawn_point(&self, slot: usize) -> Vec2 {
        let (w, h) = (self.state.width, self.state.height);
        let hw = PLAYER_SIZE.half_width();
        let hh = PLAYER_SIZE.half_height();
        let x = (w / 2.0 + slot as f32 * PLAYER_SPAWN_SPACING).clamp(hw, (w - hw).max(hw));
        let y = (h - PLAYER_SPAWN_INSET).clamp(hh, (h - hh).max(hh));
        Vec2::new(x, y)
    }

    pub fn remove_player(&mut self, player_id: &str) {
        let before = self.state.players.len();
        self.state.players.retain(|p| p.player_id != player_id);
        self.roster.retain(|r| r.player_id != player_id);
        if self.state.players.len() == before {
            trace!(player_id, "remove_player: unknown player");
        } else {
            debug!(player_id, "player removed");
        }
    }

    /// Teleport a player to an absolute position.  Physics re-clamps it to
    /// the playfield on the next tick.
    pub fn update_player_position(&mut self, player_id: &str, position: Vec2) {
        match self.state.player_mut(player_id) {
            Some(player) => player.entity.position = position,
            None => trace!(player_id, "update_player_position: unknown player"),
        }
    }

    /// Drive a player by direction instead of position.  The direction is
    /// normalized and scaled by the configured player speed and any active
    /// speed boost; a zero direction stops the player.
    pub fn set_player_velocity(&mut self, player_id: &str, direction: Vec2) {
        let base_speed = self.config.player_speed;
        match self.state.player_mut(player_id) {
            Some(player) => {
                let speed = base_speed * player.speed_multiplier();
                player.entity.velocity = direction.normalize_or_zero() * speed;
            }
            None => trace!(player_id, "set_player_velocity: unknown player"),
        }
    }

    /// Fire the player's current weapon.  Only effective while playing.
    pub fn player_shoot(&mut self, player_id: &str) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        let Some(player) = self
            .state
            .players
            .iter()
            .find(|p| p.player_id == player_id && p.entity.active)
        else {
            trace!(player_id, "player_shoot: unknown or inactive player");
            return;
        };

        let weapon = player.weapon;
        let owner = player.entity.id;
        let muzzle = Vec2::new(player.entity.position.x, player.entity.top());
        let speed = self.config.bullet_speed;

        let offsets: &[f32] = match weapon {
            WeaponKind::Basic => &[0.0],
            WeaponKind::Spread => &SPREAD_OFFSETS,
        };
        let mut fired = 0;
        for &dx in offsets {
            if self.state.bullets.len() >= self.config.max_bullets {
                trace!(player_id, "player_shoot: bullet cap reached");
                break;
            }
            let bullet = Bullet::new(
                self.state.ids.next_id(),
                BulletKind::Player,
                owner,
                muzzle,
                Vec2::new(dx, -speed),
                PLAYER_BULLET_DAMAGE,
            );
            self.state.bullets.push(bullet);
            self.state.shots_fired += 1;
            fired += 1;
        }

        if fired > 0 {
            self.sound.play(SoundCue::Shoot(weapon));
        }
    }

    // ── Status machine ───────────────────────────────────────────────────────

    /// Enter `Playing`.  Starting after a finished game rebuilds the world
    /// and brings every registered player back at full strength.
    pub fn start_game(&mut self, now_ms: f64) {
        match self.state.status {
            GameStatus::Playing => return,
            GameStatus::Paused => {
                self.resume_game(now_ms);
                return;
            }
            GameStatus::GameOver | GameStatus::Victory => self.reset_world(),
            GameStatus::Menu | GameStatus::Waiting => {}
        }

        self.state.status = GameStatus::Playing;
        self.state.paused = false;
        self.running = true;
        self.last_tick_ms = Some(now_ms);
        info!(
            players = self.state.players.len(),
            difficulty = ?self.config.difficulty,
            "game started"
        );
    }

    pub fn pause_game(&mut self) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        self.state.status = GameStatus::Paused;
        self.state.paused = true;
        self.running = false;
        debug!(time_ms = self.state.time_elapsed, "game paused");
    }

    /// Leave `Paused`.  The tick clock restarts at `now_ms` so the time spent
    /// paused never shows up as one huge frame.
    pub fn resume_game(&mut self, now_ms: f64) {
        if self.state.status != GameStatus::Paused {
            return;
        }
        self.state.status = GameStatus::Playing;
        self.state.paused = false;
        self.running = true;
        self.last_tick_ms = Some(now_ms);
        debug!(time_ms = self.state.time_elapsed, "game resumed");
    }

    pub fn stop_game(&mut self) {
        if !matches!(self.state.status, GameStatus::Playing | GameStatus::Paused) {
            return;
        }
        self.finish(GameStatus::GameOver);
    }

    /// Multiplayer lobby: wait for peers before starting.
    pub fn wait_for_players(&mut self) {
        if self.state.status == GameStatus::Menu {
            self.state.status = GameStatus::Waiting;
            self.state.is_multiplayer = true;
        }
    }

    fn finish(&mut self, status: GameStatus) {
        self.state.status = status;
        self.state.paused = false;
        self.running = false;
        self.sound.play(match status {
            GameStatus::Victory => SoundCue::Victory,
            _ => SoundCue::GameOver,
        });
        info!(
            ?status,
            score = self.state.score,
            wave = self.state.wave,
            kills = self.state.enemies_killed,
            "game finished"
        );
    }

    fn reset_world(&mut self) {
        let mut ids = std::mem::take(&mut self.state.ids);
        ids.next_generation();

        let multiplayer = self.state.is_multiplayer;
        self.state = GameState::new(self.config.screen_width, self.config.screen_height);
        self.state.ids = ids;
        self.state.is_multiplayer = multiplayer;

        let roster = self.roster.clone();
        for (slot, entry) in roster.iter().enumerate() {
            self.spawn_player(&entry.player_id, &entry.name, entry.is_local, slot);
        }

        self.enemy_spawner.reset();
        self.power_up_spawner.reset();
    }

    // ── Per-frame pipeline ───────────────────────────────────────────────────

    /// Scheduler entry point.  Derives the frame delta from the previous
    /// call and runs one [`step`](Self::step).  Ignored unless running.
    pub fn update(&mut self, now_ms: f64) {
        if !self.running || self.state.status != GameStatus::Playing {
            return;
        }
        let delta = match self.last_tick_ms {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);
        self.step(delta);
    }

    /// Advance the simulation by an explicit `delta_ms`.
    pub fn step(&mut self, delta_ms: f64) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        let delta = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        self.state.time_elapsed += delta;

        // ── 1. Motion ────────────────────────────────────────────────────────
        self.physics.update(&mut self.state, delta);

        // ── 2. Spawning ──────────────────────────────────────────────────────
        let spawned = self.enemy_spawner.update(&mut self.state, &mut self.rng);
        self.state.enemies.extend(spawned);

        if let Some(power_up) = self.power_up_spawner.update(&mut self.state, &mut self.rng) {
            self.state.power_ups.push(power_up);
        }

        // ── 3. Timed effects ─────────────────────────────────────────────────
        for player in &mut self.state.players {
            player.tick_effects(delta);
        }

        // ── 4. Collisions & cleanup ──────────────────────────────────────────
        self.resolve_collisions();
        self.state.remove_inactive();
        self.state.explosions.retain_mut(|e| !e.advance(delta));

        // ── 5. Progression ───────────────────────────────────────────────────
        self.advance_wave();
        if self.state.shots_fired > 0 {
            self.state.accuracy =
                self.state.shots_hit as f32 / self.state.shots_fired as f32 * 100.0;
        }

        // ── 6. End conditions ────────────────────────────────────────────────
        if self.state.active_player_count() == 0 {
            self.finish(GameStatus::GameOver);
        } else if let Some(target) = self.config.victory_wave {
            if self.state.wave > target {
                self.finish(GameStatus::Victory);
            }
        }

        if let Some(listener) = self.listener.as_mut() {
            listener(self.state.clone());
        }
    }

    /// Publish a spawner wave change.  `state.wave` only ever moves forward.
    fn advance_wave(&mut self) {
        let wave = self.enemy_spawner.wave_number();
        if wave <= self.state.wave {
            return;
        }
        self.state.wave = wave;
        self.power_up_spawner.increase_difficulty();
        let reward = self
            .power_up_spawner
            .spawn_wave_reward(&mut self.state, &mut self.rng);
        if let Some(reward) = reward {
            debug!(kind = ?reward.kind, wave, "wave reward dropped");
            self.state.power_ups.push(reward);
        }
    }

    /// Independent passes over the full cross-products:
    /// players×enemies, player bullets×enemies, enemy bullets×players,
    /// players×power-ups.
    fn resolve_collisions(&mut self) {
        let mut score_gain = 0u32;
        let mut kills = 0u32;
        let mut hits = 0u32;
        let mut collected = 0u32;
        let mut boss_deaths: Vec<Vec2> = Vec::new();

        {
            let GameState {
                players,
                enemies,
                bullets,
                power_ups,
                explosions,
                ..
            } = &mut self.state;
            let sound = &mut self.sound;

            // ── Player × Enemy: contact ──────────────────────────────────────
            for player in players.iter_mut() {
                for enemy in enemies.iter_mut() {
                    if !check_collision(&player.entity, &enemy.entity) {
                        continue;
                    }
                    player.take_damage(enemy.damage);
                    enemy.entity.active = false;
                    explosions.push(Explosion::new(enemy.entity.position, enemy.entity.size.width));
                    sound.play(SoundCue::PlayerHit);
                    sound.play(SoundCue::Explosion);
                }
            }

            // ── Player bullet × Enemy ────────────────────────────────────────
            for bullet in bullets.iter_mut().filter(|b| b.kind == BulletKind::Player) {
                for enemy in enemies.iter_mut() {
                    if !bullet.entity.active {
                        break;
                    }
                    if !check_collision(&bullet.entity, &enemy.entity) {
                        continue;
                    }
                    bullet.entity.active = false;
                    hits += 1;

                    enemy.entity.health = (enemy.entity.health - bullet.damage).max(0);
                    if enemy.entity.health > 0 {
                        sound.play(SoundCue::EnemyHit);
                        continue;
                    }

                    enemy.entity.active = false;
                    let shooter = players.iter_mut().find(|p| p.entity.id == bullet.owner);
                    let multiplier = shooter.as_ref().map_or(1.0, |p| p.score_multiplier());
                    let awarded = (enemy.points as f32 * multiplier).round() as u32;
                    if let Some(shooter) = shooter {
                        shooter.score += awarded;
                    }
                    score_gain += awarded;
                    kills += 1;

                    explosions.push(Explosion::new(enemy.entity.position, enemy.entity.size.width));
                    sound.play(SoundCue::Explosion);
                    if enemy.kind == EnemyKind::Boss {
                        boss_deaths.push(enemy.entity.position);
                    }
                }
            }

            // ── Enemy bullet × Player ────────────────────────────────────────
            for bullet in bullets.iter_mut().filter(|b| b.kind == BulletKind::Enemy) {
                for player in players.iter_mut() {
                    if !bullet.entity.active {
                        break;
                    }
                    if !check_collision(&bullet.entity, &player.entity) {
                        continue;
                    }
                    bullet.entity.active = false;
                    player.take_damage(bullet.damage);
                    sound.play(SoundCue::PlayerHit);
                }
            }

            // ── Player × PowerUp ─────────────────────────────────────────────
            for player in players.iter_mut() {
                for power_up in power_ups.iter_mut() {
                    if !check_collision(&player.entity, &power_up.entity) {
                        continue;
                    }
                    power_up.entity.active = false;
                    player.apply_power_up(power_up.kind, power_up.effect);
                    collected += 1;
                    sound.play(SoundCue::PowerUpCollected);
                }
            }
        }

        self.state.score += score_gain;
        self.state.enemies_killed += kills;
        self.state.shots_hit += hits;
        self.state.power_ups_collected += collected;

        for position in boss_deaths {
            self.state.level += 1;
            info!(level = self.state.level, "boss defeated");
            let rewards = self
                .power_up_spawner
                .spawn_boss_reward(&mut self.state, position, &mut self.rng);
            self.state.power_ups.extend(rewards);
        }
    }

    /// Overwrite the whole state with a peer's authoritative snapshot.
    /// Local control is re-derived from this engine's own roster, and the
    /// spawners are moved to the snapshot's wave.
    pub fn apply_snapshot(&mut self, snapshot: GameState) {
        let local = self.local_player_id().map(str::to_string);
        self.state = snapshot;
        for player in &mut self.state.players {
            player.is_local = local.as_deref() == Some(player.player_id.as_str());
        }
        self.sync_spawners();
        if self.state.status != GameStatus::Playing {
            self.running = false;
        }
    }

    fn sync_spawners(&mut self) {
        let wave = self.state.wave;
        let previous = self.enemy_spawner.wave_number();
        if wave == previous {
            return;
        }
        let from = if wave < previous {
            self.power_up_spawner.reset();
            1
        } else {
            previous
        };
        for _ in from..wave {
            self.power_up_spawner.increase_difficulty();
        }
        self.enemy_spawner.sync_to_wave(wave, self.state.time_elapsed);
        debug!(from = previous, to = wave, "spawners synced to snapshot wave");
    }
}
