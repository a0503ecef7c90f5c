//! Motion: integration, attack-pattern steering, containment, off-screen
//! culling and enemy self-fire.
//!
//! All time-varying behavior is phased off `GameState::time_elapsed`, the
//! accumulated simulation time, so a run is reproducible from a sequence of
//! synthetic frame deltas.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::collision::is_within_bounds;
use crate::entities::{AttackPattern, Bullet, BulletKind, Enemy, Entity, GameState};
use crate::vector::normalize_angle;

/// Entities whose center drifts further than this outside the playfield are
/// deactivated.
pub const OFF_SCREEN_MARGIN: f32 = 100.0;

pub const ZIGZAG_AMPLITUDE: f32 = 100.0;
const ZIGZAG_FREQUENCY: f64 = 0.003;

pub const CIRCLE_SPEED: f32 = 50.0;
pub const CIRCLE_DRIFT: f32 = 50.0;
const CIRCLE_FREQUENCY: f64 = 0.002;

pub const HOMING_SPEED: f32 = 100.0;

pub const ENEMY_BULLET_SPEED: f32 = 150.0;

/// Peak vertical speed of the power-up bob, px/s.
pub const BOB_AMPLITUDE: f32 = 20.0;
const BOB_FREQUENCY: f64 = 0.005;

#[derive(Debug, Clone)]
pub struct Physics {
    pub margin: f32,
    /// Enemy fire is suppressed while the bullet collection is this large.
    pub max_bullets: usize,
}

impl Default for Physics {
    fn default() -> Self {
        Physics::new(512)
    }
}

impl Physics {
    pub fn new(max_bullets: usize) -> Self {
        Physics {
            margin: OFF_SCREEN_MARGIN,
            max_bullets,
        }
    }

    /// Advance every active body by `delta_ms`.  A zero or negative delta
    /// leaves the state untouched.
    pub fn update(&self, state: &mut GameState, delta_ms: f64) {
        if delta_ms <= 0.0 || !delta_ms.is_finite() {
            return;
        }
        let dt = (delta_ms / 1000.0) as f32;
        let now = state.time_elapsed;
        let (width, height) = (state.width, state.height);

        // ── 1. Players ───────────────────────────────────────────────────────
        for player in state.players.iter_mut().filter(|p| p.entity.active) {
            integrate(&mut player.entity, dt);
            clamp_to_playfield(&mut player.entity, width, height);
        }

        // ── 2. Enemies: steer, move, cull, fire ─────────────────────────────
        let targets: Vec<Vec2> = state
            .players
            .iter()
            .filter(|p| p.entity.active)
            .map(|p| p.entity.position)
            .collect();
        let mut room = self.max_bullets.saturating_sub(state.bullets.len());
        let mut fired: Vec<Bullet> = Vec::new();

        for enemy in state.enemies.iter_mut().filter(|e| e.entity.active) {
            steer(enemy, now, &targets);
            integrate(&mut enemy.entity, dt);

            if !is_within_bounds(&enemy.entity, width, height, self.margin) {
                enemy.entity.active = false;
                continue;
            }

            if room > 0 && now - enemy.last_shot_ms >= enemy.fire_interval_ms() {
                enemy.last_shot_ms = now;
                room -= 1;
                let muzzle = Vec2::new(
                    enemy.entity.position.x,
                    enemy.entity.position.y + enemy.entity.size.half_height(),
                );
                fired.push(Bullet::new(
                    state.ids.next_id(),
                    BulletKind::Enemy,
                    enemy.entity.id,
                    muzzle,
                    Vec2::new(0.0, ENEMY_BULLET_SPEED),
                    enemy.damage,
                ));
            }
        }

        // ── 3. Bullets ───────────────────────────────────────────────────────
        for bullet in state.bullets.iter_mut().filter(|b| b.entity.active) {
            integrate(&mut bullet.entity, dt);
            if !is_within_bounds(&bullet.entity, width, height, self.margin) {
                bullet.entity.active = false;
            }
        }

        // ── 4. Power-ups: drift plus a cosmetic bob ──────────────────────────
        let bob = BOB_AMPLITUDE * (now * BOB_FREQUENCY).sin() as f32 * dt;
        for power_up in state.power_ups.iter_mut().filter(|p| p.entity.active) {
            integrate(&mut power_up.entity, dt);
            power_up.entity.position.y += bob;
            if !is_within_bounds(&power_up.entity, width, height, self.margin) {
                power_up.entity.active = false;
            }
        }

        state.bullets.extend(fired);
    }
}

/// `position += velocity * dt`; the nose follows the direction of travel.
fn integrate(entity: &mut Entity, dt: f32) {
    entity.position += entity.velocity * dt;
    if entity.velocity != Vec2::ZERO {
        entity.rotation = entity.velocity.to_angle() + FRAC_PI_2;
    }
}

/// Keep a body fully inside the playfield.  A clamped axis loses its
/// velocity so the body stops against the wall.
pub fn clamp_to_playfield(entity: &mut Entity, width: f32, height: f32) {
    let hw = entity.size.half_width();
    let hh = entity.size.half_height();
    let max_x = (width - hw).max(hw);
    let max_y = (height - hh).max(hh);

    if entity.position.x < hw {
        entity.position.x = hw;
        entity.velocity.x = 0.0;
    } else if entity.position.x > max_x {
        entity.position.x = max_x;
        entity.velocity.x = 0.0;
    }

    if entity.position.y < hh {
        entity.position.y = hh;
        entity.velocity.y = 0.0;
    } else if entity.position.y > max_y {
        entity.position.y = max_y;
        entity.velocity.y = 0.0;
    }
}

/// Recompute an enemy's velocity from its attack pattern.
fn steer(enemy: &mut Enemy, now_ms: f64, targets: &[Vec2]) {
    let velocity = &mut enemy.entity.velocity;
    match enemy.pattern {
        AttackPattern::Straight => {}
        AttackPattern::Zigzag => {
            velocity.x = ZIGZAG_AMPLITUDE * (now_ms * ZIGZAG_FREQUENCY).sin() as f32;
        }
        AttackPattern::Circular => {
            let phase = now_ms * CIRCLE_FREQUENCY;
            *velocity = Vec2::new(
                CIRCLE_SPEED * phase.cos() as f32,
                CIRCLE_SPEED * phase.sin() as f32 + CIRCLE_DRIFT,
            );
        }
        AttackPattern::Homing => {
            let here = enemy.entity.position;
            let nearest = targets
                .iter()
                .copied()
                .min_by(|a, b| here.distance(*a).total_cmp(&here.distance(*b)));
            if let Some(target) = nearest {
                *velocity = (target - here).normalize_or_zero() * HOMING_SPEED;
            }
        }
    }
}

// ── Motion utilities ─────────────────────────────────────────────────────────

fn seconds(delta_ms: f64) -> f32 {
    (delta_ms / 1000.0) as f32
}

/// Additive acceleration over `delta_ms`.
pub fn apply_force(entity: &mut Entity, force: Vec2, delta_ms: f64) {
    entity.velocity += force * seconds(delta_ms);
}

/// Exponential damping: `velocity *= damping_factor ^ dt`.
pub fn apply_damping(entity: &mut Entity, damping_factor: f32, delta_ms: f64) {
    entity.velocity = entity.velocity * damping_factor.powf(seconds(delta_ms));
}

pub fn set_velocity(entity: &mut Entity, velocity: Vec2) {
    entity.velocity = velocity;
}

pub fn add_velocity(entity: &mut Entity, delta: Vec2) {
    entity.velocity += delta;
}

pub fn speed(entity: &Entity) -> f32 {
    entity.velocity.length()
}

/// Rescale velocity to `target_speed`, keeping its direction.
pub fn normalize_velocity(entity: &mut Entity, target_speed: f32) {
    entity.velocity = entity.velocity.normalize_or_zero() * target_speed;
}

/// Step toward `target` at `speed` without overshooting.  Returns `true`
/// once the target is reached, at which point velocity is zero.
pub fn move_towards(entity: &mut Entity, target: Vec2, speed: f32, delta_ms: f64) -> bool {
    let offset = target - entity.position;
    let distance = offset.length();
    let step = speed * seconds(delta_ms);

    if distance == 0.0 || step >= distance {
        entity.position = target;
        entity.velocity = Vec2::ZERO;
        return true;
    }

    entity.velocity = offset.normalize_or_zero() * speed;
    entity.position += entity.velocity * seconds(delta_ms);
    false
}

/// Turn toward `target_angle` along the shortest arc, at most
/// `max_rate` radians per second.
pub fn rotate_towards(entity: &mut Entity, target_angle: f32, max_rate: f32, delta_ms: f64) {
    let diff = normalize_angle(target_angle - entity.rotation);
    let max_step = max_rate.abs() * seconds(delta_ms);

    entity.rotation = if diff.abs() <= max_step {
        normalize_angle(target_angle)
    } else {
        normalize_angle(entity.rotation + max_step * diff.signum())
    };
}
