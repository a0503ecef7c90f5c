use arcade_shooter::entities::*;
use arcade_shooter::powerup_spawner::*;
use glam::Vec2;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameState {
    GameState::new(800.0, 600.0)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn push_power_up(state: &mut GameState, kind: PowerUpKind) {
    let id = state.ids.next_id();
    state.power_ups.push(PowerUp::new(id, kind, Vec2::new(100.0, 100.0)));
}

// ── Tuning ────────────────────────────────────────────────────────────────────

#[test]
fn default_tuning_is_medium() {
    let s = PowerUpSpawner::default();
    assert_eq!(s.spawn_interval_ms(), BASE_SPAWN_INTERVAL_MS);
    assert_eq!(s.spawn_chance(), BASE_SPAWN_CHANCE);
    assert_eq!(PowerUpSpawner::new(Difficulty::Medium).spawn_interval_ms(), 15_000.0);
}

#[test]
fn adjust_spawn_rate_follows_difficulty() {
    let mut s = PowerUpSpawner::default();
    s.adjust_spawn_rate(Difficulty::Easy);
    assert_eq!(s.spawn_interval_ms(), 12_000.0);
    assert_eq!(s.spawn_chance(), 0.4);

    s.adjust_spawn_rate(Difficulty::Expert);
    assert_eq!(s.spawn_interval_ms(), 20_000.0);
    assert_eq!(s.spawn_chance(), 0.2);
}

#[test]
fn increase_difficulty_is_capped() {
    let mut s = PowerUpSpawner::new(Difficulty::Medium);
    s.increase_difficulty();
    assert!((s.spawn_interval_ms() - 16_500.0).abs() < 1e-6);
    assert!((s.spawn_chance() - 0.27).abs() < 1e-9);

    for _ in 0..50 {
        s.increase_difficulty();
    }
    assert_eq!(s.spawn_interval_ms(), MAX_SPAWN_INTERVAL_MS);
    assert_eq!(s.spawn_chance(), MIN_SPAWN_CHANCE);
}

#[test]
fn reset_restores_difficulty_tuning() {
    let mut s = PowerUpSpawner::new(Difficulty::Hard);
    for _ in 0..5 {
        s.increase_difficulty();
    }
    s.reset();
    assert_eq!(s.spawn_interval_ms(), 18_000.0);
    assert_eq!(s.spawn_chance(), 0.25);
}

// ── Timed spawn ───────────────────────────────────────────────────────────────

#[test]
fn nothing_before_the_interval() {
    let mut s = PowerUpSpawner::with_tuning(1_000.0, 1.0);
    let mut state = make_state();
    state.time_elapsed = 999.0;
    assert!(s.update(&mut state, &mut seeded_rng()).is_none());
}

#[test]
fn certain_chance_spawns_at_interval() {
    let mut s = PowerUpSpawner::with_tuning(1_000.0, 1.0);
    let mut state = make_state();
    let mut rng = seeded_rng();
    state.time_elapsed = 1_000.0;

    let p = s.update(&mut state, &mut rng).expect("spawn with chance 1.0");
    let hw = p.kind.size().half_width();
    assert!(p.entity.position.x >= hw && p.entity.position.x <= 800.0 - hw);
    assert_eq!(p.entity.position.y, -hw);
    assert!(state.power_ups.is_empty()); // caller appends

    // Interval restarted
    state.time_elapsed = 1_500.0;
    assert!(s.update(&mut state, &mut rng).is_none());
    state.time_elapsed = 2_000.0;
    assert!(s.update(&mut state, &mut rng).is_some());
}

#[test]
fn zero_chance_never_spawns() {
    let mut s = PowerUpSpawner::with_tuning(1_000.0, 0.0);
    let mut state = make_state();
    let mut rng = seeded_rng();
    for i in 1..=20 {
        state.time_elapsed = 1_000.0 * i as f64;
        assert!(s.update(&mut state, &mut rng).is_none());
    }
}

#[test]
fn at_most_three_on_screen() {
    let mut s = PowerUpSpawner::with_tuning(1_000.0, 1.0);
    let mut state = make_state();
    for _ in 0..MAX_ACTIVE_POWER_UPS {
        push_power_up(&mut state, PowerUpKind::Health);
    }
    state.time_elapsed = 10_000.0;
    assert!(s.update(&mut state, &mut seeded_rng()).is_none());

    // Inactive ones do not count
    state.power_ups[0].entity.active = false;
    assert!(s.update(&mut state, &mut seeded_rng()).is_some());
}

// ── Rewards ───────────────────────────────────────────────────────────────────

#[test]
fn boss_reward_always_includes_health() {
    let s = PowerUpSpawner::default();
    let at = Vec2::new(400.0, 200.0);
    for seed in 0..20 {
        let mut state = make_state();
        let mut rng = StdRng::seed_from_u64(seed);
        let rewards = s.spawn_boss_reward(&mut state, at, &mut rng);

        assert!((1..=3).contains(&rewards.len()));
        assert_eq!(rewards[0].kind, PowerUpKind::Health);
        assert_eq!(rewards[0].entity.position, at);
        for r in &rewards[1..] {
            assert!(matches!(
                r.kind,
                PowerUpKind::WeaponUpgrade | PowerUpKind::ScoreMultiplier
            ));
            assert_ne!(r.entity.position.x, at.x);
        }
    }
}

#[test]
fn wave_reward_is_occasional() {
    let s = PowerUpSpawner::default();
    let mut state = make_state();
    let mut rng = seeded_rng();
    let dropped = (0..200)
        .filter_map(|_| s.spawn_wave_reward(&mut state, &mut rng))
        .count();
    assert!(dropped > 0 && dropped < 200);
}
