use arcade_shooter::config::GameConfig;
use arcade_shooter::enemy_spawner::*;
use arcade_shooter::entities::*;
use glam::Vec2;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameState {
    GameState::new(800.0, 600.0)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn spawner_for(difficulty: Difficulty) -> EnemySpawner {
    let config = GameConfig {
        difficulty,
        ..GameConfig::default()
    };
    EnemySpawner::new(&config)
}

/// Drive the spawner with "just over one interval" steps until it reaches
/// `target` wave, discarding every enemy so each wave clears immediately.
/// Returns everything spawned while on the final wave reached.
fn run_to_wave(
    spawner: &mut EnemySpawner,
    state: &mut GameState,
    rng: &mut StdRng,
    target: u32,
) -> Vec<Enemy> {
    let mut on_target = Vec::new();
    for _ in 0..10_000 {
        if spawner.wave_number() > target {
            return on_target;
        }
        state.time_elapsed += spawner.spawn_interval_ms() + 1.0;
        let spawned = spawner.update(state, rng);
        if spawner.wave_number() == target {
            on_target.extend(spawned);
        }
    }
    panic!("spawner never got past wave {}", target);
}

// ── Construction / difficulty ─────────────────────────────────────────────────

#[test]
fn medium_defaults() {
    let s = spawner_for(Difficulty::Medium);
    assert_eq!(s.wave_number(), 1);
    assert_eq!(s.enemies_in_current_wave(), 0);
    assert_eq!(s.spawn_interval_ms(), 2_000.0);
    assert_eq!(s.max_enemies_per_wave(), 5);
    assert_eq!(s.wave_delay_ms(), 5_000.0);
    assert!(!s.boss_spawned_this_wave());
}

#[test]
fn set_difficulty_reseeds_thresholds() {
    let mut s = spawner_for(Difficulty::Medium);
    s.set_difficulty(Difficulty::Expert);
    assert_eq!(s.difficulty(), Difficulty::Expert);
    assert_eq!(s.spawn_interval_ms(), 1_000.0);
    assert_eq!(s.max_enemies_per_wave(), 9);
    assert_eq!(s.wave_delay_ms(), 3_000.0);

    s.set_difficulty(Difficulty::Easy);
    assert_eq!(s.spawn_interval_ms(), 2_500.0);
    assert_eq!(s.max_enemies_per_wave(), 4);
}

#[test]
fn spawn_interval_has_a_floor() {
    let config = GameConfig {
        spawn_rate: 600.0,
        difficulty: Difficulty::Expert,
        ..GameConfig::default()
    };
    let s = EnemySpawner::new(&config);
    assert_eq!(s.spawn_interval_ms(), MIN_SPAWN_INTERVAL_MS);
}

// ── Regular spawning ──────────────────────────────────────────────────────────

#[test]
fn nothing_spawns_before_the_interval() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    state.time_elapsed = 2_000.0; // not strictly greater
    assert!(s.update(&mut state, &mut seeded_rng()).is_empty());
}

#[test]
fn regular_spawn_enters_above_the_playfield() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    state.time_elapsed = 2_001.0;

    let spawned = s.update(&mut state, &mut seeded_rng());
    assert_eq!(spawned.len(), 1);
    assert_eq!(s.enemies_in_current_wave(), 1);

    let e = &spawned[0];
    assert_eq!(e.kind, EnemyKind::Basic); // only kind on wave 1
    let hw = e.entity.size.half_width();
    assert!(e.entity.position.x >= hw && e.entity.position.x <= 800.0 - hw);
    assert_eq!(e.entity.position.y, -e.entity.size.half_height());
    assert_eq!(e.last_shot_ms, 2_001.0);
    assert!(matches!(e.pattern, AttackPattern::Straight | AttackPattern::Zigzag));
}

#[test]
fn spawner_hands_back_enemies_without_touching_state() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    state.time_elapsed = 2_001.0;
    let spawned = s.update(&mut state, &mut seeded_rng());
    assert_eq!(spawned.len(), 1);
    assert!(state.enemies.is_empty());
}

#[test]
fn quota_stops_regular_spawns() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    for i in 1..=5 {
        state.time_elapsed = 2_001.0 * i as f64;
        assert_eq!(s.update(&mut state, &mut rng).len(), 1);
    }
    // Keep one alive so the wave cannot complete
    let id = state.ids.next_id();
    state
        .enemies
        .push(Enemy::new(id, EnemyKind::Basic, Vec2::new(400.0, 100.0), 1, 100.0));

    state.time_elapsed = 20_000.0;
    assert!(s.update(&mut state, &mut rng).is_empty());
    assert_eq!(s.enemies_in_current_wave(), 5);
    assert_eq!(s.wave_number(), 1);
}

// ── Wave transitions ──────────────────────────────────────────────────────────

#[test]
fn cleared_wave_advances_to_the_next() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    for i in 1..=5 {
        state.time_elapsed = 2_001.0 * i as f64;
        s.update(&mut state, &mut rng);
    }
    assert_eq!(s.enemies_in_current_wave(), 5);

    state.time_elapsed = 12_006.0;
    let spawned = s.update(&mut state, &mut rng);
    assert!(spawned.is_empty());
    assert_eq!(s.wave_number(), 2);
    assert_eq!(s.enemies_in_current_wave(), 0);

    // Each wave is harder than the last
    assert_eq!(s.max_enemies_per_wave(), 6);
    assert!((s.spawn_interval_ms() - 1_800.0).abs() < 1e-6);
    assert!((s.wave_delay_ms() - 4_750.0).abs() < 1e-6);
}

#[test]
fn wave_waits_for_its_delay() {
    let config = GameConfig {
        spawn_rate: 500.0,
        ..GameConfig::default()
    };
    let mut s = EnemySpawner::new(&config);
    let mut state = make_state();
    let mut rng = seeded_rng();
    for i in 1..=5 {
        state.time_elapsed = 501.0 * i as f64;
        s.update(&mut state, &mut rng);
    }
    // Quota out and nothing alive, but only ~2.5 s into a 5 s wave
    state.time_elapsed = 3_000.0;
    s.update(&mut state, &mut rng);
    assert_eq!(s.wave_number(), 1);

    state.time_elapsed = 5_000.0;
    s.update(&mut state, &mut rng);
    assert_eq!(s.wave_number(), 2);
}

#[test]
fn new_kinds_unlock_with_waves() {
    assert_eq!(unlocked_kinds(1), &[EnemyKind::Basic]);
    assert_eq!(unlocked_kinds(2), &[EnemyKind::Basic, EnemyKind::Fast]);
    assert_eq!(
        unlocked_kinds(3),
        &[EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Heavy]
    );
    assert!(!unlocked_kinds(20).contains(&EnemyKind::Boss));
}

#[test]
fn later_waves_spawn_scaled_enemies() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    let wave3 = run_to_wave(&mut s, &mut state, &mut rng, 3);
    assert!(!wave3.is_empty());
    for e in &wave3 {
        let base = e.kind.stats().health as f32;
        assert_eq!(e.entity.health, (base * 1.2).round() as i32);
    }
}

#[test]
fn patterns_match_their_kind() {
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let p = pick_pattern(EnemyKind::Heavy, &mut rng);
        assert!(matches!(p, AttackPattern::Straight | AttackPattern::Homing));
        let p = pick_pattern(EnemyKind::Fast, &mut rng);
        assert!(matches!(p, AttackPattern::Straight | AttackPattern::Zigzag));
    }
    assert_eq!(pick_pattern(EnemyKind::Boss, &mut rng), AttackPattern::Circular);
}

// ── Bosses ────────────────────────────────────────────────────────────────────

#[test]
fn no_boss_before_wave_five() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    for wave in 1..=4 {
        let spawned = run_to_wave(&mut s, &mut state, &mut rng, wave);
        assert!(spawned.iter().all(|e| e.kind != EnemyKind::Boss));
    }
}

#[test]
fn exactly_one_boss_on_wave_five() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    let wave5 = run_to_wave(&mut s, &mut state, &mut rng, 5);

    let bosses: Vec<&Enemy> = wave5.iter().filter(|e| e.kind == EnemyKind::Boss).collect();
    assert_eq!(bosses.len(), 1);
    let boss = bosses[0];
    assert_eq!(boss.pattern, AttackPattern::Circular);
    assert_eq!(boss.entity.position.x, 400.0);
    assert_eq!(boss.entity.position.y, -40.0);

    // Regular quota (9 on wave 5) is still honoured on top of the boss
    let regular = wave5.iter().filter(|e| e.kind != EnemyKind::Boss).count();
    assert_eq!(regular, 9);
}

#[test]
fn boss_flag_clears_on_next_wave() {
    let mut s = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    run_to_wave(&mut s, &mut state, &mut rng, 5);
    assert_eq!(s.wave_number(), 6);
    assert!(!s.boss_spawned_this_wave());
}

// ── Caps & reset ──────────────────────────────────────────────────────────────

#[test]
fn thresholds_stay_within_caps() {
    let mut s = spawner_for(Difficulty::Expert);
    let mut state = make_state();
    let mut rng = seeded_rng();
    run_to_wave(&mut s, &mut state, &mut rng, 12);

    assert_eq!(s.max_enemies_per_wave(), MAX_ENEMIES_PER_WAVE_CAP);
    assert!(s.spawn_interval_ms() >= MIN_SPAWN_INTERVAL_MS);
    assert!(s.wave_delay_ms() >= MIN_WAVE_DELAY_MS);
}

#[test]
fn reset_returns_to_wave_one() {
    let mut s = spawner_for(Difficulty::Hard);
    let mut state = make_state();
    let mut rng = seeded_rng();
    run_to_wave(&mut s, &mut state, &mut rng, 2);
    assert_eq!(s.wave_number(), 3);

    s.reset();
    assert_eq!(s.wave_number(), 1);
    assert_eq!(s.enemies_in_current_wave(), 0);
    assert_eq!(s.max_enemies_per_wave(), 7);
    assert_eq!(s.spawn_interval_ms(), 1_500.0);
}

#[test]
fn syncing_to_a_wave_matches_playing_through_it() {
    let mut played = spawner_for(Difficulty::Medium);
    let mut state = make_state();
    let mut rng = seeded_rng();
    run_to_wave(&mut played, &mut state, &mut rng, 2);
    assert_eq!(played.wave_number(), 3);

    let mut synced = spawner_for(Difficulty::Medium);
    synced.sync_to_wave(3, 10_000.0);
    assert_eq!(synced.wave_number(), 3);
    assert_eq!(synced.enemies_in_current_wave(), 0);
    assert_eq!(synced.max_enemies_per_wave(), played.max_enemies_per_wave());
    assert_eq!(synced.spawn_interval_ms(), played.spawn_interval_ms());
    assert_eq!(synced.wave_delay_ms(), played.wave_delay_ms());

    // Nothing spawns until a full interval after the sync point
    let mut fresh = make_state();
    fresh.time_elapsed = 10_000.0 + synced.spawn_interval_ms() - 1.0;
    assert!(synced.update(&mut fresh, &mut rng).is_empty());
}

#[test]
fn syncing_to_an_earlier_wave_starts_over() {
    let mut s = spawner_for(Difficulty::Medium);
    s.sync_to_wave(4, 0.0);
    s.sync_to_wave(2, 500.0);
    assert_eq!(s.wave_number(), 2);
    assert_eq!(s.max_enemies_per_wave(), 6);
}
