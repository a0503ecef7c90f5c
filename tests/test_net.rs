use arcade_shooter::config::GameConfig;
use arcade_shooter::engine::Engine;
use arcade_shooter::entities::*;
use arcade_shooter::error::GameError;
use arcade_shooter::net::*;
use glam::Vec2;

fn host() -> Engine {
    let mut engine = Engine::with_seed(GameConfig::default(), 3);
    engine.set_multiplayer(true);
    engine.add_player("host", "Ada", true);
    engine.add_player("guest", "Bo", false);
    engine.start_game(0.0);
    engine
}

fn guest() -> Engine {
    let mut engine = Engine::with_seed(GameConfig::default(), 4);
    engine.set_multiplayer(true);
    engine.add_player("guest", "Bo", true);
    engine.start_game(0.0);
    engine
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[test]
fn snapshot_round_trip_reproduces_entities() {
    let mut source = host();
    {
        let state = source.state_mut();
        let id = state.ids.next_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Heavy, Vec2::new(123.5, 77.25), 3, 100.0));
    }
    source.player_shoot("host");
    source.step(16.0);

    let bytes = encode(&NetMessage::snapshot(source.state(), 16.0)).expect("encode");
    let mut replica = guest();
    replica.apply_network_message(decode(&bytes).expect("decode"));

    let a = source.state();
    let b = replica.state();
    assert_eq!(a.players.len(), b.players.len());
    assert_eq!(a.enemies.len(), b.enemies.len());
    assert_eq!(a.bullets.len(), b.bullets.len());
    assert_eq!(a.time_elapsed, b.time_elapsed);
    assert_eq!(a.score, b.score);

    for (x, y) in a.enemies.iter().zip(&b.enemies) {
        assert_eq!(x.entity.id, y.entity.id);
        assert_eq!(x.entity.health, y.entity.health);
        assert_eq!(x.kind, y.kind);
        assert!(approx(x.entity.position.x, y.entity.position.x));
        assert!(approx(x.entity.position.y, y.entity.position.y));
    }
    for (x, y) in a.bullets.iter().zip(&b.bullets) {
        assert_eq!(x.entity.id, y.entity.id);
        assert_eq!(x.owner, y.owner);
        assert!(approx(x.entity.position.y, y.entity.position.y));
    }
    for (x, y) in a.players.iter().zip(&b.players) {
        assert_eq!(x.entity.id, y.entity.id);
        assert_eq!(x.player_id, y.player_id);
        assert_eq!(x.entity.health, y.entity.health);
    }
}

#[test]
fn snapshot_rederives_local_player() {
    let source = host();
    let mut replica = guest();
    replica.apply_snapshot(source.state().clone());

    let state = replica.state();
    assert!(!state.player("host").map_or(true, |p| p.is_local));
    assert!(state.player("guest").map_or(false, |p| p.is_local));
    assert_eq!(state.local_player().map(|p| p.name.as_str()), Some("Bo"));
}

#[test]
fn finished_snapshot_stops_the_replica() {
    let mut source = host();
    source.stop_game();
    let mut replica = guest();
    assert!(replica.is_running());

    replica.apply_network_message(NetMessage::snapshot(source.state(), 0.0));
    assert_eq!(replica.state().status, GameStatus::GameOver);
    assert!(!replica.is_running());
}

#[test]
fn snapshot_moves_spawners_to_its_wave() {
    let mut source = host();
    source.state_mut().wave = 3;
    let mut replica = guest();
    replica.apply_snapshot(source.state().clone());
    assert_eq!(replica.enemy_spawner().wave_number(), 3);

    // Keep ticking with the field cleared so the replica's own spawner
    // drives wave progression from here on
    let mut waves = Vec::new();
    for _ in 0..8 {
        replica.state_mut().enemies.clear();
        replica.state_mut().bullets.clear();
        replica.step(2_001.0);
        waves.push(replica.state().wave);
        assert_eq!(replica.enemy_spawner().wave_number(), replica.state().wave);
    }
    assert!(waves.iter().all(|&w| w >= 3), "{waves:?}");
    assert!(waves.windows(2).all(|w| w[0] <= w[1]), "{waves:?}");
}

#[test]
fn snapshot_from_a_restarted_host_rewinds_spawners() {
    let mut replica = guest();
    let mut ahead = replica.state().clone();
    ahead.wave = 4;
    replica.apply_snapshot(ahead);
    assert_eq!(replica.enemy_spawner().wave_number(), 4);

    replica.apply_snapshot(host().state().clone());
    assert_eq!(replica.state().wave, 1);
    assert_eq!(replica.enemy_spawner().wave_number(), 1);
}

// ── Player events ─────────────────────────────────────────────────────────────

#[test]
fn move_message_relocates_player() {
    let mut engine = host();
    let msg = NetMessage::player_move("guest", Vec2::new(200.0, 400.0), 12.0);
    engine.apply_network_message(decode(&encode(&msg).expect("encode")).expect("decode"));

    let p = engine.state().player("guest").expect("guest");
    assert!(approx(p.entity.position.x, 200.0));
    assert!(approx(p.entity.position.y, 400.0));
}

#[test]
fn shoot_message_fires_for_that_player() {
    let mut engine = host();
    engine.apply_network_message(NetMessage::player_shoot("guest", 5.0));

    let owner = engine.state().player("guest").map(|p| p.entity.id);
    assert_eq!(engine.state().bullets.len(), 1);
    assert_eq!(Some(engine.state().bullets[0].owner), owner);
}

#[test]
fn messages_for_unknown_players_are_ignored() {
    let mut engine = host();
    let before = engine.state().clone();
    engine.apply_network_message(NetMessage::player_move("ghost", Vec2::ZERO, 1.0));
    engine.apply_network_message(NetMessage::player_shoot("ghost", 1.0));
    assert_eq!(engine.state(), &before);
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[test]
fn messages_are_tagged_by_type() {
    let bytes = encode(&NetMessage::player_shoot("p1", 42.0)).expect("encode");
    let text = String::from_utf8(bytes).expect("utf-8");
    assert!(text.contains("\"type\":\"player_shoot\""));
    assert!(text.contains("\"player_id\":\"p1\""));
}

#[test]
fn timestamp_is_exposed() {
    assert_eq!(NetMessage::player_shoot("p1", 42.0).timestamp(), 42.0);
    assert_eq!(
        NetMessage::player_move("p1", Vec2::ZERO, 7.5).timestamp(),
        7.5
    );
}

#[test]
fn garbage_fails_to_decode() {
    assert!(matches!(decode(b"not json"), Err(GameError::Codec(_))));
    assert!(matches!(
        decode(br#"{"type":"teleport","timestamp":0}"#),
        Err(GameError::Codec(_))
    ));
}
