use arcade_shooter::collision::*;
use arcade_shooter::entities::{Entity, EntityId};
use arcade_shooter::vector::{normalize_angle, Size};
use glam::Vec2;

use std::f32::consts::PI;

fn body(serial: u32, x: f32, y: f32, side: f32) -> Entity {
    Entity::new(
        EntityId { generation: 0, serial },
        Vec2::new(x, y),
        Size::square(side),
        1,
    )
}

// ── check_collision ───────────────────────────────────────────────────────────

#[test]
fn overlapping_boxes_collide_both_ways() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 8.0, 3.0, 10.0);
    assert!(check_collision(&a, &b));
    assert!(check_collision(&b, &a));
}

#[test]
fn touching_edges_do_not_collide() {
    let a = body(1, 0.0, 0.0, 10.0); // right edge at 5
    let b = body(2, 10.0, 0.0, 10.0); // left edge at 5
    assert!(!check_collision(&a, &b));
    assert!(!check_collision(&b, &a));
}

#[test]
fn separated_boxes_do_not_collide() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 0.0, 50.0, 10.0);
    assert!(!check_collision(&a, &b));
}

#[test]
fn inactive_entity_never_collides() {
    let a = body(1, 0.0, 0.0, 10.0);
    let mut b = body(2, 0.0, 0.0, 10.0);
    b.active = false;
    assert!(!check_collision(&a, &b));
    assert!(!check_collision(&b, &a));
}

#[test]
fn zero_size_box_is_harmless() {
    let a = body(1, 0.0, 0.0, 0.0);
    let b = body(2, 0.0, 0.0, 0.0);
    assert!(!check_collision(&a, &b));
}

// ── Point / circle ────────────────────────────────────────────────────────────

#[test]
fn point_collision_is_inclusive() {
    let e = body(1, 0.0, 0.0, 10.0);
    assert!(check_point_collision(Vec2::new(0.0, 0.0), &e));
    assert!(check_point_collision(Vec2::new(5.0, -5.0), &e)); // corner
    assert!(!check_point_collision(Vec2::new(5.1, 0.0), &e));
}

#[test]
fn circular_collision_is_strict() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(10.0, 0.0);
    assert!(!check_circular_collision(a, 5.0, b, 5.0));
    assert!(check_circular_collision(a, 5.5, b, 5.0));
}

#[test]
fn distance_between_centers() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 3.0, 4.0, 10.0);
    assert_eq!(get_distance(&a, &b), 5.0);
}

// ── Bounds ────────────────────────────────────────────────────────────────────

#[test]
fn bounds_include_the_margin() {
    let inside = body(1, -100.0, 700.0, 10.0);
    let outside = body(2, -100.5, 300.0, 10.0);
    assert!(is_within_bounds(&inside, 800.0, 600.0, 100.0));
    assert!(!is_within_bounds(&outside, 800.0, 600.0, 100.0));
}

// ── Line of sight ─────────────────────────────────────────────────────────────

#[test]
fn clear_line_of_sight_without_obstacles() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 100.0, 0.0, 10.0);
    assert!(has_line_of_sight(&a, &b, std::iter::empty()));
}

#[test]
fn obstacle_between_blocks_sight() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 100.0, 0.0, 10.0);
    let wall = body(3, 50.0, 0.0, 10.0);
    assert!(!has_line_of_sight(&a, &b, [&wall]));
}

#[test]
fn obstacle_off_the_segment_does_not_block() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 100.0, 0.0, 10.0);
    let wall = body(3, 50.0, 50.0, 10.0);
    assert!(has_line_of_sight(&a, &b, [&wall]));
}

#[test]
fn inactive_obstacle_and_endpoints_are_ignored() {
    let a = body(1, 0.0, 0.0, 10.0);
    let b = body(2, 100.0, 0.0, 10.0);
    let mut wall = body(3, 50.0, 0.0, 10.0);
    wall.active = false;
    let all = vec![a.clone(), b.clone(), wall];
    assert!(has_line_of_sight(&a, &b, &all));
}

// ── Angle helpers ─────────────────────────────────────────────────────────────

#[test]
fn angles_wrap_into_half_open_range() {
    assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
    assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
    assert_eq!(normalize_angle(f32::NAN), 0.0);
}
