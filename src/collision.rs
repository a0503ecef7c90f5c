//! Stateless overlap and visibility tests.
//!
//! Nothing here fails: degenerate input such as a zero-size box simply
//! produces a trivial `true` / `false`.

use glam::Vec2;

use crate::entities::Entity;

/// Strict AABB overlap.  Touching edges do not count, and an inactive entity
/// never collides with anything.
pub fn check_collision(a: &Entity, b: &Entity) -> bool {
    if !a.active || !b.active {
        return false;
    }
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Inclusive point-in-box test.
pub fn check_point_collision(point: Vec2, entity: &Entity) -> bool {
    point.x >= entity.left()
        && point.x <= entity.right()
        && point.y >= entity.top()
        && point.y <= entity.bottom()
}

pub fn check_circular_collision(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    pos_a.distance(pos_b) < radius_a + radius_b
}

pub fn get_distance(a: &Entity, b: &Entity) -> f32 {
    a.position.distance(b.position)
}

/// Whether the entity's center lies in `[-margin, dim + margin]` on both axes.
pub fn is_within_bounds(entity: &Entity, width: f32, height: f32, margin: f32) -> bool {
    let p = entity.position;
    p.x >= -margin && p.x <= width + margin && p.y >= -margin && p.y <= height + margin
}

/// `true` unless some active obstacle (other than `a` and `b` themselves)
/// has one of its edges crossed by the segment between their centers.
pub fn has_line_of_sight<'a>(
    a: &Entity,
    b: &Entity,
    obstacles: impl IntoIterator<Item = &'a Entity>,
) -> bool {
    let from = a.position;
    let to = b.position;
    !obstacles
        .into_iter()
        .filter(|o| o.active && o.id != a.id && o.id != b.id)
        .any(|o| segment_crosses_rect(from, to, o))
}

fn segment_crosses_rect(from: Vec2, to: Vec2, rect: &Entity) -> bool {
    let top_left = Vec2::new(rect.left(), rect.top());
    let top_right = Vec2::new(rect.right(), rect.top());
    let bottom_left = Vec2::new(rect.left(), rect.bottom());
    let bottom_right = Vec2::new(rect.right(), rect.bottom());

    segments_intersect(from, to, top_left, top_right)
        || segments_intersect(from, to, top_right, bottom_right)
        || segments_intersect(from, to, bottom_right, bottom_left)
        || segments_intersect(from, to, bottom_left, top_left)
}

/// Parametric segment intersection.  Parallel segments (zero denominator)
/// never intersect.
fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom == 0.0 {
        return false;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}
