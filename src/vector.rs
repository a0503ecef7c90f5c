//! Box extents and angle helpers.  Positions and velocities are `glam::Vec2`.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Full width / height of an axis-aligned box centered on an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }

    pub const fn square(side: f32) -> Self {
        Size { width: side, height: side }
    }

    pub fn half_width(self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(self) -> f32 {
        self.height / 2.0
    }
}

/// Wrap an angle into (−π, π].
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}
