//! Screen plane mapping 2D gaze-target coordinates into world space.

use serde::{Deserialize, Serialize};

use crate::math::{Pt3, Real, Vec3};

/// A planar screen embedded in world space.
///
/// `point_to_world(x, y)` walks `x` units along `x_axis` and `y` units
/// along `y_axis` from `origin`; the axis vectors carry the physical
/// pitch, e.g. metres per screen pixel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScreenPlane {
    pub origin: Pt3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
}

impl ScreenPlane {
    pub fn new(origin: Pt3, x_axis: Vec3, y_axis: Vec3) -> Self {
        Self {
            origin,
            x_axis,
            y_axis,
        }
    }

    /// World-space position of the screen point `(x, y)`.
    pub fn point_to_world(&self, x: Real, y: Real) -> Pt3 {
        self.origin + self.x_axis * x + self.y_axis * y
    }
}
