use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::{Mat3, Real, Vec2};

/// Standard pinhole intrinsics without skew.
///
/// Immutable after construction; both constructors validate the focal
/// lengths and fail fast on degenerate values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FxFyCxCy {
    /// Focal length in pixels along X.
    pub fx: Real,
    /// Focal length in pixels along Y.
    pub fy: Real,
    /// Principal point X coordinate in pixels.
    pub cx: Real,
    /// Principal point Y coordinate in pixels.
    pub cy: Real,
}

impl FxFyCxCy {
    /// Build intrinsics from explicit parameters.
    pub fn new(fx: Real, fy: Real, cx: Real, cy: Real) -> Result<Self, GeometryError> {
        if !(fx.is_finite() && fy.is_finite() && cx.is_finite() && cy.is_finite()) {
            return Err(GeometryError::InvalidIntrinsics(
                "non-finite parameter".into(),
            ));
        }
        if fx <= 0.0 || fy <= 0.0 {
            return Err(GeometryError::InvalidIntrinsics(format!(
                "focal lengths must be positive, got fx={fx}, fy={fy}"
            )));
        }
        Ok(Self { fx, fy, cx, cy })
    }

    /// Intrinsics with a single focal length and the principal point at
    /// the frame center, the usual setup when only the frame size is known.
    pub fn from_frame_size(focal: Real, frame: (u32, u32)) -> Result<Self, GeometryError> {
        let (width, height) = frame;
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidIntrinsics(format!(
                "empty frame {width}x{height}"
            )));
        }
        Self::new(focal, focal, width as Real / 2.0, height as Real / 2.0)
    }

    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Mat3 {
        Mat3::new(
            self.fx, 0.0, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0,
        )
    }

    /// Convert normalized sensor-plane coordinates into pixel coordinates.
    pub fn to_pixel(&self, n: &Vec2) -> Vec2 {
        Vec2::new(self.fx * n.x + self.cx, self.fy * n.y + self.cy)
    }

    /// Convert pixel coordinates into normalized sensor-plane coordinates.
    pub fn from_pixel(&self, px: &Vec2) -> Vec2 {
        Vec2::new((px.x - self.cx) / self.fx, (px.y - self.cy) / self.fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_focal_length_is_rejected() {
        assert!(FxFyCxCy::new(0.0, 800.0, 320.0, 240.0).is_err());
        assert!(FxFyCxCy::new(800.0, -1.0, 320.0, 240.0).is_err());
        assert!(FxFyCxCy::new(f64::NAN, 800.0, 320.0, 240.0).is_err());
    }

    #[test]
    fn principal_point_from_frame_size() {
        let k = FxFyCxCy::from_frame_size(640.0, (640, 480)).unwrap();
        assert_eq!(k.cx, 320.0);
        assert_eq!(k.cy, 240.0);
        assert_eq!(k.fx, k.fy);
    }

    #[test]
    fn pixel_round_trip() {
        let k = FxFyCxCy::new(800.0, 780.0, 320.0, 240.0).unwrap();
        let n = Vec2::new(0.12, -0.07);
        let back = k.from_pixel(&k.to_pixel(&n));
        assert_relative_eq!(back, n, epsilon = 1e-12);
    }
}
