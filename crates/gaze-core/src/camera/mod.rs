//! Pinhole camera with Brown-Conrady distortion and an extrinsic pose.
//!
//! The extrinsic pose is `T_C_W` (world -> camera). Projection applies
//! the pose, the pinhole division, the distortion polynomial and the
//! intrinsics, in that order. Degenerate input (non-finite points,
//! points at or behind the camera plane) is rejected with a
//! [`GeometryError`] instead of letting NaNs reach image buffers.

mod distortion;
mod intrinsics;

pub use distortion::RadialTangential;
pub use intrinsics::FxFyCxCy;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::{pt3_is_finite, Iso3, Pt2, Pt3, Real, Vec2, Vec3};

/// Calibrated camera: intrinsics, distortion and world-to-camera pose.
#[derive(Clone, Debug)]
pub struct Camera {
    pub intrinsics: FxFyCxCy,
    pub distortion: RadialTangential,
    /// World -> camera transform (`T_C_W`).
    pub pose: Iso3,
}

impl Camera {
    pub fn new(intrinsics: FxFyCxCy, distortion: RadialTangential, pose: Iso3) -> Self {
        Self {
            intrinsics,
            distortion,
            pose,
        }
    }

    /// Camera at the world origin looking down +Z, without distortion.
    pub fn identity(intrinsics: FxFyCxCy) -> Self {
        Self::new(intrinsics, RadialTangential::default(), Iso3::identity())
    }

    /// Project one world-space point into pixel coordinates.
    pub fn project_point(&self, p_w: &Pt3) -> Result<Pt2, GeometryError> {
        self.project_point_indexed(p_w, 0)
    }

    fn project_point_indexed(&self, p_w: &Pt3, idx: usize) -> Result<Pt2, GeometryError> {
        if !pt3_is_finite(p_w) {
            return Err(GeometryError::NonFinitePoint(idx));
        }
        let p_c = self.pose.transform_point(p_w);
        if p_c.z <= Real::EPSILON {
            return Err(GeometryError::BehindCamera(idx, p_c.z));
        }
        let n = Vec2::new(p_c.x / p_c.z, p_c.y / p_c.z);
        let n_d = self.distortion.distort(&n);
        let px = self.intrinsics.to_pixel(&n_d);
        Ok(Pt2::new(px.x, px.y))
    }

    /// Project a sequence of world-space points into pixel coordinates.
    ///
    /// Fails on the first degenerate point; a partial projection is
    /// never returned.
    pub fn project(&self, points: &[Pt3]) -> Result<Vec<Pt2>, GeometryError> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| self.project_point_indexed(p, i))
            .collect()
    }

    /// Express a world-frame direction vector in the camera frame.
    ///
    /// Rotation only, no translation: used for gaze directions and face
    /// normals in the learning-dataset record.
    pub fn vectors_to_self(&self, v_w: &Vec3) -> Vec3 {
        self.pose.rotation * v_w
    }
}

/// Serializable camera description, mirroring the runtime model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    pub intrinsics: FxFyCxCy,
    #[serde(default)]
    pub distortion: RadialTangential,
    /// Axis-angle rotation of `T_C_W`.
    #[serde(default)]
    pub rotation: [Real; 3],
    /// Translation of `T_C_W`.
    #[serde(default)]
    pub translation: [Real; 3],
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        let rot = nalgebra::UnitQuaternion::from_scaled_axis(Vec3::from(self.rotation));
        let trans = nalgebra::Translation3::from(Vec3::from(self.translation));
        Camera::new(
            self.intrinsics,
            self.distortion,
            Iso3::from_parts(trans, rot),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Translation3, UnitQuaternion};

    fn plain_camera() -> Camera {
        Camera::identity(FxFyCxCy::new(800.0, 780.0, 320.0, 240.0).unwrap())
    }

    #[test]
    fn optical_axis_hits_principal_point() {
        let cam = plain_camera();
        for z in [0.1, 1.0, 25.0] {
            let px = cam.project_point(&Pt3::new(0.0, 0.0, z)).unwrap();
            assert_relative_eq!(px.x, 320.0, epsilon = 1e-9);
            assert_relative_eq!(px.y, 240.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn degenerate_points_are_rejected() {
        let cam = plain_camera();
        let nan = Pt3::new(f64::NAN, 0.0, 1.0);
        assert!(matches!(
            cam.project_point(&nan),
            Err(GeometryError::NonFinitePoint(0))
        ));
        let behind = Pt3::new(0.0, 0.0, -1.0);
        assert!(matches!(
            cam.project_point(&behind),
            Err(GeometryError::BehindCamera(0, _))
        ));
        // a batch with one bad point fails as a whole
        let pts = [Pt3::new(0.1, 0.1, 1.0), behind];
        assert!(cam.project(&pts).is_err());
    }

    #[test]
    fn vectors_to_self_is_linear_and_orthogonal() {
        let rot = UnitQuaternion::from(Rotation3::from_euler_angles(0.3, -0.4, 0.2));
        let cam = Camera::new(
            FxFyCxCy::new(500.0, 500.0, 100.0, 100.0).unwrap(),
            RadialTangential::default(),
            Iso3::from_parts(Translation3::new(0.5, -0.2, 1.0), rot),
        );

        let a = Vec3::new(0.2, -1.3, 0.7);
        let b = Vec3::new(-0.9, 0.4, 2.1);

        let lhs = cam.vectors_to_self(&(a + b));
        let rhs = cam.vectors_to_self(&a) + cam.vectors_to_self(&b);
        assert_relative_eq!(lhs, rhs, epsilon = 1e-12);

        // rotation only: the norm is preserved and translation ignored
        assert_relative_eq!(cam.vectors_to_self(&a).norm(), a.norm(), epsilon = 1e-12);
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let cfg: CameraConfig = serde_json::from_str(
            r#"{"intrinsics": {"fx": 640.0, "fy": 640.0, "cx": 320.0, "cy": 240.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.rotation, [0.0; 3]);
        assert_eq!(cfg.translation, [0.0; 3]);
        let cam = cfg.build();
        assert_eq!(cam.pose, Iso3::identity());
    }

    #[test]
    fn config_round_trip_builds_same_projection() {
        let cfg = CameraConfig {
            intrinsics: FxFyCxCy::new(640.0, 640.0, 320.0, 240.0).unwrap(),
            distortion: RadialTangential::default(),
            rotation: [0.0, 0.1, 0.0],
            translation: [0.02, 0.0, 0.1],
        };
        let cam = cfg.build();
        let p = Pt3::new(0.05, -0.03, 0.8);
        let px = cam.project_point(&p).unwrap();
        assert!(px.x.is_finite() && px.y.is_finite());
    }
}
