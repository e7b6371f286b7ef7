//! Iterative Perspective-n-Point head-pose estimation.
//!
//! A pose `T_C_W` (world -> camera) is recovered from N >= 4 matched
//! 3D model points and 2D pixel observations. A normalized DLT solve
//! seeds the estimate when the correspondence set allows it (6+
//! non-coplanar points); otherwise a centroid-depth guess is used.
//! Either way the pose is refined by Levenberg-Marquardt on pixel
//! reprojection residuals over a 6-DoF axis-angle + translation
//! parameterization, and an unconverged refinement is an error, never
//! a returned pose.

use gaze_core::{FxFyCxCy, Iso3, Pt2, Pt3, RadialTangential, Real, Vec2, Vec3};
use nalgebra::{
    DMatrix, DVector, Rotation3, Translation3, UnitQuaternion,
};

use crate::backend_lm::LmBackend;
use crate::error::SolveError;
use crate::traits::{NllsProblem, NllsSolverBackend, SolveOptions};

/// Minimum number of correspondences for a pose solve.
pub const MIN_PNP_POINTS: usize = 4;

/// Head pose solved for one face in one frame: `T_C_W`.
///
/// Created by [`solve_pnp`] and consumed by the projection steps of the
/// same frame; not meant to be persisted across frames.
#[derive(Debug, Clone, Copy)]
pub struct FacePose {
    pub pose: Iso3,
}

impl FacePose {
    /// Axis-angle rotation vector of the pose.
    pub fn rotation_vector(&self) -> Vec3 {
        self.pose.rotation.scaled_axis()
    }

    /// Translation vector of the pose.
    pub fn translation_vector(&self) -> Vec3 {
        self.pose.translation.vector
    }
}

struct PnpRefine<'a> {
    world: &'a [Pt3],
    image: &'a [Pt2],
    k: &'a FxFyCxCy,
    dist: &'a RadialTangential,
}

fn pose_from_params(x: &DVector<Real>) -> Iso3 {
    let rot = UnitQuaternion::from_scaled_axis(Vec3::new(x[0], x[1], x[2]));
    let trans = Translation3::new(x[3], x[4], x[5]);
    Iso3::from_parts(trans, rot)
}

impl PnpRefine<'_> {
    fn reproject(&self, pose: &Iso3, p_w: &Pt3) -> Vec2 {
        let p_c = pose.transform_point(p_w);
        // clamp instead of failing: points drifting behind the camera
        // mid-iteration produce large residuals that steer LM back
        let z = p_c.z.max(1e-9);
        let n = Vec2::new(p_c.x / z, p_c.y / z);
        self.k.to_pixel(&self.dist.distort(&n))
    }
}

impl NllsProblem for PnpRefine<'_> {
    fn num_params(&self) -> usize {
        6
    }

    fn num_residuals(&self) -> usize {
        2 * self.world.len()
    }

    fn residuals_unweighted(&self, x: &DVector<Real>) -> DVector<Real> {
        let pose = pose_from_params(x);
        let mut r = DVector::zeros(2 * self.world.len());
        for (i, (pw, uv)) in self.world.iter().zip(self.image.iter()).enumerate() {
            let proj = self.reproject(&pose, pw);
            r[2 * i] = proj.x - uv.x;
            r[2 * i + 1] = proj.y - uv.y;
        }
        r
    }

    fn jacobian_unweighted(&self, x: &DVector<Real>) -> DMatrix<Real> {
        // central differences over the 6 pose parameters
        let mut j = DMatrix::zeros(2 * self.world.len(), 6);
        let mut xp = x.clone();
        for col in 0..6 {
            let step = 1e-6 * (1.0 + x[col].abs());
            xp[col] = x[col] + step;
            let r_plus = self.residuals_unweighted(&xp);
            xp[col] = x[col] - step;
            let r_minus = self.residuals_unweighted(&xp);
            xp[col] = x[col];
            for row in 0..j.nrows() {
                j[(row, col)] = (r_plus[row] - r_minus[row]) / (2.0 * step);
            }
        }
        j
    }
}

/// Centered singular values of the world point cloud, descending.
fn world_spread(world: &[Pt3]) -> (Pt3, [Real; 3]) {
    let n = world.len() as Real;
    let centroid = Pt3::from(
        world
            .iter()
            .fold(Vec3::zeros(), |acc, p| acc + p.coords)
            / n,
    );
    let mut m = DMatrix::zeros(world.len(), 3);
    for (i, p) in world.iter().enumerate() {
        let d = p - centroid;
        m[(i, 0)] = d.x;
        m[(i, 1)] = d.y;
        m[(i, 2)] = d.z;
    }
    let svd = m.svd(false, false);
    let mut s = [0.0; 3];
    for (i, v) in svd.singular_values.iter().enumerate().take(3) {
        s[i] = *v;
    }
    (centroid, s)
}

/// Depth-only initial guess: identity rotation, translation placing the
/// world centroid in front of the camera at a depth matching the
/// observed pixel spread.
fn centroid_seed(world: &[Pt3], image: &[Pt2], k: &FxFyCxCy) -> Iso3 {
    let n = world.len() as Real;
    let (centroid, s) = world_spread(world);

    let img_centroid = image
        .iter()
        .fold(Vec2::zeros(), |acc, p| acc + p.coords)
        / n;
    let pixel_spread = image
        .iter()
        .map(|p| (p.coords - img_centroid).norm())
        .sum::<Real>()
        / n;
    let world_radius = (s[0] + s[1]) / 2.0;

    let depth = if pixel_spread > 1e-9 {
        (k.fx * world_radius / pixel_spread).max(1e-3)
    } else {
        1.0
    };

    Iso3::from_parts(
        Translation3::new(-centroid.x, -centroid.y, depth - centroid.z),
        UnitQuaternion::identity(),
    )
}

/// Normalized DLT pose seed for 6+ non-coplanar correspondences.
fn dlt_seed(world: &[Pt3], image: &[Pt2], k: &FxFyCxCy) -> Option<Iso3> {
    let n = world.len();
    let (centroid, s) = world_spread(world);
    // the 3x4 DLT is rank-deficient for (near-)coplanar points
    if s[2] < 1e-6 * s[0].max(1.0) {
        return None;
    }

    let mut mean_dist = 0.0;
    for p in world {
        mean_dist += (p - centroid).norm();
    }
    mean_dist /= n as Real;
    if mean_dist <= Real::EPSILON {
        return None;
    }
    let scale = (3.0_f64).sqrt() / mean_dist;

    let mut a = DMatrix::<Real>::zeros(2 * n, 12);
    for (i, (pw, pi)) in world.iter().zip(image.iter()).enumerate() {
        let x = (pw.x - centroid.x) * scale;
        let y = (pw.y - centroid.y) * scale;
        let z = (pw.z - centroid.z) * scale;

        // normalized image point: K^{-1} [u, v, 1]^T
        let nrm = k.from_pixel(&Vec2::new(pi.x, pi.y));
        let (u, v) = (nrm.x, nrm.y);

        let r0 = 2 * i;
        let r1 = 2 * i + 1;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = z;
        a[(r0, 3)] = 1.0;
        a[(r0, 8)] = -u * x;
        a[(r0, 9)] = -u * y;
        a[(r0, 10)] = -u * z;
        a[(r0, 11)] = -u;

        a[(r1, 4)] = x;
        a[(r1, 5)] = y;
        a[(r1, 6)] = z;
        a[(r1, 7)] = 1.0;
        a[(r1, 8)] = -v * x;
        a[(r1, 9)] = -v * y;
        a[(r1, 10)] = -v * z;
        a[(r1, 11)] = -v;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let h = v_t.row(v_t.nrows() - 1);

    // reshape into P = [M | t] and undo the world normalization
    let mut p_mtx = nalgebra::Matrix3x4::<Real>::zeros();
    for r in 0..3 {
        for c in 0..4 {
            p_mtx[(r, c)] = h[4 * r + c];
        }
    }
    let t_world = nalgebra::Matrix4::new(
        scale, 0.0, 0.0, -scale * centroid.x,
        0.0, scale, 0.0, -scale * centroid.y,
        0.0, 0.0, scale, -scale * centroid.z,
        0.0, 0.0, 0.0, 1.0,
    );
    let p_mtx = p_mtx * t_world;

    let m = p_mtx.fixed_view::<3, 3>(0, 0).into_owned();
    let mut sgn_scale = (m.row(0).norm() + m.row(1).norm() + m.row(2).norm()) / 3.0;
    if m.determinant() < 0.0 {
        sgn_scale = -sgn_scale;
    }
    if sgn_scale.abs() <= Real::EPSILON {
        return None;
    }
    let m = m / sgn_scale;

    // project M onto SO(3)
    let svd = m.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let t = p_mtx.column(3) / sgn_scale;
    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
    Some(Iso3::from_parts(Translation3::new(t.x, t.y, t.z), rot))
}

/// Solve the head pose from matched 3D/2D correspondences.
///
/// Requires `N >= 4` correspondences with a non-collinear 3D
/// configuration. Refinement is bounded by `opts.max_iters`; a run that
/// exhausts the budget without converging returns
/// [`SolveError::Convergence`].
pub fn solve_pnp(
    world: &[Pt3],
    image: &[Pt2],
    k: &FxFyCxCy,
    dist: &RadialTangential,
    opts: &SolveOptions,
) -> Result<FacePose, SolveError> {
    let n = world.len();
    if n != image.len() {
        return Err(SolveError::MismatchedLengths(n, image.len()));
    }
    if n < MIN_PNP_POINTS {
        return Err(SolveError::NotEnoughPoints {
            got: n,
            need: MIN_PNP_POINTS,
        });
    }
    if !world.iter().all(gaze_core::pt3_is_finite)
        || !image.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    {
        return Err(SolveError::NonFiniteInput);
    }

    let (_, s) = world_spread(world);
    if s[1] < 1e-9 * s[0].max(1.0) {
        return Err(SolveError::DegenerateConfiguration(
            "3d points are collinear".into(),
        ));
    }

    let seed_pose = if n >= 6 {
        dlt_seed(world, image, k).unwrap_or_else(|| centroid_seed(world, image, k))
    } else {
        centroid_seed(world, image, k)
    };

    let problem = PnpRefine {
        world,
        image,
        k,
        dist,
    };
    let mut x0 = DVector::zeros(6);
    x0.fixed_rows_mut::<3>(0)
        .copy_from(&seed_pose.rotation.scaled_axis());
    x0.fixed_rows_mut::<3>(3)
        .copy_from(&seed_pose.translation.vector);

    let (x, report) = LmBackend.solve(&problem, x0, opts);
    if !report.converged || !x.iter().all(|v| v.is_finite()) {
        return Err(SolveError::Convergence {
            iterations: report.iterations,
            final_cost: report.final_cost,
        });
    }

    Ok(FacePose {
        pose: pose_from_params(&x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::Camera;
    use nalgebra::Rotation3;

    fn intrinsics() -> FxFyCxCy {
        FxFyCxCy::new(800.0, 780.0, 640.0, 360.0).unwrap()
    }

    fn pose_error(a: &Iso3, b: &Iso3) -> (Real, Real) {
        let dt = (a.translation.vector - b.translation.vector).norm();
        let ang = a.rotation.angle_to(&b.rotation);
        (dt, ang)
    }

    fn project_all(cam: &Camera, world: &[Pt3]) -> Vec<Pt2> {
        cam.project(world).unwrap()
    }

    #[test]
    fn recovers_pose_from_volume_points() {
        let k = intrinsics();
        let rot = Rotation3::from_euler_angles(0.12, -0.07, 0.21);
        let gt = Iso3::from_parts(Translation3::new(0.1, -0.05, 1.1), rot.into());
        let cam = Camera::new(k, RadialTangential::default(), gt);

        let mut world = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    world.push(Pt3::new(
                        x as Real * 0.1,
                        y as Real * 0.1,
                        0.4 + z as Real * 0.1,
                    ));
                }
            }
        }
        let image = project_all(&cam, &world);

        let est = solve_pnp(
            &world,
            &image,
            &k,
            &RadialTangential::default(),
            &SolveOptions::default(),
        )
        .unwrap();

        let (dt, ang) = pose_error(&est.pose, &gt);
        assert!(dt < 1e-5, "translation error {dt}");
        assert!(ang < 1e-5, "rotation error {ang}");
    }

    #[test]
    fn recovers_pose_from_six_point_face_model() {
        let k = intrinsics();
        let rot = Rotation3::from_euler_angles(0.08, 0.15, -0.05);
        let gt = Iso3::from_parts(Translation3::new(20.0, -10.0, 900.0), rot.into());
        let cam = Camera::new(k, RadialTangential::default(), gt);

        // the tutorial face model geometry (millimetres, non-planar)
        let world = vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(0.0, -330.0, -65.0),
            Pt3::new(-225.0, 170.0, -135.0),
            Pt3::new(225.0, 170.0, -135.0),
            Pt3::new(-150.0, -150.0, -125.0),
            Pt3::new(150.0, -150.0, -125.0),
        ];
        let image = project_all(&cam, &world);

        let est = solve_pnp(
            &world,
            &image,
            &k,
            &RadialTangential::default(),
            &SolveOptions::default(),
        )
        .unwrap();

        let (dt, ang) = pose_error(&est.pose, &gt);
        assert!(dt < 1e-3, "translation error {dt}");
        assert!(ang < 1e-5, "rotation error {ang}");
    }

    #[test]
    fn four_points_take_the_centroid_seed_path() {
        let k = intrinsics();
        // near-frontal pose, where the depth-only seed is close enough
        let gt = Iso3::from_parts(
            Translation3::new(0.01, 0.02, 1.0),
            Rotation3::from_euler_angles(0.03, -0.02, 0.01).into(),
        );
        let cam = Camera::new(k, RadialTangential::default(), gt);

        let world = vec![
            Pt3::new(-0.1, -0.1, 0.0),
            Pt3::new(0.1, -0.1, 0.02),
            Pt3::new(0.1, 0.1, 0.0),
            Pt3::new(-0.1, 0.1, 0.03),
        ];
        let image = project_all(&cam, &world);

        let est = solve_pnp(
            &world,
            &image,
            &k,
            &RadialTangential::default(),
            &SolveOptions::default(),
        )
        .unwrap();

        let (dt, ang) = pose_error(&est.pose, &gt);
        assert!(dt < 1e-4, "translation error {dt}");
        assert!(ang < 1e-4, "rotation error {ang}");
    }

    #[test]
    fn tolerates_subpixel_landmark_noise() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let k = intrinsics();
        let rot = Rotation3::from_euler_angles(0.1, -0.05, 0.15);
        let gt = Iso3::from_parts(Translation3::new(0.05, -0.02, 1.2), rot.into());
        let cam = Camera::new(k, RadialTangential::default(), gt);

        let mut world = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    world.push(Pt3::new(
                        x as Real * 0.1,
                        y as Real * 0.1,
                        0.4 + z as Real * 0.1,
                    ));
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(7);
        let image: Vec<Pt2> = project_all(&cam, &world)
            .into_iter()
            .map(|p| {
                Pt2::new(
                    p.x + rng.gen_range(-0.5..0.5),
                    p.y + rng.gen_range(-0.5..0.5),
                )
            })
            .collect();

        let est = solve_pnp(
            &world,
            &image,
            &k,
            &RadialTangential::default(),
            &SolveOptions::default(),
        )
        .unwrap();

        let (dt, ang) = pose_error(&est.pose, &gt);
        assert!(dt < 0.02, "translation error {dt}");
        assert!(ang < 0.01, "rotation error {ang}");
    }

    #[test]
    fn too_few_points_are_rejected() {
        let k = intrinsics();
        let world = vec![Pt3::new(0.0, 0.0, 1.0); 3];
        let image = vec![Pt2::new(0.0, 0.0); 3];
        assert!(matches!(
            solve_pnp(
                &world,
                &image,
                &k,
                &RadialTangential::default(),
                &SolveOptions::default()
            ),
            Err(SolveError::NotEnoughPoints { got: 3, need: 4 })
        ));
    }

    #[test]
    fn collinear_points_are_rejected() {
        let k = intrinsics();
        let world: Vec<Pt3> = (0..6).map(|i| Pt3::new(i as Real * 0.1, 0.0, 0.0)).collect();
        let image: Vec<Pt2> = (0..6).map(|i| Pt2::new(i as Real * 10.0, 0.0)).collect();
        assert!(matches!(
            solve_pnp(
                &world,
                &image,
                &k,
                &RadialTangential::default(),
                &SolveOptions::default()
            ),
            Err(SolveError::DegenerateConfiguration(_))
        ));
    }
}
