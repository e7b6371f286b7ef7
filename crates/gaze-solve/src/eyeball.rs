//! Eyeball-center estimation as a sphere fit.
//!
//! Given socket-contour samples around one eye and a fixed eyeball
//! radius, find the center `c` minimizing `Σ |‖c − p_i‖ − r|`. The
//! least-absolute-deviation objective is handled by IRLS: each LM pass
//! scales residual rows by `1 / sqrt(|r_i| + eps)`, which turns the
//! squared cost into the L1 cost in the fixed point.
//!
//! The fit is seeded at the first sample point, so identical inputs
//! always produce identical output.

use gaze_core::{pt3_is_finite, Pt3, Real, Vec3};
use nalgebra::{DMatrix, DVector};

use crate::backend_lm::LmBackend;
use crate::error::SolveError;
use crate::traits::{NllsProblem, NllsSolverBackend, SolveOptions};

const IRLS_EPS: Real = 1e-9;

struct SphereFit<'a> {
    samples: &'a [Pt3],
    radius: Real,
}

impl NllsProblem for SphereFit<'_> {
    fn num_params(&self) -> usize {
        3
    }

    fn num_residuals(&self) -> usize {
        self.samples.len()
    }

    fn residuals_unweighted(&self, x: &DVector<Real>) -> DVector<Real> {
        let c = Vec3::new(x[0], x[1], x[2]);
        DVector::from_iterator(
            self.samples.len(),
            self.samples
                .iter()
                .map(|p| (c - p.coords).norm() - self.radius),
        )
    }

    fn jacobian_unweighted(&self, x: &DVector<Real>) -> DMatrix<Real> {
        let c = Vec3::new(x[0], x[1], x[2]);
        let mut j = DMatrix::zeros(self.samples.len(), 3);
        for (i, p) in self.samples.iter().enumerate() {
            let d = c - p.coords;
            let norm = d.norm();
            // d‖c-p‖/dc = (c-p)/‖c-p‖; the row stays zero when the
            // center coincides with a sample point
            if norm > IRLS_EPS {
                j[(i, 0)] = d.x / norm;
                j[(i, 1)] = d.y / norm;
                j[(i, 2)] = d.z / norm;
            }
        }
        j
    }

    fn robust_row_scales(&self, r_unweighted: &DVector<Real>) -> DVector<Real> {
        r_unweighted.map(|r| 1.0 / (r.abs() + IRLS_EPS).sqrt())
    }
}

/// Fit the eyeball center to socket-contour samples.
///
/// Requires at least 3 samples; returns
/// [`SolveError::Convergence`] when the iteration budget runs out
/// before the minimizer settles.
pub fn fit_eyeball_center(
    samples: &[Pt3],
    radius: Real,
    opts: &SolveOptions,
) -> Result<Pt3, SolveError> {
    if samples.len() < 3 {
        return Err(SolveError::NotEnoughPoints {
            got: samples.len(),
            need: 3,
        });
    }
    if !samples.iter().all(pt3_is_finite) || !radius.is_finite() || radius <= 0.0 {
        return Err(SolveError::NonFiniteInput);
    }

    let problem = SphereFit { samples, radius };
    let seed = DVector::from_column_slice(samples[0].coords.as_slice());
    let (x, report) = LmBackend.solve(&problem, seed, opts);

    if !report.converged {
        return Err(SolveError::Convergence {
            iterations: report.iterations,
            final_cost: report.final_cost,
        });
    }

    let center = Pt3::new(x[0], x[1], x[2]);
    if !pt3_is_finite(&center) {
        return Err(SolveError::Convergence {
            iterations: report.iterations,
            final_cost: report.final_cost,
        });
    }
    Ok(center)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic samples on the surface of a sphere.
    fn sphere_samples(center: Pt3, radius: Real, n: usize) -> Vec<Pt3> {
        (0..n)
            .map(|i| {
                let theta = 0.9 * i as Real;
                let phi = 0.45 + 0.07 * i as Real;
                let dir = Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                );
                center + dir * radius
            })
            .collect()
    }

    #[test]
    fn recovers_known_center_on_exact_samples() {
        let center = Pt3::new(0.031, -0.012, 0.44);
        let radius = 0.012;
        let samples = sphere_samples(center, radius, 24);

        let est = fit_eyeball_center(&samples, radius, &SolveOptions::default()).unwrap();
        let err = (est - center).norm();
        assert!(err < 1e-4 * radius, "center error {err}");
    }

    #[test]
    fn is_deterministic() {
        let samples = sphere_samples(Pt3::new(0.0, 0.0, 0.5), 0.012, 12);
        let a = fit_eyeball_center(&samples, 0.012, &SolveOptions::default()).unwrap();
        let b = fit_eyeball_center(&samples, 0.012, &SolveOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_few_samples_fail() {
        let samples = vec![Pt3::new(0.0, 0.0, 0.0), Pt3::new(0.01, 0.0, 0.0)];
        assert!(matches!(
            fit_eyeball_center(&samples, 0.012, &SolveOptions::default()),
            Err(SolveError::NotEnoughPoints { got: 2, need: 3 })
        ));
    }

    #[test]
    fn non_finite_input_fails() {
        let samples = vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(f64::NAN, 0.0, 0.0),
            Pt3::new(0.0, 0.01, 0.0),
        ];
        assert!(matches!(
            fit_eyeball_center(&samples, 0.012, &SolveOptions::default()),
            Err(SolveError::NonFiniteInput)
        ));
    }
}
