use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec2};

/// Brown-Conrady radial-tangential distortion (k1, k2, p1, p2, k3).
///
/// The coefficient ordering matches the usual 5-element distortion
/// vector. `Default` yields the distortion-free model.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct RadialTangential {
    pub k1: Real,
    pub k2: Real,
    pub p1: Real,
    pub p2: Real,
    pub k3: Real,
    /// Fixed-point iterations used by [`RadialTangential::undistort`];
    /// 0 selects the default of 8.
    #[serde(default)]
    pub iters: u32,
}

impl RadialTangential {
    fn distort_impl(&self, x: Real, y: Real) -> (Real, Real) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;
        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        (x * radial + x_tan, y * radial + y_tan)
    }

    /// Apply the distortion polynomial to normalized coordinates.
    pub fn distort(&self, n_undist: &Vec2) -> Vec2 {
        let (xd, yd) = self.distort_impl(n_undist.x, n_undist.y);
        Vec2::new(xd, yd)
    }

    /// Invert the distortion by fixed-point iteration.
    pub fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        let mut x = n_dist.x;
        let mut y = n_dist.y;

        let iters = if self.iters == 0 { 8 } else { self.iters };
        for _ in 0..iters {
            let (xd, yd) = self.distort_impl(x, y);
            x -= xd - n_dist.x;
            y -= yd - n_dist.y;
        }
        Vec2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undistort_inverts_distort() {
        let dist = RadialTangential {
            k1: -0.28,
            k2: 0.07,
            p1: 1.8e-4,
            p2: -2.0e-5,
            k3: 0.0,
            iters: 0,
        };
        let n = Vec2::new(0.3, -0.2);
        let back = dist.undistort(&dist.distort(&n));
        assert!((back - n).norm() < 1e-9, "residual {}", (back - n).norm());
    }

    #[test]
    fn zero_coefficients_are_identity() {
        let dist = RadialTangential::default();
        let n = Vec2::new(0.4, 0.1);
        assert_eq!(dist.distort(&n), n);
    }
}
