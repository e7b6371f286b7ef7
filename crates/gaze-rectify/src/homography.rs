//! Planar homography estimation via the Direct Linear Transform.

use gaze_core::{Mat3, Pt2};
use nalgebra::DMatrix;

use crate::error::RectificationError;

/// Relative determinant threshold below which a homography is treated
/// as singular. Collinear corner points drive the determinant to zero.
const SINGULARITY_EPS: f64 = 1e-10;

/// Estimate `H` such that `dst ~ H · src` from 4+ correspondences.
///
/// Collinear correspondence sets produce a rank-deficient `H`; those
/// are rejected with [`RectificationError::Singular`] instead of
/// letting a degenerate warp silently produce an empty patch.
pub fn dlt_homography(src: &[Pt2], dst: &[Pt2]) -> Result<Mat3, RectificationError> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return Err(RectificationError::NotEnoughPoints(n.min(dst.len())));
    }
    if !src
        .iter()
        .chain(dst.iter())
        .all(|p| p.x.is_finite() && p.y.is_finite())
    {
        return Err(RectificationError::NonFinitePoint);
    }

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);

    for (i, (ps, pd)) in src.iter().zip(dst.iter()).enumerate() {
        let x = ps.x;
        let y = ps.y;
        let u = pd.x;
        let v = pd.y;

        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    // Solve A h = 0 via SVD (smallest singular value).
    let svd = a.svd(false, true);
    let v_t = svd.v_t.ok_or(RectificationError::SvdFailed)?;

    // a null space of dimension > 1 means the correspondences do not
    // pin down a unique homography (collinear configuration)
    let sv = &svd.singular_values;
    let s_max = sv[0];
    if sv.len() >= 2 && sv[sv.len() - 2] < 1e-8 * s_max.max(1.0) {
        return Err(RectificationError::Singular);
    }

    let h = v_t.row(v_t.nrows() - 1);

    let mut h_mat = Mat3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_mat[(r, c)] = h[3 * r + c];
        }
    }

    // normalise such that H[2,2] = 1
    let scale = h_mat[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h_mat /= scale;
    }

    let norm = h_mat.norm();
    if norm <= f64::EPSILON || h_mat.determinant().abs() < SINGULARITY_EPS * norm.powi(3) {
        return Err(RectificationError::Singular);
    }

    Ok(h_mat)
}
