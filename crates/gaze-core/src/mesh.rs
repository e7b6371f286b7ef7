//! Landmark index tables for the dense 3D face mesh.
//!
//! These indices are tied to the dense mesh variant whose point cloud
//! the depth pipeline produces; they are meaningless for any other
//! indexing scheme. [`check_mesh_len`] must be called before any table
//! is applied to a point cloud.

use crate::error::GeometryError;
use crate::math::Real;

/// Physical eyeball radius in metres used by the sphere fit.
pub const EYEBALL_RADIUS_M: Real = 0.012;

/// Left eye rectangle corners, canonical winding:
/// outer-top, inner-top, inner-bottom, outer-bottom.
pub const LEFT_EYE_RECT_IDX: [usize; 4] = [1080, 201, 289, 151];

/// Right eye rectangle corners, same winding mirrored.
pub const RIGHT_EYE_RECT_IDX: [usize; 4] = [1084, 847, 947, 772];

/// Socket-contour samples around the left eye for the sphere fit.
/// The first entry doubles as the fit's deterministic seed point.
pub const LEFT_EYE_SOCKET_IDX: [usize; 24] = [
    210, 1111, 1109, 1108, 1103, 1104, 1105, 1112, 1106, 1107, 1113, 1114, 1115, 1116, 188, 211,
    137, 238, 244, 241, 121, 153, 187, 316,
];

/// Socket-contour samples around the right eye for the sphere fit.
pub const RIGHT_EYE_SOCKET_IDX: [usize; 25] = [
    843, 1097, 1095, 1096, 1091, 1090, 1092, 1099, 1094, 1065, 1100, 1101, 1102, 992, 846, 777,
    776, 728, 731, 873, 733, 876, 749, 752, 992,
];

/// Nose reference point.
pub const NOSE_IDX: usize = 18;

/// Chin reference point.
pub const CHIN_IDX: usize = 4;

/// Minimum point-cloud length covering every index above.
pub const MESH_MIN_LEN: usize = 1117;

/// Verify that a dense point cloud covers every referenced index.
pub fn check_mesh_len(len: usize) -> Result<(), GeometryError> {
    if len < MESH_MIN_LEN {
        return Err(GeometryError::LandmarkIndexOutOfRange {
            index: MESH_MIN_LEN - 1,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_len_covers_every_table() {
        let max = LEFT_EYE_RECT_IDX
            .iter()
            .chain(RIGHT_EYE_RECT_IDX.iter())
            .chain(LEFT_EYE_SOCKET_IDX.iter())
            .chain(RIGHT_EYE_SOCKET_IDX.iter())
            .chain([NOSE_IDX, CHIN_IDX].iter())
            .copied()
            .max()
            .unwrap();
        assert_eq!(max + 1, MESH_MIN_LEN);
    }

    #[test]
    fn short_cloud_is_rejected() {
        assert!(check_mesh_len(MESH_MIN_LEN).is_ok());
        assert!(check_mesh_len(MESH_MIN_LEN - 1).is_err());
        assert!(check_mesh_len(0).is_err());
    }
}
