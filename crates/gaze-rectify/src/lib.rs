//! Eye-region rectification: homography estimation, perspective
//! warping and patch post-processing.
//!
//! The geometric core projects 3D eye rectangles into the image plane
//! elsewhere; this crate turns four projected corners into a
//! fixed-resolution patch via a DLT homography and an inverse-mapped
//! bilinear warp, then optionally converts to grayscale, equalizes the
//! histogram and removes specular highlights, in that order.

/// Debug overlay drawing (points, lines, labels).
pub mod draw;
/// Grayscale conversion, histogram equalization, specularity removal.
pub mod enhance;
/// Rectification error taxonomy.
pub mod error;
/// DLT homography estimation.
pub mod homography;
/// Perspective warping with bilinear sampling.
pub mod warp;

pub use enhance::{EyePatch, PatchOptions};
pub use error::RectificationError;
pub use homography::dlt_homography;
pub use warp::{rectify_patch, warp_perspective};
