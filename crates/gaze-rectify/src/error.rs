use thiserror::Error;

/// Errors from homography estimation and patch warping.
#[derive(Debug, Error)]
pub enum RectificationError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("svd failed while estimating homography")]
    SvdFailed,
    #[error("homography is singular (collinear correspondence points)")]
    Singular,
    #[error("target patch resolution {0}x{1} is empty")]
    EmptyResolution(u32, u32),
    #[error("non-finite correspondence point")]
    NonFinitePoint,
}
