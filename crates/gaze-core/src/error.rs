use thiserror::Error;

/// Errors from camera construction and projection geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid intrinsics: {0}")]
    InvalidIntrinsics(String),
    #[error("non-finite 3d point at index {0}")]
    NonFinitePoint(usize),
    #[error("point {0} is at or behind the camera plane (z = {1})")]
    BehindCamera(usize, f64),
    #[error("zero-norm vector cannot be normalized")]
    ZeroNorm,
    #[error("landmark sequence of length {len} does not cover index {index}")]
    LandmarkIndexOutOfRange { index: usize, len: usize },
}
