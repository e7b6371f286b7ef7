//! Pipeline error taxonomy.
//!
//! [`PreconditionError`] covers ordering violations of the actor
//! builder; [`PipelineError`] aggregates every failure a frame can
//! produce so batch orchestration can report and skip uniformly.

use thiserror::Error;

use gaze_core::GeometryError;
use gaze_rectify::RectificationError;
use gaze_solve::SolveError;

/// A builder step or dataset export was attempted before its inputs
/// were set.
#[derive(Debug, Error, PartialEq)]
pub enum PreconditionError {
    #[error("eye centers must be set before gaze vectors")]
    MissingEyeCenters,
    #[error("missing eye rectangle for {0} eye")]
    MissingEyeRectangle(&'static str),
    #[error("missing gaze vector for {0} eye")]
    MissingGaze(&'static str),
    #[error("missing eye center for {0} eye")]
    MissingEyeCenter(&'static str),
    #[error("missing {0} landmark")]
    MissingLandmark(&'static str),
    #[error("head rotation has not been set")]
    MissingRotation,
    #[error("cannot normalize a zero-norm vector")]
    ZeroNormVector,
}

/// Any failure produced while processing one face or one frame.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Rectification(#[from] RectificationError),
}
