//! Frame-level orchestration for `gaze-normalization-rs`.
//!
//! This crate ties the geometry together:
//! - [`ActorState`]: per-face 3D state built with consuming setters,
//! - [`Frame`]: a camera/image pair with projection, eye-patch
//!   extraction and debug overlays,
//! - [`to_learning_dataset`]: camera-relative learning-record assembly,
//! - [`estimate_face_poses`]: per-frame batch pose solving with a
//!   report-and-skip failure policy.

/// Per-face 3D actor state.
pub mod actor;
/// Learning-dataset record assembly.
pub mod dataset;
/// Pipeline error taxonomy.
pub mod error;
/// Camera/image pairs and eye-patch extraction.
pub mod frame;
/// Per-frame batch orchestration.
pub mod process;

pub use actor::{ActorState, EyeState, TranslationAnchor};
pub use dataset::{to_learning_dataset, EyeRecord, EyesRecord, LearningRecord};
pub use error::{PipelineError, PreconditionError};
pub use frame::{Frame, EYE_PATCH_RESOLUTION};
pub use process::{estimate_face_poses, normalize_actor, FaceReport, NormalizedFace};
