//! High-level entry crate for the `gaze-normalization-rs` toolbox.
//!
//! The workspace turns per-frame face observations into
//! camera-relative gaze training data:
//!
//! 1. solve the head pose from 2D landmarks ([`solve::solve_pnp`]),
//! 2. build the per-face 3D state from a dense mesh
//!    ([`pipeline::ActorState`]): eye rectangles, eyeball centers,
//!    nose and chin,
//! 3. assign gaze vectors from an on-screen target
//!    ([`core::ScreenPlane`]),
//! 4. rectify both eye patches and assemble the learning record
//!    ([`pipeline::normalize_actor`]).
//!
//! ```no_run
//! use gaze::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let camera = Camera::identity(FxFyCxCy::from_frame_size(640.0, (640, 480))?);
//! let screen = ScreenPlane::new(
//!     Pt3::new(-0.25, 0.15, 0.0),
//!     Vec3::new(2.8e-4, 0.0, 0.0),
//!     Vec3::new(0.0, -2.8e-4, 0.0),
//! );
//!
//! let cloud: Vec<Pt3> = /* dense 3D face mesh for this frame */
//! # vec![];
//! let image = image::RgbImage::new(640, 480);
//!
//! let actor = ActorState::new()
//!     .with_landmarks3d(&cloud, &SolveOptions::default())?
//!     .with_gazes(320.0, 200.0, &screen)?;
//!
//! let frame = Frame::new(camera, image);
//! let face = normalize_actor(
//!     &frame,
//!     &actor,
//!     "left_0001.png".into(),
//!     "right_0001.png".into(),
//!     EYE_PATCH_RESOLUTION,
//!     &PatchOptions::default(),
//! )?;
//! println!("{}", serde_json::to_string(&face.record)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - **[`core`]**: math types, camera model, face model, mesh tables
//! - **[`solve`]**: PnP head pose and the eyeball sphere fit
//! - **[`rectify`]**: homography, perspective warp, patch enhancement
//! - **[`pipeline`]**: actor state, frames, dataset records
//! - **[`prelude`]**: convenient re-exports for common use cases
//!
//! ## Stability
//!
//! The `gaze` crate is the public compatibility boundary. Lower-level
//! crates are intended for advanced usage and may evolve more quickly.

/// Math types, camera model, face model and mesh index tables.
pub mod core {
    pub use gaze_core::*;
}

/// Non-linear solvers: PnP head pose and the eyeball sphere fit.
pub mod solve {
    pub use gaze_solve::*;
}

/// Eye-region rectification: homography, warping, enhancement,
/// overlays.
pub mod rectify {
    pub use gaze_rectify::*;
}

/// Frame orchestration: actor state, dataset records, batch
/// processing.
pub mod pipeline {
    pub use gaze_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use gaze::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        Camera, CameraConfig, FaceLandmarks2D, FaceModel, FaceModelVariant, FaceRect, FxFyCxCy,
        Iso3, Pt2, Pt3, RadialTangential, Real, ScreenPlane, Vec2, Vec3,
    };

    pub use crate::solve::{fit_eyeball_center, solve_pnp, FacePose, SolveOptions};

    pub use crate::rectify::{EyePatch, PatchOptions};

    pub use crate::pipeline::{
        estimate_face_poses, normalize_actor, to_learning_dataset, ActorState, Frame,
        LearningRecord, TranslationAnchor, EYE_PATCH_RESOLUTION,
    };
}
