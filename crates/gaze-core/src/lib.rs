//! Core math and geometry primitives for `gaze-normalization-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...),
//! - the pinhole camera model (intrinsics + distortion + extrinsic pose),
//! - the canonical 3D face model and its landmark index mapping,
//! - dense-mesh landmark index tables,
//! - the screen plane used to map gaze targets into world space.
//!
//! Camera pipeline:
//! `pixel = K ∘ distortion ∘ pinhole(T_C_W · p_w)`
//!
//! All extrinsic poses in this workspace are `T_C_W`: the transform from
//! world coordinates into the camera frame.

/// Camera models: intrinsics, distortion and projection.
pub mod camera;
/// Geometry error taxonomy.
pub mod error;
/// Canonical face model and 2D landmark containers.
pub mod face;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Dense face-mesh landmark index tables.
pub mod mesh;
/// Screen plane for gaze-target conversion.
pub mod screen;

pub use camera::*;
pub use error::GeometryError;
pub use face::*;
pub use math::*;
pub use screen::ScreenPlane;
