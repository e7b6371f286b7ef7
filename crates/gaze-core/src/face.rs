//! Canonical 3D face model and per-frame 2D landmark containers.
//!
//! The detection subsystem supplies one [`FaceLandmarks2D`] per face per
//! frame, indexed by the 68-point scheme. A [`FaceModel`] pairs a small
//! set of canonical 3D points with the landmark indices that observe
//! them; the matched correspondences feed the PnP pose solver.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::{Pt2, Pt3, Real};

/// Axis-aligned face bounding rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FaceRect {
    pub x: Real,
    pub y: Real,
    pub width: Real,
    pub height: Real,
}

/// Ordered 2D landmarks for one detected face, immutable once built.
#[derive(Clone, Debug)]
pub struct FaceLandmarks2D {
    points: Vec<Pt2>,
    rect: FaceRect,
}

impl FaceLandmarks2D {
    pub fn new(points: Vec<Pt2>, rect: FaceRect) -> Self {
        Self { points, rect }
    }

    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    pub fn rect(&self) -> FaceRect {
        self.rect
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Named canonical face model variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceModelVariant {
    /// Nose tip, chin, outer eye corners and mouth corners.
    SixPointTutorial,
    /// Four eye corners and two mouth corners.
    SixPointDataset,
}

/// Canonical, person-independent 3D face points in a model-local frame
/// (millimetres, nose tip near the origin, +Z out of the face), plus the
/// mapping from 68-point landmark index to model point index.
///
/// One instance per variant; loaded once and shared read-only across
/// frames.
#[derive(Clone, Debug)]
pub struct FaceModel {
    variant: FaceModelVariant,
    points: Vec<Pt3>,
    /// `(landmark_index, model_point_index)` pairs, landmark indices
    /// 0-based into the 68-point sequence.
    landmark_map: Vec<(usize, usize)>,
}

impl FaceModel {
    /// Construct one of the named variants from embedded constants.
    pub fn variant(variant: FaceModelVariant) -> Self {
        match variant {
            FaceModelVariant::SixPointTutorial => Self {
                variant,
                points: vec![
                    Pt3::new(0.0, 0.0, 0.0),         // nose tip
                    Pt3::new(0.0, -330.0, -65.0),    // chin
                    Pt3::new(-225.0, 170.0, -135.0), // left eye outer corner
                    Pt3::new(225.0, 170.0, -135.0),  // right eye outer corner
                    Pt3::new(-150.0, -150.0, -125.0), // mouth left corner
                    Pt3::new(150.0, -150.0, -125.0), // mouth right corner
                ],
                landmark_map: vec![(30, 0), (8, 1), (36, 2), (45, 3), (48, 4), (54, 5)],
            },
            FaceModelVariant::SixPointDataset => Self {
                variant,
                points: vec![
                    Pt3::new(-60.0, 40.0, -30.0), // left eye outer corner
                    Pt3::new(-20.0, 40.0, -30.0), // left eye inner corner
                    Pt3::new(20.0, 40.0, -30.0),  // right eye inner corner
                    Pt3::new(60.0, 40.0, -30.0),  // right eye outer corner
                    Pt3::new(-25.0, -35.0, -20.0), // mouth left corner
                    Pt3::new(25.0, -35.0, -20.0), // mouth right corner
                ],
                landmark_map: vec![(36, 0), (39, 1), (42, 2), (45, 3), (48, 4), (54, 5)],
            },
        }
    }

    pub fn kind(&self) -> FaceModelVariant {
        self.variant
    }

    pub fn points(&self) -> &[Pt3] {
        &self.points
    }

    /// Highest landmark index referenced by this model's mapping.
    pub fn max_landmark_index(&self) -> usize {
        self.landmark_map.iter().map(|(l, _)| *l).max().unwrap_or(0)
    }

    /// Match the model's canonical points with their 2D observations.
    ///
    /// Returns `(model 3D, observed 2D)` pairs ordered by model point
    /// index, or an error if the landmark sequence does not cover every
    /// referenced index.
    pub fn correspondences(
        &self,
        landmarks: &FaceLandmarks2D,
    ) -> Result<(Vec<Pt3>, Vec<Pt2>), GeometryError> {
        let max_index = self.max_landmark_index();
        if landmarks.len() <= max_index {
            return Err(GeometryError::LandmarkIndexOutOfRange {
                index: max_index,
                len: landmarks.len(),
            });
        }

        let mut world = Vec::with_capacity(self.landmark_map.len());
        let mut image = Vec::with_capacity(self.landmark_map.len());
        for &(lm_idx, model_idx) in &self.landmark_map {
            world.push(self.points[model_idx]);
            image.push(landmarks.points()[lm_idx]);
        }
        Ok((world, image))
    }
}
