//! Per-face 3D state assembled over one frame.
//!
//! [`ActorState`] is built with consuming setters; each setter returns
//! the updated state or a [`PreconditionError`] when it runs before its
//! inputs exist. Geometry is world-frame metres throughout; the screen
//! plane converts 2D gaze-target coordinates into that frame.

use nalgebra::UnitQuaternion;

use gaze_core::mesh::{
    check_mesh_len, CHIN_IDX, EYEBALL_RADIUS_M, LEFT_EYE_RECT_IDX, LEFT_EYE_SOCKET_IDX, NOSE_IDX,
    RIGHT_EYE_RECT_IDX, RIGHT_EYE_SOCKET_IDX,
};
use gaze_core::{Pt3, Real, ScreenPlane, Vec3};
use gaze_solve::{fit_eyeball_center, SolveOptions};

use crate::error::{PipelineError, PreconditionError};

/// Which mesh landmark anchors the head translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TranslationAnchor {
    #[default]
    Nose,
    Chin,
}

/// Geometry of one eye: projected rectangle corners, eyeball center
/// and gaze vector, each unset until the corresponding builder step
/// has run.
#[derive(Clone, Debug, Default)]
pub struct EyeState {
    rectangle: Option<[Pt3; 4]>,
    center: Option<Pt3>,
    gaze: Option<Vec3>,
}

impl EyeState {
    pub fn rectangle(&self) -> Option<&[Pt3; 4]> {
        self.rectangle.as_ref()
    }

    pub fn center(&self) -> Option<&Pt3> {
        self.center.as_ref()
    }

    pub fn gaze(&self) -> Option<&Vec3> {
        self.gaze.as_ref()
    }
}

/// Full 3D state of one face, filled in by builder-style setters.
#[derive(Clone, Debug)]
pub struct ActorState {
    eyeball_radius: Real,
    left: EyeState,
    right: EyeState,
    nose: Option<Pt3>,
    chin: Option<Pt3>,
    /// Axis-angle head rotation.
    rotation: Option<Vec3>,
    translation: Option<Pt3>,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorState {
    pub fn new() -> Self {
        Self {
            eyeball_radius: EYEBALL_RADIUS_M,
            left: EyeState::default(),
            right: EyeState::default(),
            nose: None,
            chin: None,
            rotation: None,
            translation: None,
        }
    }

    pub fn with_eyeball_radius(mut self, radius: Real) -> Self {
        self.eyeball_radius = radius;
        self
    }

    /// Populate rectangles, eyeball centers, nose and chin from a dense
    /// 3D face mesh.
    ///
    /// The cloud must cover every index the mesh tables reference; eye
    /// centers come from the socket-contour sphere fit.
    pub fn with_landmarks3d(
        self,
        cloud: &[Pt3],
        opts: &SolveOptions,
    ) -> Result<Self, PipelineError> {
        check_mesh_len(cloud.len())?;

        let left_rect = LEFT_EYE_RECT_IDX.map(|i| cloud[i]);
        let right_rect = RIGHT_EYE_RECT_IDX.map(|i| cloud[i]);

        let left_socket: Vec<Pt3> = LEFT_EYE_SOCKET_IDX.iter().map(|&i| cloud[i]).collect();
        let right_socket: Vec<Pt3> = RIGHT_EYE_SOCKET_IDX.iter().map(|&i| cloud[i]).collect();
        let left_center = fit_eyeball_center(&left_socket, self.eyeball_radius, opts)?;
        let right_center = fit_eyeball_center(&right_socket, self.eyeball_radius, opts)?;

        Ok(self
            .with_eye_rectangles(left_rect, right_rect)
            .with_eye_centers(left_center, right_center)
            .with_nose_chin(cloud[NOSE_IDX], cloud[CHIN_IDX]))
    }

    pub fn with_eye_rectangles(mut self, left: [Pt3; 4], right: [Pt3; 4]) -> Self {
        self.left.rectangle = Some(left);
        self.right.rectangle = Some(right);
        self
    }

    pub fn with_eye_centers(mut self, left: Pt3, right: Pt3) -> Self {
        self.left.center = Some(left);
        self.right.center = Some(right);
        self
    }

    pub fn with_nose_chin(mut self, nose: Pt3, chin: Pt3) -> Self {
        self.nose = Some(nose);
        self.chin = Some(chin);
        self
    }

    /// Set both gaze vectors from a gaze target at screen coordinates
    /// `(x, y)`.
    ///
    /// Each gaze vector runs from the eyeball center to the target's
    /// world position, so the centers must already be set.
    pub fn with_gazes(
        mut self,
        x: Real,
        y: Real,
        screen: &ScreenPlane,
    ) -> Result<Self, PreconditionError> {
        let (left_c, right_c) = match (self.left.center, self.right.center) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(PreconditionError::MissingEyeCenters),
        };
        let target = screen.point_to_world(x, y);
        self.left.gaze = Some(target - left_c);
        self.right.gaze = Some(target - right_c);
        Ok(self)
    }

    /// Set the head rotation; stored as an axis-angle vector.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<Real>) -> Self {
        self.rotation = Some(rotation.scaled_axis());
        self
    }

    /// Anchor the head translation at the nose or chin landmark.
    pub fn with_translation(mut self, anchor: TranslationAnchor) -> Result<Self, PreconditionError> {
        let point = match anchor {
            TranslationAnchor::Nose => self
                .nose
                .ok_or(PreconditionError::MissingLandmark("nose"))?,
            TranslationAnchor::Chin => self
                .chin
                .ok_or(PreconditionError::MissingLandmark("chin"))?,
        };
        self.translation = Some(point);
        Ok(self)
    }

    /// Outward face normal: cross product of the chin-to-eye-center
    /// vectors.
    ///
    /// The magnitude scales with face size; callers normalize before
    /// use.
    pub fn norm_vector_to_face(&self) -> Result<Vec3, PreconditionError> {
        let chin = self.chin.ok_or(PreconditionError::MissingLandmark("chin"))?;
        let left = self
            .left
            .center
            .ok_or(PreconditionError::MissingEyeCenter("left"))?;
        let right = self
            .right
            .center
            .ok_or(PreconditionError::MissingEyeCenter("right"))?;
        Ok((chin - left).cross(&(chin - right)))
    }

    /// Assemble this actor's learning record; see
    /// [`crate::dataset::to_learning_dataset`].
    pub fn to_learning_dataset(
        &self,
        camera: &gaze_core::Camera,
        left_image: String,
        right_image: String,
    ) -> Result<crate::dataset::LearningRecord, PreconditionError> {
        crate::dataset::to_learning_dataset(self, camera, left_image, right_image)
    }

    pub fn left(&self) -> &EyeState {
        &self.left
    }

    pub fn right(&self) -> &EyeState {
        &self.right
    }

    pub fn nose(&self) -> Option<&Pt3> {
        self.nose.as_ref()
    }

    pub fn chin(&self) -> Option<&Pt3> {
        self.chin.as_ref()
    }

    /// Axis-angle head rotation, if set.
    pub fn rotation(&self) -> Option<&Vec3> {
        self.rotation.as_ref()
    }

    pub fn translation(&self) -> Option<&Pt3> {
        self.translation.as_ref()
    }
}
