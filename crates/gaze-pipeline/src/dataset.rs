//! Learning-dataset record assembly.
//!
//! One [`LearningRecord`] per face per frame: unit gaze directions, eye
//! patch image names, eyeball centers and the face-normal direction,
//! all expressed in the camera frame via the camera's rotation. The
//! field names are the dataset's on-disk contract and must not change.

use serde::{Deserialize, Serialize};

use gaze_core::{Camera, Real, Vec3};

use crate::actor::{ActorState, EyeState};
use crate::error::PreconditionError;

/// One eye's slice of a learning record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EyeRecord {
    /// Unit gaze direction in the camera frame.
    pub gaze_norm: [Real; 3],
    /// File name of the rectified eye patch.
    pub image: String,
    /// Eyeball center expressed in the camera frame.
    pub center: [Real; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EyesRecord {
    pub left: EyeRecord,
    pub right: EyeRecord,
}

/// One face's learning-dataset record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningRecord {
    pub eyes: EyesRecord,
    /// Unit face-normal direction in the camera frame.
    pub rotation_norm: [Real; 3],
}

fn unit_in_camera(camera: &Camera, v: &Vec3) -> Result<[Real; 3], PreconditionError> {
    let norm = v.norm();
    if norm <= Real::EPSILON {
        return Err(PreconditionError::ZeroNormVector);
    }
    Ok(camera.vectors_to_self(&(v / norm)).into())
}

fn eye_record(
    camera: &Camera,
    eye: &EyeState,
    side: &'static str,
    image: String,
) -> Result<EyeRecord, PreconditionError> {
    let gaze = eye.gaze().ok_or(PreconditionError::MissingGaze(side))?;
    let center = eye
        .center()
        .ok_or(PreconditionError::MissingEyeCenter(side))?;
    Ok(EyeRecord {
        gaze_norm: unit_in_camera(camera, gaze)?,
        image,
        center: camera.vectors_to_self(&center.coords).into(),
    })
}

/// Assemble the learning record for one actor.
///
/// `left_image` and `right_image` name the already-written patch files.
/// Fails when gaze vectors, eye centers or the chin landmark are
/// missing, or when a direction vector has zero norm.
pub fn to_learning_dataset(
    actor: &ActorState,
    camera: &Camera,
    left_image: String,
    right_image: String,
) -> Result<LearningRecord, PreconditionError> {
    let normal = actor.norm_vector_to_face()?;
    Ok(LearningRecord {
        eyes: EyesRecord {
            left: eye_record(camera, actor.left(), "left", left_image)?,
            right: eye_record(camera, actor.right(), "right", right_image)?,
        },
        rotation_norm: unit_in_camera(camera, &normal)?,
    })
}
