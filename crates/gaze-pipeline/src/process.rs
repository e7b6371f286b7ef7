//! Per-frame batch orchestration.
//!
//! A frame may carry several detected faces; failures are per face. A
//! face whose landmarks do not support a pose solve is reported and
//! skipped, never aborting the rest of the frame.

use gaze_core::{FaceLandmarks2D, FaceModel};
use gaze_rectify::{EyePatch, PatchOptions};
use gaze_solve::{solve_pnp, FacePose, SolveOptions};

use crate::actor::ActorState;
use crate::dataset::{to_learning_dataset, LearningRecord};
use crate::error::PipelineError;
use crate::frame::Frame;

/// Outcome of one face's pose solve within a frame.
#[derive(Debug)]
pub struct FaceReport {
    /// Index of the face in the frame's detection order.
    pub index: usize,
    pub outcome: Result<FacePose, PipelineError>,
}

/// Solve the head pose for every detected face in one frame.
///
/// Faces that fail the solve are logged at warn level and carried in
/// the report with their error; the batch never aborts early.
pub fn estimate_face_poses(
    frame: &Frame,
    faces: &[FaceLandmarks2D],
    model: &FaceModel,
    opts: &SolveOptions,
) -> Vec<FaceReport> {
    faces
        .iter()
        .enumerate()
        .map(|(index, landmarks)| {
            let outcome = estimate_one(frame, landmarks, model, opts);
            if let Err(err) = &outcome {
                log::warn!("skipping face {index}: {err}");
            }
            FaceReport { index, outcome }
        })
        .collect()
}

fn estimate_one(
    frame: &Frame,
    landmarks: &FaceLandmarks2D,
    model: &FaceModel,
    opts: &SolveOptions,
) -> Result<FacePose, PipelineError> {
    let (world, image) = model.correspondences(landmarks)?;
    let pose = solve_pnp(
        &world,
        &image,
        &frame.camera.intrinsics,
        &frame.camera.distortion,
        opts,
    )?;
    Ok(pose)
}

/// Everything the dataset writer needs for one normalized face.
#[derive(Debug)]
pub struct NormalizedFace {
    pub record: LearningRecord,
    pub left_patch: EyePatch,
    pub right_patch: EyePatch,
}

/// Rectify one actor's eye patches and assemble its learning record.
///
/// `left_image` and `right_image` are the file names the caller will
/// write the patches under; they are recorded verbatim.
pub fn normalize_actor(
    frame: &Frame,
    actor: &ActorState,
    left_image: String,
    right_image: String,
    resolution: (u32, u32),
    patch_opts: &PatchOptions,
) -> Result<NormalizedFace, PipelineError> {
    let (left_patch, right_patch) = frame.extract_eyes_from_actor(actor, resolution, patch_opts)?;
    let record = to_learning_dataset(actor, &frame.camera, left_image, right_image)?;
    Ok(NormalizedFace {
        record,
        left_patch,
        right_patch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::{Camera, FaceModelVariant, FaceRect, FxFyCxCy, Pt2};
    use image::RgbImage;

    fn frame() -> Frame {
        let camera = Camera::identity(FxFyCxCy::new(800.0, 800.0, 320.0, 240.0).unwrap());
        Frame::new(camera, RgbImage::new(640, 480))
    }

    fn rect() -> FaceRect {
        FaceRect {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn bad_faces_are_skipped_without_aborting_the_batch() {
        let frame = frame();
        let model = FaceModel::variant(FaceModelVariant::SixPointTutorial);

        // face 0: landmark sequence too short; face 1: all landmarks
        // collapse onto one pixel, a degenerate solve
        let faces = vec![
            FaceLandmarks2D::new(vec![Pt2::new(0.0, 0.0); 10], rect()),
            FaceLandmarks2D::new(vec![Pt2::new(100.0, 100.0); 68], rect()),
        ];

        let reports = estimate_face_poses(&frame, &faces, &model, &SolveOptions::default());
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            reports[0].outcome,
            Err(PipelineError::Geometry(_))
        ));
        assert!(reports[1].outcome.is_err());
    }

    #[test]
    fn synthetic_face_pose_is_recovered() {
        let frame = frame();
        let model = FaceModel::variant(FaceModelVariant::SixPointTutorial);

        // render the model through a known pose
        let pose = gaze_core::Iso3::translation(10.0, -20.0, 900.0);
        let mut points = vec![Pt2::new(0.0, 0.0); 68];
        let cam = Camera::new(
            frame.camera.intrinsics,
            frame.camera.distortion,
            pose,
        );
        for (world, landmark_idx) in model.points().iter().zip([30usize, 8, 36, 45, 48, 54]) {
            points[landmark_idx] = cam.project_point(world).unwrap();
        }
        let faces = vec![FaceLandmarks2D::new(points, rect())];

        let reports = estimate_face_poses(&frame, &faces, &model, &SolveOptions::default());
        let solved = reports[0].outcome.as_ref().unwrap();
        assert!((solved.translation_vector() - pose.translation.vector).norm() < 1e-3);
    }
}
