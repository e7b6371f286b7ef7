//! One captured frame: camera plus image, with projection, eye-patch
//! extraction and debug overlays.

use image::{Rgb, RgbImage};

use gaze_core::{Camera, GeometryError, Pt2, Pt3, Real};
use gaze_rectify::{draw, rectify_patch, EyePatch, PatchOptions};

use crate::actor::ActorState;
use crate::error::{PipelineError, PreconditionError};

/// Default resolution of a rectified eye patch, width x height.
pub const EYE_PATCH_RESOLUTION: (u32, u32) = (60, 36);

/// Canonical patch corners for the left eye, matching the winding of
/// the left rectangle index table. The mirrored x order keeps the
/// patch upright with the nasal corner on the same side as in the
/// right patch.
fn left_canonical_corners(resolution: (u32, u32)) -> [Pt2; 4] {
    let (w, h) = (resolution.0 as Real, resolution.1 as Real);
    [
        Pt2::new(w, 0.0),
        Pt2::new(0.0, 0.0),
        Pt2::new(0.0, h),
        Pt2::new(w, h),
    ]
}

/// Canonical patch corners for the right eye.
fn right_canonical_corners(resolution: (u32, u32)) -> [Pt2; 4] {
    let (w, h) = (resolution.0 as Real, resolution.1 as Real);
    [
        Pt2::new(0.0, 0.0),
        Pt2::new(w, 0.0),
        Pt2::new(w, h),
        Pt2::new(0.0, h),
    ]
}

/// A captured frame and the camera that produced it.
#[derive(Clone, Debug)]
pub struct Frame {
    pub camera: Camera,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(camera: Camera, image: RgbImage) -> Self {
        Self { camera, image }
    }

    /// Project world-space points into this frame's pixel coordinates.
    pub fn projected_coordinates(&self, points: &[Pt3]) -> Result<Vec<Pt2>, GeometryError> {
        self.camera.project(points)
    }

    fn extract_eye(
        &self,
        rect: &[Pt3; 4],
        canon: &[Pt2; 4],
        resolution: (u32, u32),
        opts: &PatchOptions,
    ) -> Result<EyePatch, PipelineError> {
        let projected = self.camera.project(rect.as_slice())?;
        let corners: [Pt2; 4] = [projected[0], projected[1], projected[2], projected[3]];
        Ok(rectify_patch(&self.image, &corners, canon, resolution, opts)?)
    }

    /// Extract both rectified eye patches for one actor.
    ///
    /// The actor's 3D eye rectangles are projected into this frame and
    /// each quadrilateral is warped onto the canonical patch rectangle.
    pub fn extract_eyes_from_actor(
        &self,
        actor: &ActorState,
        resolution: (u32, u32),
        opts: &PatchOptions,
    ) -> Result<(EyePatch, EyePatch), PipelineError> {
        let left_rect = actor
            .left()
            .rectangle()
            .ok_or(PreconditionError::MissingEyeRectangle("left"))?;
        let right_rect = actor
            .right()
            .rectangle()
            .ok_or(PreconditionError::MissingEyeRectangle("right"))?;

        let left = self.extract_eye(
            left_rect,
            &left_canonical_corners(resolution),
            resolution,
            opts,
        )?;
        let right = self.extract_eye(
            right_rect,
            &right_canonical_corners(resolution),
            resolution,
            opts,
        )?;
        Ok((left, right))
    }

    /// Project world points and draw them as overlay dots, colored per
    /// point (empty list selects the default overlay color).
    pub fn project_points(
        &mut self,
        points: &[Pt3],
        colors: &[Rgb<u8>],
        radius: i64,
    ) -> Result<(), GeometryError> {
        let px = self.camera.project(points)?;
        draw::draw_points(&mut self.image, &px, colors, radius);
        Ok(())
    }

    /// Project world segments and draw them as overlay lines.
    pub fn project_lines(
        &mut self,
        starts: &[Pt3],
        ends: &[Pt3],
        color: Rgb<u8>,
    ) -> Result<(), GeometryError> {
        let s = self.camera.project(starts)?;
        let e = self.camera.project(ends)?;
        draw::draw_lines(&mut self.image, &s, &e, color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::FxFyCxCy;

    fn frame() -> Frame {
        let camera = Camera::identity(FxFyCxCy::new(100.0, 100.0, 50.0, 40.0).unwrap());
        Frame::new(camera, RgbImage::new(100, 80))
    }

    #[test]
    fn canonical_corner_tables_mirror_each_other() {
        let res = EYE_PATCH_RESOLUTION;
        let left = left_canonical_corners(res);
        let right = right_canonical_corners(res);
        let w = res.0 as Real;
        for (l, r) in left.iter().zip(right.iter()) {
            assert_eq!(l.y, r.y);
            assert_eq!(l.x, w - r.x);
        }
    }

    #[test]
    fn missing_rectangles_are_a_precondition_error() {
        let res = frame().extract_eyes_from_actor(
            &ActorState::new(),
            EYE_PATCH_RESOLUTION,
            &PatchOptions::default(),
        );
        assert!(matches!(
            res,
            Err(PipelineError::Precondition(
                PreconditionError::MissingEyeRectangle("left")
            ))
        ));
    }

    #[test]
    fn rectangle_behind_camera_is_a_geometry_error() {
        let actor = ActorState::new().with_eye_rectangles(
            [Pt3::new(0.0, 0.0, -1.0); 4],
            [Pt3::new(0.0, 0.0, 1.0); 4],
        );
        let res = frame().extract_eyes_from_actor(
            &actor,
            EYE_PATCH_RESOLUTION,
            &PatchOptions::default(),
        );
        assert!(matches!(res, Err(PipelineError::Geometry(_))));
    }

    #[test]
    fn overlay_points_land_at_projection() {
        let mut frame = frame();
        frame
            .project_points(&[Pt3::new(0.0, 0.0, 1.0)], &[Rgb([255, 0, 0])], 1)
            .unwrap();
        // optical axis projects to the principal point (50, 40)
        assert_eq!(frame.image.get_pixel(50, 40)[0], 255);
    }
}
