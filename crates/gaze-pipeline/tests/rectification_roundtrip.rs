//! End-to-end rectification check: 3D eye rectangles whose projections
//! are axis-aligned pixel rectangles must come back as (near) exact
//! copies of the source region.

use anyhow::Result;
use image::RgbImage;

use gaze_core::{Camera, FxFyCxCy, Pt3, Real};
use gaze_pipeline::{ActorState, Frame, EYE_PATCH_RESOLUTION};
use gaze_rectify::PatchOptions;

/// World point whose projection through `fx = fy = 100`, `c = 0` lands
/// exactly on pixel `(u, v)`.
fn at_pixel(u: Real, v: Real) -> Pt3 {
    Pt3::new(u / 100.0, v / 100.0, 1.0)
}

fn pattern(u: u32, v: u32) -> u8 {
    ((u * 7 + v * 13) % 251) as u8
}

#[test]
fn axis_aligned_rectangles_rectify_to_source_pixels() -> Result<()> {
    let (w, h) = EYE_PATCH_RESOLUTION;
    let camera = Camera::identity(FxFyCxCy::new(100.0, 100.0, 0.0, 0.0)?);

    let mut image = RgbImage::new(320, 100);
    for (u, v, px) in image.enumerate_pixels_mut() {
        let g = pattern(u, v);
        *px = image::Rgb([g, g, g]);
    }

    // right-eye winding is top-left, top-right, bottom-right,
    // bottom-left; the left-eye table is the same winding mirrored in x
    let (rx, ry) = (20.0, 10.0);
    let right_rect = [
        at_pixel(rx, ry),
        at_pixel(rx + w as Real, ry),
        at_pixel(rx + w as Real, ry + h as Real),
        at_pixel(rx, ry + h as Real),
    ];
    let (lx, ly) = (160.0, 10.0);
    let left_rect = [
        at_pixel(lx + w as Real, ly),
        at_pixel(lx, ly),
        at_pixel(lx, ly + h as Real),
        at_pixel(lx + w as Real, ly + h as Real),
    ];

    let frame = Frame::new(camera, image);
    let actor = ActorState::new().with_eye_rectangles(left_rect, right_rect);

    let (left, right) =
        frame.extract_eyes_from_actor(&actor, EYE_PATCH_RESOLUTION, &PatchOptions::default())?;

    let left = left.as_rgb().expect("no post-processing requested");
    let right = right.as_rgb().expect("no post-processing requested");
    assert_eq!(left.dimensions(), EYE_PATCH_RESOLUTION);
    assert_eq!(right.dimensions(), EYE_PATCH_RESOLUTION);

    for y in 0..h {
        for x in 0..w {
            let want_r = pattern(x + rx as u32, y + ry as u32) as i32;
            let got_r = right.get_pixel(x, y)[0] as i32;
            assert!(
                (got_r - want_r).abs() <= 1,
                "right patch ({x},{y}): got {got_r}, want {want_r}"
            );

            let want_l = pattern(x + lx as u32, y + ly as u32) as i32;
            let got_l = left.get_pixel(x, y)[0] as i32;
            assert!(
                (got_l - want_l).abs() <= 1,
                "left patch ({x},{y}): got {got_l}, want {want_l}"
            );
        }
    }
    Ok(())
}

#[test]
fn grayscale_patches_come_back_gray() -> Result<()> {
    let camera = Camera::identity(FxFyCxCy::new(100.0, 100.0, 0.0, 0.0)?);
    let frame = Frame::new(camera, RgbImage::from_pixel(320, 100, image::Rgb([80, 80, 80])));
    let rect = [
        at_pixel(20.0, 10.0),
        at_pixel(80.0, 10.0),
        at_pixel(80.0, 46.0),
        at_pixel(20.0, 46.0),
    ];
    let actor = ActorState::new().with_eye_rectangles(rect, rect);

    let opts = PatchOptions {
        to_grayscale: true,
        equalize_hist: false,
        remove_specularity: false,
    };
    let (left, right) = frame.extract_eyes_from_actor(&actor, EYE_PATCH_RESOLUTION, &opts)?;
    assert!(left.as_gray().is_some());
    assert!(right.as_gray().is_some());
    Ok(())
}
