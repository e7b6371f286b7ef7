//! Perspective warping with inverse mapping and bilinear sampling.

use gaze_core::{Mat3, Pt2, Vec3};
use image::RgbImage;
use rayon::prelude::*;

use crate::enhance::{EyePatch, PatchOptions};
use crate::error::RectificationError;
use crate::homography::dlt_homography;

fn sample_channel(raw: &[u8], width: u32, height: u32, x: i64, y: i64, ch: usize) -> f32 {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return 0.0; // constant black border
    }
    raw[(y as usize * width as usize + x as usize) * 3 + ch] as f32
}

fn bilinear(src: &RgbImage, x: f32, y: f32) -> [f32; 3] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let raw = src.as_raw();
    let (w, h) = src.dimensions();

    let mut out = [0.0f32; 3];
    for (ch, value) in out.iter_mut().enumerate() {
        let v00 = sample_channel(raw, w, h, x0, y0, ch);
        let v10 = sample_channel(raw, w, h, x0 + 1, y0, ch);
        let v01 = sample_channel(raw, w, h, x0, y0 + 1, ch);
        let v11 = sample_channel(raw, w, h, x0 + 1, y0 + 1, ch);

        let top = v00 * (1.0 - fx) + v10 * fx;
        let bottom = v01 * (1.0 - fx) + v11 * fx;
        *value = top * (1.0 - fy) + bottom * fy;
    }
    out
}

/// Warp `src` through the homography `h` (source pixel -> destination
/// pixel) into a `width`×`height` image.
///
/// Sampling is inverse-mapped: each destination pixel is pulled from
/// `h⁻¹ · dst` with bilinear interpolation and a constant black border.
pub fn warp_perspective(
    src: &RgbImage,
    h: &Mat3,
    width: u32,
    height: u32,
) -> Result<RgbImage, RectificationError> {
    if width == 0 || height == 0 {
        return Err(RectificationError::EmptyResolution(width, height));
    }
    let h_inv = h.try_inverse().ok_or(RectificationError::Singular)?;

    let mut dst = RgbImage::new(width, height);
    dst.as_mut()
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width as usize {
                let v = h_inv * Vec3::new(x as f64, y as f64, 1.0);
                let px = if v.z.abs() > f64::EPSILON {
                    bilinear(src, (v.x / v.z) as f32, (v.y / v.z) as f32)
                } else {
                    [0.0; 3]
                };
                for ch in 0..3 {
                    row[x * 3 + ch] = px[ch].clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(dst)
}

/// Rectify a quadrilateral image region to a canonical patch.
///
/// `corners` are the four projected corner pixels and `canon` the four
/// matching corners of the `resolution`-sized target rectangle, in the
/// same order; a mismatched winding silently mirrors or rotates the
/// patch, so both orderings come from fixed tables upstream. Post
/// processing runs per [`PatchOptions`].
pub fn rectify_patch(
    src: &RgbImage,
    corners: &[Pt2; 4],
    canon: &[Pt2; 4],
    resolution: (u32, u32),
    opts: &PatchOptions,
) -> Result<EyePatch, RectificationError> {
    let h = dlt_homography(corners, canon)?;
    let warped = warp_perspective(src, &h, resolution.0, resolution.1)?;
    Ok(EyePatch::Rgb(warped).post_process(opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn identity_warp_copies_pixels() {
        let mut src = RgbImage::new(8, 6);
        for (x, y, p) in src.enumerate_pixels_mut() {
            *p = Rgb([(x * 30) as u8, (y * 40) as u8, 7]);
        }
        let out = warp_perspective(&src, &Mat3::identity(), 8, 6).unwrap();
        assert_eq!(src.as_raw(), out.as_raw());
    }

    #[test]
    fn translation_warp_shifts_content() {
        let mut src = RgbImage::new(8, 8);
        src.put_pixel(2, 3, Rgb([200, 0, 0]));
        // shift +1 in x: dst(x) = src(x-1)
        let h = Mat3::new(1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let out = warp_perspective(&src, &h, 8, 8).unwrap();
        assert_eq!(out.get_pixel(3, 3)[0], 200);
        assert_eq!(out.get_pixel(2, 3)[0], 0);
    }

    #[test]
    fn empty_resolution_is_rejected() {
        let src = RgbImage::new(4, 4);
        assert!(matches!(
            warp_perspective(&src, &Mat3::identity(), 0, 4),
            Err(RectificationError::EmptyResolution(0, 4))
        ));
    }
}
