//! Eye-patch post-processing.
//!
//! The pipeline applies, in order: grayscale conversion, histogram
//! equalization, specularity removal. Each step is optional and
//! selected via [`PatchOptions`].

use image::{GrayImage, RgbImage};

/// Post-processing switches for extracted eye patches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    pub to_grayscale: bool,
    pub equalize_hist: bool,
    pub remove_specularity: bool,
}

/// A rectified eye patch, grayscale or RGB depending on post-processing.
#[derive(Debug, Clone)]
pub enum EyePatch {
    Rgb(RgbImage),
    Gray(GrayImage),
}

impl EyePatch {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            EyePatch::Rgb(img) => img.dimensions(),
            EyePatch::Gray(img) => img.dimensions(),
        }
    }

    pub fn as_gray(&self) -> Option<&GrayImage> {
        match self {
            EyePatch::Gray(img) => Some(img),
            EyePatch::Rgb(_) => None,
        }
    }

    pub fn as_rgb(&self) -> Option<&RgbImage> {
        match self {
            EyePatch::Rgb(img) => Some(img),
            EyePatch::Gray(_) => None,
        }
    }

    /// Apply the configured post-processing steps in their fixed order.
    pub fn post_process(self, opts: &PatchOptions) -> EyePatch {
        let mut patch = self;
        if opts.to_grayscale {
            patch = patch.into_gray();
        }
        if opts.equalize_hist {
            patch = patch.equalized();
        }
        if opts.remove_specularity {
            patch = patch.despeculared();
        }
        patch
    }

    fn into_gray(self) -> EyePatch {
        match self {
            EyePatch::Gray(img) => EyePatch::Gray(img),
            EyePatch::Rgb(img) => EyePatch::Gray(to_grayscale(&img)),
        }
    }

    /// Histogram equalization; grayscale patches get the standard CDF
    /// remap, RGB patches are equalized per channel with independent
    /// lookup tables.
    fn equalized(self) -> EyePatch {
        match self {
            EyePatch::Gray(img) => {
                let mut img = img;
                equalize_plane(img.as_mut());
                EyePatch::Gray(img)
            }
            EyePatch::Rgb(img) => {
                let (w, h) = img.dimensions();
                let mut planes: [Vec<u8>; 3] = split_planes(&img);
                for plane in planes.iter_mut() {
                    equalize_plane(plane);
                }
                EyePatch::Rgb(merge_planes(&planes, w, h))
            }
        }
    }

    fn despeculared(self) -> EyePatch {
        match self {
            EyePatch::Gray(img) => {
                let (w, h) = img.dimensions();
                let mut plane = img.into_raw();
                fill_specular(&mut plane, w as usize, h as usize);
                EyePatch::Gray(GrayImage::from_raw(w, h, plane).expect("plane size unchanged"))
            }
            EyePatch::Rgb(img) => {
                let (w, h) = img.dimensions();
                let mut planes = split_planes(&img);
                // the mask comes from luma so all channels fill together
                let luma = to_grayscale(&img).into_raw();
                for plane in planes.iter_mut() {
                    fill_specular_masked(plane, &luma, w as usize, h as usize);
                }
                EyePatch::Rgb(merge_planes(&planes, w, h))
            }
        }
    }
}

/// Rec.601 luma conversion.
pub fn to_grayscale(src: &RgbImage) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = vec![0u8; (w * h) as usize];
    for (dst, px) in out.iter_mut().zip(src.pixels()) {
        let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
        *dst = luma.round().clamp(0.0, 255.0) as u8;
    }
    GrayImage::from_raw(w, h, out).expect("buffer sized from dimensions")
}

fn split_planes(src: &RgbImage) -> [Vec<u8>; 3] {
    let n = (src.width() * src.height()) as usize;
    let mut planes = [vec![0u8; n], vec![0u8; n], vec![0u8; n]];
    for (i, px) in src.pixels().enumerate() {
        planes[0][i] = px[0];
        planes[1][i] = px[1];
        planes[2][i] = px[2];
    }
    planes
}

fn merge_planes(planes: &[Vec<u8>; 3], w: u32, h: u32) -> RgbImage {
    let mut raw = vec![0u8; (w * h) as usize * 3];
    for i in 0..(w * h) as usize {
        raw[3 * i] = planes[0][i];
        raw[3 * i + 1] = planes[1][i];
        raw[3 * i + 2] = planes[2][i];
    }
    RgbImage::from_raw(w, h, raw).expect("buffer sized from dimensions")
}

/// In-place histogram equalization of one 8-bit plane.
fn equalize_plane(plane: &mut [u8]) {
    if plane.is_empty() {
        return;
    }

    let mut hist = [0u32; 256];
    for &v in plane.iter() {
        hist[v as usize] += 1;
    }

    let mut cdf = [0u32; 256];
    cdf[0] = hist[0];
    for i in 1..256 {
        cdf[i] = cdf[i - 1] + hist[i];
    }

    let cdf_min = cdf.iter().find(|&&x| x > 0).copied().unwrap_or(0);
    let total = plane.len() as u32;
    if total <= cdf_min {
        return; // flat image, nothing to equalize
    }

    let denom = (total - cdf_min) as f32;
    let mut lut = [0u8; 256];
    for i in 0..256 {
        lut[i] = ((cdf[i].saturating_sub(cdf_min)) as f32 / denom * 255.0).round() as u8;
    }

    for v in plane.iter_mut() {
        *v = lut[*v as usize];
    }
}

/// Luma level at and above which a pixel counts as a specular highlight.
const SPECULAR_THRESHOLD: u8 = 240;
/// Fill passes; each pass grows inward by one pixel ring.
const SPECULAR_FILL_PASSES: usize = 8;

fn fill_specular(plane: &mut [u8], w: usize, h: usize) {
    let mask: Vec<bool> = plane.iter().map(|&v| v >= SPECULAR_THRESHOLD).collect();
    fill_masked(plane, mask, w, h);
}

fn fill_specular_masked(plane: &mut [u8], luma: &[u8], w: usize, h: usize) {
    let mask: Vec<bool> = luma.iter().map(|&v| v >= SPECULAR_THRESHOLD).collect();
    fill_masked(plane, mask, w, h);
}

/// Replace masked pixels with the mean of their unmasked 8-neighbors,
/// growing inward from the highlight boundary.
fn fill_masked(plane: &mut [u8], mut mask: Vec<bool>, w: usize, h: usize) {
    for _ in 0..SPECULAR_FILL_PASSES {
        let mut changed = false;
        let snapshot = plane.to_vec();
        let prev_mask = mask.clone();

        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                if !prev_mask[idx] {
                    continue;
                }
                let mut sum = 0u32;
                let mut count = 0u32;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if !prev_mask[nidx] {
                            sum += snapshot[nidx] as u32;
                            count += 1;
                        }
                    }
                }
                if count > 0 {
                    plane[idx] = (sum / count) as u8;
                    mask[idx] = false;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }
}
