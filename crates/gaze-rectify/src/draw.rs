//! Debug overlay drawing.
//!
//! All helpers mutate the supplied image in place and clip to the
//! image bounds; pixels outside the drawn region are never touched.

use gaze_core::Pt2;
use image::{Rgb, RgbImage};

/// Color used when a caller supplies no color list.
pub const DEFAULT_OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Per-item overlay color: an empty slice selects the default for
/// everything, a single entry applies to every item, a longer slice is
/// indexed per item (missing tail entries fall back to the default).
fn color_at(colors: &[Rgb<u8>], i: usize) -> Rgb<u8> {
    match colors {
        [] => DEFAULT_OVERLAY_COLOR,
        [c] => *c,
        _ => colors.get(i).copied().unwrap_or(DEFAULT_OVERLAY_COLOR),
    }
}

/// Draw a filled circle at each point, colored per point.
pub fn draw_points(image: &mut RgbImage, points: &[Pt2], colors: &[Rgb<u8>], radius: i64) {
    let r2 = radius * radius;
    for (i, p) in points.iter().enumerate() {
        let color = color_at(colors, i);
        let cx = p.x.round() as i64;
        let cy = p.y.round() as i64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    put_pixel_clipped(image, cx + dx, cy + dy, color);
                }
            }
        }
    }
}

/// Draw a line segment between each start/end pair (Bresenham).
pub fn draw_lines(image: &mut RgbImage, starts: &[Pt2], ends: &[Pt2], color: Rgb<u8>) {
    for (s, e) in starts.iter().zip(ends.iter()) {
        draw_segment(image, s, e, color);
    }
}

fn draw_segment(image: &mut RgbImage, start: &Pt2, end: &Pt2, color: Rgb<u8>) {
    let mut x = start.x.round() as i64;
    let mut y = start.y.round() as i64;
    let x1 = end.x.round() as i64;
    let y1 = end.y.round() as i64;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_clipped(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a short text label next to each position, colored per label.
///
/// Glyphs are a compact 3x5 bitmap set covering digits and the few
/// letters used by the overlay; anything else renders as a full block.
pub fn draw_labels(
    image: &mut RgbImage,
    labels: &[&str],
    positions: &[Pt2],
    colors: &[Rgb<u8>],
    scale: u32,
) {
    let scale = scale.max(1) as i64;
    for (i, (label, pos)) in labels.iter().zip(positions.iter()).enumerate() {
        let color = color_at(colors, i);
        let mut cx = pos.x.round() as i64 + 6;
        let cy = pos.y.round() as i64 - 2;
        for c in label.chars() {
            draw_glyph(image, cx, cy, c, color, scale);
            cx += 4 * scale; // 3 columns + 1 spacing
        }
    }
}

fn glyph_rows(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'C' => [0x7, 0x4, 0x4, 0x4, 0x7],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        ' ' => [0x0; 5],
        _ => [0x7; 5],
    }
}

fn draw_glyph(image: &mut RgbImage, x: i64, y: i64, c: char, color: Rgb<u8>, scale: i64) {
    for (row, bits) in glyph_rows(c).iter().enumerate() {
        for col in 0..3i64 {
            if (bits >> (2 - col)) & 1 == 1 {
                for dy in 0..scale {
                    for dx in 0..scale {
                        put_pixel_clipped(
                            image,
                            x + col * scale + dx,
                            y + row as i64 * scale + dy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}
