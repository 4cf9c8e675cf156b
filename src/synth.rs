//! Synthetic spot-pattern images: bright discs on a dark background, used by
//! the tests and the CLI demo mode instead of binary fixtures.

use image::{Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([10, 10, 10, 255]);
const SPOT: Rgba<u8> = Rgba([235, 235, 235, 255]);

/// Renders filled discs of the given radius at each center over a near-black
/// background.
pub fn spot_pattern(width: u32, height: u32, centers: &[(f32, f32)], radius: f32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return img;
    }

    for pixel in img.pixels_mut() {
        *pixel = BACKGROUND;
    }

    for &(cx, cy) in centers {
        let r = radius.max(0.5);
        let min_x = ((cx - r).floor() as i64).max(0) as u32;
        let max_x = ((cx + r).ceil() as i64).clamp(0, width as i64 - 1) as u32;
        let min_y = ((cy - r).floor() as i64).max(0) as u32;
        let max_y = ((cy + r).ceil() as i64).clamp(0, height as i64 - 1) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r * r {
                    img.put_pixel(x, y, SPOT);
                }
            }
        }
    }

    img
}

/// Centers for a rows x cols grid of spots with the given pitch, starting at
/// `origin`. Handy for building one coherent spot group.
pub fn dot_grid(origin: (f32, f32), rows: u32, cols: u32, pitch: f32) -> Vec<(f32, f32)> {
    let mut centers = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            centers.push((
                origin.0 + col as f32 * pitch,
                origin.1 + row as f32 * pitch,
            ));
        }
    }
    centers
}
