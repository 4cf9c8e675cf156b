//! Spot detection: per-pixel channel thresholding for the clustering pipeline,
//! and connected-component centroids for the orientation sub-pipeline.

use std::collections::VecDeque;

use image::RgbaImage;
use kornia::{
    image::{Image, ImageError, ImageSize, allocator::CpuAllocator},
    imgproc,
};

use crate::geom::Point;

type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

/// Grayscale cutoff for the component-centroid path. The group crops have a
/// near-black background, so bright blob pixels sit well above this.
pub const COMPONENT_THRESHOLD: u8 = 200;

/// Errors from the kornia-backed centroid detector.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("kornia image error: {0}")]
    Kornia(#[from] ImageError),
}

/// Emits one point per pixel whose red, green and blue channels all exceed
/// `threshold`. Pure predicate over the pixel grid: no spatial reasoning, no
/// duplicates, unordered output.
pub fn threshold_points(image: &RgbaImage, threshold: u8) -> Vec<Point> {
    let mut points = Vec::new();
    for (x, y, px) in image.enumerate_pixels() {
        if px[0] > threshold && px[1] > threshold && px[2] > threshold {
            points.push(Point::new(x as f64, y as f64));
        }
    }
    points
}

/// Detects bright connected components and returns one centroid per component,
/// computed from image moments (m10/m00, m01/m00).
///
/// Grayscale conversion and binarization run through kornia; component
/// extraction is a 4-neighbor BFS over the binary mask.
pub fn component_centroids(image: &RgbaImage, threshold: u8) -> Result<Vec<Point>, DetectError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let mut raw_rgb = Vec::with_capacity((width * height * 3) as usize);
    for px in image.pixels() {
        raw_rgb.extend_from_slice(&px.0[..3]);
    }

    let rgb = CpuImage::<u8, 3>::new(
        ImageSize {
            width: width as usize,
            height: height as usize,
        },
        raw_rgb,
        CpuAllocator,
    )?;

    let mut gray = CpuImage::<u8, 1>::from_size_val(rgb.size(), 0u8, CpuAllocator)?;
    imgproc::color::gray_from_rgb_u8(&rgb, &mut gray)?;

    let mut binary = CpuImage::<u8, 1>::from_size_val(gray.size(), 0u8, CpuAllocator)?;
    imgproc::threshold::threshold_binary(&gray, &mut binary, threshold, 255)?;

    Ok(mask_centroids(
        binary.as_slice(),
        width as usize,
        height as usize,
    ))
}

fn mask_centroids(mask: &[u8], width: usize, height: usize) -> Vec<Point> {
    let mut visited = vec![false; mask.len()];
    let mut centroids = Vec::new();

    for start in 0..mask.len() {
        if mask[start] == 0 || visited[start] {
            continue;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        // Zeroth and first image moments of the component.
        let mut m00 = 0usize;
        let mut m10 = 0f64;
        let mut m01 = 0f64;

        while let Some(idx) = queue.pop_front() {
            let y = idx / width;
            let x = idx % width;
            m00 += 1;
            m10 += x as f64;
            m01 += y as f64;

            for (dx, dy) in [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)] {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                    continue;
                }
                let next = ny as usize * width + nx as usize;
                if mask[next] == 0 || visited[next] {
                    continue;
                }
                visited[next] = true;
                queue.push_back(next);
            }
        }

        if m00 == 0 {
            continue;
        }
        centroids.push(Point::new(m10 / m00 as f64, m01 / m00 as f64));
    }

    log::debug!(
        "centroid detector: {} components in {}x{} mask",
        centroids.len(),
        width,
        height
    );
    centroids
}
