//! In-memory rendering of a group's centroid geometry: scatter, hull edges and
//! the selected baseline, for visual inspection of the orientation solver.

use plotters::prelude::*;

use crate::geom::{Edge, Hull, Point};

const DOT_COLOR: RGBColor = RGBColor(60, 110, 220);
const HULL_COLOR: RGBColor = RGBColor(40, 40, 40);
const BASELINE_COLOR: RGBColor = RGBColor(0, 128, 0);

fn clamp_point(p: &Point, width: u32, height: u32) -> (i32, i32) {
    (
        (p.x.round() as i32).clamp(0, width.saturating_sub(1) as i32),
        (p.y.round() as i32).clamp(0, height.saturating_sub(1) as i32),
    )
}

/// Renders centroids, hull edges and the baseline as an RGBA pixel buffer of
/// the given dimensions (white background, y-down image coordinates).
pub fn render_geometry_rgba(
    width: u32,
    height: u32,
    points: &[Point],
    hull: Option<&Hull>,
    baseline: Option<&Edge>,
) -> Result<Vec<u8>, String> {
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| "width*height overflow".to_string())?;

    let mut rgb = vec![255u8; pixel_count * 3];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        if let Some(hull) = hull {
            for edge in hull.edges() {
                root.draw(&PathElement::new(
                    [
                        clamp_point(&edge.a, width, height),
                        clamp_point(&edge.b, width, height),
                    ],
                    HULL_COLOR,
                ))
                .map_err(|e| e.to_string())?;
            }
        }

        if let Some(baseline) = baseline {
            root.draw(&PathElement::new(
                [
                    clamp_point(&baseline.a, width, height),
                    clamp_point(&baseline.b, width, height),
                ],
                BASELINE_COLOR.stroke_width(3),
            ))
            .map_err(|e| e.to_string())?;
        }

        for p in points {
            root.draw(&Circle::new(
                clamp_point(p, width, height),
                4,
                DOT_COLOR.filled(),
            ))
            .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    let mut rgba = vec![255u8; pixel_count * 4];
    for i in 0..pixel_count {
        rgba[i * 4] = rgb[i * 3];
        rgba[i * 4 + 1] = rgb[i * 3 + 1];
        rgba[i * 4 + 2] = rgb[i * 3 + 2];
        rgba[i * 4 + 3] = 255;
    }

    Ok(rgba)
}
