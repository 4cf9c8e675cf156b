//! Canonical-orientation normalization: rotate a group so its baseline edge is
//! horizontal, then disambiguate up/down with a single optional 180-degree flip.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};

use crate::geom::{Edge, Point};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A rotation by `angle_deg` about `center`, realized as a 2x3 affine matrix
/// (the OpenCV `getRotationMatrix2D` convention: positive angles rotate
/// counter-clockwise in the displayed image). Images and points go through the
/// same matrix, so they always stay in register.
#[derive(Debug, Clone, Copy)]
pub struct RotationTransform {
    pub angle_deg: f64,
    pub center: Point,
    m: [f64; 6],
}

impl RotationTransform {
    pub fn new(angle_deg: f64, center: Point) -> Self {
        let theta = angle_deg.to_radians();
        let alpha = theta.cos();
        let beta = theta.sin();
        let m = [
            alpha,
            beta,
            (1.0 - alpha) * center.x - beta * center.y,
            -beta,
            alpha,
            beta * center.x + (1.0 - alpha) * center.y,
        ];
        Self {
            angle_deg,
            center,
            m,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.m[0] * p.x + self.m[1] * p.y + self.m[2],
            self.m[3] * p.x + self.m[4] * p.y + self.m[5],
        )
    }

    pub fn apply_edge(&self, e: &Edge) -> Edge {
        Edge {
            a: self.apply(e.a),
            b: self.apply(e.b),
        }
    }

    /// Rotates the full image through the same transform as the points, filling
    /// newly exposed regions with solid white.
    pub fn warp_image(&self, image: &RgbaImage) -> RgbaImage {
        let m = &self.m;
        let projection = Projection::from_matrix([
            m[0] as f32,
            m[1] as f32,
            m[2] as f32,
            m[3] as f32,
            m[4] as f32,
            m[5] as f32,
            0.0,
            0.0,
            1.0,
        ])
        .expect("rotation matrix is always invertible");
        warp(image, &projection, Interpolation::Bilinear, BACKGROUND)
    }
}

/// Signed angle, in degrees, between the baseline vector `b - a` and the
/// horizontal. The y component is negated because image y grows downward while
/// the angle convention assumes an upward y axis.
pub fn baseline_angle_deg(baseline: &Edge) -> f64 {
    let dx = baseline.b.x - baseline.a.x;
    let dy = -(baseline.b.y - baseline.a.y);
    dy.atan2(dx).to_degrees()
}

/// Maps an angle-to-horizontal onto the target rotation that makes the baseline
/// horizontal. Negative and non-negative angles intentionally land in two
/// different rotation families; the disambiguator settles the final orientation.
pub fn canonical_rotation_deg(angle_to_horizontal: f64) -> f64 {
    if angle_to_horizontal < 0.0 {
        180.0 - angle_to_horizontal
    } else {
        360.0 - angle_to_horizontal
    }
}

/// Tests whether `p` falls on the "below" side of the baseline, using the line
/// equation a*x + b*y + c with a = y2 - y1, b = x1 - x2, c = x2*y1 - x1*y2.
/// In y-down image coordinates a negative value is below the (horizontal)
/// baseline, matching a point visually underneath it.
pub fn below_baseline(baseline: &Edge, p: &Point) -> bool {
    let a = baseline.b.y - baseline.a.y;
    let b = baseline.a.x - baseline.b.x;
    let c = baseline.b.x * baseline.a.y - baseline.a.x * baseline.b.y;
    a * p.x + b * p.y + c < 0.0
}

/// If any non-baseline point sits below the rotated baseline, returns the 180°
/// flip transform to apply to image and points; otherwise no correction is
/// needed. Exactly one of {no flip, one flip} ever happens: the baseline is a
/// hull edge, so all other points share a side and a single flip fixes them all.
pub fn flip_correction(
    baseline: &Edge,
    points: &[Point],
    center: Point,
) -> Option<RotationTransform> {
    let any_below = points
        .iter()
        .filter(|p| !baseline.has_endpoint(p))
        .any(|p| below_baseline(baseline, p));
    any_below.then(|| RotationTransform::new(180.0, center))
}
