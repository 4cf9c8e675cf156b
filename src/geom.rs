//! Points, bounding boxes, convex hulls and baseline-edge selection over group centroids.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum number of centroids needed before a hull can be attempted.
pub const MIN_HULL_POINTS: usize = 3;

/// A hull edge is unusable as a baseline if any other centroid lies closer than
/// this to the edge's infinite line.
pub const BASELINE_CLEARANCE: f64 = 5.0;

/// A location in image space: origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Total order on (x, y); used to keep partitions and hulls deterministic.
    pub fn cmp_xy(&self, other: &Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
    }
}

/// Mean position of a non-empty point set.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(Point::new(sum_x / n, sum_y / n))
}

/// Axis-aligned box in image coordinates, min <= max on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bb.min_x = bb.min_x.min(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_x = bb.max_x.max(p.x);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        BoundingBox {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Clips the box to [0, width] x [0, height].
    pub fn clip(&self, width: u32, height: u32) -> Self {
        BoundingBox {
            min_x: self.min_x.max(0.0),
            min_y: self.min_y.max(0.0),
            max_x: self.max_x.min(width as f64),
            max_y: self.max_y.min(height as f64),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// A directed hull edge with its two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
}

impl Edge {
    pub fn length(&self) -> f64 {
        self.a.distance_sq(&self.b).sqrt()
    }

    pub fn midpoint(&self) -> Point {
        Point::new((self.a.x + self.b.x) / 2.0, (self.a.y + self.b.y) / 2.0)
    }

    /// Perpendicular distance from `p` to this edge's infinite line:
    /// |cross(b - a, a - p)| / |b - a|.
    pub fn line_distance(&self, p: &Point) -> f64 {
        let ex = self.b.x - self.a.x;
        let ey = self.b.y - self.a.y;
        let px = self.a.x - p.x;
        let py = self.a.y - p.y;
        let cross = ex * py - ey * px;
        cross.abs() / (ex * ex + ey * ey).sqrt()
    }

    pub fn has_endpoint(&self, p: &Point) -> bool {
        *p == self.a || *p == self.b
    }

    /// Endpoints reordered so `a.x <= b.x`. The side-of-line sign convention
    /// depends on edge direction, so the disambiguator always works on a
    /// left-to-right baseline.
    pub fn oriented_left_to_right(&self) -> Edge {
        if self.b.x < self.a.x {
            Edge {
                a: self.b,
                b: self.a,
            }
        } else {
            *self
        }
    }
}

/// Errors from hull construction and baseline selection. All of these are hard
/// failures the caller must handle; there is no fallback edge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("need at least {MIN_HULL_POINTS} centroids for a hull, got {got}")]
    TooFewPoints { got: usize },

    #[error("centroids are collinear, hull is degenerate")]
    Collinear,

    #[error("every hull edge has a third centroid within {BASELINE_CLEARANCE} units")]
    NoValidEdge,
}

/// Convex hull boundary: ordered cyclic vertices, each a member of the input set.
#[derive(Debug, Clone, PartialEq)]
pub struct Hull {
    vertices: Vec<Point>,
}

impl Hull {
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Consecutive vertex pairs, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Edge {
            a: self.vertices[i],
            b: self.vertices[(i + 1) % n],
        })
    }
}

fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Andrew's monotone chain. Fails explicitly for fewer than three points or a
/// fully collinear set.
pub fn convex_hull(points: &[Point]) -> Result<Hull, GeometryError> {
    if points.len() < MIN_HULL_POINTS {
        return Err(GeometryError::TooFewPoints { got: points.len() });
    }

    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| a.cmp_xy(b));
    sorted.dedup();

    if sorted.len() < MIN_HULL_POINTS {
        return Err(GeometryError::TooFewPoints { got: sorted.len() });
    }

    let mut lower: Vec<Point> = Vec::new();
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < MIN_HULL_POINTS {
        return Err(GeometryError::Collinear);
    }

    Ok(Hull { vertices: lower })
}

/// Selects the canonical baseline: the longest hull edge whose infinite line has
/// no other centroid within [`BASELINE_CLEARANCE`]. Ties keep the first maximum
/// encountered in hull order.
pub fn select_baseline(points: &[Point]) -> Result<Edge, GeometryError> {
    let hull = convex_hull(points)?;

    let mut best: Option<(f64, Edge)> = None;
    for edge in hull.edges() {
        let clear = points
            .iter()
            .filter(|p| !edge.has_endpoint(p))
            .all(|p| edge.line_distance(p) >= BASELINE_CLEARANCE);
        if !clear {
            continue;
        }
        let len = edge.length();
        if best.as_ref().is_none_or(|(l, _)| len > *l) {
            best = Some((len, edge));
        }
    }

    best.map(|(_, e)| e).ok_or(GeometryError::NoValidEdge)
}
