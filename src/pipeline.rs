//! Top-level pipelines: spot grouping (detect -> cluster -> extract) and
//! canonical orientation (centroids -> hull baseline -> rotate -> disambiguate).
//!
//! Both run to completion for one image and return owned results; a failure is
//! always a distinguishable error, never partial geometry, so a caller batching
//! many images can skip or flag the bad ones.

use image::RgbaImage;
use serde::Serialize;

use crate::config::SpotConfig;
use crate::detect::{self, DetectError};
use crate::extract::{self, GroupCrop};
use crate::geom::{self, BoundingBox, Edge, GeometryError, Point};
use crate::orient::{self, RotationTransform};

/// Pipeline failures, all recoverable at the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no spots above threshold")]
    NoSpots,

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Result of the grouping pipeline for one image.
pub struct GroupingOutcome {
    /// Copy of the input with an ellipse drawn around each retained cluster.
    pub annotated: RgbaImage,
    /// One crop per retained cluster, tagged with its positional index.
    pub groups: Vec<GroupCrop>,
}

/// Result of the orientation pipeline for one group.
#[derive(Debug, Clone)]
pub struct CanonicalOutcome {
    /// The group's image rotated into canonical orientation, white fill.
    pub image: RgbaImage,
    /// All centroids carried through the same transform(s) as the image.
    pub points: Vec<Point>,
    /// The baseline after transformation; horizontal up to float error.
    pub baseline: Edge,
    /// The normalizing rotation that was applied, in degrees.
    pub rotation_deg: f64,
    /// Whether the extra 180-degree disambiguation flip fired.
    pub flipped: bool,
}

/// Detects spots, partitions them into groups, and extracts annotated crops.
///
/// Zero detected spots is reported as [`PipelineError::NoSpots`] instead of
/// handing empty collections downstream.
pub fn group_spots(
    image: &RgbaImage,
    config: &SpotConfig,
) -> Result<GroupingOutcome, PipelineError> {
    let points = detect::threshold_points(image, config.threshold);
    if points.is_empty() {
        return Err(PipelineError::NoSpots);
    }
    log::debug!("detected {} spot pixels", points.len());

    let partition = config.clusterer().partition(&points);
    let (annotated, groups) = extract::extract_groups(image, &partition, config);

    Ok(GroupingOutcome { annotated, groups })
}

/// Rotates a group's image and centroids into canonical orientation: baseline
/// horizontal, every other centroid on the fixed upper side.
pub fn canonicalize_group(
    image: &RgbaImage,
    centroids: &[Point],
) -> Result<CanonicalOutcome, GeometryError> {
    let baseline = geom::select_baseline(centroids)?;
    let angle = orient::baseline_angle_deg(&baseline);
    let rotation_deg = orient::canonical_rotation_deg(angle);
    let center = baseline.midpoint();

    let transform = RotationTransform::new(rotation_deg, center);
    let mut rotated = transform.warp_image(image);
    let mut points: Vec<Point> = centroids.iter().map(|&p| transform.apply(p)).collect();
    let mut baseline = transform.apply_edge(&baseline).oriented_left_to_right();

    let flip = orient::flip_correction(&baseline, &points, center);
    let flipped = flip.is_some();
    if let Some(flip) = flip {
        rotated = flip.warp_image(&rotated);
        for p in points.iter_mut() {
            *p = flip.apply(*p);
        }
        baseline = flip.apply_edge(&baseline).oriented_left_to_right();
    }

    Ok(CanonicalOutcome {
        image: rotated,
        points,
        baseline,
        rotation_deg,
        flipped,
    })
}

/// Detects bright components in a group crop and canonicalizes its orientation
/// from their centroids.
pub fn canonicalize_crop(crop: &RgbaImage, threshold: u8) -> Result<CanonicalOutcome, PipelineError> {
    let centroids = detect::component_centroids(crop, threshold)?;
    Ok(canonicalize_group(crop, &centroids)?)
}

/// Serializable record of one image's grouping results, handed to the
/// surrounding application for packaging or display.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub image_width: u32,
    pub image_height: u32,
    pub group_count: usize,
    pub groups: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRecord {
    pub index: usize,
    pub dot_count: usize,
    pub centroid: Point,
    pub bounds: BoundingBox,
}

impl GroupSummary {
    pub fn new(image: &RgbaImage, outcome: &GroupingOutcome) -> Self {
        let (image_width, image_height) = image.dimensions();
        let groups = outcome
            .groups
            .iter()
            .map(|g| GroupRecord {
                index: g.index,
                dot_count: g.dot_count,
                centroid: g.centroid,
                bounds: g.bounds,
            })
            .collect::<Vec<_>>();
        Self {
            image_width,
            image_height,
            group_count: groups.len(),
            groups,
        }
    }
}
