//! Per-cluster crop extraction and full-image annotation.

use image::RgbaImage;
use image::imageops;
use imageproc::drawing::draw_hollow_ellipse_mut;

use crate::cluster::Partition;
use crate::config::SpotConfig;
use crate::geom::{BoundingBox, Point};

/// One retained cluster's crop geometry and sub-image.
#[derive(Debug, Clone)]
pub struct GroupCrop {
    /// Positional index among retained clusters, stable for a given input.
    pub index: usize,
    /// Margin-expanded box, clipped to the image.
    pub bounds: BoundingBox,
    pub dot_count: usize,
    pub centroid: Point,
    pub image: RgbaImage,
}

/// Filters the partition down to clusters with at least `min_dots` members,
/// crops each at its margin-expanded, image-clipped box, and draws an ellipse
/// per retained cluster on a copy of the full image.
///
/// Crops come from the untouched original; the ellipses use the expanded box
/// before clipping, mirroring how the annotation is purely cosmetic.
pub fn extract_groups(
    original: &RgbaImage,
    partition: &Partition,
    config: &SpotConfig,
) -> (RgbaImage, Vec<GroupCrop>) {
    let (width, height) = original.dimensions();
    let mut annotated = original.clone();
    let mut groups = Vec::new();

    let retained = partition
        .clusters
        .iter()
        .filter(|c| c.len() >= config.min_dots);

    for (index, cluster) in retained.enumerate() {
        let (Some(raw), Some(centroid)) =
            (BoundingBox::of_points(&cluster.points), cluster.centroid())
        else {
            // Clusters are non-empty by construction.
            log::warn!("skipping empty cluster at index {index}");
            continue;
        };

        let expanded = raw.expand(config.margin);
        let clipped = expanded.clip(width, height);

        let x0 = (clipped.min_x.floor() as u32).min(width.saturating_sub(1));
        let y0 = (clipped.min_y.floor() as u32).min(height.saturating_sub(1));
        let x1 = (clipped.max_x.ceil() as u32).min(width);
        let y1 = (clipped.max_y.ceil() as u32).min(height);
        let crop_w = (x1 - x0).max(1);
        let crop_h = (y1 - y0).max(1);
        let crop = imageops::crop_imm(original, x0, y0, crop_w, crop_h).to_image();

        draw_annotation(&mut annotated, &expanded, config);

        groups.push(GroupCrop {
            index,
            bounds: clipped,
            dot_count: cluster.len(),
            centroid,
            image: crop,
        });
    }

    (annotated, groups)
}

fn draw_annotation(canvas: &mut RgbaImage, bounds: &BoundingBox, config: &SpotConfig) {
    let center = bounds.center();
    let center = (center.x.round() as i32, center.y.round() as i32);
    let width_radius = (bounds.width() / 2.0).round() as i32;
    let height_radius = (bounds.height() / 2.0).round() as i32;
    let color = config.annotation_color();

    // Concentric rings emulate the configured stroke width.
    for ring in 0..config.circle_width as i32 {
        draw_hollow_ellipse_mut(
            canvas,
            center,
            (width_radius + ring).max(1),
            (height_radius + ring).max(1),
            color,
        );
    }
}
