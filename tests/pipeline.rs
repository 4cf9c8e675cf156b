use image::Rgba;
use spot_group_reader::cluster::{Cluster, Partition};
use spot_group_reader::config::{ClusterStrategy, ConfigError, SpotConfig};
use spot_group_reader::detect::{COMPONENT_THRESHOLD, component_centroids, threshold_points};
use spot_group_reader::extract::extract_groups;
use spot_group_reader::geom::Point;
use spot_group_reader::orient::below_baseline;
use spot_group_reader::pipeline::{
    GroupSummary, PipelineError, canonicalize_crop, group_spots,
};
use spot_group_reader::synth;

#[test]
fn detector_requires_every_channel_above_threshold() {
    let mut img = image::RgbaImage::new(3, 1);
    img.put_pixel(0, 0, Rgba([70, 70, 70, 255]));
    img.put_pixel(1, 0, Rgba([70, 10, 70, 255]));
    img.put_pixel(2, 0, Rgba([60, 60, 60, 255]));

    let points = threshold_points(&img, 60);
    assert_eq!(points, vec![Point::new(0.0, 0.0)]);
}

#[test]
fn dense_cluster_is_retained_and_sparse_cluster_is_dropped() {
    // Radius-7 disc: 149 bright pixels (>= min_dots). Radius-4 disc: 49 (< min_dots).
    let mut img = synth::spot_pattern(600, 400, &[(100.0, 100.0)], 7.0);
    let small = synth::spot_pattern(600, 400, &[(400.0, 300.0)], 4.0);
    for (x, y, px) in small.enumerate_pixels() {
        if px[0] > 60 {
            img.put_pixel(x, y, *px);
        }
    }

    let config = SpotConfig::default();
    let outcome = group_spots(&img, &config).expect("grouping failed");

    assert_eq!(outcome.groups.len(), 1, "only the dense cluster is retained");
    let group = &outcome.groups[0];
    assert!(group.dot_count >= 100);
    assert!((group.centroid.x - 100.0).abs() < 1.0);
    assert!((group.centroid.y - 100.0).abs() < 1.0);
    assert_eq!(outcome.annotated.dimensions(), img.dimensions());

    // Containment: every detected pixel of the dense disc is inside the box,
    // and the box never leaves the image.
    let points = threshold_points(&img, config.threshold);
    for p in points.iter().filter(|p| p.x < 300.0) {
        assert!(group.bounds.contains(p));
    }
    assert!(group.bounds.min_x >= 0.0 && group.bounds.min_y >= 0.0);
    assert!(group.bounds.max_x <= 600.0 && group.bounds.max_y <= 400.0);

    let summary = GroupSummary::new(&img, &outcome);
    assert_eq!(summary.group_count, 1);
    let json = serde_json::to_string(&summary).expect("summary must serialize");
    assert!(json.contains("\"dot_count\""));
}

#[test]
fn empty_detection_is_reported_not_propagated_as_empty_collections() {
    let img = synth::spot_pattern(64, 64, &[], 3.0);
    match group_spots(&img, &SpotConfig::default()) {
        Err(PipelineError::NoSpots) => {}
        Err(other) => panic!("expected NoSpots, got {other:?}"),
        Ok(outcome) => panic!("expected NoSpots, got {} groups", outcome.groups.len()),
    }
}

#[test]
fn single_point_cluster_still_yields_a_usable_crop() {
    let img = synth::spot_pattern(100, 100, &[(50.0, 50.0)], 1.0);
    let partition = Partition {
        clusters: vec![Cluster {
            points: vec![Point::new(5.0, 5.0)],
        }],
        noise: Vec::new(),
    };
    let config = SpotConfig {
        min_dots: 1,
        margin: 10.0,
        ..SpotConfig::default()
    };

    let (_, groups) = extract_groups(&img, &partition, &config);
    assert_eq!(groups.len(), 1);
    let bounds = groups[0].bounds;
    assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
    assert_eq!(groups[0].image.dimensions(), (15, 15));
}

#[test]
fn component_centroids_find_disc_centers() {
    let img = synth::spot_pattern(100, 60, &[(20.0, 20.0), (60.0, 40.0)], 3.0);
    let mut centroids =
        component_centroids(&img, COMPONENT_THRESHOLD).expect("centroid detection failed");
    centroids.sort_by(|a, b| a.cmp_xy(b));
    eprintln!("centroids: {centroids:?}");

    assert_eq!(centroids.len(), 2);
    assert!((centroids[0].x - 20.0).abs() < 0.75 && (centroids[0].y - 20.0).abs() < 0.75);
    assert!((centroids[1].x - 60.0).abs() < 0.75 && (centroids[1].y - 40.0).abs() < 0.75);
}

#[test]
fn canonicalize_crop_levels_the_baseline_and_flips_points_above() {
    // Trapezoid of blobs: the long top edge is the unique longest valid
    // baseline; the other centroids start out below it in image coordinates.
    let centers = [(30.0, 20.0), (130.0, 20.0), (100.0, 80.0), (50.0, 80.0)];
    let img = synth::spot_pattern(160, 100, &centers, 3.0);

    let outcome = canonicalize_crop(&img, COMPONENT_THRESHOLD).expect("canonicalization failed");
    eprintln!(
        "rotation {} flipped {} baseline {:?}",
        outcome.rotation_deg, outcome.flipped, outcome.baseline
    );

    assert_eq!(outcome.points.len(), 4);
    assert_eq!(outcome.image.dimensions(), img.dimensions());
    assert!(outcome.flipped, "points under the baseline force the 180 flip");

    let baseline = outcome.baseline;
    assert!((baseline.a.y - baseline.b.y).abs() < 1e-6, "baseline must end horizontal");
    assert!((baseline.length() - 100.0).abs() < 0.5);

    for p in outcome
        .points
        .iter()
        .filter(|p| !baseline.has_endpoint(p))
    {
        assert!(
            !below_baseline(&baseline, p),
            "no point may remain below after disambiguation: {p:?}"
        );
    }
}

#[test]
fn degenerate_geometry_is_a_hard_failure() {
    // Two blobs cannot define a hull.
    let img = synth::spot_pattern(80, 80, &[(20.0, 20.0), (60.0, 60.0)], 3.0);
    let err = canonicalize_crop(&img, COMPONENT_THRESHOLD).unwrap_err();
    assert!(matches!(err, PipelineError::Geometry(_)), "got {err:?}");
}

#[test]
fn config_rejects_non_positive_parameters() {
    let bad = SpotConfig {
        group_radius: 0.0,
        ..SpotConfig::default()
    };
    assert_eq!(
        bad.validate(),
        Err(ConfigError::NonPositive {
            name: "group_radius",
            value: 0.0
        })
    );

    let bad = SpotConfig {
        threshold: 0,
        ..SpotConfig::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn config_loads_from_partial_json() {
    let config: SpotConfig =
        serde_json::from_str(r#"{"strategy": "density", "min_dots": 25}"#).expect("parse failed");
    assert_eq!(config.strategy, ClusterStrategy::Density);
    assert_eq!(config.min_dots, 25);
    assert_eq!(config.threshold, SpotConfig::default().threshold);
    config.validate().expect("defaults must validate");
}
