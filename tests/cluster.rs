use spot_group_reader::cluster::{Clusterer, DensityClusterer, Partition, UnionFindClusterer};
use spot_group_reader::geom::Point;

fn points_of(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Deterministic pseudo-random points so the grid and naive scans can be
/// compared on something denser than hand-picked fixtures.
fn lcg_points(count: usize, extent: f64) -> Vec<Point> {
    let mut state = 0x2545F4914F6CDD1Du64;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f64 / (1u64 << 31) as f64) * extent
    };
    (0..count).map(|_| Point::new(next(), next())).collect()
}

#[test]
fn chain_of_close_points_merges_across_large_span() {
    // Pairwise neighbors are 40 apart, the endpoints 400 apart: the transitive
    // closure still puts them all in one cluster.
    let points: Vec<Point> = (0..=10).map(|i| Point::new(i as f64 * 40.0, 0.0)).collect();
    let partition = UnionFindClusterer::naive(50.0).partition(&points);
    assert_eq!(partition.clusters.len(), 1);
    assert_eq!(partition.clusters[0].len(), 11);
    assert!(partition.noise.is_empty());
}

#[test]
fn radius_below_spacing_yields_singletons() {
    let points: Vec<Point> = (0..=10).map(|i| Point::new(i as f64 * 40.0, 0.0)).collect();
    let partition = UnionFindClusterer::naive(30.0).partition(&points);
    assert_eq!(partition.clusters.len(), 11);
    assert!(partition.clusters.iter().all(|c| c.len() == 1));
}

#[test]
fn distant_point_stays_in_its_own_cluster() {
    let points = points_of(&[(0.0, 0.0), (30.0, 0.0), (500.0, 500.0)]);
    let partition = UnionFindClusterer::naive(50.0).partition(&points);
    assert_eq!(partition.clusters.len(), 2);
    assert_eq!(partition.clusters[0].len(), 2);
    assert_eq!(partition.clusters[1].len(), 1);
}

#[test]
fn union_find_partition_is_permutation_invariant() {
    let points = lcg_points(150, 800.0);
    let mut reversed = points.clone();
    reversed.reverse();
    let mut interleaved: Vec<Point> = Vec::new();
    for i in 0..points.len() {
        interleaved.push(points[(i * 7) % points.len()]);
    }

    let clusterer = UnionFindClusterer::naive(60.0);
    let base = clusterer.partition(&points);
    assert_eq!(base, clusterer.partition(&reversed));
    // The stride-7 walk revisits every index exactly once for 150 points.
    assert_eq!(base, clusterer.partition(&interleaved));
}

#[test]
fn grid_accelerated_scan_matches_naive_scan() {
    let points = lcg_points(250, 1000.0);
    for radius in [15.0, 60.0, 200.0] {
        let naive = UnionFindClusterer::naive(radius).partition(&points);
        let grid = UnionFindClusterer::grid(radius).partition(&points);
        assert_eq!(naive, grid, "partitions diverged at radius {radius}");
    }
}

/// Partition soundness: every cluster is internally chain-connected under the
/// radius, and no two clusters hold a pair within the radius.
#[test]
fn union_find_partition_is_sound() {
    let radius = 60.0f64;
    let radius_sq = radius * radius;
    let points = lcg_points(200, 900.0);
    let partition = UnionFindClusterer::grid(radius).partition(&points);

    assert_eq!(partition.clustered_len(), points.len());

    for cluster in &partition.clusters {
        // BFS over the "within radius" relation must reach every member.
        let n = cluster.len();
        let mut reached = vec![false; n];
        let mut queue = vec![0usize];
        reached[0] = true;
        while let Some(i) = queue.pop() {
            for j in 0..n {
                if !reached[j]
                    && cluster.points[i].distance_sq(&cluster.points[j]) <= radius_sq
                {
                    reached[j] = true;
                    queue.push(j);
                }
            }
        }
        assert!(
            reached.iter().all(|&r| r),
            "cluster of {n} points is not chain-connected"
        );
    }

    for (i, a) in partition.clusters.iter().enumerate() {
        for b in &partition.clusters[i + 1..] {
            for pa in &a.points {
                for pb in &b.points {
                    assert!(
                        pa.distance_sq(pb) > radius_sq,
                        "separate clusters hold a pair within the radius"
                    );
                }
            }
        }
    }
}

#[test]
fn density_clusterer_labels_sparse_points_as_noise() {
    let mut coords = vec![
        (0.0, 0.0),
        (5.0, 0.0),
        (0.0, 5.0),
        (5.0, 5.0),
        (2.0, 2.0),
        // Border point: within eps of a core point, too sparse to be core.
        (12.0, 0.0),
        // Isolated outlier.
        (100.0, 100.0),
    ];
    coords.rotate_left(3);
    let points = points_of(&coords);

    let partition = DensityClusterer::new(10.0, 4).partition(&points);
    eprintln!(
        "density clusters: {:?}, noise: {:?}",
        partition.clusters, partition.noise
    );
    assert_eq!(partition.clusters.len(), 1);
    assert_eq!(partition.clusters[0].len(), 6);
    assert_eq!(partition.noise, points_of(&[(100.0, 100.0)]));
}

#[test]
fn strategies_are_interchangeable_behind_the_trait() {
    let points = points_of(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (4.0, 4.0), (2.0, 2.0)]);
    let strategies: Vec<Box<dyn Clusterer>> = vec![
        Box::new(UnionFindClusterer::naive(10.0)),
        Box::new(UnionFindClusterer::grid(10.0)),
        Box::new(DensityClusterer::new(10.0, 4)),
    ];
    for clusterer in strategies {
        let partition: Partition = clusterer.partition(&points);
        assert_eq!(partition.clusters.len(), 1);
        assert_eq!(partition.clusters[0].len(), 5);
        assert!(partition.noise.is_empty());
    }
}
