//! Density-reachability clustering: chains of dense neighborhoods form clusters,
//! sparse leftovers are labeled noise instead of being forced into a group.

use super::{Clusterer, Partition};
use crate::geom::Point;

const UNCLAIMED: usize = usize::MAX;
const NOISE: usize = usize::MAX - 1;

/// Classic DBSCAN rule: a point is a core point if its eps-neighborhood
/// (itself included) holds at least `min_pts` points; clusters grow by chaining
/// reachability from core points, border points join a reachable core's cluster.
#[derive(Debug, Clone)]
pub struct DensityClusterer {
    pub eps: f64,
    pub min_pts: usize,
}

impl DensityClusterer {
    pub fn new(eps: f64, min_pts: usize) -> Self {
        Self { eps, min_pts }
    }

    fn neighborhood(&self, points: &[Point], i: usize) -> Vec<usize> {
        let eps_sq = self.eps * self.eps;
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| points[i].distance_sq(p) <= eps_sq)
            .map(|(j, _)| j)
            .collect()
    }
}

impl Clusterer for DensityClusterer {
    fn partition(&self, points: &[Point]) -> Partition {
        let mut label = vec![UNCLAIMED; points.len()];
        let mut cluster_count = 0usize;

        for i in 0..points.len() {
            if label[i] != UNCLAIMED {
                continue;
            }
            let seeds = self.neighborhood(points, i);
            if seeds.len() < self.min_pts {
                label[i] = NOISE;
                continue;
            }

            let id = cluster_count;
            cluster_count += 1;
            label[i] = id;

            let mut frontier = seeds;
            let mut cursor = 0;
            while cursor < frontier.len() {
                let j = frontier[cursor];
                cursor += 1;

                if label[j] == NOISE {
                    // Border point: reachable from a core point, not core itself.
                    label[j] = id;
                    continue;
                }
                if label[j] != UNCLAIMED {
                    continue;
                }
                label[j] = id;

                let reachable = self.neighborhood(points, j);
                if reachable.len() >= self.min_pts {
                    frontier.extend(reachable);
                }
            }
        }

        let mut groups: Vec<Vec<Point>> = vec![Vec::new(); cluster_count];
        let mut noise = Vec::new();
        for (i, p) in points.iter().enumerate() {
            match label[i] {
                NOISE => noise.push(*p),
                id => groups[id].push(*p),
            }
        }
        log::debug!(
            "density: {} points -> {} clusters, {} noise (eps {}, min_pts {})",
            points.len(),
            cluster_count,
            noise.len(),
            self.eps,
            self.min_pts
        );

        Partition::from_groups(groups, noise)
    }
}
