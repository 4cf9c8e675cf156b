//! Spatial clustering of detected spots behind a single partition contract.
//!
//! Strategy selection is an explicit construction-time choice (see
//! [`crate::config::ClusterStrategy`]); every strategy yields the same kind of
//! [`Partition`], differing only in whether outliers can be labeled noise.

pub mod density;
pub mod union_find;

use crate::geom::{self, Point};

pub use density::DensityClusterer;
pub use union_find::UnionFindClusterer;

/// A group of spots sharing one cluster identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub points: Vec<Point>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> Option<Point> {
        geom::centroid(&self.points)
    }
}

/// Disjoint clusters plus the points no strategy claimed. `noise` is always
/// empty for the union-find strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub clusters: Vec<Cluster>,
    pub noise: Vec<Point>,
}

impl Partition {
    /// Normalizes raw groups into a deterministic partition: points sorted
    /// within each cluster, clusters ordered by their smallest member. This
    /// makes group indices stable under permutation of the input.
    pub(crate) fn from_groups(groups: Vec<Vec<Point>>, mut noise: Vec<Point>) -> Self {
        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(|mut points| {
                points.sort_by(|a, b| a.cmp_xy(b));
                Cluster { points }
            })
            .collect();
        clusters.sort_by(|a, b| a.points[0].cmp_xy(&b.points[0]));
        noise.sort_by(|a, b| a.cmp_xy(b));
        Self { clusters, noise }
    }

    /// Total number of clustered (non-noise) points.
    pub fn clustered_len(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

/// The single "partition points into groups" capability all strategies share.
pub trait Clusterer {
    fn partition(&self, points: &[Point]) -> Partition;
}
