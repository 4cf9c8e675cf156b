//! Tunable pipeline parameters. Supplied by the surrounding application,
//! typically as JSON; every numeric knob is validated at this boundary rather
//! than clamped inside the algorithms.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::cluster::{Clusterer, DensityClusterer, UnionFindClusterer};

const DEFAULT_THRESHOLD: u8 = 60;
const DEFAULT_GROUP_RADIUS: f64 = 50.0;
const DEFAULT_MIN_DOTS: usize = 100;
const DEFAULT_MARGIN: f64 = 50.0;
const DEFAULT_MIN_PTS: usize = 4;
const DEFAULT_CIRCLE_WIDTH: u32 = 8;
const DEFAULT_CIRCLE_COLOR: [u8; 4] = [0, 128, 0, 255];

/// Which clustering strategy the pipeline is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterStrategy {
    /// All-pairs union-find merge under `group_radius`.
    #[default]
    UnionFind,
    /// Same partition as `union-find`, computed with a spatial grid index.
    GridUnionFind,
    /// Density reachability with `group_radius` as eps; outliers become noise.
    Density,
}

/// Errors raised when a configuration fails validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
}

/// Pipeline configuration.
///
/// `group_radius` is the union-find merge radius (or density eps); `margin` is
/// the crop expansion applied around each retained cluster. `circle_color` and
/// `circle_width` only affect the annotated visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotConfig {
    pub threshold: u8,
    pub group_radius: f64,
    pub min_dots: usize,
    pub margin: f64,
    pub min_pts: usize,
    pub strategy: ClusterStrategy,
    pub circle_color: [u8; 4],
    pub circle_width: u32,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            group_radius: DEFAULT_GROUP_RADIUS,
            min_dots: DEFAULT_MIN_DOTS,
            margin: DEFAULT_MARGIN,
            min_pts: DEFAULT_MIN_PTS,
            strategy: ClusterStrategy::default(),
            circle_color: DEFAULT_CIRCLE_COLOR,
            circle_width: DEFAULT_CIRCLE_WIDTH,
        }
    }
}

impl SpotConfig {
    /// Rejects non-positive or non-finite parameters. Nothing downstream clamps,
    /// so an invalid value must never make it past this point.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("threshold", self.threshold as f64),
            ("group_radius", self.group_radius),
            ("min_dots", self.min_dots as f64),
            ("margin", self.margin),
            ("min_pts", self.min_pts as f64),
            ("circle_width", self.circle_width as f64),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }

    /// Builds the configured clustering strategy.
    pub fn clusterer(&self) -> Box<dyn Clusterer> {
        match self.strategy {
            ClusterStrategy::UnionFind => Box::new(UnionFindClusterer::naive(self.group_radius)),
            ClusterStrategy::GridUnionFind => Box::new(UnionFindClusterer::grid(self.group_radius)),
            ClusterStrategy::Density => {
                Box::new(DensityClusterer::new(self.group_radius, self.min_pts))
            }
        }
    }

    pub fn annotation_color(&self) -> Rgba<u8> {
        Rgba(self.circle_color)
    }
}
