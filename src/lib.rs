//! Spot clustering and canonical-orientation alignment for raster images of
//! bright markers: detect spots, partition them into spatially coherent groups,
//! crop each group, and rotate a group so its dominant hull edge sits
//! horizontal with a consistent up/down orientation.

pub mod cluster;
pub mod config;
pub mod detect;
pub mod extract;
pub mod geom;
pub mod orient;
pub mod pipeline;
pub mod plot;
pub mod synth;
