//! # Spatial Weights
//!
//! A sparse, directed, weighted graph over a fixed set of observation ids,
//! expressing neighbor relationships and their strengths for
//! spatial-statistics computations (spatial autocorrelation, spatial lag
//! operators).
//!
//! The [`SpatialWeights`] container stores per-id neighbor lists with
//! positionally-aligned weights, supports in-place weight normalization
//! through a closed set of [`WeightTransform`] schemes, and keeps the derived
//! moments (`s0`, `s1`, `s2`), cardinality statistics, island set, and
//! asymmetry flag consistent with the current weights at all times.
//! [`contiguity`] holds the order-of-contiguity graph algorithms and
//! [`util`] the dense-matrix expansion and spatial-lag helpers that consume
//! the container's public contract.

pub mod contiguity;
pub mod engine;
pub mod util;

// Re-export commonly used types
pub use engine::asymmetry::Asymmetry;
pub use engine::characteristics::Characteristics;
pub use engine::errors::WeightsError;
pub use engine::transform::WeightTransform;
pub use engine::weights::{ObservationId, SpatialWeights, WeightsIter};
