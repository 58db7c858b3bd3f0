//! Error types for spatial weights operations.

use thiserror::Error;

/// Errors that can occur constructing or mutating a weights container.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// All failures are raised synchronously at the call that triggers them and
/// leave the container unchanged; these are contract violations, not
/// transient faults, so there is no retry story. Variants carry ids as
/// pre-rendered `String`s so the error type stays non-generic over the id
/// parameter.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WeightsError {
    /// A candidate `id_order` whose element set differs from the container's
    /// id set (missing ids, unknown ids, or duplicates).
    #[error("id order mismatch: ordered ids do not align with container ids")]
    OrderMismatch,

    /// A transformation code outside the supported set (O, B, R, D, V).
    #[error("unsupported weights transformation: {0:?}")]
    UnsupportedTransform(String),

    /// A neighbor list and its weight list disagree in length for some id.
    #[error("length mismatch for id {id}: {neighbors} neighbors vs {weights} weights")]
    LengthMismatch {
        /// The offending observation id.
        id: String,
        /// Neighbor list length.
        neighbors: usize,
        /// Weight list length.
        weights: usize,
    },

    /// A supplied weights mapping has no entry for an observation id.
    #[error("no weights supplied for id {0}")]
    MissingWeights(String),

    /// An id that is not an observation in the container (an unknown lookup
    /// key, a weights entry without a neighbor list, or a neighbor reference
    /// to a non-observation).
    #[error("unknown id: {0}")]
    UnknownId(String),

    /// A value vector that is not aligned with the observation count.
    #[error("value vector length {actual} does not match observation count {expected}")]
    ValueAlignment {
        /// The container's observation count.
        expected: usize,
        /// The supplied vector length.
        actual: usize,
    },

    /// A contiguity order below 1.
    #[error("contiguity order must be at least 1, got {0}")]
    InvalidOrder(usize),
}
