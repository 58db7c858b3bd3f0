//! Weight transformations.
//!
//! A transformation replaces every weight in the container according to a
//! named normalization scheme. The set of schemes is closed: dispatch is an
//! exhaustive match over [`WeightTransform`], and the only open-ended failure
//! mode left is parsing a one-letter code from callers that still traffic in
//! the conventional `"R"`/`"B"` strings.
//!
//! All kernels compute from an immutable pre-transform snapshot; no row ever
//! observes a partially-updated sibling row.

use std::fmt;
use std::str::FromStr;

use crate::engine::errors::WeightsError;
use crate::engine::weights::{ObservationId, Row, WeightMap};

/// A weight normalization scheme.
///
/// The one-letter codes are the conventional names used by spatial
/// econometrics tooling:
///
/// - `O` — original weights as supplied at construction
/// - `B` — binary: every edge weight becomes 1.0
/// - `R` — row-standardized: each row sums to 1.0
/// - `D` — doubly-standardized: the global sum is 1.0
/// - `V` — variance-stabilizing: rows scaled by the root of their squared
///   sum, then globally rescaled so the total equals the observation count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeightTransform {
    /// Restore the construction-time weights.
    Original,
    /// Unit weight on every edge, preserving adjacency structure.
    Binary,
    /// Each weight divided by its row sum.
    RowStandardized,
    /// Each weight divided by the global sum of all weights.
    DoublyStandardized,
    /// Rows scaled to unit squared sum, then globally rescaled to sum to n.
    VarianceStabilizing,
}

impl WeightTransform {
    /// The conventional one-letter code for this transformation.
    pub fn code(self) -> char {
        match self {
            WeightTransform::Original => 'O',
            WeightTransform::Binary => 'B',
            WeightTransform::RowStandardized => 'R',
            WeightTransform::DoublyStandardized => 'D',
            WeightTransform::VarianceStabilizing => 'V',
        }
    }
}

impl fmt::Display for WeightTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for WeightTransform {
    type Err = WeightsError;

    /// Parses a one-letter transformation code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "O" => Ok(WeightTransform::Original),
            "B" => Ok(WeightTransform::Binary),
            "R" => Ok(WeightTransform::RowStandardized),
            "D" => Ok(WeightTransform::DoublyStandardized),
            "V" => Ok(WeightTransform::VarianceStabilizing),
            _ => Err(WeightsError::UnsupportedTransform(s.to_string())),
        }
    }
}

/// Computes the transformed weight map from a pre-transform snapshot.
///
/// `n` is the observation count, used only by the variance-stabilizing
/// scheme. `Original` is handled by the container (it restores the fixed
/// construction snapshot rather than recomputing anything) but is still a
/// valid input here and degrades to an identity copy.
pub(crate) fn apply<K: ObservationId>(
    kind: WeightTransform,
    snapshot: &WeightMap<K>,
    n: usize,
) -> WeightMap<K> {
    match kind {
        WeightTransform::Original => snapshot.clone(),
        WeightTransform::Binary => binary(snapshot),
        WeightTransform::RowStandardized => row_standardized(snapshot),
        WeightTransform::DoublyStandardized => doubly_standardized(snapshot),
        WeightTransform::VarianceStabilizing => variance_stabilizing(snapshot, n),
    }
}

fn binary<K: ObservationId>(snapshot: &WeightMap<K>) -> WeightMap<K> {
    snapshot
        .iter()
        .map(|(id, row)| (id.clone(), row.iter().map(|_| 1.0).collect()))
        .collect()
}

fn row_standardized<K: ObservationId>(snapshot: &WeightMap<K>) -> WeightMap<K> {
    snapshot
        .iter()
        .map(|(id, row)| {
            let row_sum: f64 = row.iter().sum();
            // Zero-sum rows keep their zero weights; only reachable when the
            // snapshot contains explicit zeros.
            let scaled = if row_sum == 0.0 {
                row.clone()
            } else {
                row.iter().map(|w| w / row_sum).collect()
            };
            (id.clone(), scaled)
        })
        .collect()
}

fn doubly_standardized<K: ObservationId>(snapshot: &WeightMap<K>) -> WeightMap<K> {
    let s0: f64 = snapshot.values().flat_map(|row| row.iter()).sum();
    if s0 == 0.0 {
        return snapshot.clone();
    }
    let scale = 1.0 / s0;
    snapshot
        .iter()
        .map(|(id, row)| (id.clone(), row.iter().map(|w| w * scale).collect()))
        .collect()
}

fn variance_stabilizing<K: ObservationId>(snapshot: &WeightMap<K>, n: usize) -> WeightMap<K> {
    // First pass: scale each row by the root of its squared sum and
    // accumulate the global total Q of the scaled weights.
    let mut scaled: WeightMap<K> = WeightMap::default();
    let mut q_total = 0.0;
    for (id, row) in snapshot {
        let sq_sum: f64 = row.iter().map(|w| w * w).sum();
        let q = sq_sum.sqrt();
        let s_row: Row<f64> = if q == 0.0 {
            row.clone()
        } else {
            row.iter().map(|w| w / q).collect()
        };
        q_total += s_row.iter().sum::<f64>();
        scaled.insert(id.clone(), s_row);
    }

    // Second pass: rescale so the global sum equals the observation count.
    let factor = if q_total == 0.0 {
        1.0
    } else {
        n as f64 / q_total
    };
    for row in scaled.values_mut() {
        for w in row.iter_mut() {
            *w *= factor;
        }
    }
    scaled
}
