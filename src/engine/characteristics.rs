//! Derived characteristics of a weights container.
//!
//! Computes, in a single pass over the iteration order, the scalar moments
//! (`s0`, `s1`, `s2`) consumed by spatial-autocorrelation test statistics
//! together with the cardinality distribution, island set, and asymmetry
//! flag. The container recomputes these synchronously on every weights
//! change, so readers never observe values that are stale with respect to
//! the current weights.

use rustc_hash::FxHashMap;

use crate::engine::asymmetry;
use crate::engine::weights::{NeighborMap, ObservationId, WeightMap};

/// Summary statistics of the current weights, recomputed on every weights
/// change.
///
/// Internal consistency invariants, maintained by construction:
/// `nonzero == Σ cardinalities` and `Σ histogram counts == n`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Characteristics<K: std::cmp::Eq + std::hash::Hash> {
    /// Number of observations.
    pub n: usize,
    /// Neighbor count per observation id.
    pub cardinalities: FxHashMap<K, usize>,
    /// Ids with no neighbors, in iteration order.
    pub islands: Vec<K>,
    /// Largest cardinality (0 for an empty container).
    pub max_neighbors: usize,
    /// Smallest cardinality (0 for an empty container).
    pub min_neighbors: usize,
    /// Arithmetic mean cardinality.
    pub mean_neighbors: f64,
    /// Population standard deviation of the cardinalities.
    pub sd_neighbors: f64,
    /// `(cardinality, count)` for every integer cardinality in
    /// `[min_neighbors, max_neighbors]`, zero-count bins included.
    pub histogram: Vec<(usize, usize)>,
    /// Total count of directed edges.
    pub nonzero: usize,
    /// `nonzero / n²`.
    pub pct_nonzero: f64,
    /// Sum of all weights over directed edges.
    pub s0: f64,
    /// Half the sum of `(w_ij + w_ji)²` over all directed edges.
    pub s1: f64,
    /// Sum over ids of `(row_sum + col_sum)²`, where both sums range over the
    /// id's own neighbor list (outgoing weights and the reciprocals found for
    /// them).
    pub s2: f64,
    /// Whether any directed edge lacks a reciprocal.
    pub asymmetric: bool,
}

impl<K: ObservationId> Characteristics<K> {
    /// Computes all characteristics for the given adjacency in one pass over
    /// `id_order`.
    pub(crate) fn compute(
        neighbors: &NeighborMap<K>,
        weights: &WeightMap<K>,
        id_order: &[K],
    ) -> Self {
        let n = id_order.len();
        let mut cardinalities = FxHashMap::default();
        cardinalities.reserve(n);
        let mut s0 = 0.0;
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        let mut nonzero = 0usize;

        for i in id_order {
            let (Some(row_neighbors), Some(row_weights)) = (neighbors.get(i), weights.get(i))
            else {
                continue;
            };
            cardinalities.insert(i.clone(), row_neighbors.len());

            // Row and column sums for i both range over i's own neighbor
            // list: outgoing weights and the reciprocals found for them.
            let mut row_sum = 0.0;
            let mut col_sum = 0.0;
            for (pos, j) in row_neighbors.iter().enumerate() {
                let w_ij = row_weights[pos];
                let w_ji = neighbors
                    .get(j)
                    .and_then(|js| js.iter().position(|candidate| candidate == i))
                    .and_then(|ji| weights.get(j).and_then(|ws| ws.get(ji)))
                    .copied()
                    .unwrap_or(0.0);
                let paired = w_ij + w_ji;
                s1 += paired * paired;
                s0 += w_ij;
                row_sum += w_ij;
                col_sum += w_ji;
                nonzero += 1;
            }
            let combined = row_sum + col_sum;
            s2 += combined * combined;
        }
        // Each undirected pair was visited once from each side.
        s1 /= 2.0;

        let max_neighbors = cardinalities.values().copied().max().unwrap_or(0);
        let min_neighbors = cardinalities.values().copied().min().unwrap_or(0);
        let mean_neighbors = if n == 0 {
            0.0
        } else {
            nonzero as f64 / n as f64
        };
        let sd_neighbors = if n == 0 {
            0.0
        } else {
            let variance = cardinalities
                .values()
                .map(|&c| {
                    let d = c as f64 - mean_neighbors;
                    d * d
                })
                .sum::<f64>()
                / n as f64;
            variance.sqrt()
        };

        let histogram = if n == 0 {
            Vec::new()
        } else {
            let mut counts = vec![0usize; max_neighbors - min_neighbors + 1];
            for &c in cardinalities.values() {
                counts[c - min_neighbors] += 1;
            }
            counts
                .into_iter()
                .enumerate()
                .map(|(offset, count)| (min_neighbors + offset, count))
                .collect()
        };

        let islands = id_order
            .iter()
            .filter(|id| cardinalities.get(*id).copied() == Some(0))
            .cloned()
            .collect();

        let pct_nonzero = if n == 0 {
            0.0
        } else {
            nonzero as f64 / (n * n) as f64
        };

        let asymmetric = !asymmetry::detect(neighbors, weights, id_order, true).is_empty();

        Characteristics {
            n,
            cardinalities,
            islands,
            max_neighbors,
            min_neighbors,
            mean_neighbors,
            sd_neighbors,
            histogram,
            nonzero,
            pct_nonzero,
            s0,
            s1,
            s2,
            asymmetric,
        }
    }
}
