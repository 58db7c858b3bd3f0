//! Dense expansion and spatial-lag helpers built on the container's public
//! contract.

use rustc_hash::FxHashMap;

use crate::engine::errors::WeightsError;
use crate::engine::weights::{ObservationId, SpatialWeights};

/// Expands the sparse weights into a dense n×n matrix.
///
/// Rows and columns are indexed by `id_order` position; the returned id list
/// is the ordering the matrix is aligned to. Entries without an edge are 0.
pub fn full<K: ObservationId>(w: &SpatialWeights<K>) -> (Vec<Vec<f64>>, Vec<K>) {
    let ids = w.id_order().to_vec();
    let n = ids.len();
    let positions: FxHashMap<&K, usize> =
        ids.iter().enumerate().map(|(pos, id)| (id, pos)).collect();
    let mut matrix = vec![vec![0.0; n]; n];
    for (row, id) in ids.iter().enumerate() {
        let (Some(row_neighbors), Some(row_weights)) = (w.neighbors_of(id), w.weights_of(id))
        else {
            continue;
        };
        for (j, w_ij) in row_neighbors.iter().zip(row_weights) {
            matrix[row][positions[j]] = *w_ij;
        }
    }
    (matrix, ids)
}

/// Computes the spatial lag of a value vector.
///
/// `y` must be aligned to `id_order` (one value per observation, in order);
/// the result is aligned the same way: `lag[i] = Σ_k w[i][k] · y[pos(k)]`.
/// With row-standardized weights this is the weighted neighbor mean.
///
/// Takes `&mut` because it goes through the lazily-built neighbor-offset
/// cache.
pub fn lag<K: ObservationId>(
    w: &mut SpatialWeights<K>,
    y: &[f64],
) -> Result<Vec<f64>, WeightsError> {
    let n = w.n();
    if y.len() != n {
        return Err(WeightsError::ValueAlignment {
            expected: n,
            actual: y.len(),
        });
    }
    w.neighbor_offsets();
    let offsets = w.offsets_cache();
    let mut lagged = vec![0.0; n];
    for (i, id) in w.id_order().iter().enumerate() {
        let (Some(row_weights), Some(row_offsets)) = (w.weights_of(id), offsets.get(id)) else {
            continue;
        };
        lagged[i] = row_weights
            .iter()
            .zip(row_offsets)
            .map(|(w_ij, &pos)| w_ij * y[pos])
            .sum();
    }
    Ok(lagged)
}
