//! Contiguity-order graph algorithms.
//!
//! These consume only the neighbor topology and iteration order of a weights
//! container — weights are treated as structure, not magnitude. Orders are
//! reported in vectors aligned to `id_order` positions: `-1` marks an id's
//! own position, a positive value is the shortest contiguity order (hop
//! count) to that id, and `0` means unreachable (or beyond the requested
//! maximum order).

use rustc_hash::FxHashMap;

use crate::engine::errors::WeightsError;
use crate::engine::weights::{ObservationId, SpatialWeights};

/// Shortest contiguity order between every pair of observations.
///
/// Returns one vector per id, in `id_order`, each indexed by `id_order`
/// position.
pub fn shimbel<K: ObservationId>(w: &SpatialWeights<K>) -> Vec<Vec<i64>> {
    let positions = position_index(w.id_order());
    w.id_order()
        .iter()
        .map(|id| contiguity_orders(w, id, usize::MAX, &positions))
        .collect()
}

/// Shortest contiguity orders up to `kmax`, keyed by observation id.
///
/// Ids more than `kmax` hops away keep the unreachable marker `0`.
pub fn order<K: ObservationId>(w: &SpatialWeights<K>, kmax: usize) -> FxHashMap<K, Vec<i64>> {
    let positions = position_index(w.id_order());
    w.id_order()
        .iter()
        .map(|id| (id.clone(), contiguity_orders(w, id, kmax, &positions)))
        .collect()
}

/// Builds the order-`k` contiguity container: each id's neighbors are
/// exactly the ids at shortest contiguity order `k`, with binary weight 1.0.
///
/// `k` below 1 is rejected with [`WeightsError::InvalidOrder`].
pub fn higher_order<K: ObservationId>(
    w: &SpatialWeights<K>,
    k: usize,
) -> Result<SpatialWeights<K>, WeightsError> {
    if k < 1 {
        return Err(WeightsError::InvalidOrder(k));
    }
    let positions = position_index(w.id_order());
    let target = k as i64;
    let mut neighbors: FxHashMap<K, Vec<K>> = FxHashMap::default();
    neighbors.reserve(w.n());
    for id in w.id_order() {
        let orders = contiguity_orders(w, id, k, &positions);
        let at_k: Vec<K> = w
            .id_order()
            .iter()
            .zip(&orders)
            .filter(|(_, &order)| order == target)
            .map(|(j, _)| j.clone())
            .collect();
        neighbors.insert(id.clone(), at_k);
    }
    SpatialWeights::new(neighbors, None, None)
}

fn position_index<K: ObservationId>(id_order: &[K]) -> FxHashMap<&K, usize> {
    id_order.iter().enumerate().map(|(pos, id)| (id, pos)).collect()
}

/// Level-by-level breadth-first expansion from `start`, bounded by `kmax`.
fn contiguity_orders<'a, K: ObservationId>(
    w: &'a SpatialWeights<K>,
    start: &'a K,
    kmax: usize,
    positions: &FxHashMap<&'a K, usize>,
) -> Vec<i64> {
    let mut orders = vec![0i64; w.n()];
    orders[positions[start]] = -1;
    let mut frontier: Vec<&K> = vec![start];
    let mut level = 0usize;
    while !frontier.is_empty() && level < kmax {
        level += 1;
        let mut next = Vec::new();
        for id in frontier {
            let Some(row) = w.neighbors_of(id) else {
                continue;
            };
            for j in row {
                let pos = positions[j];
                if orders[pos] == 0 && j != start {
                    orders[pos] = level as i64;
                    next.push(j);
                }
            }
        }
        frontier = next;
    }
    orders
}
