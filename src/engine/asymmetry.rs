//! Asymmetry detection over the directed edge set.
//!
//! A weights container is symmetric when every directed edge `(i, j)` has a
//! reciprocal `(j, i)` carrying the same weight. The scan here reports every
//! violation, distinguishing a reciprocal that is *missing* from one that is
//! present with a mismatched value. It is read-only and is also how the
//! container derives its `asymmetric` flag (with `nonzero = true`, where only
//! presence of both directions is checked).

use crate::engine::weights::{NeighborMap, ObservationId, WeightMap};

/// A single asymmetric directed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Asymmetry<K> {
    /// The reverse edge does not exist: `i` is not among `j`'s neighbors.
    MissingReciprocal {
        /// The directed edge `(i, j)` whose reciprocal is absent.
        edge: (K, K),
    },
    /// Both directions exist but carry different weights.
    ValueMismatch {
        /// The directed edge `(i, j)`.
        edge: (K, K),
        /// The reciprocal edge `(j, i)`.
        reciprocal: (K, K),
    },
}

impl<K> Asymmetry<K> {
    /// The directed edge this asymmetry was detected on.
    pub fn edge(&self) -> &(K, K) {
        match self {
            Asymmetry::MissingReciprocal { edge } => edge,
            Asymmetry::ValueMismatch { edge, .. } => edge,
        }
    }
}

/// Scans every directed edge for asymmetries.
///
/// Output order follows `id_order` and, within an id, the stored neighbor
/// list order. With `nonzero` set, a present reciprocal passes regardless of
/// value; otherwise weights are compared for exact equality.
pub(crate) fn detect<K: ObservationId>(
    neighbors: &NeighborMap<K>,
    weights: &WeightMap<K>,
    id_order: &[K],
    nonzero: bool,
) -> Vec<Asymmetry<K>> {
    let mut asymmetries = Vec::new();
    for i in id_order {
        let (Some(row_neighbors), Some(row_weights)) = (neighbors.get(i), weights.get(i)) else {
            continue;
        };
        for (pos, j) in row_neighbors.iter().enumerate() {
            let w_ij = row_weights[pos];
            let reciprocal_pos = neighbors
                .get(j)
                .and_then(|js| js.iter().position(|candidate| candidate == i));
            match reciprocal_pos {
                None => asymmetries.push(Asymmetry::MissingReciprocal {
                    edge: (i.clone(), j.clone()),
                }),
                Some(ji) if !nonzero => {
                    let w_ji = weights
                        .get(j)
                        .and_then(|ws| ws.get(ji))
                        .copied()
                        .unwrap_or(0.0);
                    // Exact comparison: value asymmetry is a data condition,
                    // not a tolerance question.
                    if w_ij != w_ji {
                        asymmetries.push(Asymmetry::ValueMismatch {
                            edge: (i.clone(), j.clone()),
                            reciprocal: (j.clone(), i.clone()),
                        });
                    }
                }
                Some(_) => {}
            }
        }
    }
    asymmetries
}
