//! # Spatial Weights Container
//!
//! This module implements the core spatial weights data structure: a sparse,
//! directed, weighted graph over a fixed set of observation ids.
//!
//! ## Key Components
//!
//! - **SpatialWeights**: per-id neighbor lists with positionally-aligned
//!   weight lists, an iteration-order contract over ids, a memoizing cache of
//!   named weight transformations, and derived characteristics (moments,
//!   cardinalities, islands, asymmetry) kept consistent with the current
//!   weights at all times
//!
//! - **WeightsIter**: a restartable iteration session over per-id
//!   neighbor→weight mappings; every session owns its own position, so
//!   concurrent or repeated sessions over the same container cannot
//!   interfere
//!
//! ## Design
//!
//! - Adjacency rows are `SmallVec`s stored inline up to [`INLINE_ROW`]
//!   entries, keyed by `FxHashMap` for O(1) id lookups
//! - The neighbor-offset cache is guarded by a generation counter on the
//!   ordering: bumping the generation invalidates lazily, and the cache is
//!   rebuilt on the next access
//! - Every mutating operation either fully succeeds or fails without effect
//!
//! Self-loops (an id listing itself as a neighbor) are accepted but carry no
//! defined statistical meaning; the moments are computed by the same rules as
//! for any other edge.
//!
//! ## Example
//!
//! ```rust
//! use rustc_hash::FxHashMap;
//! use spatial_weights::{SpatialWeights, WeightTransform};
//!
//! let mut neighbors = FxHashMap::default();
//! neighbors.insert(0u32, vec![1u32]);
//! neighbors.insert(1u32, vec![0u32, 2u32]);
//! neighbors.insert(2u32, vec![1u32]);
//!
//! let mut w = SpatialWeights::from_neighbors(neighbors).unwrap();
//! assert_eq!(w.s0(), 4.0);
//!
//! w.set_transform(WeightTransform::RowStandardized);
//! assert_eq!(w.weights_of(&1).unwrap(), &[0.5, 0.5]);
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::engine::asymmetry::{self, Asymmetry};
use crate::engine::characteristics::Characteristics;
use crate::engine::errors::WeightsError;
use crate::engine::transform::{self, WeightTransform};

/// Maximum adjacency row length stored inline without a heap allocation.
pub(crate) const INLINE_ROW: usize = 8;

/// A per-id adjacency row.
pub(crate) type Row<T> = SmallVec<[T; INLINE_ROW]>;

/// Neighbor lists keyed by observation id.
pub(crate) type NeighborMap<K> = FxHashMap<K, Row<K>>;

/// Weight lists keyed by observation id, positionally aligned with the
/// neighbor lists: `weights[id][k]` is the weight of the edge to
/// `neighbors[id][k]`.
pub(crate) type WeightMap<K> = FxHashMap<K, Row<f64>>;

/// Bound for observation ids: opaque, hashable, and totally ordered.
///
/// Ids are arbitrary comparable values (integers, strings); nothing assumes a
/// contiguous integer range. The `Ord` bound supplies the default
/// lexicographic iteration order, and `Debug` renders ids into error
/// messages. Implemented for every eligible type via a blanket impl.
pub trait ObservationId: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> ObservationId for T {}

/// A sparse spatial weights container.
///
/// Owns the adjacency data, the iteration-order contract, the transformation
/// cache, and the derived characteristics. Constructed once from
/// caller-supplied neighbor lists (weights optional, defaulting to uniform
/// 1.0); mutated in place only by [`set_transform`](Self::set_transform)
/// (replaces weights wholesale and recomputes characteristics) and
/// [`set_id_order`](Self::set_id_order) (replaces the iteration order and
/// invalidates the offset cache).
///
/// Not safe for concurrent mutation: transform switches and ordering changes
/// mutate shared internal maps in place. Callers needing concurrent readers
/// during a mutation must serialize writers externally.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialWeights<K: ObservationId> {
    /// Neighbor ids per observation.
    neighbors: NeighborMap<K>,
    /// Current (possibly transformed) weights, aligned with `neighbors`.
    weights: WeightMap<K>,
    /// Memoized transformed weight maps. The `Original` entry is the
    /// construction-time snapshot and is never overwritten.
    transformations: FxHashMap<WeightTransform, WeightMap<K>>,
    /// Currently selected transformation, `None` until one is set.
    transform: Option<WeightTransform>,
    /// Iteration order: a permutation of the observation ids.
    id_order: Vec<K>,
    /// Whether the order was set by the caller (as opposed to the
    /// lexicographic default).
    id_order_set: bool,
    /// Bumped on every ordering change; stale caches compare against it.
    order_generation: u64,
    /// Cached positions of each id's neighbors within `id_order`.
    offsets: FxHashMap<K, Vec<usize>>,
    /// Ordering generation the offset cache was built against; `None` until
    /// first built.
    offsets_generation: Option<u64>,
    /// Derived statistics of the current weights.
    characteristics: Characteristics<K>,
}

impl<K: ObservationId> SpatialWeights<K> {
    /// Builds a container from neighbor lists, weight lists, and an optional
    /// explicit iteration order.
    ///
    /// Validation fails fast, before any state is built:
    ///
    /// - every weight list must align with its neighbor list
    ///   ([`WeightsError::LengthMismatch`] /
    ///   [`WeightsError::MissingWeights`]);
    /// - every referenced neighbor must itself be an observation id
    ///   ([`WeightsError::UnknownId`]);
    /// - an explicit `id_order` must be a permutation of the id set
    ///   ([`WeightsError::OrderMismatch`]).
    ///
    /// When `weights` is `None`, every listed edge gets uniform weight 1.0.
    /// When `id_order` is `None`, ids iterate in lexicographic (`Ord`) order
    /// and the order is marked as not user-set.
    pub fn new(
        neighbors: FxHashMap<K, Vec<K>>,
        weights: Option<FxHashMap<K, Vec<f64>>>,
        id_order: Option<Vec<K>>,
    ) -> Result<Self, WeightsError> {
        let neighbors: NeighborMap<K> = neighbors
            .into_iter()
            .map(|(id, row)| (id, Row::from_vec(row)))
            .collect();

        for row in neighbors.values() {
            for j in row {
                if !neighbors.contains_key(j) {
                    return Err(WeightsError::UnknownId(format!("{j:?}")));
                }
            }
        }

        let weights: WeightMap<K> = match weights {
            Some(supplied) => {
                for id in supplied.keys() {
                    if !neighbors.contains_key(id) {
                        return Err(WeightsError::UnknownId(format!("{id:?}")));
                    }
                }
                let mut aligned = WeightMap::default();
                aligned.reserve(neighbors.len());
                for (id, row) in &neighbors {
                    let Some(ws) = supplied.get(id) else {
                        return Err(WeightsError::MissingWeights(format!("{id:?}")));
                    };
                    if ws.len() != row.len() {
                        return Err(WeightsError::LengthMismatch {
                            id: format!("{id:?}"),
                            neighbors: row.len(),
                            weights: ws.len(),
                        });
                    }
                    aligned.insert(id.clone(), Row::from_slice(ws));
                }
                aligned
            }
            None => neighbors
                .iter()
                .map(|(id, row)| (id.clone(), row.iter().map(|_| 1.0).collect()))
                .collect(),
        };

        let (id_order, id_order_set) = match id_order {
            Some(order) => {
                Self::validate_order(&order, &neighbors)?;
                (order, true)
            }
            None => {
                let mut order: Vec<K> = neighbors.keys().cloned().collect();
                order.sort_unstable();
                (order, false)
            }
        };

        let characteristics = Characteristics::compute(&neighbors, &weights, &id_order);
        let mut transformations = FxHashMap::default();
        transformations.insert(WeightTransform::Original, weights.clone());

        Ok(SpatialWeights {
            neighbors,
            weights,
            transformations,
            transform: None,
            id_order,
            id_order_set,
            order_generation: 0,
            offsets: FxHashMap::default(),
            offsets_generation: None,
            characteristics,
        })
    }

    /// Builds a container with uniform weight 1.0 on every listed edge.
    pub fn from_neighbors(neighbors: FxHashMap<K, Vec<K>>) -> Result<Self, WeightsError> {
        Self::new(neighbors, None, None)
    }

    /// Number of observations.
    pub fn n(&self) -> usize {
        self.id_order.len()
    }

    /// Whether the container holds no observations.
    pub fn is_empty(&self) -> bool {
        self.id_order.is_empty()
    }

    /// The current iteration order over observation ids.
    pub fn id_order(&self) -> &[K] {
        &self.id_order
    }

    /// Whether the iteration order was set by the caller.
    pub fn id_order_set(&self) -> bool {
        self.id_order_set
    }

    /// Replaces the iteration order.
    ///
    /// The candidate must contain exactly the container's id set (membership
    /// checked as set equality; duplicates rejected). On mismatch fails with
    /// [`WeightsError::OrderMismatch`] and leaves all state untouched. On
    /// success the order is marked user-set and the neighbor-offset cache
    /// becomes stale (rebuilt lazily on next access).
    pub fn set_id_order(&mut self, ordered_ids: Vec<K>) -> Result<(), WeightsError> {
        Self::validate_order(&ordered_ids, &self.neighbors)?;
        self.id_order = ordered_ids;
        self.id_order_set = true;
        self.order_generation += 1;
        Ok(())
    }

    fn validate_order(candidate: &[K], neighbors: &NeighborMap<K>) -> Result<(), WeightsError> {
        if candidate.len() != neighbors.len() {
            return Err(WeightsError::OrderMismatch);
        }
        let mut seen: FxHashSet<&K> = FxHashSet::default();
        for id in candidate {
            if !neighbors.contains_key(id) || !seen.insert(id) {
                return Err(WeightsError::OrderMismatch);
            }
        }
        Ok(())
    }

    /// The neighbor ids of `id`, in stored order.
    pub fn neighbors_of(&self, id: &K) -> Option<&[K]> {
        self.neighbors.get(id).map(|row| row.as_slice())
    }

    /// The current weights of `id`'s edges, aligned with
    /// [`neighbors_of`](Self::neighbors_of).
    pub fn weights_of(&self, id: &K) -> Option<&[f64]> {
        self.weights.get(id).map(|row| row.as_slice())
    }

    /// Map-style indexing: the neighbor→weight mapping for `id`.
    ///
    /// An island (an id with no neighbors) yields an empty mapping, not an
    /// error; an id that is not an observation is
    /// [`WeightsError::UnknownId`].
    pub fn neighbor_weights(&self, id: &K) -> Result<FxHashMap<K, f64>, WeightsError> {
        if !self.neighbors.contains_key(id) {
            return Err(WeightsError::UnknownId(format!("{id:?}")));
        }
        Ok(self.row_map(id))
    }

    fn row_map(&self, id: &K) -> FxHashMap<K, f64> {
        match (self.neighbors.get(id), self.weights.get(id)) {
            (Some(ns), Some(ws)) => ns.iter().cloned().zip(ws.iter().copied()).collect(),
            _ => FxHashMap::default(),
        }
    }

    /// Starts an iteration session over per-id neighbor→weight mappings,
    /// visiting ids in [`id_order`](Self::id_order).
    ///
    /// Each call returns a fresh session owning its own position, so
    /// overlapping sessions never interfere; restarting is simply calling
    /// `iter()` again.
    pub fn iter(&self) -> WeightsIter<'_, K> {
        WeightsIter {
            container: self,
            position: 0,
        }
    }

    /// The positions of each id's neighbors within the current `id_order`,
    /// aligned with the stored neighbor lists.
    ///
    /// Computed lazily on first access and cached until the next ordering
    /// change (the cache records the ordering generation it was built
    /// against). Consumed by spatial-lag style operators that align neighbor
    /// weights with a value vector ordered by `id_order`.
    pub fn neighbor_offsets(&mut self) -> &FxHashMap<K, Vec<usize>> {
        if self.offsets_generation != Some(self.order_generation) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                generation = self.order_generation,
                "rebuilding neighbor offset cache"
            );
            let mut positions: FxHashMap<&K, usize> = FxHashMap::default();
            positions.reserve(self.id_order.len());
            for (pos, id) in self.id_order.iter().enumerate() {
                positions.insert(id, pos);
            }
            let mut offsets = FxHashMap::default();
            offsets.reserve(self.neighbors.len());
            for (id, row) in &self.neighbors {
                // Every neighbor ref is an observation (validated at
                // construction) and id_order is a permutation of the ids.
                let list: Vec<usize> = row.iter().map(|j| positions[j]).collect();
                offsets.insert(id.clone(), list);
            }
            self.offsets = offsets;
            self.offsets_generation = Some(self.order_generation);
        }
        &self.offsets
    }

    /// The currently selected transformation, `None` until one is set.
    pub fn transform(&self) -> Option<WeightTransform> {
        self.transform
    }

    /// Switches the weights to the given transformation.
    ///
    /// Replaces the weights wholesale and synchronously recomputes every
    /// derived characteristic before returning. The first computation of a
    /// transformation derives it from the *current* weights and memoizes the
    /// result under its kind; re-selecting a memoized kind restores the
    /// cached weights without recomputation. `Original` always restores the
    /// construction-time snapshot bit-identical.
    pub fn set_transform(&mut self, kind: WeightTransform) {
        #[cfg(feature = "tracing")]
        tracing::debug!(transform = %kind, "switching weight transformation");
        let replaced = match self.transformations.get(&kind) {
            Some(cached) => cached.clone(),
            None => {
                let computed = transform::apply(kind, &self.weights, self.id_order.len());
                self.transformations.insert(kind, computed.clone());
                computed
            }
        };
        self.weights = replaced;
        self.transform = Some(kind);
        self.recompute_characteristics();
    }

    /// Switches the weights by one-letter transformation code
    /// (case-insensitive).
    ///
    /// An unrecognized code fails with [`WeightsError::UnsupportedTransform`]
    /// and leaves the weights and characteristics unchanged.
    pub fn set_transform_code(&mut self, code: &str) -> Result<(), WeightsError> {
        let kind: WeightTransform = code.parse()?;
        self.set_transform(kind);
        Ok(())
    }

    fn recompute_characteristics(&mut self) {
        self.characteristics =
            Characteristics::compute(&self.neighbors, &self.weights, &self.id_order);
    }

    /// Scans every directed edge for asymmetries; read-only.
    ///
    /// See [`Asymmetry`] for the distinction between a missing reciprocal and
    /// a value mismatch, and the `nonzero` flag's meaning.
    pub fn asymmetry(&self, nonzero: bool) -> Vec<Asymmetry<K>> {
        asymmetry::detect(&self.neighbors, &self.weights, &self.id_order, nonzero)
    }

    /// The full derived-characteristics record for the current weights.
    pub fn characteristics(&self) -> &Characteristics<K> {
        &self.characteristics
    }

    /// Sum of all weights over directed edges.
    pub fn s0(&self) -> f64 {
        self.characteristics.s0
    }

    /// Half the sum of `(w_ij + w_ji)²` over all directed edges.
    pub fn s1(&self) -> f64 {
        self.characteristics.s1
    }

    /// Sum over ids of squared combined row and column sums.
    pub fn s2(&self) -> f64 {
        self.characteristics.s2
    }

    /// Count of directed edges.
    pub fn nonzero(&self) -> usize {
        self.characteristics.nonzero
    }

    /// `nonzero / n²`.
    pub fn pct_nonzero(&self) -> f64 {
        self.characteristics.pct_nonzero
    }

    /// Neighbor count per observation.
    pub fn cardinalities(&self) -> &FxHashMap<K, usize> {
        &self.characteristics.cardinalities
    }

    /// Ids with no neighbors, in iteration order.
    pub fn islands(&self) -> &[K] {
        &self.characteristics.islands
    }

    /// `(cardinality, count)` bins over the full observed cardinality range.
    pub fn histogram(&self) -> &[(usize, usize)] {
        &self.characteristics.histogram
    }

    /// Largest cardinality.
    pub fn max_neighbors(&self) -> usize {
        self.characteristics.max_neighbors
    }

    /// Smallest cardinality.
    pub fn min_neighbors(&self) -> usize {
        self.characteristics.min_neighbors
    }

    /// Mean cardinality.
    pub fn mean_neighbors(&self) -> f64 {
        self.characteristics.mean_neighbors
    }

    /// Population standard deviation of the cardinalities.
    pub fn sd_neighbors(&self) -> f64 {
        self.characteristics.sd_neighbors
    }

    /// Whether any directed edge lacks a reciprocal.
    pub fn asymmetric(&self) -> bool {
        self.characteristics.asymmetric
    }

    /// The offset cache as last built; callers must warm it via
    /// [`neighbor_offsets`](Self::neighbor_offsets) first.
    pub(crate) fn offsets_cache(&self) -> &FxHashMap<K, Vec<usize>> {
        &self.offsets
    }
}

impl<'a, K: ObservationId> IntoIterator for &'a SpatialWeights<K> {
    type Item = (&'a K, FxHashMap<K, f64>);
    type IntoIter = WeightsIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iteration session over a weights container.
///
/// Yields `(id, neighbor→weight mapping)` in `id_order`. The session owns
/// its own position: it is unaffected by other sessions over the same
/// container.
#[derive(Debug, Clone)]
pub struct WeightsIter<'a, K: ObservationId> {
    container: &'a SpatialWeights<K>,
    position: usize,
}

impl<'a, K: ObservationId> Iterator for WeightsIter<'a, K> {
    type Item = (&'a K, FxHashMap<K, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.container.id_order.get(self.position)?;
        self.position += 1;
        Some((id, self.container.row_map(id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.container.id_order.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<K: ObservationId> ExactSizeIterator for WeightsIter<'_, K> {}
