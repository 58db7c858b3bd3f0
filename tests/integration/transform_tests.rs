//! Transform engine behavior through the public API.

use approx::assert_relative_eq;
use rustc_hash::FxHashMap;
use spatial_weights::{SpatialWeights, WeightTransform, WeightsError};

/// Rook-contiguity lattice: id = row * cols + col.
fn lattice(rows: usize, cols: usize) -> SpatialWeights<usize> {
    let mut neighbors: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for r in 0..rows {
        for c in 0..cols {
            let id = r * cols + c;
            let mut adjacent = Vec::new();
            if r > 0 {
                adjacent.push(id - cols);
            }
            if r + 1 < rows {
                adjacent.push(id + cols);
            }
            if c > 0 {
                adjacent.push(id - 1);
            }
            if c + 1 < cols {
                adjacent.push(id + 1);
            }
            neighbors.insert(id, adjacent);
        }
    }
    SpatialWeights::from_neighbors(neighbors).unwrap()
}

#[test]
fn row_standardized_rows_sum_to_one() {
    let mut w = lattice(3, 3);
    w.set_transform(WeightTransform::RowStandardized);
    for id in w.id_order().to_vec() {
        let row_sum: f64 = w.weights_of(&id).unwrap().iter().sum();
        assert_relative_eq!(row_sum, 1.0, max_relative = 1e-12);
    }
}

#[test]
fn doubly_standardized_s0_is_one() {
    let mut w = lattice(3, 3);
    w.set_transform(WeightTransform::DoublyStandardized);
    assert_relative_eq!(w.s0(), 1.0, max_relative = 1e-12);
}

#[test]
fn variance_stabilizing_s0_equals_n() {
    let mut w = lattice(3, 3);
    w.set_transform(WeightTransform::VarianceStabilizing);
    assert_relative_eq!(w.s0(), w.n() as f64, max_relative = 1e-9);
}

#[test]
fn binary_restores_unit_weights_after_standardization() {
    let mut w = lattice(3, 3);
    w.set_transform(WeightTransform::RowStandardized);
    w.set_transform(WeightTransform::Binary);
    for id in w.id_order().to_vec() {
        assert!(w.weights_of(&id).unwrap().iter().all(|&v| v == 1.0));
    }
    assert_eq!(w.s0(), w.nonzero() as f64);
}

#[test]
fn original_round_trip_is_bit_identical() {
    let mut neighbors: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
    neighbors.insert(0, vec![1]);
    neighbors.insert(1, vec![0, 2]);
    neighbors.insert(2, vec![1]);
    let mut weights: FxHashMap<u32, Vec<f64>> = FxHashMap::default();
    weights.insert(0, vec![0.123_456_789]);
    weights.insert(1, vec![0.987_654_321, 1.0 / 3.0]);
    weights.insert(2, vec![2.0 / 7.0]);

    let mut w = SpatialWeights::new(neighbors, Some(weights.clone()), None).unwrap();
    w.set_transform(WeightTransform::VarianceStabilizing);
    w.set_transform(WeightTransform::DoublyStandardized);
    w.set_transform(WeightTransform::RowStandardized);
    w.set_transform(WeightTransform::Original);

    for (id, expected) in &weights {
        assert_eq!(w.weights_of(id).unwrap(), expected.as_slice());
    }
}

#[test]
fn repeated_selection_reuses_the_cache_and_characteristics_match() {
    let mut w = lattice(3, 3);
    w.set_transform(WeightTransform::VarianceStabilizing);
    let first = w.characteristics().clone();

    w.set_transform(WeightTransform::VarianceStabilizing);
    assert_eq!(w.characteristics(), &first);
}

#[test]
fn characteristics_follow_every_switch() {
    let mut w = lattice(3, 3);
    let binary_s1 = w.s1();

    w.set_transform(WeightTransform::RowStandardized);
    assert_ne!(w.s1(), binary_s1, "s1 must reflect the standardized weights");

    w.set_transform(WeightTransform::Original);
    assert_eq!(w.s1(), binary_s1, "restoring the original restores the moments");
}

#[test]
fn unsupported_code_reports_and_preserves_state() {
    let mut w = lattice(2, 2);
    w.set_transform(WeightTransform::RowStandardized);
    let chars_before = w.characteristics().clone();

    let err = w.set_transform_code("standardize-harder").unwrap_err();
    assert!(matches!(err, WeightsError::UnsupportedTransform(_)));
    assert_eq!(w.characteristics(), &chars_before);
    assert_eq!(w.transform(), Some(WeightTransform::RowStandardized));
}

#[test]
fn transform_codes_drive_the_engine() {
    let mut w = lattice(2, 2);
    w.set_transform_code("r").unwrap();
    let row_sum: f64 = w.weights_of(&0).unwrap().iter().sum();
    assert_relative_eq!(row_sum, 1.0);
    w.set_transform_code("b").unwrap();
    assert_eq!(w.weights_of(&0).unwrap(), &[1.0, 1.0]);
}
