//! End-to-end container behavior: construction, ordering, iteration,
//! indexing, and the characteristics contract.

use rustc_hash::FxHashMap;
use spatial_weights::{Asymmetry, SpatialWeights, WeightsError};

fn neighbor_input(rows: &[(u32, &[u32])]) -> FxHashMap<u32, Vec<u32>> {
    rows.iter().map(|(id, ns)| (*id, ns.to_vec())).collect()
}

fn weight_input(rows: &[(u32, &[f64])]) -> FxHashMap<u32, Vec<f64>> {
    rows.iter().map(|(id, ws)| (*id, ws.to_vec())).collect()
}

#[test]
fn path_graph_characteristics() {
    let w = SpatialWeights::new(
        neighbor_input(&[(0, &[1]), (1, &[0, 2]), (2, &[1])]),
        Some(weight_input(&[(0, &[1.0]), (1, &[1.0, 1.0]), (2, &[1.0])])),
        None,
    )
    .unwrap();

    assert_eq!(w.n(), 3);
    assert_eq!(w.nonzero(), 4);
    assert_eq!(w.s0(), 4.0);
    assert!(w.islands().is_empty());
    assert_eq!(w.cardinalities()[&0], 1);
    assert_eq!(w.cardinalities()[&1], 2);
    assert_eq!(w.cardinalities()[&2], 1);
    assert!(!w.asymmetric());
}

#[test]
fn island_scenario() {
    let w = SpatialWeights::from_neighbors(neighbor_input(&[(0, &[1]), (1, &[])])).unwrap();

    assert_eq!(w.islands(), &[1]);
    assert_eq!(w.cardinalities()[&0], 1);
    assert_eq!(w.cardinalities()[&1], 0);
    assert!(w.neighbor_weights(&1).unwrap().is_empty());
}

#[test]
fn non_reciprocal_values_scenario() {
    let w = SpatialWeights::new(
        neighbor_input(&[(0, &[1]), (1, &[0])]),
        Some(weight_input(&[(0, &[2.0]), (1, &[1.0])])),
        None,
    )
    .unwrap();

    assert_eq!(
        w.asymmetry(false),
        vec![
            Asymmetry::ValueMismatch {
                edge: (0, 1),
                reciprocal: (1, 0)
            },
            Asymmetry::ValueMismatch {
                edge: (1, 0),
                reciprocal: (0, 1)
            },
        ]
    );
    assert!(w.asymmetry(true).is_empty());
    assert!(!w.asymmetric());
}

#[test]
fn asymmetric_flag_tracks_presence_only_scan() {
    let w = SpatialWeights::from_neighbors(neighbor_input(&[
        (0, &[1, 2, 3]),
        (1, &[2, 3]),
        (2, &[0, 1]),
        (3, &[0, 1]),
    ]))
    .unwrap();

    // 0→1 has no reciprocal; everything else is mirrored.
    assert_eq!(
        w.asymmetry(true),
        vec![Asymmetry::MissingReciprocal { edge: (0, 1) }]
    );
    assert!(w.asymmetric());
}

#[test]
fn characteristics_stay_internally_consistent() {
    let w = SpatialWeights::from_neighbors(neighbor_input(&[
        (0, &[1, 2]),
        (1, &[0]),
        (2, &[0]),
        (3, &[]),
    ]))
    .unwrap();

    let card_sum: usize = w.cardinalities().values().sum();
    assert_eq!(w.nonzero(), card_sum);
    let histogram_total: usize = w.histogram().iter().map(|(_, count)| count).sum();
    assert_eq!(histogram_total, w.n());
    assert_eq!(w.pct_nonzero(), w.nonzero() as f64 / (w.n() * w.n()) as f64);
}

#[test]
fn rejected_order_change_leaves_everything_untouched() {
    let mut w = SpatialWeights::from_neighbors(neighbor_input(&[(0, &[1]), (1, &[0])])).unwrap();
    let order_before: Vec<u32> = w.id_order().to_vec();
    let s0_before = w.s0();
    let weights_before: Vec<f64> = w.weights_of(&0).unwrap().to_vec();

    // Missing one id.
    assert!(matches!(
        w.set_id_order(vec![0]),
        Err(WeightsError::OrderMismatch)
    ));
    // Containing an unknown id.
    assert!(matches!(
        w.set_id_order(vec![0, 9]),
        Err(WeightsError::OrderMismatch)
    ));

    assert_eq!(w.id_order(), order_before.as_slice());
    assert_eq!(w.s0(), s0_before);
    assert_eq!(w.weights_of(&0).unwrap(), weights_before.as_slice());
    assert!(!w.id_order_set());
}

#[test]
fn iteration_yields_neighbor_weight_mappings_in_order() {
    let mut w = SpatialWeights::from_neighbors(neighbor_input(&[
        (0, &[1]),
        (1, &[0, 2]),
        (2, &[1]),
    ]))
    .unwrap();
    w.set_id_order(vec![2, 1, 0]).unwrap();

    let rows: Vec<(u32, usize)> = w.iter().map(|(id, row)| (*id, row.len())).collect();
    assert_eq!(rows, vec![(2, 1), (1, 2), (0, 1)]);

    // A second full pass sees the same sequence.
    let again: Vec<(u32, usize)> = w.iter().map(|(id, row)| (*id, row.len())).collect();
    assert_eq!(rows, again);
}

#[test]
fn offsets_realign_after_order_change() {
    let mut w = SpatialWeights::from_neighbors(neighbor_input(&[
        (0, &[1]),
        (1, &[0, 2]),
        (2, &[1]),
    ]))
    .unwrap();

    assert_eq!(w.neighbor_offsets()[&1], vec![0, 2]);
    w.set_id_order(vec![1, 2, 0]).unwrap();
    assert_eq!(w.neighbor_offsets()[&1], vec![2, 1]);
}
