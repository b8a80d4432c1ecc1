use tfbp_explorer::math::pearson::pearson_pairwise;

fn some(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

#[test]
fn perfect_positive_relation() {
    let a = some(&[1.0, 2.0, 3.0]);
    let b = some(&[2.0, 4.0, 6.0]);
    assert!((pearson_pairwise(&a, &b) - 1.0).abs() < 1e-12);
}

#[test]
fn perfect_negative_relation() {
    let a = some(&[1.0, 2.0, 3.0, 4.0]);
    let b = some(&[8.0, 6.0, 4.0, 2.0]);
    assert!((pearson_pairwise(&a, &b) + 1.0).abs() < 1e-12);
}

#[test]
fn constant_column_is_zero() {
    let a = some(&[1.0, 1.0, 1.0]);
    let b = some(&[1.0, 1.0, 1.0]);
    assert_eq!(pearson_pairwise(&a, &b), 0.0);
    let c = some(&[1.0, 2.0, 3.0]);
    assert_eq!(pearson_pairwise(&c, &a), 0.0);
}

#[test]
fn fewer_than_two_pairs_is_zero() {
    assert_eq!(pearson_pairwise(&[], &[]), 0.0);
    let a = vec![Some(1.0), None, Some(3.0)];
    let b = vec![None, Some(2.0), Some(5.0)];
    assert_eq!(pearson_pairwise(&a, &b), 0.0);
}

#[test]
fn uses_pairwise_complete_observations() {
    let a = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(100.0)];
    let b = vec![Some(2.0), Some(4.0), Some(-50.0), Some(8.0), None];
    assert!((pearson_pairwise(&a, &b) - 1.0).abs() < 1e-12);
}

#[test]
fn symmetric_and_self_correlation() {
    let x = some(&[0.3, 1.7, 2.2, 5.1, 4.4, 0.9]);
    let y = some(&[1.0, 0.2, 3.3, 2.8, 6.0, 1.1]);
    assert_eq!(pearson_pairwise(&x, &y), pearson_pairwise(&y, &x));
    assert!((pearson_pairwise(&x, &x) - 1.0).abs() < 1e-12);
    let r = pearson_pairwise(&x, &y);
    assert!((-1.0..=1.0).contains(&r));
}
