use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid(side: usize) -> Vec<(f64, f64)> {
    (0..side * side)
        .map(|i| ((i % side) as f64, (i / side) as f64))
        .collect()
}

fn knn(points: &[(f64, f64)]) -> SpatialWeights {
    SpatialWeights::knn(points, KNN_NEIGHBORS).standardized()
}

#[test]
fn test_gradient_is_positive() {
    let points = grid(10);
    let values: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    let stat = morans_i(&values, &knn(&points)).unwrap();
    assert!(stat.i > 0.5, "I = {}", stat.i);
    assert!(stat.z_score > 2.0);
    assert!(stat.p_value < 0.05);
    assert_eq!(stat.interpretation(), "positive");
}

#[test]
fn test_alternating_columns_are_negative() {
    let points = grid(10);
    let values: Vec<f64> = points
        .iter()
        .map(|(x, _)| if (*x as usize) % 2 == 0 { 1.0 } else { 0.0 })
        .collect();
    let stat = morans_i(&values, &knn(&points)).unwrap();
    assert!(stat.i < stat.expected_i);
    assert_eq!(stat.interpretation(), "negative");
}

#[test]
fn test_expected_value() {
    let points = grid(8);
    let values: Vec<f64> = (0..64).map(|i| ((i * 37) % 17) as f64).collect();
    let stat = morans_i(&values, &knn(&points)).unwrap();
    assert!((stat.expected_i + 1.0 / 63.0).abs() < 1e-12);
    assert!(stat.variance > 0.0);
    assert!((0.0..=1.0).contains(&stat.p_value));
}

#[test]
fn test_random_layouts_rarely_significant() {
    let mut significant = 0;
    let mut z_total = 0.0;
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<(f64, f64)> = (0..80)
            .map(|_| (rng.gen_range(-90.0..-80.0), rng.gen_range(30.0..40.0)))
            .collect();
        let values: Vec<f64> = (0..80).map(|_| rng.gen::<f64>()).collect();
        let stat = morans_i(&values, &knn(&points)).unwrap();
        if stat.z_score.abs() > 2.0 {
            significant += 1;
        }
        z_total += stat.z_score;
    }
    assert!(significant <= 5, "{significant} of 20 layouts had |z| > 2");
    assert!((z_total / 20.0).abs() < 1.0);
}

#[test]
fn test_constant_values_rejected() {
    let points = grid(8);
    assert!(morans_i(&[3.0; 64], &knn(&points)).is_none());
}

#[test]
fn test_length_mismatch_rejected() {
    let points = grid(8);
    assert!(morans_i(&[1.0, 2.0, 3.0], &knn(&points)).is_none());
}

#[test]
fn test_interpretation_random_when_equal() {
    let stat = MoranStatistic {
        i: -0.02,
        expected_i: -0.02,
        variance: 0.001,
        z_score: 0.0,
        p_value: 1.0,
    };
    assert_eq!(stat.interpretation(), "random");
}
