use crate::algebra::*;

#[test]
fn test_scale_negate_set() {
    let mut x = vec![1., -2., 3.];
    x.scale(2.);
    assert_eq!(x, vec![2., -4., 6.]);
    x.negate();
    assert_eq!(x, vec![-2., 4., -6.]);
    x.set(0.);
    assert_eq!(x, vec![0., 0., 0.]);
}

#[test]
fn test_dot_and_norms() {
    let x = vec![3., -4.];
    let y = vec![1., 2.];
    assert_eq!(x.dot(&y), -5.);
    assert_eq!(x.sumsq(), 25.);
    assert_eq!(x.norm(), 5.);
    assert_eq!(x.norm_inf(), 4.);
}

#[test]
fn test_axpby() {
    let mut y = vec![1., 1.];
    let x = vec![2., 3.];
    y.axpby(2., &x, -1.);
    assert_eq!(y, vec![3., 5.]);
}

#[test]
fn test_is_finite() {
    let x = vec![1., 2.];
    assert!(x.is_finite());
    let y = vec![1., f64::NAN];
    assert!(!y.is_finite());
}

#[test]
fn test_vecmath_generic_over_extended_types() {
    let x: Vec<DoubleF64> = [1., 2., 3.].iter().map(|&v| DoubleF64::from_f64(v)).collect();
    let y: Vec<DoubleF64> = [4., 5., 6.].iter().map(|&v| DoubleF64::from_f64(v)).collect();
    assert_eq!(x.dot(&y), DoubleF64::from_f64(32.));
    assert_eq!(x.norm_inf(), DoubleF64::from_f64(3.));
}
