#![cfg(feature = "serde")]

use intercurve::prelude::*;
use nalgebra::Point2;

#[test]
fn test_serialization() {
    let curve = NurbsCurve2D::polyline(&[
        Point2::new(0., 0.),
        Point2::new(1., 1.),
        Point2::new(2., 0.),
    ]);
    let json = serde_json::to_string_pretty(&curve).unwrap();
    let restored: NurbsCurve2D<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(curve, restored);
}
