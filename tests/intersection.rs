use approx::assert_relative_eq;
use intercurve::prelude::*;
use nalgebra::{Point2, Point3};

fn crossing_segments() -> (NurbsCurve2D<f64>, NurbsCurve2D<f64>) {
    let a = NurbsCurve2D::polyline(&[Point2::new(0., 0.), Point2::new(2., 2.)]);
    let b = NurbsCurve2D::polyline(&[Point2::new(0., 2.), Point2::new(2., 0.)]);
    (a, b)
}

/// Unit circle at the origin as a quadratic rational curve.
fn unit_circle() -> NurbsCurve2D<f64> {
    let s = 2_f64.sqrt() / 2.;
    let control_points = vec![
        Point3::new(1., 0., 1.),
        Point3::new(s, s, s),
        Point3::new(0., 1., 1.),
        Point3::new(-s, s, s),
        Point3::new(-1., 0., 1.),
        Point3::new(-s, -s, s),
        Point3::new(0., -1., 1.),
        Point3::new(s, -s, s),
        Point3::new(1., 0., 1.),
    ];
    let knots = vec![0., 0., 0., 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1., 1., 1.];
    NurbsCurve2D::try_new(2, control_points, knots).unwrap()
}

#[test]
fn single_crossing_through_search_and_dedup() {
    let (a, b) = crossing_segments();
    for method in [
        NumericMethod::NelderMead,
        NumericMethod::QuasiNewton,
        NumericMethod::GradientDescent,
        NumericMethod::DirectionSet,
        NumericMethod::TrustRegion,
    ] {
        let options = CurveIntersectionSolverOptions::default().with_method(method);
        let candidates = a.find_intersections(&b, Some(options)).unwrap();
        let points = candidates
            .into_iter()
            .map(|it| it.into_point())
            .collect::<Vec<_>>();
        let points = dedup_adjacent(points, DEDUP_MINIMUM_DISTANCE);
        assert_eq!(points.len(), 1, "method {:?}", method);
        assert_relative_eq!(points[0], Point2::new(1., 1.), epsilon = 1e-3);
    }
}

#[test]
fn circle_and_line_intersections_lie_on_both_curves() {
    let circle = unit_circle();
    let line = NurbsCurve2D::polyline(&[Point2::new(-2., 0.), Point2::new(2., 0.)]);

    let candidates = circle.find_intersections(&line, None).unwrap();
    assert!(!candidates.is_empty());

    let points = candidates
        .into_iter()
        .map(|it| it.into_point())
        .collect::<Vec<_>>();
    let points = dedup_adjacent(points, DEDUP_MINIMUM_DISTANCE);
    let left = Point2::new(-1., 0.);
    let right = Point2::new(1., 0.);
    for p in &points {
        assert_relative_eq!(p.coords.norm(), 1., epsilon = 1e-3);
        let hit = (p - left).norm() < 1e-3 || (p - right).norm() < 1e-3;
        assert!(hit, "point {} is not a circle-line intersection", p);
    }
}

#[test]
fn batch_pipeline_is_deterministic() {
    let (a, b) = crossing_segments();
    let rows_a = vec![vec![a]];
    let rows_b = vec![vec![b]];

    let first = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();
    let second = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn disjoint_curves_flow_through_the_batch_as_empty_lists() {
    let rows_a = vec![vec![NurbsCurve2D::polyline(&[
        Point2::new(0., 0.),
        Point2::new(1., 0.),
    ])]];
    let rows_b = vec![vec![NurbsCurve2D::polyline(&[
        Point2::new(0., 3.),
        Point2::new(1., 3.),
    ])]];
    let rows = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();
    assert_eq!(
        rows,
        vec![RowOutput::Flat(vec![vec![]])],
        "a pair without intersections is an empty list, not an error"
    );
}
