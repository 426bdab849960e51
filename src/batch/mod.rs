use argmin::core::ArgminFloat;
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, U1,
};

use crate::adapt::ToNurbsCurve;
use crate::curve::NurbsCurve;
use crate::intersects::{
    dedup_adjacent, CurveIntersectionSolverOptions, Intersects, DEDUP_MINIMUM_DISTANCE,
};
use crate::misc::FloatingPoint;
use crate::pairing::{zip_long_repeat, PairingPolicy};

/// External intersection primitive: given two curves, return an ordered
/// sequence of intersection points. Implementations do not expose method or
/// precision configuration; their raw output still flows through the same
/// deduplication and truncation as the built-in search.
pub trait IntersectionKernel<T, D>
where
    T: FloatingPoint,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    fn intersect(
        &self,
        a: &NurbsCurve<T, D>,
        b: &NurbsCurve<T, D>,
    ) -> anyhow::Result<Vec<OPoint<T, DimNameDiff<D, U1>>>>;
}

/// Which implementation computes the per-pair intersections.
/// Selected once per batch, not per pair.
pub enum IntersectionBackend<'k, T, D>
where
    T: FloatingPoint,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Built-in multi-start distance minimization.
    Native(CurveIntersectionSolverOptions<T>),
    /// Externally provided intersection primitive.
    Kernel(&'k dyn IntersectionKernel<T, D>),
}

/// Configuration bundle threaded through a whole batch computation.
pub struct BatchIntersectionConfig<'k, T, D>
where
    T: FloatingPoint,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    pub backend: IntersectionBackend<'k, T, D>,
    pub pairing: PairingPolicy,
    /// Truncate each pair's result to its first-found point.
    pub single: bool,
    /// Regroup each row's flat output into per-first-collection chunks.
    /// Only effective under `Cross` pairing.
    pub split_rows: bool,
}

impl<T, D> Default for BatchIntersectionConfig<'_, T, D>
where
    T: FloatingPoint,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    fn default() -> Self {
        Self {
            backend: IntersectionBackend::Native(Default::default()),
            pairing: PairingPolicy::default(),
            single: false,
            split_rows: false,
        }
    }
}

/// Per-row output of a batch computation. One point list per curve pair,
/// either flat in pair order or regrouped by first-collection element.
#[derive(Clone, Debug, PartialEq)]
pub enum RowOutput<P> {
    Flat(Vec<Vec<P>>),
    Grouped(Vec<Vec<Vec<P>>>),
}

/// Intersect two nested curve collections row by row.
///
/// Rows are aligned by repeating the last row of the shorter collection.
/// Within each row, pairs are formed by the configured pairing policy; each
/// pair is adapted to NURBS form, intersected with the configured backend and
/// deduplicated. A curve that fails adaptation aborts the whole batch.
/// A pair with no intersections contributes an empty point list.
pub fn intersect_curve_batches<C1, C2, T, D>(
    rows_a: &[Vec<C1>],
    rows_b: &[Vec<C2>],
    config: &BatchIntersectionConfig<'_, T, D>,
) -> anyhow::Result<Vec<RowOutput<OPoint<T, DimNameDiff<D, U1>>>>>
where
    C1: ToNurbsCurve<T, D>,
    C2: ToNurbsCurve<T, D>,
    T: FloatingPoint + ArgminFloat,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let min_distance = T::from_f64(DEDUP_MINIMUM_DISTANCE).unwrap();

    let mut rows = vec![];
    for (row_a, row_b) in zip_long_repeat(rows_a, rows_b) {
        let pairs = config.pairing.pairs(row_a, row_b);

        let mut flat = Vec::with_capacity(pairs.len());
        for (ca, cb) in pairs {
            let a = ca.to_nurbs()?;
            let b = cb.to_nurbs()?;

            let points = match &config.backend {
                IntersectionBackend::Native(options) => a
                    .find_intersections(&b, Some(options.clone()))?
                    .into_iter()
                    .map(|it| it.into_point())
                    .collect(),
                IntersectionBackend::Kernel(kernel) => kernel.intersect(&a, &b)?,
            };

            let mut points = dedup_adjacent(points, min_distance);
            if config.single {
                points.truncate(1);
            }
            flat.push(points);
        }

        #[cfg(feature = "log")]
        log::debug!(
            "batch row: {} pairs, {} non-empty results",
            flat.len(),
            flat.iter().filter(|points| !points.is_empty()).count()
        );

        let row = if config.split_rows && config.pairing == PairingPolicy::Cross {
            let chunk = row_b.len();
            if chunk == 0 {
                RowOutput::Grouped(vec![])
            } else {
                RowOutput::Grouped(flat.chunks(chunk).map(|c| c.to_vec()).collect())
            }
        } else {
            RowOutput::Flat(flat)
        };
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx::assert_relative_eq;
    use nalgebra::{Const, Point2};

    use crate::adapt::ToNurbsCurve;
    use crate::curve::{CurveError, NurbsCurve, NurbsCurve2D};
    use crate::pairing::PairingPolicy;

    use super::{
        intersect_curve_batches, BatchIntersectionConfig, IntersectionBackend, IntersectionKernel,
        RowOutput,
    };

    enum TestCurve {
        Nurbs(NurbsCurve2D<f64>),
        Procedural,
    }

    impl ToNurbsCurve<f64, Const<3>> for TestCurve {
        fn to_nurbs(&self) -> anyhow::Result<NurbsCurve2D<f64>> {
            match self {
                TestCurve::Nurbs(curve) => Ok(curve.clone()),
                TestCurve::Procedural => Err(CurveError::NotNurbsConvertible.into()),
            }
        }
    }

    fn segment(from: Point2<f64>, to: Point2<f64>) -> NurbsCurve2D<f64> {
        NurbsCurve2D::polyline(&[from, to])
    }

    /// Hands back a fixed point list for every pair, counting calls.
    struct FixedKernel {
        points: Vec<Point2<f64>>,
        calls: Cell<usize>,
    }

    impl FixedKernel {
        fn new(points: Vec<Point2<f64>>) -> Self {
            Self {
                points,
                calls: Cell::new(0),
            }
        }
    }

    impl IntersectionKernel<f64, Const<3>> for FixedKernel {
        fn intersect(
            &self,
            _a: &NurbsCurve<f64, Const<3>>,
            _b: &NurbsCurve<f64, Const<3>>,
        ) -> anyhow::Result<Vec<Point2<f64>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.points.clone())
        }
    }

    #[test]
    fn crossing_segments_give_one_deduplicated_point() {
        let rows_a = vec![vec![segment(Point2::new(0., 0.), Point2::new(2., 2.))]];
        let rows_b = vec![vec![segment(Point2::new(0., 2.), Point2::new(2., 0.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();

        assert_eq!(rows.len(), 1);
        let RowOutput::Flat(pairs) = &rows[0] else {
            panic!("expected flat row output");
        };
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].len(), 1);
        assert_relative_eq!(pairs[0][0], Point2::new(1., 1.), epsilon = 1e-3);
    }

    #[test]
    fn disjoint_segments_give_an_empty_point_list() {
        let rows_a = vec![vec![segment(Point2::new(0., 0.), Point2::new(1., 0.))]];
        let rows_b = vec![vec![segment(Point2::new(0., 2.), Point2::new(1., 2.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();

        let RowOutput::Flat(pairs) = &rows[0] else {
            panic!("expected flat row output");
        };
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].is_empty());
    }

    #[test]
    fn longest_pairing_repeats_the_shorter_row() {
        let anti = segment(Point2::new(0., 2.), Point2::new(2., 0.));
        let rows_a = vec![vec![
            segment(Point2::new(0., 0.), Point2::new(2., 2.)),
            segment(Point2::new(0., 1.), Point2::new(2., 1.)),
            segment(Point2::new(1., 0.), Point2::new(1., 2.)),
        ]];
        let rows_b = vec![vec![anti]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();

        let RowOutput::Flat(pairs) = &rows[0] else {
            panic!("expected flat row output");
        };
        assert_eq!(pairs.len(), 3);
        for points in pairs {
            assert_eq!(points.len(), 1);
        }
        assert_relative_eq!(pairs[0][0], Point2::new(1., 1.), epsilon = 1e-3);
        assert_relative_eq!(pairs[1][0], Point2::new(1., 1.), epsilon = 1e-3);
        assert_relative_eq!(pairs[2][0], Point2::new(1., 1.), epsilon = 1e-3);
    }

    #[test]
    fn single_mode_keeps_the_first_found_point() {
        let kernel = FixedKernel::new(vec![
            Point2::new(0., 0.),
            Point2::new(1., 0.),
            Point2::new(2., 0.),
        ]);
        let config = BatchIntersectionConfig {
            backend: IntersectionBackend::Kernel(&kernel),
            single: true,
            ..Default::default()
        };
        let rows_a = vec![vec![segment(Point2::new(0., 0.), Point2::new(1., 1.))]];
        let rows_b = vec![vec![segment(Point2::new(0., 1.), Point2::new(1., 0.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &config).unwrap();

        let RowOutput::Flat(pairs) = &rows[0] else {
            panic!("expected flat row output");
        };
        assert_eq!(pairs[0], vec![Point2::new(0., 0.)]);
    }

    #[test]
    fn kernel_output_is_deduplicated() {
        let kernel = FixedKernel::new(vec![
            Point2::new(0., 0.),
            Point2::new(5e-5, 0.),
            Point2::new(1., 0.),
        ]);
        let config = BatchIntersectionConfig {
            backend: IntersectionBackend::Kernel(&kernel),
            ..Default::default()
        };
        let rows_a = vec![vec![segment(Point2::new(0., 0.), Point2::new(1., 1.))]];
        let rows_b = vec![vec![segment(Point2::new(0., 1.), Point2::new(1., 0.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &config).unwrap();

        let RowOutput::Flat(pairs) = &rows[0] else {
            panic!("expected flat row output");
        };
        assert_eq!(pairs[0], vec![Point2::new(0., 0.), Point2::new(1., 0.)]);
        assert_eq!(kernel.calls.get(), 1);
    }

    #[test]
    fn cross_pairing_with_split_regroups_by_first_collection() {
        let kernel = FixedKernel::new(vec![Point2::new(0., 0.)]);
        let config = BatchIntersectionConfig {
            backend: IntersectionBackend::Kernel(&kernel),
            pairing: PairingPolicy::Cross,
            split_rows: true,
            ..Default::default()
        };
        let rows_a = vec![vec![
            segment(Point2::new(0., 0.), Point2::new(1., 0.)),
            segment(Point2::new(0., 1.), Point2::new(1., 1.)),
        ]];
        let rows_b = vec![vec![
            segment(Point2::new(0., 0.), Point2::new(0., 1.)),
            segment(Point2::new(1., 0.), Point2::new(1., 1.)),
            segment(Point2::new(2., 0.), Point2::new(2., 1.)),
        ]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &config).unwrap();

        let RowOutput::Grouped(groups) = &rows[0] else {
            panic!("expected grouped row output");
        };
        assert_eq!(groups.len(), 2);
        for group in groups {
            assert_eq!(group.len(), 3);
        }
        assert_eq!(kernel.calls.get(), 6);
    }

    #[test]
    fn split_without_cross_pairing_stays_flat() {
        let kernel = FixedKernel::new(vec![Point2::new(0., 0.)]);
        let config = BatchIntersectionConfig {
            backend: IntersectionBackend::Kernel(&kernel),
            pairing: PairingPolicy::Longest,
            split_rows: true,
            ..Default::default()
        };
        let rows_a = vec![vec![segment(Point2::new(0., 0.), Point2::new(1., 0.))]];
        let rows_b = vec![vec![segment(Point2::new(0., 1.), Point2::new(1., 1.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &config).unwrap();
        assert!(matches!(&rows[0], RowOutput::Flat(_)));
    }

    #[test]
    fn adaptation_failure_aborts_the_whole_batch() {
        let rows_a = vec![vec![
            TestCurve::Nurbs(segment(Point2::new(0., 0.), Point2::new(2., 2.))),
            TestCurve::Procedural,
        ]];
        let rows_b = vec![vec![TestCurve::Nurbs(segment(
            Point2::new(0., 2.),
            Point2::new(2., 0.),
        ))]];
        let result = intersect_curve_batches(&rows_a, &rows_b, &Default::default());
        let error = result.err().expect("procedural curve must abort the batch");
        assert!(matches!(
            error.downcast_ref::<CurveError>(),
            Some(CurveError::NotNurbsConvertible)
        ));
    }

    #[test]
    fn rows_are_aligned_by_repeating_the_last_row() {
        let rows_a = vec![
            vec![segment(Point2::new(0., 0.), Point2::new(2., 2.))],
            vec![segment(Point2::new(0., 1.), Point2::new(2., 1.))],
        ];
        let rows_b = vec![vec![segment(Point2::new(0., 2.), Point2::new(2., 0.))]];
        let rows = intersect_curve_batches(&rows_a, &rows_b, &Default::default()).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            let RowOutput::Flat(pairs) = row else {
                panic!("expected flat row output");
            };
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].len(), 1);
        }
    }
}
