use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName};

use crate::curve::NurbsCurve;
use crate::misc::FloatingPoint;

/// Conversion of an arbitrary curve object into the NURBS representation
/// the intersection engine operates on.
///
/// A curve type with no rational B-spline form must fail with
/// `CurveError::NotNurbsConvertible`; the batch layer treats that as fatal
/// for the whole computation rather than skipping the pair.
pub trait ToNurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    fn to_nurbs(&self) -> anyhow::Result<NurbsCurve<T, D>>;
}

impl<T: FloatingPoint, D: DimName> ToNurbsCurve<T, D> for NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn to_nurbs(&self) -> anyhow::Result<NurbsCurve<T, D>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::ToNurbsCurve;
    use crate::curve::{CurveError, NurbsCurve2D};

    enum TestCurve {
        Nurbs(NurbsCurve2D<f64>),
        Procedural,
    }

    impl ToNurbsCurve<f64, nalgebra::Const<3>> for TestCurve {
        fn to_nurbs(&self) -> anyhow::Result<NurbsCurve2D<f64>> {
            match self {
                TestCurve::Nurbs(c) => Ok(c.clone()),
                TestCurve::Procedural => Err(CurveError::NotNurbsConvertible.into()),
            }
        }
    }

    #[test]
    fn nurbs_adapts_to_itself() {
        let curve = NurbsCurve2D::polyline(&[Point2::new(0., 0.), Point2::new(1., 0.)]);
        let adapted = curve.to_nurbs().unwrap();
        assert_eq!(adapted, curve);
    }

    #[test]
    fn unconvertible_curve_reports_typed_error() {
        let err = TestCurve::Procedural.to_nurbs().unwrap_err();
        assert_eq!(
            err.downcast_ref::<CurveError>(),
            Some(&CurveError::NotNurbsConvertible)
        );
    }
}
