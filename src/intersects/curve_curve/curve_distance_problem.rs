use argmin::core::{CostFunction, Gradient};
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, Vector2, U1,
};

use crate::curve::NurbsCurve;
use crate::misc::FloatingPoint;

use super::ParameterRectangle;

/// Squared distance between two curve points as a black-box objective over
/// the joint parameter domain. The objective is zero exactly at an
/// intersection, so the root search minimizes it.
pub struct CurveDistanceProblem<'a, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    a: &'a NurbsCurve<T, D>,
    b: &'a NurbsCurve<T, D>,
    rectangle: ParameterRectangle<T>,
}

impl<'a, T: FloatingPoint, D: DimName> CurveDistanceProblem<'a, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    pub fn new(a: &'a NurbsCurve<T, D>, b: &'a NurbsCurve<T, D>) -> Self {
        let rectangle = ParameterRectangle::new(a.knots_domain(), b.knots_domain());
        Self { a, b, rectangle }
    }

    pub fn parameter_rectangle(&self) -> ParameterRectangle<T> {
        self.rectangle
    }

    /// Squared distance at a parameter pair, clamped into the domain rectangle.
    pub fn squared_distance(&self, param: &Vector2<T>) -> T {
        let p = self.rectangle.clamp(*param);
        let p0 = self.a.point_at(p.x);
        let p1 = self.b.point_at(p.y);
        (p0 - p1).norm_squared()
    }
}

impl<T: FloatingPoint, D: DimName> CostFunction for CurveDistanceProblem<'_, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Param = Vector2<T>;
    type Output = T;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, anyhow::Error> {
        Ok(self.squared_distance(param))
    }
}

impl<T: FloatingPoint, D: DimName> Gradient for CurveDistanceProblem<'_, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Param = Vector2<T>;
    type Gradient = Vector2<T>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, anyhow::Error> {
        let p = self.rectangle.clamp(*param);
        let aderiv = self.a.rational_derivatives(p.x, 1);
        let bderiv = self.b.rational_derivatives(p.y, 1);
        let r = &aderiv[0] - &bderiv[0];
        Ok(Vector2::new(aderiv[1].dot(&r), -bderiv[1].dot(&r)) * T::from_f64(2.0).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point2, Vector2};

    use super::CurveDistanceProblem;
    use crate::curve::NurbsCurve2D;
    use argmin::core::{CostFunction, Gradient};

    fn segment(a: Point2<f64>, b: Point2<f64>) -> NurbsCurve2D<f64> {
        NurbsCurve2D::polyline(&[a, b])
    }

    #[test]
    fn cost_is_squared_distance() {
        let l0 = segment(Point2::new(0., 0.), Point2::new(1., 0.));
        let l1 = segment(Point2::new(0., 2.), Point2::new(1., 2.));
        let problem = CurveDistanceProblem::new(&l0, &l1);
        let cost = problem.cost(&Vector2::new(0.5, 0.5)).unwrap();
        assert!((cost - 4.).abs() < 1e-12);
    }

    #[test]
    fn cost_clamps_out_of_domain_parameters() {
        let l0 = segment(Point2::new(0., 0.), Point2::new(1., 0.));
        let l1 = segment(Point2::new(0., 1.), Point2::new(1., 1.));
        let problem = CurveDistanceProblem::new(&l0, &l1);
        let inside = problem.cost(&Vector2::new(1., 1.)).unwrap();
        let outside = problem.cost(&Vector2::new(10., 10.)).unwrap();
        assert_eq!(inside, outside);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let l0 = segment(Point2::new(0., 0.), Point2::new(1., 1.));
        let l1 = segment(Point2::new(0., 1.), Point2::new(1., 0.));
        let problem = CurveDistanceProblem::new(&l0, &l1);

        let p = Vector2::new(0.3, 0.6);
        let grad = problem.gradient(&p).unwrap();

        let h = 1e-7;
        for i in 0..2 {
            let mut fwd = p;
            let mut bwd = p;
            fwd[i] += h;
            bwd[i] -= h;
            let fd =
                (problem.cost(&fwd).unwrap() - problem.cost(&bwd).unwrap()) / (2. * h);
            assert!((grad[i] - fd).abs() < 1e-5, "component {}", i);
        }
    }
}
