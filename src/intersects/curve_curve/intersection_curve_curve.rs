use argmin::core::ArgminFloat;
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, Vector2, U1,
};

use crate::curve::NurbsCurve;
use crate::intersects::Intersects;
use crate::misc::FloatingPoint;

use super::{CurveCurveIntersection, CurveIntersectionSolverOptions};

impl<'a, T, D> Intersects<'a, &'a NurbsCurve<T, D>> for NurbsCurve<T, D>
where
    T: FloatingPoint + ArgminFloat,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Output = anyhow::Result<Vec<CurveCurveIntersection<OPoint<T, DimNameDiff<D, U1>>, T>>>;
    type Option = Option<CurveIntersectionSolverOptions<T>>;

    /// Find the intersection points with another curve by multi-start
    /// bounded minimization of the inter-curve squared distance.
    /// * `other` - The other curve to intersect with
    /// * `option` - Hyperparameters for the intersection solver
    ///
    /// The minimizer is seeded from a deterministic grid spanning the joint
    /// parameter domain and run independently from each seed. Every run whose
    /// residual passes the `precision` acceptance test contributes a raw
    /// candidate, in seed order; seeds that do not converge onto an
    /// intersection are silently dropped. The raw sequence may hold
    /// near-duplicates from different seeds landing on the same point.
    ///
    /// # Example
    /// ```
    /// use intercurve::prelude::*;
    /// use nalgebra::Point2;
    /// use approx::assert_relative_eq;
    /// let diagonal = NurbsCurve2D::polyline(&[
    ///     Point2::new(0., 0.),
    ///     Point2::new(2., 2.),
    /// ]);
    /// let antidiagonal = NurbsCurve2D::polyline(&[
    ///     Point2::new(0., 2.),
    ///     Point2::new(2., 0.),
    /// ]);
    /// let intersections = diagonal.find_intersections(&antidiagonal, None).unwrap();
    /// assert!(!intersections.is_empty());
    /// for it in &intersections {
    ///     assert_relative_eq!(it.a().0, Point2::new(1., 1.), epsilon = 1e-3);
    /// }
    /// ```
    fn find_intersections(
        &'a self,
        other: &'a NurbsCurve<T, D>,
        option: Self::Option,
    ) -> Self::Output {
        let options = option.unwrap_or_default();

        let (a0, a1) = self.knots_domain();
        let (b0, b1) = other.knots_domain();

        let division = options.seed_division.max(1);
        let div = T::from_usize(division).unwrap();
        let acceptance = options.precision * options.precision;

        let mut intersections = vec![];

        for i in 0..=division {
            let u = a0 + (a1 - a0) * T::from_usize(i).unwrap() / div;
            for j in 0..=division {
                let v = b0 + (b1 - b0) * T::from_usize(j).unwrap() / div;

                let outcome =
                    options
                        .method
                        .minimize(self, other, Vector2::new(u, v), &options);
                if let Some((param, residual)) = outcome {
                    if residual <= acceptance {
                        let p0 = self.point_at(param.x);
                        let p1 = other.point_at(param.y);
                        intersections.push(CurveCurveIntersection::new(
                            (p0, param.x),
                            (p1, param.y),
                            residual,
                        ));
                    }
                }
            }
        }

        #[cfg(feature = "log")]
        log::trace!(
            "curve intersection search: {} seeds, {} accepted candidates",
            (division + 1) * (division + 1),
            intersections.len()
        );

        Ok(intersections)
    }
}
