use nalgebra::allocator::Allocator;
use nalgebra::{
    Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, OVector, U1,
};
use simba::scalar::SupersetOf;

use crate::curve::CurveError;
use crate::knot::KnotVector;
use crate::misc::{binomial, FloatingPoint};

/// NURBS curve representation.
/// Generic over the scalar type and the homogeneous dimension,
/// so the same code covers 2D and 3D curves with f32 or f64.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, OPoint<T, D>: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, OPoint<T, D>: serde::Deserialize<'de>"
    ))
)]
pub struct NurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points in homogeneous coordinates,
    /// the last component of each point is its weight
    control_points: Vec<OPoint<T, D>>,
    degree: usize,
    /// knot vector, `control points + degree + 1` entries long
    knots: KnotVector<T>,
}

/// 2D NURBS curve alias
pub type NurbsCurve2D<T> = NurbsCurve<T, Const<3>>;

/// 3D NURBS curve alias
pub type NurbsCurve3D<T> = NurbsCurve<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new NURBS curve, validating the degree / control point / knot
    /// relationship up front.
    /// # Failures
    /// Returns a `CurveError::MalformedCurve` when
    /// - the number of control points is not greater than the degree,
    /// - the knot count is not `control points + degree + 1`,
    /// - the knot sequence decreases anywhere,
    /// - any control point carries a non-positive weight.
    ///
    /// # Example
    /// ```
    /// use intercurve::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let w = 1.; // weight of each control point
    /// let control_points: Vec<Point3<f64>> = vec![
    ///     Point3::new(-1., -1., w),
    ///     Point3::new(1., -1., w),
    ///     Point3::new(1., 1., w),
    ///     Point3::new(-1., 1., w),
    /// ];
    /// let degree = 3;
    /// let knots = vec![0., 0., 0., 0., 1., 1., 1., 1.];
    /// let curve = NurbsCurve::try_new(degree, control_points, knots);
    /// assert!(curve.is_ok());
    /// ```
    pub fn try_new(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: Vec<T>,
    ) -> anyhow::Result<Self> {
        if control_points.len() <= degree {
            return Err(CurveError::MalformedCurve(format!(
                "too few control points for degree {} curve, got {}",
                degree,
                control_points.len()
            ))
            .into());
        }
        let expected = control_points.len() + degree + 1;
        if knots.len() != expected {
            return Err(CurveError::MalformedCurve(format!(
                "invalid number of knots, got {}, expected {}",
                knots.len(),
                expected
            ))
            .into());
        }

        let knots = KnotVector::new(knots);
        if !knots.is_sorted() {
            return Err(
                CurveError::MalformedCurve("knot vector is not non-decreasing".into()).into(),
            );
        }

        let w_index = D::dim() - 1;
        if control_points.iter().any(|p| p[w_index] <= T::zero()) {
            return Err(
                CurveError::MalformedCurve("control point with non-positive weight".into()).into(),
            );
        }

        Ok(Self {
            degree,
            control_points,
            knots,
        })
    }

    /// Create a degree-1 curve passing through the given points,
    /// with a clamped uniform knot vector.
    pub fn polyline(points: &[OPoint<T, DimNameDiff<D, U1>>]) -> Self
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        debug_assert!(points.len() >= 2, "a polyline needs at least two points");

        let control_points = points
            .iter()
            .map(|p| {
                let mut cp = OPoint::<T, D>::origin();
                for i in 0..(D::dim() - 1) {
                    cp[i] = p[i];
                }
                cp[D::dim() - 1] = T::one();
                cp
            })
            .collect();

        Self {
            degree: 1,
            control_points,
            knots: KnotVector::clamped_uniform(points.len(), 1),
        }
    }

    /// Evaluate the curve at a parameter, returning the dehomogenized point.
    pub fn point_at(&self, t: T) -> OPoint<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let p = self.point(t);
        dehomogenize(&p).unwrap()
    }

    /// Evaluate the curve at a parameter in homogeneous space.
    pub(crate) fn point(&self, t: T) -> OPoint<T, D> {
        let n = self.knots.len() - self.degree - 2;
        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, t);
        let basis = self.knots.basis_functions(knot_span_index, t, self.degree);
        let mut position = OPoint::<T, D>::origin();
        for i in 0..=self.degree {
            position.coords +=
                &self.control_points[knot_span_index - self.degree + i].coords * basis[i];
        }
        position
    }

    /// Tangent vector of the curve at a parameter.
    pub fn tangent_at(&self, u: T) -> OVector<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let deriv = self.rational_derivatives(u, 1);
        deriv[1].clone()
    }

    /// Rational (dehomogenized) derivatives at a parameter,
    /// up to the given order. Index 0 is the point itself.
    pub(crate) fn rational_derivatives(
        &self,
        u: T,
        derivs: usize,
    ) -> Vec<OVector<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let ders = self.derivatives(u, derivs);
        let a_ders: Vec<_> = ders
            .iter()
            .map(|d| {
                let mut a = vec![];
                for i in 0..D::dim() - 1 {
                    a.push(d[i]);
                }
                OVector::<T, DimNameDiff<D, U1>>::from_vec(a)
            })
            .collect();
        let w_ders: Vec<_> = ders.iter().map(|d| d[D::dim() - 1]).collect();

        let mut ck: Vec<OVector<T, DimNameDiff<D, U1>>> = vec![];
        for k in 0..=derivs {
            let mut v = a_ders[k].clone();

            for i in 1..=k {
                let coef = binomial::<T>(k, i) * w_ders[i];
                v -= &ck[k - i] * coef;
            }

            ck.push(v / w_ders[0]);
        }
        ck
    }

    /// Homogeneous derivatives at a parameter (The NURBS Book, A3.2).
    fn derivatives(&self, u: T, derivs: usize) -> Vec<OVector<T, D>> {
        let n = self.knots.len() - self.degree - 2;

        let du = derivs.min(self.degree);
        let mut derivatives = vec![OVector::<T, D>::zeros(); derivs + 1];

        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, u);
        let nders = self
            .knots
            .derivative_basis_functions(knot_span_index, u, self.degree, du);
        for k in 0..=du {
            for j in 0..=self.degree {
                let w = &self.control_points[knot_span_index - self.degree + j] * nders[k][j];
                let column = derivatives.get_mut(k).unwrap();
                w.coords.iter().enumerate().for_each(|(i, v)| {
                    column[i] += *v;
                });
            }
        }

        derivatives
    }

    /// Return the dehomogenized control points.
    pub fn dehomogenized_control_points(&self) -> Vec<OPoint<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.control_points
            .iter()
            .map(|p| dehomogenize(p).unwrap())
            .collect()
    }

    pub fn weights(&self) -> Vec<T> {
        self.control_points
            .iter()
            .map(|p| p[D::dim() - 1])
            .collect()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn control_points(&self) -> &Vec<OPoint<T, D>> {
        &self.control_points
    }

    /// Valid parameter domain of the curve.
    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    /// Cast the curve to another floating point type.
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> NurbsCurve<F, D>
    where
        DefaultAllocator: Allocator<D>,
    {
        NurbsCurve {
            degree: self.degree,
            control_points: self
                .control_points
                .iter()
                .map(|p| p.clone().cast())
                .collect(),
            knots: self.knots.cast(),
        }
    }
}

/// Dehomogenize a point, returning `None` for a zero weight.
pub(crate) fn dehomogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, D>,
) -> Option<OPoint<T, DimNameDiff<D, U1>>>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let v = &point.coords;
    let idx = D::dim() - 1;
    let w = v[idx];
    if w != T::zero() {
        let coords =
            v.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>)) / w;
        Some(OPoint { coords })
    } else {
        None
    }
}
