/// A candidate intersection of two curves: the point & parameter on each
/// curve, plus the residual (squared distance between the two points) the
/// search converged to.
#[derive(Debug, Clone)]
pub struct CurveCurveIntersection<P, T> {
    /// point & parameter on the first curve
    a: (P, T),
    /// point & parameter on the second curve
    b: (P, T),
    residual: T,
}

impl<P, T> CurveCurveIntersection<P, T> {
    pub fn new(a: (P, T), b: (P, T), residual: T) -> Self {
        Self { a, b, residual }
    }

    pub fn a(&self) -> &(P, T) {
        &self.a
    }

    pub fn b(&self) -> &(P, T) {
        &self.b
    }

    /// Representative intersection point (the point on the first curve).
    pub fn point(&self) -> &P {
        &self.a.0
    }

    pub fn into_point(self) -> P {
        self.a.0
    }

    /// Squared distance between the two curve points at the solution.
    pub fn residual(&self) -> T
    where
        T: Copy,
    {
        self.residual
    }
}
