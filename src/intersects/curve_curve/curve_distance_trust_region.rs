use argmin::{argmin_error_closure, core::*};
use nalgebra::{Matrix2, RealField, Vector2};

use crate::misc::FloatingPoint;

use super::ParameterRectangle;

type CurveDistanceTrustRegionState<F> = IterState<Vector2<F>, Vector2<F>, (), (), (), F>;

/// Trust-region Newton minimizer for the curve distance objective.
/// The Hessian is approximated by central differences of the analytic
/// gradient; steps are Newton steps when they fit the trust radius and
/// Cauchy steps otherwise, clamped into the parameter rectangle.
#[derive(Clone, Debug)]
pub struct CurveDistanceTrustRegion<F: FloatingPoint> {
    bounds: ParameterRectangle<F>,
    radius: F,
    max_radius: F,
    eta: F,
    step_size_tolerance: F,
    cost_tolerance: F,
}

impl<F: FloatingPoint> CurveDistanceTrustRegion<F> {
    pub fn new(bounds: ParameterRectangle<F>) -> Self {
        let span = bounds.span();
        let max_radius = span.norm();
        Self {
            bounds,
            radius: max_radius * F::from_f64(0.1).unwrap(),
            max_radius,
            eta: F::from_f64(1e-4).unwrap(),
            step_size_tolerance: F::from_f64(1e-9).unwrap(),
            cost_tolerance: F::from_f64(1e-12).unwrap(),
        }
    }

    pub fn with_step_size_tolerance(mut self, tolerance: F) -> Self {
        self.step_size_tolerance = tolerance;
        self
    }

    pub fn with_cost_tolerance(mut self, tolerance: F) -> Self {
        self.cost_tolerance = tolerance;
        self
    }

    /// Central-difference Hessian of the objective from its gradient.
    fn hessian<O>(&self, problem: &mut Problem<O>, x: &Vector2<F>) -> Result<Matrix2<F>, Error>
    where
        O: Gradient<Param = Vector2<F>, Gradient = Vector2<F>>,
    {
        let h = F::default_epsilon().sqrt();
        let mut columns = [Vector2::zeros(); 2];
        for i in 0..2 {
            let mut fwd = *x;
            let mut bwd = *x;
            fwd[i] += h;
            bwd[i] -= h;
            let gf = problem.gradient(&fwd)?;
            let gb = problem.gradient(&bwd)?;
            columns[i] = (gf - gb) / (h + h);
        }
        let raw = Matrix2::from_columns(&columns);
        // symmetrize
        Ok((raw + raw.transpose()) * F::from_f64(0.5).unwrap())
    }

    /// Step within the trust radius: the Newton step when the Hessian is
    /// invertible and the step fits, the Cauchy point otherwise.
    fn step(&self, g: &Vector2<F>, h: &Matrix2<F>) -> Vector2<F> {
        if let Some(inv) = h.try_inverse() {
            let newton = -(inv * g);
            if newton.norm() <= self.radius && g.dot(&newton) < F::zero() {
                return newton;
            }
        }

        let g_norm = g.norm();
        if g_norm == F::zero() {
            return Vector2::zeros();
        }
        let ghg = g.dot(&(h * g));
        let tau = if ghg <= F::zero() {
            F::one()
        } else {
            (g_norm * g_norm * g_norm / (self.radius * ghg)).min(F::one())
        };
        -g * (tau * self.radius / g_norm)
    }
}

impl<O, F> Solver<O, CurveDistanceTrustRegionState<F>> for CurveDistanceTrustRegion<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>
        + Gradient<Param = Vector2<F>, Gradient = Vector2<F>>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve distance trust region";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceTrustRegionState<F>,
    ) -> Result<(CurveDistanceTrustRegionState<F>, Option<KV>), Error> {
        let x0 = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveDistanceTrustRegion` requires an initial parameter vector. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;
        let x0 = self.bounds.clamp(*x0);
        let cost = problem.cost(&x0)?;

        Ok((state.param(x0).cost(cost), None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceTrustRegionState<F>,
    ) -> Result<(CurveDistanceTrustRegionState<F>, Option<KV>), Error> {
        let x0 = *state.get_param().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "`CurveDistanceTrustRegion`: parameter vector in state not set."
        ))?;

        let f0 = state.get_cost();
        let g = problem.gradient(&x0)?;
        let h = self.hessian(problem, &x0)?;

        let step = self.step(&g, &h);
        let x1 = self.bounds.clamp(x0 + step);
        let effective = x1 - x0;

        let f1 = problem.cost(&x1)?;
        let actual = f0 - f1;
        let predicted = -(g.dot(&effective)
            + effective.dot(&(h * effective)) * F::from_f64(0.5).unwrap());

        let quarter = F::from_f64(0.25).unwrap();
        let rho = if predicted > F::zero() {
            actual / predicted
        } else if actual > F::zero() {
            F::one()
        } else {
            F::zero()
        };

        // radius update
        if rho < quarter {
            self.radius *= quarter;
        } else if rho > F::from_f64(0.75).unwrap()
            && effective.norm() >= self.radius * F::from_f64(0.9).unwrap()
        {
            self.radius = RealField::min(self.radius + self.radius, self.max_radius);
        }

        let state = if rho > self.eta && f1 < f0 {
            state.param(x1).cost(f1).gradient(g)
        } else {
            state.param(x0).cost(f0).gradient(g)
        };

        Ok((state, None))
    }

    fn terminate(&mut self, state: &CurveDistanceTrustRegionState<F>) -> TerminationStatus {
        if let Some(g) = state.get_gradient() {
            if g.iter().any(|v| v.is_nan() || v.is_infinite()) {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "gradient is NaN or infinite".into(),
                ));
            }
            if g.norm() < self.step_size_tolerance {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
        }

        if self.radius < self.step_size_tolerance {
            return TerminationStatus::Terminated(TerminationReason::SolverExit(
                "trust radius collapsed".into(),
            ));
        }

        if state.get_cost() != state.get_prev_cost()
            && nalgebra::ComplexField::abs(state.get_cost() - state.get_prev_cost())
                < self.cost_tolerance
        {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }

        TerminationStatus::NotTerminated
    }
}
