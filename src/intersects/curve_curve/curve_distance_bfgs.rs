use argmin::{argmin_error_closure, core::*};
use nalgebra::{Matrix2, Vector2};

use crate::misc::FloatingPoint;

use super::ParameterRectangle;

type CurveDistanceBfgsState<F> = IterState<Vector2<F>, Vector2<F>, (), Matrix2<F>, (), F>;

/// Bounded quasi-Newton minimizer for the curve distance objective.
/// Maintains an inverse Hessian approximation with a backtracking line
/// search; every iterate is projected back into the parameter rectangle.
#[derive(Clone, Debug)]
pub struct CurveDistanceBfgs<F: FloatingPoint> {
    bounds: ParameterRectangle<F>,
    step_size_tolerance: F,
    cost_tolerance: F,
}

impl<F: FloatingPoint> CurveDistanceBfgs<F> {
    pub fn new(bounds: ParameterRectangle<F>) -> Self {
        Self {
            bounds,
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
}

impl<O, F> Solver<O, CurveDistanceBfgsState<F>> for CurveDistanceBfgs<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>
        + Gradient<Param = Vector2<F>, Gradient = Vector2<F>>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve distance quasi-newton";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceBfgsState<F>,
    ) -> Result<(CurveDistanceBfgsState<F>, Option<KV>), Error> {
        let x0 = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveDistanceBfgs` requires an initial parameter vector. ",
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
        state: CurveDistanceBfgsState<F>,
    ) -> Result<(CurveDistanceBfgsState<F>, Option<KV>), Error> {
        let x0 = *state.get_param().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "`CurveDistanceBfgs`: parameter vector in state not set."
        ))?;

        let f0 = state.get_cost();

        let g0 = match state.get_gradient() {
            Some(prev) => *prev,
            None => problem.gradient(&x0)?,
        };

        let h0 = state.get_hessian().cloned().unwrap_or(Matrix2::identity());

        let step = -h0 * g0;
        let norm = step.norm();
        let df0 = g0.dot(&step);

        // backtracking line search with projection into the bounds
        let dt = F::from_f64(1e-1).unwrap();
        let dec = F::from_f64(0.5).unwrap();
        let mut t = F::one();
        let mut x1 = x0;
        let mut f1 = f0;
        for _ in 0..32 {
            if t * norm < self.step_size_tolerance {
                break;
            }
            let candidate = self.bounds.clamp(x0 + step * t);
            let fc = problem.cost(&candidate)?;
            if fc - f0 >= dt * t * df0 {
                t *= dec;
            } else {
                x1 = candidate;
                f1 = fc;
                break;
            }
        }

        let g1 = problem.gradient(&x1)?;
        let y = g1 - g0;
        let s = x1 - x0;
        let ys = y.dot(&s);

        let h1 = if ys != F::zero() {
            let s_t = s * s.transpose();
            let hy = h0 * y;
            (h0 + s_t * ((ys + y.dot(&hy)) / (ys * ys)))
                - (((hy * s.transpose()) + (s * hy.transpose())) / ys)
        } else {
            h0
        };

        Ok((state.param(x1).cost(f1).gradient(g1).hessian(h1), None))
    }

    fn terminate(&mut self, state: &CurveDistanceBfgsState<F>) -> TerminationStatus {
        if let Some(g) = state.get_gradient() {
            if g.iter().any(|v| v.is_nan() || v.is_infinite()) {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "gradient is NaN or infinite".into(),
                ));
            }
        }

        if let Some(h) = state.get_hessian() {
            if h.iter().any(|v| v.is_nan() || v.is_infinite()) {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "inverse hessian approximation is NaN or infinite".into(),
                ));
            }
        }

        if let (Some(g), Some(h)) = (state.get_gradient(), state.get_hessian()) {
            let step = h * g;
            if step.norm() < self.step_size_tolerance {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "step size tolerance reached".into(),
                ));
            }
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
