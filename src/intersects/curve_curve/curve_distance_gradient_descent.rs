use argmin::{argmin_error_closure, core::*};
use nalgebra::Vector2;

use crate::misc::FloatingPoint;

use super::ParameterRectangle;

type CurveDistanceGradientState<F> = IterState<Vector2<F>, Vector2<F>, (), (), (), F>;

/// Bounded steepest descent for the curve distance objective:
/// Armijo backtracking along the negative gradient with every trial point
/// projected onto the parameter rectangle.
#[derive(Clone, Debug)]
pub struct CurveDistanceGradientDescent<F: FloatingPoint> {
    bounds: ParameterRectangle<F>,
    step_size_tolerance: F,
    cost_tolerance: F,
}

impl<F: FloatingPoint> CurveDistanceGradientDescent<F> {
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

impl<O, F> Solver<O, CurveDistanceGradientState<F>> for CurveDistanceGradientDescent<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>
        + Gradient<Param = Vector2<F>, Gradient = Vector2<F>>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve distance projected gradient descent";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceGradientState<F>,
    ) -> Result<(CurveDistanceGradientState<F>, Option<KV>), Error> {
        let x0 = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveDistanceGradientDescent` requires an initial parameter vector. ",
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
        state: CurveDistanceGradientState<F>,
    ) -> Result<(CurveDistanceGradientState<F>, Option<KV>), Error> {
        let x0 = *state.get_param().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "`CurveDistanceGradientDescent`: parameter vector in state not set."
        ))?;

        let f0 = state.get_cost();
        let g0 = problem.gradient(&x0)?;

        // Armijo condition on the projected step
        let c1 = F::from_f64(1e-4).unwrap();
        let dec = F::from_f64(0.5).unwrap();
        let mut t = F::one();
        let mut x1 = x0;
        let mut f1 = f0;
        for _ in 0..32 {
            let candidate = self.bounds.clamp(x0 - g0 * t);
            let s = candidate - x0;
            if s.norm() < self.step_size_tolerance {
                break;
            }
            let fc = problem.cost(&candidate)?;
            if fc <= f0 + c1 * g0.dot(&s) {
                x1 = candidate;
                f1 = fc;
                break;
            }
            t *= dec;
        }

        Ok((state.param(x1).cost(f1).gradient(g0), None))
    }

    fn terminate(&mut self, state: &CurveDistanceGradientState<F>) -> TerminationStatus {
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

        if state.get_cost() != state.get_prev_cost()
            && nalgebra::ComplexField::abs(state.get_cost() - state.get_prev_cost())
                < self.cost_tolerance
        {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }

        TerminationStatus::NotTerminated
    }
}
