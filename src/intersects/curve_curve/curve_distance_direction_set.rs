use argmin::{argmin_error_closure, core::*};
use nalgebra::Vector2;

use crate::misc::FloatingPoint;

use super::ParameterRectangle;

type CurveDistanceDirectionState<F> = IterState<Vector2<F>, (), (), (), (), F>;

/// Bounded direction-set (Powell style) minimizer for the curve distance
/// objective. Each iteration line-minimizes along the current direction set
/// with a golden-section search restricted to the parameter rectangle, then
/// replaces the oldest direction with the overall displacement.
#[derive(Clone, Debug)]
pub struct CurveDistanceDirectionSet<F: FloatingPoint> {
    bounds: ParameterRectangle<F>,
    directions: [Vector2<F>; 2],
    step_size_tolerance: F,
    cost_tolerance: F,
}

impl<F: FloatingPoint> CurveDistanceDirectionSet<F> {
    pub fn new(bounds: ParameterRectangle<F>) -> Self {
        Self {
            bounds,
            directions: [Vector2::x(), Vector2::y()],
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

    /// Golden-section search for the step along `direction` minimizing the
    /// objective, restricted to steps keeping the point inside the bounds.
    fn line_minimize<O>(
        &self,
        problem: &mut Problem<O>,
        origin: Vector2<F>,
        direction: Vector2<F>,
    ) -> Result<(Vector2<F>, F), Error>
    where
        O: CostFunction<Param = Vector2<F>, Output = F>,
    {
        let (mut lo, mut hi) = self.bounds.line_extent(&origin, &direction);
        if hi - lo < self.step_size_tolerance {
            let cost = problem.cost(&origin)?;
            return Ok((origin, cost));
        }

        let invphi = F::from_f64(0.618_033_988_749_894_9).unwrap();

        let mut c = hi - (hi - lo) * invphi;
        let mut d = lo + (hi - lo) * invphi;
        let mut fc = problem.cost(&(origin + direction * c))?;
        let mut fd = problem.cost(&(origin + direction * d))?;

        for _ in 0..64 {
            if hi - lo < self.step_size_tolerance {
                break;
            }
            if fc < fd {
                hi = d;
                d = c;
                fd = fc;
                c = hi - (hi - lo) * invphi;
                fc = problem.cost(&(origin + direction * c))?;
            } else {
                lo = c;
                c = d;
                fc = fd;
                d = lo + (hi - lo) * invphi;
                fd = problem.cost(&(origin + direction * d))?;
            }
        }

        let t = (lo + hi) * F::from_f64(0.5).unwrap();
        let minimizer = self.bounds.clamp(origin + direction * t);
        let cost = problem.cost(&minimizer)?;
        Ok((minimizer, cost))
    }
}

impl<O, F> Solver<O, CurveDistanceDirectionState<F>> for CurveDistanceDirectionSet<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve distance direction set";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceDirectionState<F>,
    ) -> Result<(CurveDistanceDirectionState<F>, Option<KV>), Error> {
        let x0 = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveDistanceDirectionSet` requires an initial parameter vector. ",
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
        state: CurveDistanceDirectionState<F>,
    ) -> Result<(CurveDistanceDirectionState<F>, Option<KV>), Error> {
        let x0 = *state.get_param().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "`CurveDistanceDirectionSet`: parameter vector in state not set."
        ))?;

        let mut x = x0;
        let mut cost = state.get_cost();

        for i in 0..2 {
            let (minimizer, line_cost) = self.line_minimize(problem, x, self.directions[i])?;
            if line_cost < cost {
                x = minimizer;
                cost = line_cost;
            }
        }

        // replace the oldest direction with the sweep displacement and
        // minimize along it once more
        let displacement = x - x0;
        let norm = displacement.norm();
        if norm > self.step_size_tolerance {
            self.directions[0] = self.directions[1];
            self.directions[1] = displacement / norm;
            let (minimizer, line_cost) = self.line_minimize(problem, x, self.directions[1])?;
            if line_cost < cost {
                x = minimizer;
                cost = line_cost;
            }
        }

        Ok((state.param(x).cost(cost), None))
    }

    fn terminate(&mut self, state: &CurveDistanceDirectionState<F>) -> TerminationStatus {
        if state.get_cost().is_nan() || state.get_cost().is_infinite() {
            return TerminationStatus::Terminated(TerminationReason::SolverExit(
                "cost is NaN or infinite".into(),
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
