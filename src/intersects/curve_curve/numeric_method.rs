use argmin::core::{ArgminFloat, Executor, State};
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, Vector2, U1,
};

use crate::curve::NurbsCurve;
use crate::misc::FloatingPoint;

use super::{
    CurveDistanceBfgs, CurveDistanceDirectionSet, CurveDistanceGradientDescent,
    CurveDistanceNelderMead, CurveDistanceProblem, CurveDistanceTrustRegion,
    CurveIntersectionSolverOptions,
};

/// Closed set of numeric minimization methods available to the root search.
/// Adding a method means adding a variant here and a dispatch arm below;
/// callers are untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumericMethod {
    /// Derivative-free simplex search.
    #[default]
    NelderMead,
    /// Bounded quasi-Newton with backtracking line search.
    QuasiNewton,
    /// Bounded steepest descent projected onto the domain rectangle.
    GradientDescent,
    /// Bounded Powell-style direction-set search.
    DirectionSet,
    /// Trust-region Newton with finite-difference Hessian.
    TrustRegion,
}

/// Result of a single minimization run: the (clamped) parameter pair the
/// solver settled on and the squared distance residual there.
pub type MinimizeOutcome<T> = (Vector2<T>, T);

impl NumericMethod {
    /// Run one minimization of the distance objective between `a` and `b`
    /// from `seed`, bounded to the joint parameter domain.
    ///
    /// Returns `None` when the solver fails or produces no parameter;
    /// failure to converge from one seed is expected and not an error.
    pub(crate) fn minimize<T, D>(
        &self,
        a: &NurbsCurve<T, D>,
        b: &NurbsCurve<T, D>,
        seed: Vector2<T>,
        options: &CurveIntersectionSolverOptions<T>,
    ) -> Option<MinimizeOutcome<T>>
    where
        T: FloatingPoint + ArgminFloat,
        D: DimName + DimNameSub<U1>,
        DefaultAllocator: Allocator<D>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let problem = CurveDistanceProblem::new(a, b);
        let rectangle = problem.parameter_rectangle();
        let seed = rectangle.clamp(seed);
        let max_iters = options.max_iters;

        let best = match self {
            NumericMethod::NelderMead => {
                let solver = CurveDistanceNelderMead::new(rectangle)
                    .with_sd_tolerance(options.cost_tolerance);
                Executor::new(problem, solver)
                    .configure(|state| state.param(seed).max_iters(max_iters))
                    .run()
                    .ok()
                    .and_then(|res| res.state().get_best_param().copied())
            }
            NumericMethod::QuasiNewton => {
                let solver = CurveDistanceBfgs::new(rectangle)
                    .with_step_size_tolerance(options.step_size_tolerance)
                    .with_cost_tolerance(options.cost_tolerance);
                Executor::new(problem, solver)
                    .configure(|state| state.param(seed).max_iters(max_iters))
                    .run()
                    .ok()
                    .and_then(|res| res.state().get_best_param().copied())
            }
            NumericMethod::GradientDescent => {
                let solver = CurveDistanceGradientDescent::new(rectangle)
                    .with_step_size_tolerance(options.step_size_tolerance)
                    .with_cost_tolerance(options.cost_tolerance);
                Executor::new(problem, solver)
                    .configure(|state| state.param(seed).max_iters(max_iters))
                    .run()
                    .ok()
                    .and_then(|res| res.state().get_best_param().copied())
            }
            NumericMethod::DirectionSet => {
                let solver = CurveDistanceDirectionSet::new(rectangle)
                    .with_step_size_tolerance(options.step_size_tolerance)
                    .with_cost_tolerance(options.cost_tolerance);
                Executor::new(problem, solver)
                    .configure(|state| state.param(seed).max_iters(max_iters))
                    .run()
                    .ok()
                    .and_then(|res| res.state().get_best_param().copied())
            }
            NumericMethod::TrustRegion => {
                let solver = CurveDistanceTrustRegion::new(rectangle)
                    .with_step_size_tolerance(options.step_size_tolerance)
                    .with_cost_tolerance(options.cost_tolerance);
                Executor::new(problem, solver)
                    .configure(|state| state.param(seed).max_iters(max_iters))
                    .run()
                    .ok()
                    .and_then(|res| res.state().get_best_param().copied())
            }
        }?;

        let param = rectangle.clamp(best);
        let residual = (a.point_at(param.x) - b.point_at(param.y)).norm_squared();
        Some((param, residual))
    }
}
