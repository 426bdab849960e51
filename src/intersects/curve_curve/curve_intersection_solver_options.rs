use crate::misc::FloatingPoint;

use super::NumericMethod;

/// Hyperparameters for the multi-start curve intersection search.
#[derive(Clone, Debug)]
pub struct CurveIntersectionSolverOptions<T: FloatingPoint> {
    /// Numeric minimization method run from each seed.
    pub method: NumericMethod,
    /// Distance tolerance for accepting a solution as an intersection.
    /// A candidate is accepted when its squared-distance residual is at most
    /// `precision * precision`.
    pub precision: T,
    /// Number of grid divisions per parameter axis used to seed the search;
    /// `(seed_division + 1)^2` independent minimizations are run per pair.
    pub seed_division: usize,
    /// Iteration cap per seed. Methods without a native convergence
    /// guarantee terminate here.
    pub max_iters: u64,
    /// Tolerance for step sizes in line searches.
    pub step_size_tolerance: T,
    /// Tolerance on the change of the cost to declare convergence.
    pub cost_tolerance: T,
}

impl<T: FloatingPoint> Default for CurveIntersectionSolverOptions<T> {
    fn default() -> Self {
        Self {
            method: NumericMethod::default(),
            precision: T::from_f64(1e-3).unwrap(),
            seed_division: 8,
            max_iters: 128,
            step_size_tolerance: T::from_f64(1e-9).unwrap(),
            cost_tolerance: T::from_f64(1e-12).unwrap(),
        }
    }
}

impl<T: FloatingPoint> CurveIntersectionSolverOptions<T> {
    pub fn with_method(mut self, method: NumericMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_precision(mut self, precision: T) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_seed_division(mut self, seed_division: usize) -> Self {
        self.seed_division = seed_division;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_step_size_tolerance(mut self, step_size_tolerance: T) -> Self {
        self.step_size_tolerance = step_size_tolerance;
        self
    }

    pub fn with_cost_tolerance(mut self, cost_tolerance: T) -> Self {
        self.cost_tolerance = cost_tolerance;
        self
    }
}
