use argmin::{argmin_error_closure, core::*};
use nalgebra::Vector2;

use crate::misc::FloatingPoint;

use super::ParameterRectangle;

type CurveDistanceSimplexState<F> = IterState<Vector2<F>, (), (), (), (), F>;

/// Derivative-free simplex minimizer for the curve distance objective.
/// A standard Nelder-Mead iteration over a triangle of parameter pairs;
/// every trial vertex is clamped into the parameter rectangle, which keeps
/// the whole simplex inside the joint domain.
#[derive(Clone, Debug)]
pub struct CurveDistanceNelderMead<F: FloatingPoint> {
    bounds: ParameterRectangle<F>,
    simplex: Vec<(Vector2<F>, F)>,
    sd_tolerance: F,
}

impl<F: FloatingPoint> CurveDistanceNelderMead<F> {
    pub fn new(bounds: ParameterRectangle<F>) -> Self {
        Self {
            bounds,
            simplex: vec![],
            sd_tolerance: F::from_f64(1e-12).unwrap(),
        }
    }

    /// Tolerance on the standard deviation of the simplex costs.
    pub fn with_sd_tolerance(mut self, tolerance: F) -> Self {
        self.sd_tolerance = tolerance;
        self
    }

    fn sort_simplex(&mut self) {
        self.simplex
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Initial simplex: the seed plus one vertex offset along each parameter
    /// axis by a fraction of the domain span, flipped when it would leave
    /// the rectangle.
    fn initial_vertices(&self, seed: Vector2<F>) -> Vec<Vector2<F>> {
        let fraction = F::from_f64(0.05).unwrap();
        let span = self.bounds.span();
        let mut vertices = vec![seed];
        for i in 0..2 {
            let mut offset = span[i] * fraction;
            if seed[i] + offset > self.bounds.max()[i] {
                offset = -offset;
            }
            let mut v = seed;
            v[i] += offset;
            vertices.push(self.bounds.clamp(v));
        }
        vertices
    }
}

impl<O, F> Solver<O, CurveDistanceSimplexState<F>> for CurveDistanceNelderMead<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve distance simplex";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceSimplexState<F>,
    ) -> Result<(CurveDistanceSimplexState<F>, Option<KV>), Error> {
        let seed = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveDistanceNelderMead` requires an initial parameter vector. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;
        let seed = self.bounds.clamp(*seed);

        self.simplex.clear();
        for v in self.initial_vertices(seed) {
            let cost = problem.cost(&v)?;
            self.simplex.push((v, cost));
        }
        self.sort_simplex();

        let (best, best_cost) = self.simplex[0];
        Ok((state.param(best).cost(best_cost), None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: CurveDistanceSimplexState<F>,
    ) -> Result<(CurveDistanceSimplexState<F>, Option<KV>), Error> {
        let half = F::from_f64(0.5).unwrap();
        let two = F::from_f64(2.0).unwrap();

        let (best, best_cost) = self.simplex[0];
        let (second, second_cost) = self.simplex[1];
        let (worst, worst_cost) = self.simplex[2];

        let centroid = (best + second) * half;

        // reflection
        let reflected = self.bounds.clamp(centroid + (centroid - worst));
        let reflected_cost = problem.cost(&reflected)?;

        if reflected_cost < best_cost {
            // expansion
            let expanded = self.bounds.clamp(centroid + (centroid - worst) * two);
            let expanded_cost = problem.cost(&expanded)?;
            self.simplex[2] = if expanded_cost < reflected_cost {
                (expanded, expanded_cost)
            } else {
                (reflected, reflected_cost)
            };
        } else if reflected_cost < second_cost {
            self.simplex[2] = (reflected, reflected_cost);
        } else {
            // contraction, towards the better of worst & reflected
            let (towards, towards_cost) = if reflected_cost < worst_cost {
                (reflected, reflected_cost)
            } else {
                (worst, worst_cost)
            };
            let contracted = self.bounds.clamp(centroid + (towards - centroid) * half);
            let contracted_cost = problem.cost(&contracted)?;
            if contracted_cost < towards_cost {
                self.simplex[2] = (contracted, contracted_cost);
            } else {
                // shrink everything towards the best vertex
                for i in 1..3 {
                    let shrunk = self.bounds.clamp(best + (self.simplex[i].0 - best) * half);
                    let shrunk_cost = problem.cost(&shrunk)?;
                    self.simplex[i] = (shrunk, shrunk_cost);
                }
            }
        }

        self.sort_simplex();
        let (best, best_cost) = self.simplex[0];
        Ok((state.param(best).cost(best_cost), None))
    }

    fn terminate(&mut self, state: &CurveDistanceSimplexState<F>) -> TerminationStatus {
        if state.get_cost().is_nan() || state.get_cost().is_infinite() {
            return TerminationStatus::Terminated(TerminationReason::SolverExit(
                "cost is NaN or infinite".into(),
            ));
        }

        let n = F::from_usize(self.simplex.len()).unwrap();
        let mean = self.simplex.iter().fold(F::zero(), |acc, (_, c)| acc + *c) / n;
        let variance = self
            .simplex
            .iter()
            .fold(F::zero(), |acc, (_, c)| acc + (*c - mean) * (*c - mean))
            / n;

        if nalgebra::ComplexField::sqrt(variance) < self.sd_tolerance {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }

        TerminationStatus::NotTerminated
    }
}
