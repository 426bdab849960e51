pub mod curve_curve_intersection;
pub mod curve_distance_bfgs;
pub mod curve_distance_direction_set;
pub mod curve_distance_gradient_descent;
pub mod curve_distance_nelder_mead;
pub mod curve_distance_problem;
pub mod curve_distance_trust_region;
pub mod curve_intersection_solver_options;
pub mod intersection_curve_curve;
pub mod numeric_method;
pub mod parameter_rectangle;

pub use curve_curve_intersection::*;
pub use curve_distance_bfgs::*;
pub use curve_distance_direction_set::*;
pub use curve_distance_gradient_descent::*;
pub use curve_distance_nelder_mead::*;
pub use curve_distance_problem::*;
pub use curve_distance_trust_region::*;
pub use curve_intersection_solver_options::*;
pub use numeric_method::*;
pub use parameter_rectangle::*;
