pub mod curve_error;
pub mod nurbs_curve;

pub use curve_error::*;
pub use nurbs_curve::*;
