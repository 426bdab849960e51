use std::fmt;

/// Errors raised while preparing curves for intersection.
/// Both kinds are fatal for the computation that produced them;
/// they are wrapped in `anyhow::Error` and can be recovered by downcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// The curve has no rational B-spline representation.
    NotNurbsConvertible,
    /// The degree / control point / knot bookkeeping of a curve is inconsistent.
    MalformedCurve(String),
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::NotNurbsConvertible => {
                write!(f, "curve is not convertible to a NURBS curve")
            }
            CurveError::MalformedCurve(reason) => write!(f, "malformed NURBS curve: {}", reason),
        }
    }
}

impl std::error::Error for CurveError {}
