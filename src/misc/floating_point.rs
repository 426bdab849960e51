use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Scalar trait covering the floating point types (f32, f64)
/// that the curve & intersection code is generic over.
pub trait FloatingPoint: RealField + ToPrimitive + Copy {}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
