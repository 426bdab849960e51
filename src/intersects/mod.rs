pub mod curve_curve;
pub mod dedup;

pub use curve_curve::*;
pub use dedup::*;

/// Intersection between two geometries.
pub trait Intersects<'a, T> {
    type Output;
    type Option;

    /// Find the intersections with another geometry.
    fn find_intersections(&'a self, other: T, option: Self::Option) -> Self::Output;
}
