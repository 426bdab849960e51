use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint};

use crate::misc::FloatingPoint;

/// Distance below which two consecutive result points are considered
/// the same intersection, in world units.
pub const DEDUP_MINIMUM_DISTANCE: f64 = 1e-4;

/// Collapse runs of near-identical points in a single forward pass.
///
/// The first point is always kept. Every following point is compared against
/// the last *kept* point and dropped when closer than `min_distance`; a dropped
/// point does not advance the comparison anchor. This is a streaming filter,
/// not a clustering: two close points separated by a distant one in the
/// sequence are both kept. Downstream consumers rely on that exact behavior.
pub fn dedup_adjacent<T: FloatingPoint, D: DimName>(
    points: Vec<OPoint<T, D>>,
    min_distance: T,
) -> Vec<OPoint<T, D>>
where
    DefaultAllocator: Allocator<D>,
{
    let mut iter = points.into_iter();
    let first = match iter.next() {
        Some(p) => p,
        None => return vec![],
    };

    let mut kept = vec![first];
    for p in iter {
        let last = &kept[kept.len() - 1];
        if (&p - last).norm() > min_distance {
            kept.push(p);
        }
    }
    kept
}
