use itertools::Itertools;

/// Policy for forming curve pairs out of two curve collections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PairingPolicy {
    /// Index-wise zip; the shorter collection repeats its last element to
    /// match the longer one.
    #[default]
    Longest,
    /// Full Cartesian product, iterated with the second collection as the
    /// outer loop and the first as the inner loop.
    Cross,
}

impl PairingPolicy {
    /// Produce the ordered pair sequence for two collections.
    /// Empty whenever either input is empty.
    pub fn pairs<'a, A, B>(&self, xs: &'a [A], ys: &'a [B]) -> Vec<(&'a A, &'a B)> {
        match self {
            PairingPolicy::Longest => zip_long_repeat(xs, ys),
            PairingPolicy::Cross => ys
                .iter()
                .cartesian_product(xs.iter())
                .map(|(y, x)| (x, y))
                .collect(),
        }
    }
}

/// Index-wise zip of two slices extended to the longer length by repeating
/// the shorter slice's final element.
pub fn zip_long_repeat<'a, A, B>(xs: &'a [A], ys: &'a [B]) -> Vec<(&'a A, &'a B)> {
    if xs.is_empty() || ys.is_empty() {
        return vec![];
    }
    let len = xs.len().max(ys.len());
    (0..len)
        .map(|i| (&xs[i.min(xs.len() - 1)], &ys[i.min(ys.len() - 1)]))
        .collect()
}
