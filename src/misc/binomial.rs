use nalgebra::RealField;

/// Returns the binomial coefficient C(n, k).
/// Computed multiplicatively, which is exact for the small
/// orders used by the rational derivative evaluation.
pub fn binomial<T: RealField + Copy>(n: usize, k: usize) -> T {
    if k == 0 || k == n {
        return T::one();
    } else if n == 0 || k > n {
        return T::zero();
    }

    let k = k.min(n - k);
    let mut r = T::one();
    for i in 0..k {
        r = r * T::from_usize(n - i).unwrap() / T::from_usize(i + 1).unwrap();
    }
    r
}
