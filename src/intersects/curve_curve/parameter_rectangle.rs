use nalgebra::Vector2;

use crate::misc::FloatingPoint;

/// Joint parameter domain of a curve pair: the rectangle
/// `[u_min, u_max] x [v_min, v_max]`. Every solver evaluation and every
/// accepted solution is clamped into this rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRectangle<T: FloatingPoint> {
    min: Vector2<T>,
    max: Vector2<T>,
}

impl<T: FloatingPoint> ParameterRectangle<T> {
    pub fn new(a_domain: (T, T), b_domain: (T, T)) -> Self {
        Self {
            min: Vector2::new(a_domain.0, b_domain.0),
            max: Vector2::new(a_domain.1, b_domain.1),
        }
    }

    pub fn min(&self) -> &Vector2<T> {
        &self.min
    }

    pub fn max(&self) -> &Vector2<T> {
        &self.max
    }

    pub fn span(&self) -> Vector2<T> {
        self.max - self.min
    }

    /// Clamp a parameter pair into the rectangle componentwise.
    pub fn clamp(&self, p: Vector2<T>) -> Vector2<T> {
        Vector2::new(
            p.x.max(self.min.x).min(self.max.x),
            p.y.max(self.min.y).min(self.max.y),
        )
    }

    pub fn contains(&self, p: &Vector2<T>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }

    /// Range of step lengths `t` keeping `origin + t * direction` inside the
    /// rectangle. Returns `(0, 0)` for a zero direction.
    pub fn line_extent(&self, origin: &Vector2<T>, direction: &Vector2<T>) -> (T, T) {
        let mut lo = T::min_value().unwrap();
        let mut hi = T::max_value().unwrap();
        let mut constrained = false;

        for i in 0..2 {
            let d = direction[i];
            if d == T::zero() {
                continue;
            }
            constrained = true;
            let t0 = (self.min[i] - origin[i]) / d;
            let t1 = (self.max[i] - origin[i]) / d;
            let (a, b) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            lo = lo.max(a);
            hi = hi.min(b);
        }

        if !constrained || lo > hi {
            (T::zero(), T::zero())
        } else {
            (lo, hi)
        }
    }
}
