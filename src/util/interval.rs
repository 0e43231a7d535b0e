//! Possibly-empty scalar interval used to accumulate projection bounds.

/// A closed scalar interval that starts out empty and only ever widens.
///
/// Used for camera fitting: each visible geometry projects its vertices onto
/// the view axes and feeds the results through [`Interval::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interval {
    bounds: Option<(f32, f32)>,
}

impl Interval {
    /// An empty interval.
    pub const EMPTY: Self = Self { bounds: None };

    /// Interval spanning `min..=max`. The bounds are swapped if reversed.
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            bounds: Some((min.min(max), min.max(max))),
        }
    }

    /// Returns `true` until the first value has been fed in.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Lower bound, or `None` when empty.
    pub fn min(&self) -> Option<f32> {
        self.bounds.map(|(min, _)| min)
    }

    /// Upper bound, or `None` when empty.
    pub fn max(&self) -> Option<f32> {
        self.bounds.map(|(_, max)| max)
    }

    /// Width of the interval; zero when empty.
    pub fn length(&self) -> f32 {
        self.bounds.map_or(0.0, |(min, max)| max - min)
    }

    /// Midpoint, or `None` when empty.
    pub fn center(&self) -> Option<f32> {
        self.bounds.map(|(min, max)| 0.5 * (min + max))
    }

    /// Grow the interval symmetrically by `amount` on both ends. No-op when
    /// empty.
    pub fn extend(&mut self, amount: f32) {
        if let Some((min, max)) = self.bounds.as_mut() {
            *min -= amount;
            *max += amount;
        }
    }

    /// Widen the interval so it contains `value`.
    pub fn update(&mut self, value: f32) {
        self.bounds = Some(match self.bounds {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }

    /// Widen the interval so it contains all of `other`.
    pub fn update_range(&mut self, other: &Self) {
        if let Some((min, max)) = other.bounds {
            self.update(min);
            self.update(max);
        }
    }

    /// Returns `true` if `value` lies within the bounds.
    pub fn contains(&self, value: f32) -> bool {
        self.bounds
            .is_some_and(|(min, max)| value >= min && value <= max)
    }
}
