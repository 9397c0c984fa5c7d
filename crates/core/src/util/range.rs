use derive_more::Display;

/// A range between two `f64` values, inclusive on both ends. Used to map
/// values between different scales, e.g. raw noise output in `[-1, 1]` to the
/// normalized `[0, 1]` range.
#[derive(Copy, Clone, Debug, Display, PartialEq)]
#[display(fmt = "[{}, {}]", min, max)]
pub struct NumRange {
    pub min: f64,
    pub max: f64,
}

impl NumRange {
    /// The normal range, `[0, 1]`
    pub const NORMAL: Self = Self::new(0.0, 1.0);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Max minus min
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check if a value is in this range. Ranges are inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Clamp a value into this range
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Map a value from this range onto `[0, 1]`. Values outside this range
    /// will land outside `[0, 1]`, so clamp the result if that matters.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }
}
