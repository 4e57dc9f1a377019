//! Exponential Moving Average.

use super::{Blend, Filter};

/// Exponential Moving Average – a weighted moving average whose weight decreases exponentially.
///
/// This is a tunable IIR filter. It works on any [`Blend`]able value, so positions are averaged
/// linearly while rotations are averaged along the unit sphere.
#[derive(Debug, Clone)]
pub struct Ema<V> {
    alpha: f32,
    last: Option<V>,
}

impl<V> Ema<V> {
    /// Creates a new Exponential Moving Average filter.
    ///
    /// The `alpha` parameter must be between 0.0 and 1.0 and defines how quickly the weight of
    /// older values should decay. Values close to 1.0 very strongly favor recent values over older
    /// values, while values closer to 0.0 favor more recent values less strongly.
    ///
    /// # Panics
    ///
    /// This method will panic if `alpha` is not in between 0.0 and 1.0.
    pub fn new(alpha: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "EMA alpha must be in range 0.0 to 1.0, got {alpha}"
        );
        Self { alpha, last: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the current filter output, or [`None`] if no value was pushed since the last reset.
    pub fn last(&self) -> Option<&V> {
        self.last.as_ref()
    }
}

impl<V: Blend + Clone> Filter<V> for Ema<V> {
    fn push(&mut self, value: V) -> V {
        let avg = match &self.last {
            Some(last) => last.blend(&value, self.alpha),
            None => value,
        };
        self.last = Some(avg.clone());
        avg
    }

    fn reset(&mut self) {
        self.last = None;
    }
}
