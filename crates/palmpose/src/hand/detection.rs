//! Interface to external hand landmark detectors.

use anyhow::bail;

use crate::landmark::LandmarkSet;

/// Speed/accuracy trade-off of the landmark model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelComplexity {
    /// A lightweight but less accurate model.
    Lite,
    /// The more accurate model, which takes longer to run.
    #[default]
    Full,
}

/// Options passed to a [`HandDetector`] before it starts processing frames.
///
/// These are opaque to `palmpose`: they are handed to the detector as-is, except for
/// [`DetectorOptions::max_hands`], which the session also enforces on the detector's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    /// Maximum number of hands to report per frame.
    pub max_hands: usize,
    pub model_complexity: ModelComplexity,
    /// Minimum confidence for a new hand to be detected.
    pub min_detection_confidence: f32,
    /// Minimum confidence for an already detected hand to keep being tracked.
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_hands: 1,
            model_complexity: ModelComplexity::default(),
            min_detection_confidence: Self::DEFAULT_CONFIDENCE,
            min_tracking_confidence: Self::DEFAULT_CONFIDENCE,
        }
    }
}

impl DetectorOptions {
    pub const DEFAULT_CONFIDENCE: f32 = 0.7;

    /// Checks that the options are usable: at least one hand, and confidences in range 0.0 to 1.0.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_hands == 0 {
            bail!("`max_hands` must be at least 1");
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("`{name}` must be in range 0.0 to 1.0, got {value}");
            }
        }
        Ok(())
    }
}

/// A hand landmark detector that processes frames of type `F`.
pub trait HandDetector<F> {
    /// Applies `options` before the first frame is processed.
    ///
    /// The default implementation ignores the options.
    fn configure(&mut self, options: &DetectorOptions) -> anyhow::Result<()> {
        let _ = options;
        Ok(())
    }

    /// Detects hands in `frame`, returning one [`LandmarkSet`] per hand.
    ///
    /// An empty list means that no hand is visible.
    fn detect(&mut self, frame: &F) -> anyhow::Result<Vec<LandmarkSet>>;
}

impl<F, D: HandDetector<F> + ?Sized> HandDetector<F> for Box<D> {
    fn configure(&mut self, options: &DetectorOptions) -> anyhow::Result<()> {
        (**self).configure(options)
    }

    fn detect(&mut self, frame: &F) -> anyhow::Result<Vec<LandmarkSet>> {
        (**self).detect(frame)
    }
}
