//! Temporal smoothing of target poses.

use nalgebra::{UnitQuaternion, Vector3};

use crate::{
    filter::{Ema, Filter},
    mapper::TargetPose,
    transform::Transform,
};

/// What a [`Smoother`] does with its state when the hand is lost.
///
/// Regardless of the policy, a frame without a target always makes the object hidden immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossPolicy {
    /// Discard the smoothed pose. When the hand is found again, the object appears directly at the
    /// new target.
    #[default]
    Reset,
    /// Keep the last smoothed pose. When the hand is found again, the object glides from where it
    /// was last seen toward the new target.
    Retain,
}

/// Blends successive [`TargetPose`]s into a jitter-free [`Transform`].
///
/// Every update moves the current transform a fixed fraction `alpha` of the way toward the target:
/// position and scale are interpolated linearly, orientation spherically. The blend factor is
/// applied per update, independent of how much time passed between frames.
#[derive(Debug, Clone)]
pub struct Smoother {
    position: Ema<Vector3<f32>>,
    orientation: Ema<UnitQuaternion<f32>>,
    scale: Ema<Vector3<f32>>,
    policy: LossPolicy,
    visible: bool,
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALPHA)
    }
}

impl Smoother {
    pub const DEFAULT_ALPHA: f32 = 0.2;

    /// Creates a smoother that moves `alpha` of the way toward the target with every update.
    ///
    /// # Panics
    ///
    /// This method panics if `alpha` is not in between 0.0 and 1.0.
    pub fn new(alpha: f32) -> Self {
        Self {
            position: Ema::new(alpha),
            orientation: Ema::new(alpha),
            scale: Ema::new(alpha),
            policy: LossPolicy::default(),
            visible: false,
        }
    }

    pub fn with_loss_policy(self, policy: LossPolicy) -> Self {
        Self { policy, ..self }
    }

    pub fn alpha(&self) -> f32 {
        self.position.alpha()
    }

    pub fn loss_policy(&self) -> LossPolicy {
        self.policy
    }

    /// Advances the smoother by one frame.
    ///
    /// With a target, the current transform is blended toward it and returned. Parts of the target
    /// that are [`None`] leave the corresponding part of the transform unchanged. The first target
    /// after construction, [`Smoother::reset`], or a loss with [`LossPolicy::Reset`] is adopted
    /// unblended.
    ///
    /// Without a target, the object is hidden and [`None`] is returned.
    pub fn update(&mut self, target: Option<&TargetPose>) -> Option<Transform> {
        match target {
            Some(target) => {
                self.position.push(target.position);
                if let Some(orientation) = target.orientation {
                    self.orientation.push(orientation);
                }
                if let Some(scale) = target.scale {
                    self.scale.push(Vector3::repeat(scale));
                }
                if !self.visible {
                    log::trace!("hand acquired at {:?}", target.position);
                }
                self.visible = true;
            }
            None => {
                if self.visible {
                    log::trace!("hand lost ({:?})", self.policy);
                }
                self.visible = false;
                if self.policy == LossPolicy::Reset {
                    self.clear();
                }
            }
        }

        self.current()
    }

    /// Returns the smoothed transform, or [`None`] if the object is hidden.
    pub fn current(&self) -> Option<Transform> {
        if self.visible {
            self.last_known()
        } else {
            None
        }
    }

    /// Returns the last smoothed transform, even while the object is hidden.
    ///
    /// This is only ever [`Some`] while hidden when using [`LossPolicy::Retain`].
    pub fn last_known(&self) -> Option<Transform> {
        let position = *self.position.last()?;
        Some(Transform {
            position,
            orientation: self
                .orientation
                .last()
                .copied()
                .unwrap_or_else(UnitQuaternion::identity),
            scale: self
                .scale
                .last()
                .copied()
                .unwrap_or_else(|| Vector3::repeat(1.0)),
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hides the object and discards all smoothing state, regardless of the [`LossPolicy`].
    pub fn reset(&mut self) {
        self.visible = false;
        self.clear();
    }

    fn clear(&mut self) {
        self.position.reset();
        self.orientation.reset();
        self.scale.reset();
    }
}
