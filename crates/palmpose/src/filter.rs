//! Data filtering and smoothing.

mod ema;

use nalgebra::{UnitQuaternion, Vector3};

pub use ema::Ema;

/// A filter for values of type `V`.
pub trait Filter<V> {
    /// Adds a new value to the filter, returning the filtered value.
    fn push(&mut self, value: V) -> V;

    /// Resets the accumulated history and state of the filter to be identical to the state just
    /// after construction.
    fn reset(&mut self);
}

/// Values that can be interpolated toward a target.
pub trait Blend {
    /// Moves `alpha` of the way from `self` to `target`.
    ///
    /// An `alpha` of 0.0 returns `self`, 1.0 returns `target`.
    fn blend(&self, target: &Self, alpha: f32) -> Self;
}

impl Blend for f32 {
    #[inline]
    fn blend(&self, target: &Self, alpha: f32) -> Self {
        self + (target - self) * alpha
    }
}

/// Linear interpolation.
impl Blend for Vector3<f32> {
    #[inline]
    fn blend(&self, target: &Self, alpha: f32) -> Self {
        self.lerp(target, alpha)
    }
}

/// Spherical linear interpolation along the shorter arc.
impl Blend for UnitQuaternion<f32> {
    fn blend(&self, target: &Self, alpha: f32) -> Self {
        // `try_slerp` gives up when the two rotations are too close to tell apart; normalized
        // linear interpolation is exact enough there.
        self.try_slerp(target, alpha, 1.0e-6).unwrap_or_else(|| {
            let target = if self.coords.dot(&target.coords) < 0.0 {
                UnitQuaternion::new_unchecked(-target.into_inner())
            } else {
                *target
            };
            self.nlerp(&target, alpha)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn blend_scalar() {
        assert_eq!(1.0f32.blend(&3.0, 0.0), 1.0);
        assert_eq!(1.0f32.blend(&3.0, 0.5), 2.0);
        assert_eq!(1.0f32.blend(&3.0, 1.0), 3.0);
    }

    #[test]
    fn blend_rotation_takes_short_arc() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.0);
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let mid = a.blend(&b, 0.5);
        assert_relative_eq!(mid.angle(), FRAC_PI_2 / 2.0, epsilon = 1e-5);

        // Same rotation, opposite quaternion sign: nothing to interpolate.
        let c = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 3.0);
        let neg = UnitQuaternion::new_unchecked(-c.into_inner());
        assert_relative_eq!(c.blend(&neg, 0.5), c, epsilon = 1e-5);
    }

    #[test]
    fn blend_identical_rotations() {
        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        assert_relative_eq!(q.blend(&q, 0.2), q, epsilon = 1e-5);
    }
}
