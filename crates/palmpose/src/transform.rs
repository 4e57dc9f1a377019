//! Rigid transforms of the virtual object.

use nalgebra::{UnitQuaternion, Vector3};

use crate::filter::Blend;

/// Position, orientation and scale of the tracked object, in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Returns the transform that leaves an object at the origin, unrotated and unscaled.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Returns the orientation as Euler angles `(roll, pitch, yaw)` in radians, for renderers that
    /// don't use quaternions.
    pub fn euler_angles(&self) -> (f32, f32, f32) {
        self.orientation.euler_angles()
    }

    /// Returns a combined measure of how far apart `self` and `other` are.
    ///
    /// This is the sum of the distance between the positions, the angle between the orientations
    /// (in radians), and the distance between the scale vectors. It is zero iff both transforms are
    /// equal.
    pub fn distance(&self, other: &Self) -> f32 {
        // `angle_to` goes through `acos`, which loses most of its precision for small angles.
        let delta = self.orientation.rotation_to(&other.orientation);
        let angle = 2.0 * delta.imag().norm().atan2(delta.scalar().abs());

        (self.position - other.position).norm() + angle + (self.scale - other.scale).norm()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position and scale are interpolated linearly, orientation spherically.
impl Blend for Transform {
    fn blend(&self, target: &Self, alpha: f32) -> Self {
        Self {
            position: self.position.blend(&target.position, alpha),
            orientation: self.orientation.blend(&target.orientation, alpha),
            scale: self.scale.blend(&target.scale, alpha),
        }
    }
}
