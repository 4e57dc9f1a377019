//! Mapping of hand landmarks to a target pose.
//!
//! The [`LandmarkMapper`] converts a single frame's [`LandmarkSet`] into a [`TargetPose`]: the
//! unsmoothed position, orientation and scale that the tracked object should have in that frame.
//! All knobs that differ between use cases (which landmarks anchor the object, how large the scene
//! is, how depth is mapped, whether orientation and scale are tracked) live in [`MapperConfig`].

use std::f32::consts::PI;

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::landmark::{LandmarkIdx, LandmarkSet, PALM_BASE};

/// How the detector's relative depth is mapped to the scene's Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthMapping {
    /// `rz = -z * scale`: hands moving toward the camera move toward positive Z.
    Negated { scale: f32 },
    /// `rz = z * scale`.
    Direct { scale: f32 },
    /// Ignores the detected depth and always places the object at this Z coordinate.
    Fixed(f32),
}

impl DepthMapping {
    pub fn apply(&self, z: f32) -> f32 {
        match *self {
            DepthMapping::Negated { scale } => -z * scale,
            DepthMapping::Direct { scale } => z * scale,
            DepthMapping::Fixed(depth) => depth,
        }
    }
}

/// Parameters of the depth-responsive scale factor computed by [`depth_scale`].
///
/// The scale is `k / (|z| + c)`, clamped to `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    pub k: f32,
    pub c: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            k: 0.3,
            c: 0.5,
            min: 0.1,
            max: 1.0,
        }
    }
}

/// Configuration of a [`LandmarkMapper`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    anchor: Vec<LandmarkIdx>,
    plane_size: [f32; 2],
    depth: DepthMapping,
    orientation: bool,
    scale: Option<ScaleConfig>,
}

impl Default for MapperConfig {
    /// Anchors the object at the base of the palm, with orientation and scale tracking enabled.
    fn default() -> Self {
        Self {
            anchor: PALM_BASE.to_vec(),
            plane_size: Self::DEFAULT_PLANE_SIZE,
            depth: Self::DEFAULT_DEPTH,
            orientation: true,
            scale: Some(ScaleConfig::default()),
        }
    }
}

impl MapperConfig {
    pub const DEFAULT_PLANE_SIZE: [f32; 2] = [4.0, 3.0];

    pub const DEFAULT_DEPTH: DepthMapping = DepthMapping::Negated { scale: 2.0 };

    /// A minimal configuration that only tracks the position of the palm center landmark.
    ///
    /// The image maps onto a 2x2 plane centered at the origin, and the detector's depth is used
    /// unchanged.
    pub fn palm_center() -> Self {
        Self {
            anchor: vec![LandmarkIdx::MiddleFingerMcp],
            plane_size: [2.0, 2.0],
            depth: DepthMapping::Direct { scale: 1.0 },
            orientation: false,
            scale: None,
        }
    }

    /// Sets the landmarks whose average position anchors the object.
    ///
    /// # Panics
    ///
    /// This method panics if `anchor` is empty.
    pub fn anchor(self, anchor: &[LandmarkIdx]) -> Self {
        assert!(!anchor.is_empty(), "anchor needs at least one landmark");
        Self {
            anchor: anchor.to_vec(),
            ..self
        }
    }

    /// Sets the width and height of the scene area the camera image is mapped onto.
    pub fn plane_size(self, width: f32, height: f32) -> Self {
        Self {
            plane_size: [width, height],
            ..self
        }
    }

    pub fn depth(self, depth: DepthMapping) -> Self {
        Self { depth, ..self }
    }

    /// Enables or disables tracking the palm orientation.
    pub fn orientation(self, orientation: bool) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    /// Sets the depth-responsive scale parameters, or disables scale tracking with [`None`].
    ///
    /// # Panics
    ///
    /// This method panics if `min > max`, if either bound is NaN, if `c` is not positive, or if
    /// `k` is not finite.
    pub fn scale(self, scale: Option<ScaleConfig>) -> Self {
        if let Some(cfg) = &scale {
            assert!(
                cfg.min <= cfg.max,
                "scale bounds must satisfy min <= max, got min = {}, max = {}",
                cfg.min,
                cfg.max
            );
            assert!(cfg.c > 0.0, "scale offset `c` must be positive, got {}", cfg.c);
            assert!(cfg.k.is_finite(), "scale factor `k` must be finite, got {}", cfg.k);
        }
        Self { scale, ..self }
    }

    pub fn anchor_landmarks(&self) -> &[LandmarkIdx] {
        &self.anchor
    }
}

/// The pose derived from a single frame, before smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub position: Vector3<f32>,
    /// [`None`] if orientation tracking is disabled or the palm orientation could not be
    /// determined in this frame.
    pub orientation: Option<UnitQuaternion<f32>>,
    /// Uniform scale factor, [`None`] if scale tracking is disabled.
    pub scale: Option<f32>,
}

/// Computes [`TargetPose`]s from hand landmarks.
#[derive(Debug, Clone, Default)]
pub struct LandmarkMapper {
    config: MapperConfig,
}

impl LandmarkMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Maps the first hand of a frame's detections, if any.
    ///
    /// Returns [`None`] when no hand was detected, meaning the object should not be shown.
    pub fn map_frame(&self, hands: &[LandmarkSet]) -> Option<TargetPose> {
        hands.first().map(|hand| self.map(hand))
    }

    pub fn map(&self, hand: &LandmarkSet) -> TargetPose {
        let anchor = hand
            .average_position(&self.config.anchor)
            .unwrap_or_else(|| hand.palm_center());

        let orientation = if self.config.orientation {
            palm_normal(
                hand.get(LandmarkIdx::Wrist).to_vector(),
                hand.get(LandmarkIdx::IndexFingerMcp).to_vector(),
                hand.get(LandmarkIdx::PinkyMcp).to_vector(),
            )
            .map(|normal| rotation_to(&normal))
        } else {
            None
        };

        TargetPose {
            position: self.map_position(anchor),
            orientation,
            scale: self.config.scale.map(|cfg| depth_scale(anchor.z, &cfg)),
        }
    }

    /// Maps a position in normalized image coordinates into the scene.
    ///
    /// X and Y are recentered around the middle of the image and stretched to the configured plane
    /// size. Y is flipped, since it points down in the image but up in the scene.
    pub fn map_position(&self, pos: Vector3<f32>) -> Vector3<f32> {
        let [w, h] = self.config.plane_size;
        Vector3::new(
            (pos.x - 0.5) * w,
            -(pos.y - 0.5) * h,
            self.config.depth.apply(pos.z),
        )
    }
}

/// Computes the normal of the palm plane spanned by the wrist, index finger MCP and pinky MCP.
///
/// The result is `normalize(cross(index_mcp - wrist, pinky_mcp - wrist))`, computed in the
/// coordinate system of the inputs. Returns [`None`] if the three points are (nearly) collinear.
pub fn palm_normal(
    wrist: Vector3<f32>,
    index_mcp: Vector3<f32>,
    pinky_mcp: Vector3<f32>,
) -> Option<Unit<Vector3<f32>>> {
    let v1 = index_mcp - wrist;
    let v2 = pinky_mcp - wrist;
    Unit::try_new(v1.cross(&v2), 1.0e-9)
}

/// Returns the shortest-arc rotation that turns the forward axis `(0, 0, 1)` into `normal`.
///
/// The rotation around `normal` itself is not constrained by this.
pub fn rotation_to(normal: &Unit<Vector3<f32>>) -> UnitQuaternion<f32> {
    UnitQuaternion::rotation_between_axis(&Vector3::z_axis(), normal)
        // Exactly opposite: any half turn works, pick the one around X.
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// Computes a scale factor that grows as the hand approaches the camera.
///
/// `z` is the detector's relative depth. The result is `k / (|z| + c)`, clamped to the configured
/// `min` and `max`.
///
/// # Panics
///
/// This function panics if `min > max` or either bound is NaN. [`MapperConfig::scale`] rejects
/// such configurations up front.
pub fn depth_scale(z: f32, cfg: &ScaleConfig) -> f32 {
    (cfg.k / (z.abs() + cfg.c)).clamp(cfg.min, cfg.max)
}
