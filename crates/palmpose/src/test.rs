use std::sync::OnceLock;

use crate::landmark::LandmarkSet;

/// A right hand captured by the landmark network, tilted slightly away from the camera.
#[rustfmt::skip]
const TILTED_HAND: [f32; LandmarkSet::NUM_LANDMARKS * 3] = [
    0.512, 0.781, 0.000,
    0.447, 0.742, -0.021,
    0.401, 0.683, -0.032,
    0.372, 0.627, -0.043,
    0.349, 0.584, -0.055,
    0.463, 0.583, -0.012,
    0.447, 0.497, -0.027,
    0.438, 0.443, -0.038,
    0.432, 0.396, -0.046,
    0.509, 0.572, -0.011,
    0.505, 0.478, -0.024,
    0.502, 0.419, -0.035,
    0.500, 0.370, -0.043,
    0.551, 0.584, -0.014,
    0.561, 0.498, -0.029,
    0.566, 0.446, -0.039,
    0.569, 0.401, -0.046,
    0.589, 0.612, -0.019,
    0.608, 0.551, -0.031,
    0.618, 0.512, -0.037,
    0.625, 0.475, -0.042,
];

pub fn tilted_hand() -> &'static LandmarkSet {
    static HAND: OnceLock<LandmarkSet> = OnceLock::new();
    HAND.get_or_init(|| LandmarkSet::from_flat(&TILTED_HAND).unwrap())
}
