//! Hand landmarks as reported by a landmark detector.

use nalgebra::Vector3;

type Position = [f32; 3];

/// A single hand landmark in the detector's normalized image coordinates.
///
/// `x` and `y` are fractions of the image width and height (0.0 to 1.0, Y pointing down), `z` is a
/// relative depth that gets more negative as the landmark approaches the camera.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Default)]
pub struct Landmark {
    pos: Position,
    visibility: Option<f32>,
    presence: Option<f32>,
}

impl Landmark {
    pub fn new(position: Position) -> Self {
        Self {
            pos: position,
            visibility: None,
            presence: None,
        }
    }

    pub fn with_visibility(self, visibility: f32) -> Self {
        Self {
            visibility: Some(visibility),
            ..self
        }
    }

    pub fn with_presence(self, presence: f32) -> Self {
        Self {
            presence: Some(presence),
            ..self
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }

    pub fn visibility(&self) -> Option<f32> {
        self.visibility
    }

    pub fn presence(&self) -> Option<f32> {
        self.presence
    }

    /// Returns the landmark position as a [`Vector3`].
    #[inline]
    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::from(self.pos)
    }

    fn is_finite(&self) -> bool {
        self.pos.iter().all(|c| c.is_finite())
    }
}

/// The 21 landmarks of a single detected hand.
///
/// Landmark sets are produced fresh for every frame and never mutated afterwards. They can only be
/// constructed from well-formed input: all constructors return [`None`] when given the wrong number
/// of landmarks or non-finite coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: [Landmark; Self::NUM_LANDMARKS],
}

impl LandmarkSet {
    /// Number of landmarks the hand model outputs.
    pub const NUM_LANDMARKS: usize = 21;

    /// Returns [`None`] if any coordinate is NaN or infinite.
    pub fn new(landmarks: [Landmark; Self::NUM_LANDMARKS]) -> Option<Self> {
        if !landmarks.iter().all(Landmark::is_finite) {
            log::trace!("discarding hand with non-finite landmarks");
            return None;
        }
        Some(Self { landmarks })
    }

    /// Creates a [`LandmarkSet`] from a slice of exactly [`LandmarkSet::NUM_LANDMARKS`] landmarks.
    ///
    /// Returns [`None`] if the slice has a different length, or if any coordinate is NaN or
    /// infinite.
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        Self::new(landmarks.try_into().ok()?)
    }

    /// Creates a [`LandmarkSet`] from a flat list of `x, y, z` triples, the format landmark
    /// networks usually output.
    ///
    /// Returns [`None`] unless `coords` holds exactly `3 * NUM_LANDMARKS` finite values.
    pub fn from_flat(coords: &[f32]) -> Option<Self> {
        if coords.len() != 3 * Self::NUM_LANDMARKS {
            return None;
        }

        let landmarks = coords
            .chunks_exact(3)
            .map(|c| Landmark::new([c[0], c[1], c[2]]))
            .collect::<Vec<_>>();
        Self::from_slice(&landmarks)
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks[idx as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = Landmark> + Clone + '_ {
        self.landmarks.iter().copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.landmarks.iter().map(|lm| lm.pos)
    }

    /// Averages the positions of the landmarks in `indices`.
    ///
    /// Returns [`None`] if `indices` is empty.
    pub fn average_position(&self, indices: &[LandmarkIdx]) -> Option<Vector3<f32>> {
        if indices.is_empty() {
            return None;
        }

        let sum = indices
            .iter()
            .fold(Vector3::zeros(), |acc, &idx| acc + self.get(idx).to_vector());
        Some(sum / indices.len() as f32)
    }

    /// Computes the center of the palm by averaging the [`PALM_BASE`] landmarks.
    pub fn palm_center(&self) -> Vector3<f32> {
        let sum = PALM_BASE
            .iter()
            .fold(Vector3::zeros(), |acc, &idx| acc + self.get(idx).to_vector());
        sum / PALM_BASE.len() as f32
    }

    /// Returns the X/Y position of every landmark in pixel coordinates of a `width`x`height`
    /// image, for drawing 2D overlays.
    pub fn pixel_positions(&self, width: u32, height: u32) -> impl Iterator<Item = [f32; 2]> + '_ {
        let (w, h) = (width as f32, height as f32);
        self.landmarks.iter().map(move |lm| [lm.x() * w, lm.y() * h])
    }
}

/// Names for the hand landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    /// All landmark names, in detector order.
    pub const ALL: [LandmarkIdx; LandmarkSet::NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Wrist,
            ThumbCmc,
            ThumbMcp,
            ThumbIp,
            ThumbTip,
            IndexFingerMcp,
            IndexFingerPip,
            IndexFingerDip,
            IndexFingerTip,
            MiddleFingerMcp,
            MiddleFingerPip,
            MiddleFingerDip,
            MiddleFingerTip,
            RingFingerMcp,
            RingFingerPip,
            RingFingerDip,
            RingFingerTip,
            PinkyMcp,
            PinkyPip,
            PinkyDip,
            PinkyTip,
        ]
    };
}

/// The landmarks surrounding the base of the palm.
///
/// Their average is a stable anchor for the hand, since it does not move when the fingers bend.
pub const PALM_BASE: &[LandmarkIdx] = {
    use LandmarkIdx::*;
    &[
        Wrist,
        ThumbCmc,
        IndexFingerMcp,
        MiddleFingerMcp,
        RingFingerMcp,
        PinkyMcp,
    ]
};
