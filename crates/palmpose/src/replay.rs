//! Replay of recorded or synthetic hand data.
//!
//! [`ReplayCamera`] and [`ReplayDetector`] stand in for a real webcam and landmark network, which
//! makes it possible to drive a [`Session`][crate::session::Session] deterministically.

use anyhow::{anyhow, bail};

use crate::{
    hand::detection::{DetectorOptions, HandDetector},
    landmark::{Landmark, LandmarkIdx, LandmarkSet},
    video::Camera,
};

/// A [`Camera`] whose frames are just the frame indices `0..len`.
#[derive(Debug, Clone)]
pub struct ReplayCamera {
    len: usize,
    next: usize,
    streaming: bool,
}

impl ReplayCamera {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            next: 0,
            streaming: false,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}

impl Camera for ReplayCamera {
    type Frame = usize;

    /// Starts streaming from the first frame.
    fn start(&mut self) -> anyhow::Result<()> {
        self.next = 0;
        self.streaming = true;
        Ok(())
    }

    fn read(&mut self) -> anyhow::Result<Option<usize>> {
        if !self.streaming || self.next >= self.len {
            return Ok(None);
        }
        let frame = self.next;
        self.next += 1;
        Ok(Some(frame))
    }

    fn stop(&mut self) {
        self.streaming = false;
    }
}

/// A [`HandDetector`] that returns pre-recorded detections for each frame index.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    recording: Vec<Vec<LandmarkSet>>,
    max_hands: Option<usize>,
}

impl ReplayDetector {
    /// Creates a detector replaying `recording`, where `recording[i]` holds the hands visible in
    /// frame `i`.
    pub fn new(recording: Vec<Vec<LandmarkSet>>) -> Self {
        Self {
            recording,
            max_hands: None,
        }
    }

    pub fn len(&self) -> usize {
        self.recording.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }
}

impl HandDetector<usize> for ReplayDetector {
    fn configure(&mut self, options: &DetectorOptions) -> anyhow::Result<()> {
        self.max_hands = Some(options.max_hands);
        Ok(())
    }

    fn detect(&mut self, frame: &usize) -> anyhow::Result<Vec<LandmarkSet>> {
        let Some(max_hands) = self.max_hands else {
            bail!("detector used before it was configured");
        };
        let hands = self
            .recording
            .get(*frame)
            .ok_or_else(|| anyhow!("no recorded detections for frame {frame}"))?;
        Ok(hands.iter().take(max_hands).cloned().collect())
    }
}

/// Landmark positions of a flat, upright, open right hand seen from the palm side, relative to the
/// middle finger MCP, in normalized image units.
const OPEN_PALM: [[f32; 2]; LandmarkSet::NUM_LANDMARKS] = [
    [0.0, 0.145],     // wrist
    [-0.04, 0.115],   // thumb
    [-0.07, 0.085],
    [-0.09, 0.055],
    [-0.11, 0.025],
    [-0.03, 0.005],   // index finger
    [-0.035, -0.035],
    [-0.04, -0.065],
    [-0.045, -0.095],
    [0.0, 0.0],       // middle finger
    [0.0, -0.045],
    [0.0, -0.075],
    [0.0, -0.105],
    [0.03, 0.005],    // ring finger
    [0.035, -0.035],
    [0.04, -0.065],
    [0.045, -0.09],
    [0.055, 0.015],   // pinky
    [0.065, -0.015],
    [0.07, -0.04],
    [0.075, -0.06],
];

/// Creates the landmarks of an open hand facing the camera, with the middle finger MCP (the palm
/// center landmark) placed at `palm`.
///
/// All landmarks share the depth of `palm`.
///
/// # Panics
///
/// This function panics if any coordinate of `palm` is NaN or infinite.
pub fn open_palm(palm: [f32; 3]) -> LandmarkSet {
    assert!(
        palm.iter().all(|c| c.is_finite()),
        "palm position must be finite, got {palm:?}"
    );
    let [px, py, pz] = palm;
    let mut landmarks = [Landmark::default(); LandmarkSet::NUM_LANDMARKS];
    for (lm, [dx, dy]) in landmarks.iter_mut().zip(OPEN_PALM) {
        *lm = Landmark::new([px + dx, py + dy, pz]);
    }
    debug_assert_eq!(
        landmarks[LandmarkIdx::MiddleFingerMcp as usize].position(),
        palm
    );
    LandmarkSet::new(landmarks).expect("finite palm yields finite landmarks")
}

/// Creates `frames` open hands whose palm center moves in a straight line from `from` to `to`.
pub fn sweep(from: [f32; 3], to: [f32; 3], frames: usize) -> Vec<LandmarkSet> {
    (0..frames)
        .map(|i| {
            let t = if frames > 1 {
                i as f32 / (frames - 1) as f32
            } else {
                0.0
            };
            let mut palm = [0.0; 3];
            for ((p, a), b) in palm.iter_mut().zip(from).zip(to) {
                *p = a + (b - a) * t;
            }
            open_palm(palm)
        })
        .collect()
}
