use std::{cell::Cell, rc::Rc};

use anyhow::bail;
use approx::assert_relative_eq;
use palmpose::{
    hand::detection::{DetectorOptions, HandDetector},
    landmark::{LandmarkIdx, LandmarkSet},
    mapper::{LandmarkMapper, MapperConfig, ScaleConfig},
    replay::{self, ReplayCamera, ReplayDetector},
    session::{Session, SessionOptions, SessionStatus},
    smoother::LossPolicy,
    transform::Transform,
    video::Camera,
};

fn visible(frames: Vec<LandmarkSet>) -> Vec<Vec<LandmarkSet>> {
    frames.into_iter().map(|hand| vec![hand]).collect()
}

fn replay_session(
    recording: Vec<Vec<LandmarkSet>>,
    options: SessionOptions,
) -> Session<ReplayCamera, ReplayDetector> {
    let camera = ReplayCamera::new(recording.len());
    Session::new(camera, ReplayDetector::new(recording), options)
}

/// Runs `session` to completion and returns everything that was rendered.
fn render_all<C: Camera, D: HandDetector<C::Frame>>(
    session: &mut Session<C, D>,
) -> Vec<Option<Transform>> {
    let mut rendered = Vec::new();
    session.run(&mut |pose: Option<&Transform>| rendered.push(pose.copied()));
    rendered
}

struct BrokenCamera;

impl Camera for BrokenCamera {
    type Frame = usize;

    fn start(&mut self) -> anyhow::Result<()> {
        bail!("device busy")
    }

    fn read(&mut self) -> anyhow::Result<Option<usize>> {
        panic!("read from a camera that never started")
    }

    fn stop(&mut self) {}
}

/// Counts how often the wrapped detector is invoked.
struct Counting<D> {
    inner: D,
    calls: Rc<Cell<usize>>,
}

impl<D: HandDetector<usize>> HandDetector<usize> for Counting<D> {
    fn configure(&mut self, options: &DetectorOptions) -> anyhow::Result<()> {
        self.inner.configure(options)
    }

    fn detect(&mut self, frame: &usize) -> anyhow::Result<Vec<LandmarkSet>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.detect(frame)
    }
}

/// Parses one flat list of `x, y, z` coordinates per frame, like a network's raw output tensor.
struct FlatDetector {
    frames: Vec<Vec<f32>>,
}

impl HandDetector<usize> for FlatDetector {
    fn detect(&mut self, frame: &usize) -> anyhow::Result<Vec<LandmarkSet>> {
        Ok(LandmarkSet::from_flat(&self.frames[*frame]).into_iter().collect())
    }
}

fn flatten(hand: &LandmarkSet) -> Vec<f32> {
    hand.positions().flatten().collect()
}

#[test]
fn non_finite_landmarks_are_no_target() {
    let hands = replay::sweep([0.4, 0.5, 0.0], [0.6, 0.5, 0.0], 4);
    let mut frames = hands.iter().map(flatten).collect::<Vec<_>>();
    frames[1][0] = f32::NAN;

    for policy in [LossPolicy::Reset, LossPolicy::Retain] {
        let mut session = Session::new(
            ReplayCamera::new(frames.len()),
            FlatDetector {
                frames: frames.clone(),
            },
            SessionOptions::default().loss_policy(policy),
        );
        session.start();
        let rendered = render_all(&mut session);
        assert_eq!(rendered.len(), 5, "{policy:?}");

        assert!(rendered[0].is_some());
        assert_eq!(rendered[1], None, "{policy:?}: malformed frame must hide the object");
        for pose in &rendered[2..4] {
            let pose = pose.unwrap();
            assert!(
                pose.position.iter().all(|c| c.is_finite()),
                "{policy:?}: {pose:?}"
            );
            assert!(pose.scale.iter().all(|c| c.is_finite()));
            assert!(pose.orientation.coords.iter().all(|c| c.is_finite()));
        }

        if policy == LossPolicy::Reset {
            let target = LandmarkMapper::default().map(&hands[2]);
            assert_relative_eq!(rendered[2].unwrap().position, target.position, epsilon = 1e-6);
        }
    }
}

#[test]
#[should_panic]
fn unordered_scale_bounds_are_rejected() {
    let scale = ScaleConfig {
        min: 1.0,
        max: 0.1,
        ..Default::default()
    };
    SessionOptions::default().mapper(MapperConfig::default().scale(Some(scale)));
}

#[test]
fn follows_hand_then_hides() {
    let mut recording = visible(replay::sweep([0.3, 0.3, 0.0], [0.7, 0.7, 0.0], 5));
    recording.push(Vec::new());

    let options = SessionOptions::default()
        .mapper(MapperConfig::default().anchor(&[LandmarkIdx::MiddleFingerMcp]));
    let mut session = replay_session(recording, options);
    assert_eq!(session.start(), &SessionStatus::Running);

    let rendered = render_all(&mut session);
    // 6 recorded frames, plus the final hide when the stream ends.
    assert_eq!(rendered.len(), 7);

    let poses = rendered[..5].iter().map(|p| p.unwrap()).collect::<Vec<_>>();
    assert_relative_eq!(poses[0].position.x, -0.8, epsilon = 1e-5);
    assert_relative_eq!(poses[0].position.y, 0.6, epsilon = 1e-5);
    for pair in poses.windows(2) {
        assert!(pair[1].position.x > pair[0].position.x);
        assert!(pair[1].position.y < pair[0].position.y);
    }
    let last = poses[4].position;
    assert!(last.x < 0.8, "smoothed pose must lag behind the hand");
    assert!(last.y > -0.6);
    assert_relative_eq!(poses[4].scale.x, 0.6, epsilon = 1e-5);

    assert_eq!(rendered[5], None);
    assert_eq!(rendered[6], None);
    assert_eq!(session.status(), &SessionStatus::Finished);
    assert!(!session.camera().is_streaming());
}

#[test]
fn camera_failure_is_reported() {
    let calls = Rc::new(Cell::new(0));
    let detector = Counting {
        inner: ReplayDetector::new(Vec::new()),
        calls: calls.clone(),
    };
    let mut session = Session::new(BrokenCamera, detector, SessionOptions::default());

    assert!(matches!(session.start(), SessionStatus::Failed(_)));
    let msg = session.error_message().unwrap();
    assert!(msg.contains("failed to start camera"), "{msg}");
    assert!(msg.contains("device busy"), "{msg}");

    let rendered = render_all(&mut session);
    assert!(rendered.is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(session.pose(), None);
}

#[test]
fn detector_failure_hides_object() {
    // The camera produces more frames than the detector has recordings for.
    let recording = visible(replay::sweep([0.5, 0.5, 0.0], [0.5, 0.5, 0.0], 2));
    let camera = ReplayCamera::new(4);
    let mut session = Session::new(
        camera,
        ReplayDetector::new(recording),
        SessionOptions::default(),
    );
    session.start();

    let rendered = render_all(&mut session);
    assert_eq!(rendered.len(), 3);
    assert!(rendered[0].is_some());
    assert!(rendered[1].is_some());
    assert_eq!(rendered[2], None);

    let msg = session.error_message().unwrap();
    assert!(msg.contains("hand detection failed"), "{msg}");
    assert!(!session.camera().is_streaming());
    assert_eq!(session.pose(), None);
}

#[test]
fn invalid_options_fail_to_start() {
    let options = SessionOptions::default().detector(DetectorOptions {
        max_hands: 0,
        ..Default::default()
    });
    let mut session = replay_session(Vec::new(), options);
    assert!(matches!(session.start(), SessionStatus::Failed(_)));
    assert!(session.error_message().unwrap().contains("max_hands"));
    assert!(!session.camera().is_streaming());
}

#[test]
fn stop_halts_processing() {
    let recording = visible(replay::sweep([0.2, 0.5, 0.0], [0.8, 0.5, 0.0], 10));
    let mut session = replay_session(recording, SessionOptions::default());
    session.start();

    let mut rendered = Vec::new();
    let mut renderer = |pose: Option<&Transform>| rendered.push(pose.copied());
    assert!(session.step(&mut renderer));
    assert!(session.step(&mut renderer));
    assert!(session.pose().is_some());

    session.stop();
    assert_eq!(session.status(), &SessionStatus::Idle);
    assert_eq!(session.pose(), None);
    assert!(!session.camera().is_streaming());
    assert!(!session.step(&mut renderer));
    assert_eq!(rendered.len(), 2);
}

#[test]
fn restart_starts_over() {
    let recording = visible(replay::sweep([0.2, 0.5, 0.0], [0.8, 0.5, 0.0], 10));
    let mut session = replay_session(recording, SessionOptions::default());
    session.start();

    let mut first = Vec::new();
    let mut renderer = |pose: Option<&Transform>| first.push(pose.copied());
    for _ in 0..5 {
        session.step(&mut renderer);
    }

    assert_eq!(session.restart(), &SessionStatus::Running);
    let mut second = None;
    session.step(&mut |pose: Option<&Transform>| second = pose.copied());

    // Fresh smoothing state: the first frame is adopted as-is, and the camera rewound.
    assert_eq!(second, first[0]);
}

#[test]
fn extra_hands_are_ignored() {
    let left = replay::open_palm([0.25, 0.5, 0.0]);
    let right = replay::open_palm([0.75, 0.5, 0.0]);
    let recording = vec![vec![left.clone(), right.clone()], vec![right, left]];
    let mut session = replay_session(recording, SessionOptions::default());
    session.start();

    let rendered = render_all(&mut session);
    let first = rendered[0].unwrap();
    let second = rendered[1].unwrap();
    assert!(first.position.x < 0.0);
    assert!(second.position.x > first.position.x);
}
