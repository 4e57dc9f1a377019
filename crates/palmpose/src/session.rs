//! Camera-to-renderer tracking sessions.
//!
//! A [`Session`] wires a [`Camera`], a [`HandDetector`] and a [`Renderer`] together: each step
//! reads a frame, detects hands in it, updates the tracked pose and hands it to the renderer.
//!
//! The session is also the error boundary for the external collaborators. If the camera or the
//! detector fails to start, or fails while running, the failure is logged, stored as a
//! user-facing message (see [`Session::error_message`]), and the object is hidden. Failures are
//! never retried automatically; call [`Session::restart`] to try again.

use anyhow::Context;

use crate::{
    hand::{
        detection::{DetectorOptions, HandDetector},
        tracking::HandTracker,
    },
    mapper::{LandmarkMapper, MapperConfig},
    render::Renderer,
    smoother::{LossPolicy, Smoother},
    timer::{FpsCounter, Timer},
    transform::Transform,
    video::Camera,
};

/// Configuration of a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    mapper: MapperConfig,
    smoothing: f32,
    loss_policy: LossPolicy,
    detector: DetectorOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mapper: MapperConfig::default(),
            smoothing: Smoother::DEFAULT_ALPHA,
            loss_policy: LossPolicy::default(),
            detector: DetectorOptions::default(),
        }
    }
}

impl SessionOptions {
    pub fn mapper(self, mapper: MapperConfig) -> Self {
        Self { mapper, ..self }
    }

    /// Sets the fraction of the way the object moves toward the detected pose in each frame.
    ///
    /// # Panics
    ///
    /// This method panics if `alpha` is not in between 0.0 and 1.0.
    pub fn smoothing(self, alpha: f32) -> Self {
        assert!((0.0..=1.0).contains(&alpha));
        Self {
            smoothing: alpha,
            ..self
        }
    }

    pub fn loss_policy(self, loss_policy: LossPolicy) -> Self {
        Self {
            loss_policy,
            ..self
        }
    }

    pub fn detector(self, detector: DetectorOptions) -> Self {
        Self { detector, ..self }
    }
}

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Not started yet, or stopped.
    Idle,
    /// Processing frames.
    Running,
    /// The camera stream ended.
    Finished,
    /// The camera or detector failed. Contains a message describing the failure.
    Failed(String),
}

/// Drives hand tracking from a camera to a renderer.
pub struct Session<C: Camera, D: HandDetector<C::Frame>> {
    camera: C,
    detector: D,
    options: SessionOptions,
    /// Created when the session starts, discarded when it stops.
    tracker: Option<HandTracker>,
    status: SessionStatus,
    camera_active: bool,
    t_detect: Timer,
}

impl<C: Camera, D: HandDetector<C::Frame>> Session<C, D> {
    pub fn new(camera: C, detector: D, options: SessionOptions) -> Self {
        Self {
            camera,
            detector,
            options,
            tracker: None,
            status: SessionStatus::Idle,
            camera_active: false,
            t_detect: Timer::new("detect"),
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Returns the message describing why the session failed, if it did.
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Returns the current pose of the tracked object, or [`None`] if it is hidden.
    pub fn pose(&self) -> Option<Transform> {
        self.tracker.as_ref().and_then(HandTracker::pose)
    }

    /// Returns profiling timers for detection and tracking.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_detect]
            .into_iter()
            .chain(self.tracker.iter().flat_map(|tracker| tracker.timers()))
    }

    /// Configures the detector and starts the camera.
    ///
    /// On failure, the session enters [`SessionStatus::Failed`]. Starting a running session does
    /// nothing.
    pub fn start(&mut self) -> &SessionStatus {
        if self.is_running() {
            return &self.status;
        }

        match self.start_impl() {
            Ok(()) => {
                let mapper = LandmarkMapper::new(self.options.mapper.clone());
                let smoother =
                    Smoother::new(self.options.smoothing).with_loss_policy(self.options.loss_policy);
                self.tracker = Some(HandTracker::new(mapper, smoother));
                self.status = SessionStatus::Running;
                log::debug!("tracking session started");
            }
            Err(e) => self.fail(e),
        }
        &self.status
    }

    fn start_impl(&mut self) -> anyhow::Result<()> {
        self.options
            .detector
            .validate()
            .context("invalid detector options")?;
        self.detector
            .configure(&self.options.detector)
            .context("failed to configure hand detector")?;
        self.camera.start().context("failed to start camera")?;
        self.camera_active = true;
        Ok(())
    }

    /// Processes a single frame and renders the result.
    ///
    /// Returns `false` if the session is not running (anymore), either because it was never
    /// started, was stopped, failed, or the camera stream ended. In the latter two cases, the
    /// renderer is told to hide the object one last time.
    pub fn step<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        if !self.is_running() {
            return false;
        }

        let frame = match self.camera.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("camera stream ended");
                self.shut_down(SessionStatus::Finished);
                renderer.render(None);
                return false;
            }
            Err(e) => {
                self.fail(e.context("failed to read camera frame"));
                renderer.render(None);
                return false;
            }
        };

        let mut hands = match self.t_detect.time(|| self.detector.detect(&frame)) {
            Ok(hands) => hands,
            Err(e) => {
                self.fail(e.context("hand detection failed"));
                renderer.render(None);
                return false;
            }
        };
        hands.truncate(self.options.detector.max_hands);
        log::trace!("detected {} hand(s)", hands.len());

        let Some(tracker) = self.tracker.as_mut() else {
            return false;
        };
        let pose = tracker.track(&hands);
        renderer.render(pose.as_ref());
        true
    }

    /// Steps the session until it stops running, logging the frame rate.
    pub fn run<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let mut fps = FpsCounter::new("tracking");
        while self.step(renderer) {
            fps.tick_with(self.timers());
        }
    }

    /// Stops the camera and discards the tracking state.
    ///
    /// After this returns, [`Session::step`] will not process any further frames until the session
    /// is started again.
    pub fn stop(&mut self) {
        self.shut_down(SessionStatus::Idle);
        log::debug!("tracking session stopped");
    }

    /// Stops the session and starts it again with fresh tracking state.
    ///
    /// This is also the way to recover from [`SessionStatus::Failed`].
    pub fn restart(&mut self) -> &SessionStatus {
        self.stop();
        self.start()
    }

    fn fail(&mut self, error: anyhow::Error) {
        let message = format!("{error:#}");
        log::error!("hand tracking unavailable: {message}");
        self.shut_down(SessionStatus::Failed(message));
    }

    fn shut_down(&mut self, status: SessionStatus) {
        if self.camera_active {
            self.camera.stop();
            self.camera_active = false;
        }
        self.tracker = None;
        self.status = status;
    }
}

impl<C: Camera, D: HandDetector<C::Frame>> Drop for Session<C, D> {
    fn drop(&mut self) {
        if self.camera_active {
            self.camera.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::replay::{self, ReplayCamera, ReplayDetector};

    use super::*;

    #[test]
    fn default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.smoothing, 0.2);
        assert_eq!(options.loss_policy, LossPolicy::Reset);
        assert_eq!(options.detector.max_hands, 1);
    }

    #[test]
    #[should_panic]
    fn smoothing_out_of_range() {
        SessionOptions::default().smoothing(1.5);
    }

    #[test]
    fn idle_until_started() {
        let hands = replay::sweep([0.5, 0.5, 0.0], [0.5, 0.5, 0.0], 3);
        let recording = hands.into_iter().map(|hand| vec![hand]).collect::<Vec<_>>();
        let mut session = Session::new(
            ReplayCamera::new(recording.len()),
            ReplayDetector::new(recording),
            SessionOptions::default(),
        );
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.error_message(), None);

        let mut renders = 0;
        assert!(!session.step(&mut |_: Option<&Transform>| renders += 1));
        assert_eq!(renders, 0);

        session.start();
        assert!(session.is_running());
        assert!(session.camera().is_streaming());
        assert!(session.step(&mut |_: Option<&Transform>| renders += 1));
        assert_eq!(renders, 1);
        assert!(session.pose().is_some());
        assert_eq!(session.timers().count(), 2);
    }
}
