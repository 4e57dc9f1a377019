use std::{
    io,
    sync::{Arc, Mutex},
};

use pawawwewism::{promise, PromiseHandle, Worker};

use crate::{
    landmark::LandmarkSet,
    mapper::LandmarkMapper,
    smoother::Smoother,
    timer::Timer,
    transform::Transform,
};

/// Turns per-frame hand detections into a smoothed object pose.
///
/// Combines a [`LandmarkMapper`], which derives the target pose of each frame, with a [`Smoother`]
/// that blends successive targets.
#[derive(Clone)]
pub struct HandTracker {
    mapper: LandmarkMapper,
    smoother: Smoother,
    t_track: Timer,
}

impl Default for HandTracker {
    fn default() -> Self {
        Self::new(LandmarkMapper::default(), Smoother::default())
    }
}

impl HandTracker {
    pub fn new(mapper: LandmarkMapper, smoother: Smoother) -> Self {
        Self {
            mapper,
            smoother,
            t_track: Timer::new("track"),
        }
    }

    pub fn mapper(&self) -> &LandmarkMapper {
        &self.mapper
    }

    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    /// Returns profiling timers of the tracker.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_track].into_iter()
    }

    /// Processes the hands detected in one frame.
    ///
    /// Only the first hand in `hands` is tracked. Returns the updated pose, or [`None`] if no hand
    /// was detected and the object should be hidden.
    pub fn track(&mut self, hands: &[LandmarkSet]) -> Option<Transform> {
        let _guard = self.t_track.start();
        let target = self.mapper.map_frame(hands);
        self.smoother.update(target.as_ref())
    }

    /// Returns the current pose, or [`None`] if the object is hidden.
    pub fn pose(&self) -> Option<Transform> {
        self.smoother.current()
    }

    /// Hides the object and discards all smoothing state.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}

type Message = (Vec<LandmarkSet>, pawawwewism::Promise<Option<Transform>>);

/// Runs a [`HandTracker`] on a background thread.
///
/// Frames are processed in the order they are sent. After each frame, the resulting pose is
/// published as a whole, so [`PoseWorker::latest`] never observes a partially updated transform.
///
/// Dropping the [`PoseWorker`] (or calling [`PoseWorker::stop`]) waits for the frame in progress
/// to finish, after which no further updates take place.
pub struct PoseWorker {
    worker: Worker<Message>,
    pose: Arc<Mutex<Option<Transform>>>,
}

impl PoseWorker {
    pub fn spawn(mut tracker: HandTracker) -> io::Result<Self> {
        let pose = Arc::new(Mutex::new(None));
        let published = pose.clone();
        let worker = Worker::builder().name("pose tracker").spawn(
            move |(hands, promise): Message| {
                let update = tracker.track(&hands);
                *published.lock().unwrap() = update;
                promise.fulfill(update);
            },
        )?;

        Ok(Self { worker, pose })
    }

    /// Queues the hands detected in one frame for processing.
    ///
    /// This blocks until the worker is ready to accept the frame. The returned handle resolves to
    /// the pose computed for this frame; it can be dropped if the caller only polls
    /// [`PoseWorker::latest`].
    pub fn send(&mut self, hands: Vec<LandmarkSet>) -> PromiseHandle<Option<Transform>> {
        let (promise, handle) = promise();
        self.worker.send((hands, promise));
        handle
    }

    /// Returns the pose published after the most recently processed frame.
    pub fn latest(&self) -> Option<Transform> {
        *self.pose.lock().unwrap()
    }

    /// Stops the worker thread and returns the final pose.
    pub fn stop(self) -> Option<Transform> {
        let Self { worker, pose } = self;
        drop(worker);
        let last = *pose.lock().unwrap();
        log::debug!("pose worker stopped");
        last
    }
}
