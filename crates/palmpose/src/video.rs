//! Interface to external video sources.

/// A live source of video frames, such as a webcam.
///
/// `palmpose` never inspects frames itself; they are only passed on to the
/// [`HandDetector`][crate::hand::detection::HandDetector].
pub trait Camera {
    type Frame;

    /// Acquires the device and starts streaming.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the stream has ended. Once [`Camera::stop`] has been called, no
    /// further frames are delivered.
    fn read(&mut self) -> anyhow::Result<Option<Self::Frame>>;

    /// Stops streaming and releases the device.
    fn stop(&mut self);
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    type Frame = C::Frame;

    fn start(&mut self) -> anyhow::Result<()> {
        (**self).start()
    }

    fn read(&mut self) -> anyhow::Result<Option<Self::Frame>> {
        (**self).read()
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}
