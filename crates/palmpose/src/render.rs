//! Interface to external renderers.

use crate::transform::Transform;

/// Draws the tracked object.
pub trait Renderer {
    /// Called once per processed frame.
    ///
    /// `pose` is [`None`] when no hand is visible, in which case the object must not be drawn.
    fn render(&mut self, pose: Option<&Transform>);
}

impl<F: FnMut(Option<&Transform>)> Renderer for F {
    fn render(&mut self, pose: Option<&Transform>) {
        self(pose);
    }
}

