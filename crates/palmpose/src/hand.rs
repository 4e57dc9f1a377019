//! Detection and tracking of human hands.
//!
//! Landmark inference itself is performed by an external [`HandDetector`][detection::HandDetector].
//! [`HandTracker`][tracking::HandTracker] turns its output into a smoothed object pose.

pub mod detection;
pub mod tracking;
