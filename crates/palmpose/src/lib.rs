//! Hand-anchored pose tracking.
//!
//! `palmpose` turns the per-frame output of a hand landmark detector into a smoothed rigid
//! [`Transform`][transform::Transform] that a renderer can use to attach a virtual object to the
//! user's hand. Camera capture, landmark inference and drawing are left to external collaborators,
//! which plug in through the [`Camera`][video::Camera],
//! [`HandDetector`][hand::detection::HandDetector] and [`Renderer`][render::Renderer] traits.
//!
//! # Coordinate Systems
//!
//! Landmarks use the detector's normalized image coordinates: X and Y are fractions of the image
//! width and height in range 0.0 to 1.0, with Y pointing *down*. Z is a relative depth where more
//! negative values are closer to the camera.
//!
//! Transforms use scene coordinates: X points to the right, Y points up, and the origin lies at the
//! center of the image. How far the scene extends along X and Y, and how depth is mapped, is
//! configured through [`MapperConfig`][mapper::MapperConfig].
//!
//! # Logging
//!
//! All diagnostics go through the [`log`] facade. Binaries can call [`init_logger!`] to log to
//! *stderr*; the `RUST_LOG` environment variable overrides the default filter.

use log::LevelFilter;

pub mod filter;
pub mod hand;
pub mod landmark;
pub mod mapper;
pub mod render;
pub mod replay;
pub mod session;
pub mod smoother;
pub mod timer;
pub mod transform;
pub mod video;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and `palmpose` will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
