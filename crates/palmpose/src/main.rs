use std::io;

use anyhow::bail;
use pawawwewism::Worker;
use palmpose::landmark::LandmarkSet;
use palmpose::replay::{self, ReplayCamera, ReplayDetector};
use palmpose::session::{Session, SessionOptions, SessionStatus};
use palmpose::smoother::LossPolicy;
use palmpose::transform::Transform;

/// Number of frames the replayed hand is visible for, before and after a short dropout.
const SWEEP_FRAMES: usize = 90;
const DROPOUT_FRAMES: usize = 10;

fn main() -> anyhow::Result<()> {
    palmpose::init_logger!();

    let recording = recording();
    let camera = ReplayCamera::new(recording.len());
    let detector = ReplayDetector::new(recording);

    let loss_policy = match std::env::args().nth(1).as_deref() {
        None | Some("reset") => LossPolicy::Reset,
        Some("retain") => LossPolicy::Retain,
        Some(other) => bail!("unknown loss policy '{other}' (expected 'reset' or 'retain')"),
    };
    let options = SessionOptions::default().loss_policy(loss_policy);

    let mut session = Session::new(camera, detector, options);
    if let SessionStatus::Failed(msg) = session.start() {
        bail!("failed to start tracking: {msg}");
    }

    let mut renderer = renderer()?;
    session.run(&mut |pose: Option<&Transform>| {
        renderer.send(pose.copied());
    });
    drop(renderer);

    match session.status() {
        SessionStatus::Failed(msg) => bail!("tracking failed: {msg}"),
        status => log::info!("session ended: {status:?}"),
    }
    Ok(())
}

/// A hand moving across the image and toward the camera, disappearing briefly halfway.
fn recording() -> Vec<Vec<LandmarkSet>> {
    let there = replay::sweep([0.2, 0.6, 0.0], [0.8, 0.4, -0.3], SWEEP_FRAMES);
    let back = replay::sweep([0.8, 0.4, -0.3], [0.5, 0.5, 0.0], SWEEP_FRAMES);

    there
        .into_iter()
        .map(|hand| vec![hand])
        .chain((0..DROPOUT_FRAMES).map(|_| Vec::new()))
        .chain(back.into_iter().map(|hand| vec![hand]))
        .collect()
}

fn renderer() -> Result<Worker<Option<Transform>>, io::Error> {
    let mut visible = false;
    Worker::builder()
        .name("renderer")
        .spawn(move |pose: Option<Transform>| match pose {
            Some(pose) => {
                if !visible {
                    log::info!("object shown");
                    visible = true;
                }
                let (roll, pitch, yaw) = pose.euler_angles();
                log::debug!(
                    "pos=({:.3}, {:.3}, {:.3}) rot=({roll:.2}, {pitch:.2}, {yaw:.2}) scale={:.3}",
                    pose.position.x,
                    pose.position.y,
                    pose.position.z,
                    pose.scale.x,
                );
            }
            None => {
                if visible {
                    log::info!("object hidden");
                    visible = false;
                }
            }
        })
}
