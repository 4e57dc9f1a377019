//! Per-stage profiling of the tracking loop.

use std::{
    fmt,
    mem,
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::filter::{Ema, Filter};

const EMA_ALPHA: f32 = 0.3;

/// Averages how long one stage of the pipeline (detection, tracking) takes per frame.
///
/// Formatting the timer with `{}` prints the average and starts a fresh one.
pub struct Timer {
    name: &'static str,
    state: Mutex<State>,
}

struct State {
    ema: Ema<f32>,
    /// The number of time measurements that contributed to the current average.
    count: usize,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State {
                ema: Ema::new(EMA_ALPHA),
                count: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs `timee` and records its duration.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Records the time until the returned guard is dropped.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    /// Returns the number of measurements recorded since the timer was last displayed.
    pub fn count(&self) -> usize {
        self.state.lock().unwrap().count
    }

    fn stop(&self, start: Instant) {
        let duration = start.elapsed();
        let mut state = self.state.lock().unwrap();
        state.ema.push(duration.as_secs_f32());
        state.count += 1;
    }
}

/// Prints `name: <count>x<average>ms`, then clears the recorded timings.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut state = self.state.lock().unwrap();
        let avg = state.ema.last().copied().unwrap_or(0.0);
        state.ema.reset();
        let len = mem::replace(&mut state.count, 0);
        let avg_ms = avg * 1000.0;

        write!(f, "{}: {len}x{avg_ms:.01}ms", self.name)
    }
}

/// A clone starts without any recorded timings.
impl Clone for Timer {
    fn clone(&self) -> Self {
        Self::new(self.name)
    }
}

/// Records a measurement into its [`Timer`] on drop.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.stop(self.start);
    }
}

/// Logs the frame rate of a loop together with its stage timers.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Counts a frame. Once per second, logs the frame count and the averages of `timers`, which
    /// resets them.
    pub fn tick_with<'a, I: IntoIterator<Item = &'a Timer>>(&mut self, timers: I) {
        self.frames += 1;
        if self.start.elapsed() > Duration::from_secs(1) {
            let extra = timers
                .into_iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>();
            if extra.is_empty() {
                log::debug!("{}: {} FPS", self.name, self.frames);
            } else {
                log::debug!("{}: {} FPS ({})", self.name, self.frames, extra.join(", "));
            }

            self.frames = 0;
            self.start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_resets() {
        let timer = Timer::new("op");
        assert_eq!(timer.time(|| 5), 5);
        timer.time(|| ());
        assert_eq!(timer.count(), 2);

        let shown = timer.to_string();
        assert!(shown.starts_with("op: 2x"), "{shown}");
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.to_string(), "op: 0x0.0ms");
    }

    #[test]
    fn clone_resets() {
        let timer = Timer::new("op");
        timer.time(|| ());
        let clone = timer.clone();
        assert_eq!(clone.name(), "op");
        assert_eq!(clone.count(), 0);
    }
}
