//! Tick timing.

use std::time::{Duration, Instant};

/// Measures time between ticks and paces the loop to a target rate.
///
/// The event loop waits until [`FrameClock::next_deadline`] before running a
/// tick, so ticks never happen faster than the target rate. The delta
/// returned by [`FrameClock::tick_at`] is the real wall-clock time since the
/// previous tick, which includes that wait.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_duration: Duration,
    last_tick: Instant,
}

impl FrameClock {
    /// Create a clock targeting `fps` ticks per second. Zero is treated as 1.
    pub fn new(fps: u32) -> Self {
        Self::starting_at(fps, Instant::now())
    }

    /// Create a clock whose first tick is measured from `start`.
    pub fn starting_at(fps: u32, start: Instant) -> Self {
        Self {
            frame_duration: Duration::from_secs(1) / fps.max(1),
            last_tick: start,
        }
    }

    /// Minimum time between two ticks.
    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Earliest instant the next tick may run.
    pub fn next_deadline(&self) -> Instant {
        self.last_tick + self.frame_duration
    }

    /// Whether the next tick may run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_deadline()
    }

    /// Record a tick at `now` and return seconds since the previous one.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        dt
    }

    /// Record a tick now.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }
}
