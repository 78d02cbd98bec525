//! Frame timing for the headless loop.

use std::time::{Duration, Instant};

/// Longest fixed step accepted, in seconds.
pub const MAX_STEP_SECONDS: f32 = 1.0;

/// Steps simulated time by a fixed delta per frame, and tracks how long the
/// frames took on the wall clock.
#[derive(Debug)]
pub struct FrameClock {
    /// Simulated time per frame.
    step: Duration,
    /// Total simulated time.
    elapsed: Duration,
    /// Frames stepped so far.
    frame_count: u32,
    /// Wall-clock start of the run.
    started: Instant,
    /// Slowest single frame on the wall clock.
    slowest: Duration,
    frame_started: Instant,
}

impl FrameClock {
    pub fn new(step_seconds: f32) -> Self {
        let now = Instant::now();
        Self {
            step: Duration::from_secs_f32(clamp_step(step_seconds)),
            elapsed: Duration::ZERO,
            frame_count: 0,
            started: now,
            slowest: Duration::ZERO,
            frame_started: now,
        }
    }

    /// Mark the start of a frame's work.
    pub fn begin_frame(&mut self) {
        self.frame_started = Instant::now();
    }

    /// Close the frame: advance simulated time and record wall time.
    pub fn end_frame(&mut self) {
        self.slowest = self.slowest.max(self.frame_started.elapsed());
        self.elapsed += self.step;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn wall_time(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn slowest_frame(&self) -> Duration {
        self.slowest
    }
}

/// Clamp into `[0, MAX_STEP_SECONDS]`; NaN becomes zero.
fn clamp_step(seconds: f32) -> f32 {
    if seconds.is_nan() {
        0.0
    } else {
        seconds.clamp(0.0, MAX_STEP_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_fixed_step() {
        let mut clock = FrameClock::new(0.5);
        for _ in 0..4 {
            clock.begin_frame();
            clock.end_frame();
        }
        assert_eq!(clock.frame_count(), 4);
        assert!((clock.elapsed_seconds() - 2.0).abs() < 1e-6);
        assert_eq!(clock.delta_seconds(), 0.5);
    }

    #[test]
    fn oversized_step_is_capped() {
        assert_eq!(FrameClock::new(1.0e20).delta_seconds(), MAX_STEP_SECONDS);
        assert_eq!(FrameClock::new(f32::INFINITY).delta_seconds(), MAX_STEP_SECONDS);
        assert_eq!(FrameClock::new(f32::NAN).delta_seconds(), 0.0);
    }

    #[test]
    fn negative_step_clamps_to_zero() {
        let clock = FrameClock::new(-1.0);
        assert_eq!(clock.delta_seconds(), 0.0);
    }
}
