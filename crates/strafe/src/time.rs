//! Frame timing.
//!
//! The [`Time`] resource holds the delta of the current tick. The live loop
//! measures it from the monotonic clock with [`Time::update`]; tests and
//! fixed-step drivers feed it directly with [`Time::advance`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When the current frame started (monotonic clock).
    frame_start: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Start a new frame, measuring the delta from the previous call.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.frame_start);
        self.frame_start = now;
        self.advance(delta);
    }

    /// Start a new frame with an explicit delta.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS from the last delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_millis(20));
        assert_eq!(time.delta(), Duration::from_millis(20));
        assert_eq!(time.elapsed(), Duration::from_millis(36));
        assert_eq!(time.frame_count(), 2);
        assert!((time.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn fps_is_zero_before_first_frame() {
        assert_eq!(Time::new().fps(), 0.0);
    }

    #[test]
    fn update_counts_frames() {
        let mut time = Time::new();
        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.delta_secs() >= 0.0);
    }
}
