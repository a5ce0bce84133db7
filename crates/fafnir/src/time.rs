//! Frame timing.
//!
//! [`Time`] is updated by the surrounding application at the start of each
//! frame; its [`delta`](Time::delta) is what gets fed to
//! [`Scheduler::advance`](crate::schedule::Scheduler::advance).

use std::time::{Duration, Instant};

/// Wall-clock frame timing for the outer loop. Tracks only what the
/// scheduler consumes: the previous frame's delta, plus elapsed time and a
/// frame counter for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    startup: Instant,
    frame_start: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            frame_start: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Mark the start of a new frame. The time since the previous call
    /// becomes [`delta`](Self::delta).
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.frame_start);
        self.frame_start = now;
        self.frame_count += 1;
    }

    /// Duration of the previous frame. Zero until the first
    /// [`update`](Self::update).
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time from startup to the start of the current frame.
    pub fn elapsed(&self) -> Duration {
        self.frame_start.duration_since(self.startup)
    }

    /// Number of frames marked so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
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
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let time = Time::new();
        assert_eq!(time.delta(), Duration::ZERO);
        assert_eq!(time.elapsed(), Duration::ZERO);
        assert_eq!(time.frame_count(), 0);
    }

    #[test]
    fn update_captures_the_frame_gap() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(2));
        time.update();

        assert_eq!(time.frame_count(), 1);
        assert!(time.delta() >= Duration::from_millis(2));
        assert!(time.elapsed() >= time.delta());
    }

    #[test]
    fn elapsed_accumulates_across_frames() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(1));
        time.update();
        let after_first = time.elapsed();

        thread::sleep(Duration::from_millis(1));
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.elapsed() > after_first);
    }
}
