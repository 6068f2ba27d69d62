//! Frame clock.

use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Elapsed time, frame delta, frame count and a smoothed FPS reading.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_window_start: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_window_start: now,
        }
    }

    /// Advance to a new frame. Call once per redraw.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        // FPS is averaged over a short window so the readout doesn't flicker.
        let window = now.saturating_duration_since(self.fps_window_start);
        if window >= FPS_WINDOW {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_window_start = now;
        }
    }

    /// Seconds since start, as of the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
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
    fn test_tick_advances() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.tick_at(start + Duration::from_millis(100));
        time.tick_at(start + Duration::from_millis(150));

        assert_eq!(time.frame(), 2);
        assert!((time.elapsed() - 0.15).abs() < 1e-4);
        assert!((time.delta() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_fps_over_window() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        for i in 1..=30 {
            time.tick_at(start + Duration::from_millis(i * 20));
        }
        // 25 frames in the first 500 ms window
        assert!((time.fps() - 50.0).abs() < 0.5, "fps {}", time.fps());
    }
}
