//! Frame timing
//!
//! Motion is tuned per frame at the target rate, so `dt` is the elapsed
//! time measured in target frames: 1.0 when running exactly on time.

use std::time::{Duration, Instant};

/// `dt` for a frame that took `elapsed` at `target_fps`.
#[inline]
pub fn frame_dt(elapsed: Duration, target_fps: f64) -> f64 {
    target_fps * elapsed.as_secs_f64()
}

/// Wall-clock `dt` source for a driver loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    target_fps: f64,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(target_fps: f64) -> Self {
        Self {
            target_fps,
            last: None,
        }
    }

    #[inline]
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// `dt` since the previous call; the first call returns 1.0.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        let dt = match self.last {
            Some(prev) => frame_dt(now.saturating_duration_since(prev), self.target_fps),
            None => 1.0,
        };
        self.last = Some(now);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dt_on_time() {
        let dt = frame_dt(Duration::from_micros(16_667), 60.0);
        assert!((dt - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_dt_slow_frame() {
        assert_eq!(frame_dt(Duration::from_millis(50), 60.0), 3.0);
    }

    #[test]
    fn test_clock_first_tick_is_one() {
        let mut clock = FrameClock::new(60.0);
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 1.0);
        let dt = clock.tick_at(start + Duration::from_millis(100));
        assert!((dt - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_never_negative() {
        let mut clock = FrameClock::new(30.0);
        let now = Instant::now();
        clock.tick_at(now + Duration::from_millis(10));
        assert_eq!(clock.tick_at(now), 0.0);
    }
}
