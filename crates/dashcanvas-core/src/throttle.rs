//! Frame-rate throttling for high-frequency input.

use crate::config::DEFAULT_FRAME_INTERVAL_MS;

/// Admits at most one event per frame interval, keyed on event timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameThrottle {
    interval_ms: f64,
    last: Option<f64>,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL_MS)
    }
}

impl FrameThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Returns `true` if an event at `now_ms` should be processed.
    ///
    /// A timestamp earlier than the last admitted one (clock reset, replayed
    /// input) is admitted and restarts the window.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms >= last && now_ms - last < self.interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last admitted timestamp.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_once_per_frame() {
        let mut throttle = FrameThrottle::new(16.0);
        assert!(throttle.admit(0.0));
        assert!(!throttle.admit(5.0));
        assert!(!throttle.admit(15.9));
        assert!(throttle.admit(16.0));
        assert!(!throttle.admit(20.0));
        assert!(throttle.admit(40.0));
    }

    #[test]
    fn test_reset_admits_next() {
        let mut throttle = FrameThrottle::default();
        assert!(throttle.admit(100.0));
        assert!(!throttle.admit(101.0));
        throttle.reset();
        assert!(throttle.admit(101.0));
    }

    #[test]
    fn test_backwards_clock_restarts_window() {
        let mut throttle = FrameThrottle::new(16.0);
        assert!(throttle.admit(1000.0));
        assert!(throttle.admit(10.0));
        assert!(!throttle.admit(12.0));
    }

    #[test]
    fn test_zero_interval_admits_everything() {
        let mut throttle = FrameThrottle::new(0.0);
        assert!(throttle.admit(1.0));
        assert!(throttle.admit(1.0));
    }
}
