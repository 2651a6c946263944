//! Suppression of repeated scans of the same payload.
//!
//! The recognition pipeline reports the same code once per analyzed frame,
//! so holding a code in view produces a burst of identical scans. A
//! [`RescanPolicy`] with a non-zero window drops repeats of the last accepted
//! text until the window has elapsed. The default window is zero, which
//! accepts every scan.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanPolicy {
    /// Repeats of the last accepted text inside this window are dropped.
    pub window: Duration,
}

impl RescanPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }
}

/// Tracks the last accepted text and applies a [`RescanPolicy`].
#[derive(Debug, Default)]
pub struct RescanFilter {
    policy: RescanPolicy,
    last: Option<(String, Instant)>,
}

impl RescanFilter {
    pub fn new(policy: RescanPolicy) -> Self {
        Self { policy, last: None }
    }

    /// Returns `true` if `text` seen at `now` should be processed, and
    /// records it as the last accepted text when it is.
    pub fn admit(&mut self, text: &str, now: Instant) -> bool {
        if self.policy.is_enabled() {
            if let Some((last_text, at)) = &self.last {
                if last_text == text && now.saturating_duration_since(*at) < self.policy.window {
                    return false;
                }
            }
        }
        self.last = Some((text.to_string(), now));
        true
    }

    /// Forget the last accepted text.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_policy_admits_every_repeat() {
        let mut filter = RescanFilter::default();
        let now = Instant::now();
        assert!(filter.admit("A", now));
        assert!(filter.admit("A", now));
        assert!(filter.admit("A", now));
    }

    #[test]
    fn repeat_inside_window_is_dropped() {
        let mut filter = RescanFilter::new(RescanPolicy::new(Duration::from_millis(500)));
        let t0 = Instant::now();
        assert!(filter.admit("A", t0));
        assert!(!filter.admit("A", t0 + Duration::from_millis(100)));
        assert!(!filter.admit("A", t0 + Duration::from_millis(499)));
    }

    #[test]
    fn repeat_after_window_is_admitted() {
        let mut filter = RescanFilter::new(RescanPolicy::new(Duration::from_millis(500)));
        let t0 = Instant::now();
        assert!(filter.admit("A", t0));
        assert!(filter.admit("A", t0 + Duration::from_millis(500)));
    }

    #[test]
    fn different_text_is_always_admitted() {
        let mut filter = RescanFilter::new(RescanPolicy::new(Duration::from_secs(10)));
        let t0 = Instant::now();
        assert!(filter.admit("A", t0));
        assert!(filter.admit("B", t0));
        // "B" is now the last accepted text, so "A" is not a repeat.
        assert!(filter.admit("A", t0));
    }

    #[test]
    fn window_restarts_from_last_admission() {
        let mut filter = RescanFilter::new(RescanPolicy::new(Duration::from_millis(100)));
        let t0 = Instant::now();
        assert!(filter.admit("A", t0));
        assert!(!filter.admit("A", t0 + Duration::from_millis(50)));
        assert!(filter.admit("A", t0 + Duration::from_millis(150)));
        assert!(!filter.admit("A", t0 + Duration::from_millis(200)));
    }

    #[test]
    fn reset_clears_history() {
        let mut filter = RescanFilter::new(RescanPolicy::new(Duration::from_secs(10)));
        let t0 = Instant::now();
        assert!(filter.admit("A", t0));
        filter.reset();
        assert!(filter.admit("A", t0));
    }
}
