use std::time::{Duration, Instant};

/// Default interval between two runs of the scroll handler.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(100);

/// Leading and trailing edge throttle driven by caller supplied timestamps.
///
/// The first event in a window runs immediately; events that arrive while the
/// window is open collapse into a single trailing run, released by
/// [`ScrollThrottle::poll`] once the window has elapsed.
#[derive(Debug, Clone)]
pub struct ScrollThrottle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Default for ScrollThrottle {
    fn default() -> Self {
        Self::new(SCROLL_THROTTLE)
    }
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_run: None, pending: false }
    }

    /// Record an event; returns `true` when the handler should run now.
    pub fn event(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.duration_since(last) < self.interval => {
                self.pending = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Returns `true` when a deferred trailing run is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }

        let due = self.last_run.map_or(true, |last| now.duration_since(last) >= self.interval);
        if due {
            self.pending = false;
            self.last_run = Some(now);
        }
        due
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_runs_leading_and_trailing_once() {
        let start = Instant::now();
        let mut throttle = ScrollThrottle::new(Duration::from_millis(100));

        assert!(throttle.event(start));
        assert!(!throttle.event(start + Duration::from_millis(10)));
        assert!(!throttle.event(start + Duration::from_millis(20)));

        assert!(!throttle.poll(start + Duration::from_millis(50)));
        assert!(throttle.poll(start + Duration::from_millis(100)));
        assert!(!throttle.poll(start + Duration::from_millis(300)));
    }

    #[test]
    fn spaced_events_all_run() {
        let start = Instant::now();
        let mut throttle = ScrollThrottle::new(Duration::from_millis(100));

        assert!(throttle.event(start));
        assert!(throttle.event(start + Duration::from_millis(150)));
        assert!(!throttle.has_pending());
    }
}
