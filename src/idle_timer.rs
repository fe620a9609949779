use std::time::{Duration, Instant};

/// Default inactivity window after which a typing session ends
pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_millis(3000);

/// A single cancellable deadline measured from the last keystroke.
///
/// Arming always replaces the previous deadline, so at most one is pending.
#[derive(Debug, Clone, Copy)]
pub struct IdleTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_WINDOW)
    }
}

impl IdleTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancel any pending deadline and schedule a fresh one from `now`.
    pub fn rearm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Time left until the deadline; zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_idle() {
        let timer = IdleTimer::default();
        assert!(!timer.is_pending());
        assert_eq!(timer.window(), Duration::from_millis(3000));
        assert!(!timer.is_due(Instant::now()));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_millis(100));
        timer.rearm(t0);
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(100)));

        timer.rearm(t0 + Duration::from_millis(80));
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(180)));
        assert!(!timer.is_due(t0 + Duration::from_millis(150)));
        assert!(timer.is_due(t0 + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel_clears_deadline() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::default();
        timer.rearm(t0);
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.is_due(t0 + Duration::from_secs(60)));
        assert_eq!(timer.remaining(t0), None);
    }

    #[test]
    fn test_remaining_saturates() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_millis(3000));
        timer.rearm(t0);
        assert_eq!(
            timer.remaining(t0 + Duration::from_millis(1000)),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(
            timer.remaining(t0 + Duration::from_millis(5000)),
            Some(Duration::ZERO)
        );
    }
}
