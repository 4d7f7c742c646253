use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source driving the per-graph tick timers.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall clock used by the desktop app.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for deterministic playback. Clones share the same
/// time, so a test can keep one handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Periodic tick source of one graph.
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    next_due: Option<Duration>,
}

impl TickTimer {
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Self::MIN_INTERVAL),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// (Re)arms the timer; the first tick fires one interval after `now`.
    pub fn start(&mut self, now: Duration, interval: Duration) {
        self.interval = interval.max(Self::MIN_INTERVAL);
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Changes the period. A running timer is re-armed from `now`, a stopped
    /// one only remembers the new period.
    pub fn set_interval(&mut self, now: Duration, interval: Duration) {
        self.interval = interval.max(Self::MIN_INTERVAL);
        if self.next_due.is_some() {
            self.next_due = Some(now + self.interval);
        }
    }

    /// Collects the instants of every tick due at or before `now`, at most
    /// `max` of them. When the cap is hit the schedule skips ahead instead
    /// of trying to catch up.
    pub fn drain_due(&mut self, now: Duration, max: u32) -> Vec<Duration> {
        let mut fired = Vec::new();
        let Some(mut due) = self.next_due else {
            return fired;
        };
        while due <= now {
            if fired.len() as u32 >= max {
                due = now + self.interval;
                break;
            }
            fired.push(due);
            due += self.interval;
        }
        self.next_due = Some(due);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = TickTimer::new(60 * MS);
        assert!(timer.drain_due(100 * MS, 10).is_empty());
        timer.start(Duration::ZERO, 60 * MS);
        assert!(timer.drain_due(59 * MS, 10).is_empty());
        assert_eq!(timer.drain_due(60 * MS, 10), vec![60 * MS]);
        assert_eq!(timer.drain_due(185 * MS, 10), vec![120 * MS, 180 * MS]);
        assert_eq!(timer.next_due(), Some(240 * MS));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = TickTimer::new(10 * MS);
        timer.start(Duration::ZERO, 10 * MS);
        timer.stop();
        assert!(timer.drain_due(Duration::from_secs(5), 100).is_empty());
        assert!(!timer.is_active());
    }

    #[test]
    fn catch_up_is_capped() {
        let mut timer = TickTimer::new(MS);
        timer.start(Duration::ZERO, MS);
        let fired = timer.drain_due(1000 * MS, 5);
        assert_eq!(fired.len(), 5);
        assert_eq!(timer.next_due(), Some(1001 * MS));
    }

    #[test]
    fn interval_never_drops_to_zero() {
        let mut timer = TickTimer::new(Duration::ZERO);
        assert_eq!(timer.interval(), MS);
        timer.start(Duration::ZERO, Duration::ZERO);
        assert_eq!(timer.interval(), MS);
    }

    #[test]
    fn set_interval_rearms_running_timer() {
        let mut timer = TickTimer::new(60 * MS);
        timer.start(Duration::ZERO, 60 * MS);
        timer.set_interval(30 * MS, 10 * MS);
        assert_eq!(timer.next_due(), Some(40 * MS));
        timer.stop();
        timer.set_interval(50 * MS, 20 * MS);
        assert_eq!(timer.next_due(), None);
        assert_eq!(timer.interval(), 20 * MS);
    }

    #[test]
    fn virtual_clock_handles_share_time() {
        let clock = VirtualClock::new();
        let handle = clock.clone();
        handle.advance(25 * MS);
        assert_eq!(clock.now(), 25 * MS);
    }
}
