//! Fixed-interval drop clock polled from the frame loop.

use std::time::{Duration, Instant};

/// Gravity interval. Constant for the whole game (no levels).
pub const DROP_INTERVAL: Duration = Duration::from_millis(1000);

/// Drop timer owned by a play session. Stopped timers never fire.
#[derive(Debug)]
pub struct DropTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl DropTimer {
    /// A running timer whose first drop is one interval after `now`.
    pub fn start(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: Some(now + interval),
        }
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            log::debug!("drop timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True once per elapsed interval. A late poll fires once and
    /// reschedules from `now`, so stalls never replay a burst of drops.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next > now { next } else { now + self.interval });
                true
            }
            _ => false,
        }
    }

    /// Time left until the next drop, for sizing the event-poll timeout.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

impl Drop for DropTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_after_interval() {
        let t0 = Instant::now();
        let mut timer = DropTimer::start(DROP_INTERVAL, t0);
        assert!(!timer.poll(t0));
        assert!(!timer.poll(t0 + 999 * MS));
        assert!(timer.poll(t0 + 1000 * MS));
        assert!(!timer.poll(t0 + 1001 * MS));
        assert!(timer.poll(t0 + 2000 * MS));
    }

    #[test]
    fn test_keeps_cadence_when_slightly_late() {
        let t0 = Instant::now();
        let mut timer = DropTimer::start(DROP_INTERVAL, t0);
        assert!(timer.poll(t0 + 1010 * MS));
        assert!(!timer.poll(t0 + 1999 * MS));
        assert!(timer.poll(t0 + 2000 * MS));
    }

    #[test]
    fn test_stall_fires_once() {
        let t0 = Instant::now();
        let mut timer = DropTimer::start(DROP_INTERVAL, t0);
        assert!(timer.poll(t0 + 5500 * MS));
        assert!(!timer.poll(t0 + 5600 * MS));
        assert!(timer.poll(t0 + 6500 * MS));
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let t0 = Instant::now();
        let mut timer = DropTimer::start(DROP_INTERVAL, t0);
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + 10 * DROP_INTERVAL));
        assert_eq!(timer.remaining(t0), None);
    }

    #[test]
    fn test_remaining() {
        let t0 = Instant::now();
        let timer = DropTimer::start(DROP_INTERVAL, t0);
        assert_eq!(timer.remaining(t0 + 250 * MS), Some(750 * MS));
        assert_eq!(timer.remaining(t0 + 2 * DROP_INTERVAL), Some(Duration::ZERO));
    }
}
