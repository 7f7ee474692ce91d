//! Time sources
//!
//! Day durations are read from an injected clock so tests can control time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic seconds since some fixed origin
pub trait Clock {
    fn now_secs(&self) -> f64;
}

/// Wall clock, measured from construction
#[derive(Debug, Clone, Copy)]
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
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock. Clones share the same time, so a test can keep a
/// handle after moving one into a `Terminal`.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(10.0);
        let handle = clock.clone();
        handle.advance(2.5);
        assert_eq!(clock.now_secs(), 12.5);
        handle.advance(-4.0);
        assert_eq!(clock.now_secs(), 12.5);
        handle.set(1.0);
        assert_eq!(clock.now_secs(), 1.0);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_secs();
        let b = clock.now_secs();
        assert!(a >= 0.0 && b >= a);
    }
}
