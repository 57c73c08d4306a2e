//! Time sources.
//!
//! Everything time-dependent reads a [`Clock`] instead of the system time so
//! that polling and suppression windows can be driven deterministically.
//! Times are offsets from an arbitrary origin chosen by the clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock {
    /// Current time as an offset from the clock's origin.
    fn now(&self) -> Duration;
}

/// Something that can block the caller for a duration.
///
/// Used by synchronous drivers of polling state machines. Virtual clocks
/// implement this by advancing themselves.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// A manually advanced clock.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the code under test.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock positioned at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to an absolute position. Never moves backwards.
    pub fn set(&self, position: Duration) {
        if position > self.now.get() {
            self.now.set(position);
        }
    }

    /// Move the clock forward by a relative amount.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl Delay for ManualClock {
    fn delay(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Wall-clock time measured from construction.
#[derive(Clone, Copy, Debug)]
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

impl Delay for SystemClock {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
