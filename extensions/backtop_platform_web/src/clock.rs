//! Browser time source

use std::time::Duration;

use backtop_core::Clock;
use web_sys::Performance;

/// Monotonic time from `performance.now()`, measured from construction.
///
/// Falls back to `Date.now()` where the Performance API is missing.
#[derive(Clone)]
pub struct PerformanceClock {
    performance: Option<Performance>,
    origin: f64,
}

impl PerformanceClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|window| window.performance());
        let origin = read(performance.as_ref());
        Self {
            performance,
            origin,
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

fn read(performance: Option<&Performance>) -> f64 {
    match performance {
        Some(performance) => performance.now(),
        None => js_sys::Date::now(),
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let elapsed = (read(self.performance.as_ref()) - self.origin).max(0.0);
        Duration::from_secs_f64(elapsed / 1000.0)
    }
}
