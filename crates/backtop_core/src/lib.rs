//! Backtop Core Runtime
//!
//! Host-agnostic primitives shared by the Backtop crates:
//!
//! - **State Machines**: small typed flat statecharts for control modes
//! - **Timer Queue**: one-shot and repeating timers polled against a clock
//! - **Clocks**: injectable time sources, including a manual clock for tests
//!
//! # Example
//!
//! ```rust
//! use backtop_core::{Clock, ManualClock, TimerQueue};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerQueue::new();
//! timers.schedule(clock.now(), Duration::from_millis(50), "failsafe");
//!
//! clock.advance(Duration::from_millis(50));
//! let (_, task) = timers.pop_due(clock.now()).unwrap();
//! assert_eq!(task, "failsafe");
//! ```

pub mod clock;
pub mod fsm;
pub mod timer;

pub use clock::{Clock, Delay, ManualClock, SystemClock};
pub use fsm::{StateMachine, StateMachineBuilder};
pub use timer::{TimerId, TimerQueue};
