//! Backtop Web Platform
//!
//! Browser backend for the floating control: [`WebHost`] implements
//! [`backtop_platform::Host`] over `web-sys`, [`PerformanceClock`] reads
//! `performance.now()`, and [`BacktopControl`] is the `wasm-bindgen` export a
//! host editor plugin instantiates.
//!
//! ```js
//! import init, { BacktopControl } from "./backtop_platform_web.js";
//!
//! await init();
//! const control = new BacktopControl(JSON.stringify(saved), app.isMobile);
//! control.notifyActiveViewChanged(activeLeaf?.view.contentEl ?? null);
//! control.start();
//! ```
//!
//! The embedding page forwards workspace notifications (active view changes,
//! layout changes, settings panel open/close); element events are listened
//! for directly.

mod clock;
mod driver;
mod host;
mod logging;

pub use clock::PerformanceClock;
pub use driver::BacktopControl;
pub use host::WebHost;
