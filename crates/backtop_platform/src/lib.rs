//! Backtop Platform Abstraction Layer
//!
//! This crate defines the document interface the floating control runs
//! against. Each backend implements [`Host`] for its environment:
//!
//! - `backtop_platform_web` - browser DOM through `web-sys`
//! - [`headless`] (feature `headless`) - an in-memory document for tests
//!   and scripted scenarios
//!
//! # Architecture
//!
//! The control never talks to a real document directly. It asks the host for
//! elements by selector, reads their geometry and computed style, hit-tests
//! points, scrolls containers, and mutates only the node it created itself.
//! Notifications flow back as [`HostEvent`] values delivered by the embedder.

pub mod error;
pub mod event;
pub mod geometry;
pub mod host;

#[cfg(feature = "headless")]
pub mod headless;

pub use error::{PlatformError, Result};
pub use event::{HostEvent, ListenKind};
pub use geometry::{Point, Rect, ScrollMetrics, Viewport};
pub use host::{ControlMarkup, FormFactor, Host, ScrollBehavior, ScrollTarget};
