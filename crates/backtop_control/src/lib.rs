//! Backtop Floating Control
//!
//! The adaptive visibility and positioning controller for a floating
//! "back to top" button:
//!
//! - [`ActiveSurfaceResolver`] picks the scroll container to track
//! - [`HostElementLocator`] finds the host's companion control on touch
//!   devices and mirrors its geometry and colors
//! - [`ScrollVisibilityEngine`] turns scroll offsets into show/hide
//!   decisions, suspended while a scroll-to-top animates
//! - [`FloatingControlPresenter`] owns the node and wires it all together
//!
//! Everything runs against the [`backtop_platform::Host`] trait and an
//! injected [`backtop_core::Clock`], so the whole controller can be driven
//! in tests with a headless document and a manual clock.
//!
//! # Example
//!
//! ```rust
//! use backtop_control::{BacktopSettings, FloatingControlPresenter};
//! use backtop_core::ManualClock;
//! use backtop_platform::headless::{ElementSpec, HeadlessHost};
//! use backtop_platform::{FormFactor, Viewport};
//!
//! let host = HeadlessHost::new(Viewport::default(), FormFactor::Desktop);
//! let view = host.append(host.body(), ElementSpec::new("div"));
//! host.append(
//!     view,
//!     ElementSpec::new("div").class("markdown-preview-view").scrollable(4000.0, 700.0),
//! );
//! host.set_active_view(Some(view));
//!
//! let clock = ManualClock::new();
//! let mut presenter =
//!     FloatingControlPresenter::with_defaults(host, clock.clone(), BacktopSettings::default());
//! presenter.activate();
//! assert!(presenter.is_active());
//! ```

pub mod diagnostics;
pub mod effective;
pub mod error;
pub mod locator;
pub mod log_level;
pub mod presenter;
pub mod settings;
pub mod surface;
pub mod visibility;

pub use diagnostics::DetectionSnapshot;
pub use effective::{DetectionResult, EffectiveSettings, ThemeColors};
pub use error::{ControlError, Result, SettingsError};
pub use locator::{
    in_bottom_half, HostElementLocator, LocatePoll, LocateStep, Located, LocatorConfig, Qualifier,
};
pub use log_level::LogLevel;
pub use presenter::{FloatingControlPresenter, PresenterConfig, PresenterTimings, CONTROL_MARKUP};
pub use settings::{BacktopSettings, CssColor, Length, LengthUnit};
pub use surface::{ActiveSurfaceResolver, DEFAULT_SURFACE_CANDIDATES};
pub use visibility::{ScrollState, ScrollVisibilityEngine, Visibility, VisibilityMode};
