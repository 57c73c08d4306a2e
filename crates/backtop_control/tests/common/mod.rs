//! Shared fixtures for presenter integration tests.

#![allow(dead_code)]

use std::time::Duration;

use backtop_control::{BacktopSettings, FloatingControlPresenter};
use backtop_core::{Clock, ManualClock};
use backtop_platform::headless::{ElementSpec, HeadlessHost, NodeId};
use backtop_platform::{FormFactor, Rect, Viewport};

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// A desktop document with one view whose preview surface can scroll
pub struct Desktop {
    pub host: HeadlessHost,
    pub view: NodeId,
    pub surface: NodeId,
}

pub fn desktop() -> Desktop {
    let host = HeadlessHost::new(Viewport::new(1280.0, 800.0), FormFactor::Desktop);
    let (view, surface) = note_view(&host, "markdown-preview-view");
    host.set_active_view(Some(view));
    Desktop {
        host,
        view,
        surface,
    }
}

/// A view containing one scroll container with the given class
pub fn note_view(host: &HeadlessHost, surface_class: &str) -> (NodeId, NodeId) {
    let view = host.append(
        host.body(),
        ElementSpec::new("div")
            .class("workspace-leaf-content")
            .rect(Rect::new(0.0, 0.0, 1280.0, 800.0)),
    );
    let surface = host.append(
        view,
        ElementSpec::new("div")
            .class(surface_class)
            .rect(Rect::new(0.0, 40.0, 1280.0, 700.0))
            .scrollable(4000.0, 700.0),
    );
    (view, surface)
}

/// A phone document: editor surface, the companion control in the bottom
/// half, and the mobile navigation bar
pub struct Phone {
    pub host: HeadlessHost,
    pub view: NodeId,
    pub surface: NodeId,
    pub actions: NodeId,
    pub companion: Option<NodeId>,
    pub navbar: NodeId,
}

pub const PHONE: Viewport = Viewport::new(390.0, 844.0);
pub const COMPANION_RECT: Rect = Rect::new(320.0, 700.0, 48.0, 48.0);

pub fn phone_without_companion() -> Phone {
    let host = HeadlessHost::new(PHONE, FormFactor::Touch);
    let view = host.append(
        host.body(),
        ElementSpec::new("div")
            .class("workspace-leaf-content")
            .rect(Rect::new(0.0, 0.0, 390.0, 780.0)),
    );
    let surface = host.append(
        view,
        ElementSpec::new("div")
            .class("cm-scroller")
            .rect(Rect::new(0.0, 48.0, 390.0, 700.0))
            .scrollable(6000.0, 700.0),
    );
    let actions = host.append(view, ElementSpec::new("div").class("view-actions"));
    let navbar = host.append(
        host.body(),
        ElementSpec::new("div")
            .class("mobile-navbar")
            .rect(Rect::new(0.0, 780.0, 390.0, 64.0)),
    );
    host.append(
        navbar,
        ElementSpec::new("div")
            .class("mobile-navbar-action")
            .rect(Rect::new(0.0, 780.0, 78.0, 64.0)),
    );
    host.set_active_view(Some(view));

    Phone {
        host,
        view,
        surface,
        actions,
        companion: None,
        navbar,
    }
}

pub fn phone() -> Phone {
    let mut phone = phone_without_companion();
    phone.companion = Some(add_companion(&phone.host, phone.actions));
    phone
}

pub fn add_companion(host: &HeadlessHost, actions: NodeId) -> NodeId {
    host.append(
        actions,
        ElementSpec::new("button")
            .class("view-action clickable-icon")
            .attr("aria-label", "Current view: editing")
            .rect(COMPANION_RECT)
            .computed("background-color", "rgb(127, 109, 242)")
            .computed("color", "rgb(250, 250, 250)")
            .computed("opacity", "1"),
    )
}

/// Drives a presenter against a headless document in virtual time
pub struct Harness {
    pub host: HeadlessHost,
    pub clock: ManualClock,
    pub presenter: FloatingControlPresenter<HeadlessHost, ManualClock>,
}

impl Harness {
    pub fn new(host: &HeadlessHost, settings: BacktopSettings) -> Self {
        let clock = ManualClock::new();
        let presenter =
            FloatingControlPresenter::with_defaults(host.clone(), clock.clone(), settings);
        Self {
            host: host.clone(),
            clock,
            presenter,
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Hand every queued host event to the presenter, including events the
    /// presenter itself causes
    pub fn deliver(&mut self) {
        loop {
            let events = self.host.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.presenter.handle(event);
            }
        }
    }

    /// Advance virtual time, firing timers at their exact deadlines
    pub fn advance(&mut self, by: Duration) {
        let target = self.clock.now() + by;
        self.deliver();
        while let Some(deadline) = self.presenter.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            self.presenter.pump();
            self.deliver();
        }
        self.clock.set(target);
        self.deliver();
    }

    pub fn activate(&mut self) {
        self.presenter.activate();
        self.deliver();
    }

    /// User scroll of a container
    pub fn scroll(&mut self, node: NodeId, offset: f64) {
        self.host.scroll_to(node, offset);
        self.deliver();
    }

    pub fn control(&self) -> NodeId {
        *self.presenter.control().expect("control is mounted")
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.host.inline_style(self.control(), property)
    }

    /// `(opacity, visibility)` of the mounted control
    pub fn presented(&self) -> (String, String) {
        (
            self.style("opacity").unwrap_or_default(),
            self.style("visibility").unwrap_or_default(),
        )
    }

    pub fn controls_in_document(&self) -> usize {
        self.host.find_by_class("back-to-top-btn").len()
    }
}

pub fn shown(opacity: &str) -> (String, String) {
    (opacity.to_string(), "visible".to_string())
}

pub fn hidden() -> (String, String) {
    ("0".to_string(), "hidden".to_string())
}
