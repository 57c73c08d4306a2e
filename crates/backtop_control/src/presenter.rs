//! The floating control presenter.
//!
//! Owns the control node and everything attached to it: listeners, the
//! visibility engine, the occlusion guard and every pending timer. The
//! presenter never sleeps. The embedder delivers [`HostEvent`]s through
//! [`FloatingControlPresenter::handle`], calls
//! [`FloatingControlPresenter::pump`] whenever time may have passed, and
//! uses [`FloatingControlPresenter::next_deadline`] to schedule its next
//! wake-up.
//!
//! # Lifecycle
//!
//! ```text
//! Inactive --activate()--> [detecting] --mount--> Active(handle)
//!    ^                                               |
//!    +---------- teardown() / activate() ------------+
//! ```
//!
//! Every activation builds a fresh node; nothing is diffed in place except
//! the dynamic styles touched by [`FloatingControlPresenter::refresh_appearance`].

use std::time::Duration;

use backtop_core::{Clock, TimerId, TimerQueue};
use backtop_platform::{
    ControlMarkup, Host, HostEvent, ListenKind, Point, ScrollBehavior, ScrollTarget,
};

use crate::diagnostics::DetectionSnapshot;
use crate::effective::{DetectionResult, EffectiveSettings, ThemeColors};
use crate::error::ControlError;
use crate::locator::{HostElementLocator, LocatePoll, LocateStep, Located, LocatorConfig};
use crate::log_level::LogLevel;
use crate::settings::BacktopSettings;
use crate::surface::ActiveSurfaceResolver;
use crate::visibility::{ScrollVisibilityEngine, Visibility};

const ICON_SVG: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path fill-rule="evenodd" clip-rule="evenodd" d="M12 3L6 9L7.5 10.5L11 7V21H13V7L16.5 10.5L18 9L12 3Z" fill="currentColor"/></svg>"#;

/// Markup of the control node
pub const CONTROL_MARKUP: ControlMarkup = ControlMarkup {
    class_name: "back-to-top-btn",
    title: "Back to Top",
    icon_svg: ICON_SVG,
};

/// Structural styles applied once per node. The node starts hidden.
const BASE_STYLES: [(&str, &str); 15] = [
    ("position", "fixed"),
    ("border-radius", "50%"),
    ("border", "none"),
    ("font-size", "0"),
    ("font-weight", "bold"),
    ("cursor", "pointer"),
    ("opacity", "0"),
    ("visibility", "hidden"),
    (
        "transition",
        "opacity 0.3s ease, visibility 0.3s ease, transform 0.2s ease",
    ),
    ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)"),
    ("display", "flex"),
    ("align-items", "center"),
    ("justify-content", "center"),
    ("line-height", "1"),
    ("z-index", "999"),
];

/// Icon box properties pinned against host theme overrides
const ICON_SIZE_PROPERTIES: [&str; 4] = ["width", "height", "min-width", "min-height"];

/// Fixed delays used by the presenter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresenterTimings {
    /// Wait after a view change before touching the new view's layout
    pub settle: Duration,
    /// Hard-set of the scroll offset after a smooth scroll request
    pub failsafe: Duration,
    /// How long scroll checks stay suspended after a scroll-to-top
    pub suspend_window: Duration,
    /// Period of the touch occlusion guard
    pub occlusion_interval: Duration,
}

impl Default for PresenterTimings {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
            failsafe: Duration::from_millis(50),
            suspend_window: Duration::from_millis(500),
            occlusion_interval: Duration::from_millis(500),
        }
    }
}

/// Presenter wiring that is not part of the persisted settings
#[derive(Clone, Debug)]
pub struct PresenterConfig {
    pub timings: PresenterTimings,
    pub surfaces: ActiveSurfaceResolver,
    pub locator: LocatorConfig,
    /// Element the occlusion guard probes when no companion control was
    /// located
    pub occlusion_reference: String,
    /// Horizontal inset of the occlusion probe from the reference's left edge
    pub occlusion_probe_inset: f64,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            timings: PresenterTimings::default(),
            surfaces: ActiveSurfaceResolver::default(),
            locator: LocatorConfig::default(),
            occlusion_reference: ".mobile-navbar".to_string(),
            occlusion_probe_inset: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Task<E> {
    Activate,
    Relayout,
    LocatePoll,
    Resume,
    Failsafe(ScrollTarget<E>),
    Occlusion,
    DowngradeLogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DetectionPurpose {
    /// Build a new node when detection completes
    Activate,
    /// Restyle the existing node when detection completes
    Refresh,
}

#[derive(Debug)]
struct PendingDetection {
    purpose: DetectionPurpose,
    poll: LocatePoll,
    timer: Option<TimerId>,
}

struct OcclusionGuard<E> {
    reference: E,
    timer: TimerId,
}

/// Everything owned by a mounted control
struct ControlHandle<H: Host> {
    node: H::Element,
    surface: Option<H::Element>,
    scroll_subscription: Option<H::Subscription>,
    /// Pointer and click listeners on the node
    subscriptions: Vec<H::Subscription>,
    occlusion: Option<OcclusionGuard<H::Element>>,
    effective: EffectiveSettings,
    visibility: Visibility,
}

enum Lifecycle<H: Host> {
    Inactive,
    Active(ControlHandle<H>),
}

/// Presents the floating scroll-to-top control
pub struct FloatingControlPresenter<H: Host, C: Clock> {
    host: H,
    clock: C,
    config: PresenterConfig,
    settings: BacktopSettings,
    locator: HostElementLocator,
    engine: ScrollVisibilityEngine,
    timers: TimerQueue<Task<H::Element>>,
    lifecycle: Lifecycle<H>,
    pending: Option<PendingDetection>,
    settle_timer: Option<TimerId>,
    relayout_timer: Option<TimerId>,
    resume_timer: Option<TimerId>,
    failsafe_timer: Option<TimerId>,
    downgrade_timer: Option<TimerId>,
    snapshot: Option<DetectionSnapshot>,
    settings_dirty: bool,
}

impl<H: Host, C: Clock> FloatingControlPresenter<H, C> {
    pub fn new(host: H, clock: C, settings: BacktopSettings, config: PresenterConfig) -> Self {
        let engine =
            ScrollVisibilityEngine::new(settings.scroll_threshold, config.timings.suspend_window);
        let locator = HostElementLocator::new(config.locator.clone());

        Self {
            host,
            clock,
            config,
            settings,
            locator,
            engine,
            timers: TimerQueue::new(),
            lifecycle: Lifecycle::Inactive,
            pending: None,
            settle_timer: None,
            relayout_timer: None,
            resume_timer: None,
            failsafe_timer: None,
            downgrade_timer: None,
            snapshot: None,
            settings_dirty: false,
        }
    }

    pub fn with_defaults(host: H, clock: C, settings: BacktopSettings) -> Self {
        Self::new(host, clock, settings, PresenterConfig::default())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &BacktopSettings {
        &self.settings
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    pub fn engine(&self) -> &ScrollVisibilityEngine {
        &self.engine
    }

    pub fn log_level(&self) -> LogLevel {
        self.settings.log_level
    }

    pub fn is_active(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Active(_))
    }

    /// Whether a companion detection poll is running
    pub fn is_detecting(&self) -> bool {
        self.pending.is_some()
    }

    /// The mounted control node
    pub fn control(&self) -> Option<&H::Element> {
        match &self.lifecycle {
            Lifecycle::Active(handle) => Some(&handle.node),
            Lifecycle::Inactive => None,
        }
    }

    /// Surface the scroll listener is attached to
    pub fn tracked_surface(&self) -> Option<&H::Element> {
        match &self.lifecycle {
            Lifecycle::Active(handle) => handle.surface.as_ref(),
            Lifecycle::Inactive => None,
        }
    }

    pub fn effective(&self) -> Option<&EffectiveSettings> {
        match &self.lifecycle {
            Lifecycle::Active(handle) => Some(&handle.effective),
            Lifecycle::Inactive => None,
        }
    }

    /// Last presented visibility
    pub fn visibility(&self) -> Option<Visibility> {
        match &self.lifecycle {
            Lifecycle::Active(handle) => Some(handle.visibility),
            Lifecycle::Inactive => None,
        }
    }

    /// Whether the occlusion guard is running
    pub fn is_guarding(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Active(handle) => handle.occlusion.is_some(),
            Lifecycle::Inactive => false,
        }
    }

    pub fn last_detection_snapshot(&self) -> Option<&DetectionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Earliest pending timer; the embedder should call [`Self::pump`] then
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Schedule the first activation and arm the log downgrade timer
    pub fn start(&mut self) {
        tracing::info!("starting floating control");
        self.schedule_activation();
        self.restart_downgrade_timer();
    }

    /// Rebuild the control for the active view.
    ///
    /// Any existing node is removed first. Without an active view nothing
    /// is mounted. On touch hosts the node is mounted once companion
    /// detection settles.
    pub fn activate(&mut self) {
        if let Some(id) = self.settle_timer.take() {
            self.timers.cancel(id);
        }
        self.cancel_detection();
        self.dismount();

        if self.host.active_view().is_none() {
            tracing::debug!("no active view, control not mounted");
            return;
        }

        tracing::debug!("activating control");
        if self.needs_detection() {
            self.begin_detection(DetectionPurpose::Activate);
        } else {
            self.mount(None, None, None);
        }
    }

    /// Re-derive effective settings and restyle the existing node.
    ///
    /// Falls back to a full [`Self::activate`] when nothing is mounted.
    pub fn refresh_appearance(&mut self) {
        if self.pending.is_some() {
            tracing::debug!("detection running, refresh folded into it");
            return;
        }
        if !self.is_active() {
            self.activate();
            return;
        }

        tracing::debug!("refreshing control appearance");
        if self.needs_detection() {
            self.begin_detection(DetectionPurpose::Refresh);
        } else {
            self.restyle(None, None, None);
        }
    }

    /// Smooth-scroll the tracked surface (or the document) to the top.
    ///
    /// Scroll checks are suspended for the animation, and the offset is
    /// hard-set shortly after in case the animation never runs.
    pub fn scroll_to_top(&mut self) {
        let view = self.host.active_view();
        let target = match self.config.surfaces.resolve(&self.host, view.as_ref()) {
            Some(surface) => ScrollTarget::Element(surface),
            None => ScrollTarget::Document,
        };
        let now = self.clock.now();

        let until = self.engine.suspend(now);
        if let Some(id) = self.resume_timer.take() {
            self.timers.cancel(id);
        }
        self.resume_timer = Some(self.timers.schedule(now, until - now, Task::Resume));

        tracing::debug!("scrolling {:?} to top", target);
        if let Err(err) = self.host.scroll_to_top(&target, ScrollBehavior::Smooth) {
            tracing::warn!("smooth scroll failed: {}", err);
        }

        if let Some(id) = self.failsafe_timer.take() {
            self.timers.cancel(id);
        }
        self.failsafe_timer = Some(self.timers.schedule(
            now,
            self.config.timings.failsafe,
            Task::Failsafe(target),
        ));
    }

    /// Remove the node and release every listener and timer
    pub fn teardown(&mut self) {
        self.pending = None;
        self.dismount();
        self.timers.clear();
        self.settle_timer = None;
        self.relayout_timer = None;
        self.resume_timer = None;
        self.failsafe_timer = None;
        self.downgrade_timer = None;
        self.engine.reset();
        tracing::info!("floating control torn down");
    }

    /// React to a host notification
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Scroll => self.check_visibility(),
            HostEvent::PointerEnter => self.set_transform("scale(1.1)"),
            HostEvent::PointerLeave => self.set_transform("scale(1)"),
            HostEvent::Click => {
                tracing::debug!("control clicked");
                self.scroll_to_top();
            }
            HostEvent::ActiveViewChanged => {
                tracing::info!("active view changed, re-creating control");
                self.schedule_activation();
            }
            HostEvent::LayoutChanged => {
                if let Some(id) = self.relayout_timer.take() {
                    self.timers.cancel(id);
                }
                let now = self.clock.now();
                self.relayout_timer =
                    Some(self.timers.schedule(now, self.config.timings.settle, Task::Relayout));
            }
            HostEvent::SettingsOpened => tracing::debug!("settings opened"),
            HostEvent::SettingsClosed => {
                tracing::debug!("settings closed, re-creating control");
                self.activate();
            }
        }
    }

    /// Run every timer that is due. Returns the number of tasks run.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some((id, task)) = self.timers.pop_due(now) {
            self.run(id, task);
            ran += 1;
        }
        ran
    }

    /// Replace the settings and restyle
    pub fn update_settings(&mut self, settings: BacktopSettings) {
        self.settings = settings;
        self.settings_dirty = false;
        self.refresh_appearance();
        self.restart_downgrade_timer();
    }

    /// Parse, validate and apply a host settings blob
    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), ControlError> {
        let settings = BacktopSettings::from_json_str(json)?;
        self.update_settings(settings);
        Ok(())
    }

    /// Settings changed by the presenter itself (log level downgrade) that
    /// the host should persist. Returns each change once.
    pub fn take_settings_to_persist(&mut self) -> Option<BacktopSettings> {
        if !self.settings_dirty {
            return None;
        }
        self.settings_dirty = false;
        Some(self.settings.clone())
    }

    // =========================================================================
    // Timers
    // =========================================================================

    fn run(&mut self, id: TimerId, task: Task<H::Element>) {
        match task {
            Task::Activate => {
                if self.settle_timer == Some(id) {
                    self.settle_timer = None;
                }
                self.activate();
            }
            Task::Relayout => {
                self.relayout_timer = None;
                self.relayout();
            }
            Task::LocatePoll => self.advance_detection(),
            Task::Resume => {
                self.resume_timer = None;
                if self.engine.tick(self.clock.now()) {
                    self.check_visibility();
                }
            }
            Task::Failsafe(target) => {
                self.failsafe_timer = None;
                tracing::trace!("failsafe scrollTop=0");
                if let Err(err) = self.host.set_scroll_top(&target, 0.0) {
                    tracing::error!("failsafe scroll failed: {}", err);
                }
            }
            Task::Occlusion => self.check_occlusion(),
            Task::DowngradeLogLevel => {
                self.downgrade_timer = None;
                if self.settings.log_level.is_elevated() {
                    tracing::info!("auto-downgrading log level to info");
                    self.settings.log_level = LogLevel::Info;
                    self.settings_dirty = true;
                }
            }
        }
    }

    fn schedule_activation(&mut self) {
        if let Some(id) = self.settle_timer.take() {
            self.timers.cancel(id);
        }
        let now = self.clock.now();
        self.settle_timer =
            Some(self.timers.schedule(now, self.config.timings.settle, Task::Activate));
    }

    fn restart_downgrade_timer(&mut self) {
        if let Some(id) = self.downgrade_timer.take() {
            self.timers.cancel(id);
        }

        let minutes = self.settings.auto_downgrade_level_minutes;
        if minutes > 0 && self.settings.log_level.is_elevated() {
            tracing::info!("log level will be reset to info in {} minutes", minutes);
            let delay = Duration::from_secs(u64::from(minutes) * 60);
            let now = self.clock.now();
            self.downgrade_timer =
                Some(self.timers.schedule(now, delay, Task::DowngradeLogLevel));
        }
    }

    // =========================================================================
    // Detection
    // =========================================================================

    fn needs_detection(&self) -> bool {
        self.host.form_factor().is_touch()
            && (self.settings.auto_adapt_mobile || self.settings.use_mobile_theme_colors)
    }

    fn begin_detection(&mut self, purpose: DetectionPurpose) {
        let poll = self.locator.start(self.clock.now());
        self.pending = Some(PendingDetection {
            purpose,
            poll,
            timer: None,
        });
        self.advance_detection();
    }

    fn advance_detection(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        let now = self.clock.now();

        match pending.poll.poll(&self.locator, &self.host, now) {
            LocateStep::Retry { at } => {
                pending.timer = Some(self.timers.schedule(
                    now,
                    at.saturating_sub(now),
                    Task::LocatePoll,
                ));
                self.pending = Some(pending);
            }
            LocateStep::Found(located) => self.finish_detection(pending.purpose, Some(located)),
            LocateStep::Exhausted => {
                tracing::warn!(
                    "no companion control after {} attempts, using configured values",
                    pending.poll.attempts()
                );
                self.finish_detection(pending.purpose, None);
            }
        }
    }

    fn cancel_detection(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Some(id) = pending.timer {
                self.timers.cancel(id);
            }
        }
    }

    fn finish_detection(
        &mut self,
        purpose: DetectionPurpose,
        located: Option<Located<H::Element>>,
    ) {
        let detection = located
            .as_ref()
            .filter(|_| self.settings.auto_adapt_mobile)
            .map(|found| {
                HostElementLocator::detection(
                    found,
                    self.host.viewport(),
                    self.settings.mobile_gap_px(),
                )
            });
        let colors = located
            .as_ref()
            .filter(|_| self.settings.use_mobile_theme_colors)
            .and_then(|found| self.locator.theme_colors(&self.host, &found.element));
        let companion = located.map(|found| found.element);

        match purpose {
            DetectionPurpose::Activate => self.mount(detection, colors, companion),
            DetectionPurpose::Refresh => self.restyle(detection, colors, companion),
        }
    }

    // =========================================================================
    // Node management
    // =========================================================================

    fn resolve_effective(
        &self,
        detection: Option<&DetectionResult>,
        colors: Option<&ThemeColors>,
    ) -> EffectiveSettings {
        EffectiveSettings::resolve(&self.settings, self.host.form_factor(), detection, colors)
    }

    fn mount(
        &mut self,
        detection: Option<DetectionResult>,
        colors: Option<ThemeColors>,
        companion: Option<H::Element>,
    ) {
        let Some(view) = self.host.active_view() else {
            tracing::debug!("active view went away before the control was mounted");
            return;
        };

        let effective = self.resolve_effective(detection.as_ref(), colors.as_ref());
        self.engine.set_threshold(effective.scroll_threshold);

        let handle = match self.build_control(&view, &effective) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!("failed to create control: {}", err);
                return;
            }
        };

        tracing::info!(
            "control mounted ({}, size {}, bottom {}, right {})",
            effective.form_factor.label(),
            effective.size,
            effective.bottom_offset,
            effective.right_offset
        );
        self.snapshot = Some(DetectionSnapshot::capture(
            &effective,
            detection,
            self.clock.now(),
        ));
        let show_on_load = effective.show_on_load;
        self.lifecycle = Lifecycle::Active(handle);
        self.arm_occlusion_guard(companion);

        if show_on_load {
            self.present(Visibility::Shown);
        } else if self.host.settings_open() {
            tracing::debug!("settings open, initial visibility check deferred");
        } else {
            self.check_visibility();
        }
    }

    fn build_control(
        &self,
        view: &H::Element,
        effective: &EffectiveSettings,
    ) -> Result<ControlHandle<H>, ControlError> {
        let node = self.host.create_control(&CONTROL_MARKUP)?;
        match self.wire_control(&node, view, effective) {
            Ok(handle) => Ok(handle),
            Err(err) => {
                self.host.remove(&node);
                Err(err)
            }
        }
    }

    fn wire_control(
        &self,
        node: &H::Element,
        view: &H::Element,
        effective: &EffectiveSettings,
    ) -> Result<ControlHandle<H>, ControlError> {
        for (property, value) in BASE_STYLES {
            self.host.set_style(node, property, value)?;
        }
        apply_dynamic_styles(&self.host, node, effective)?;

        let subscriptions = [
            ListenKind::PointerEnter,
            ListenKind::PointerLeave,
            ListenKind::Click,
        ]
        .into_iter()
        .map(|kind| self.host.subscribe(node, kind))
        .collect::<Result<Vec<_>, _>>()?;

        let surface = self.config.surfaces.resolve(&self.host, Some(view));
        let scroll_subscription = match &surface {
            Some(surface) => Some(self.host.subscribe(surface, ListenKind::Scroll)?),
            None => None,
        };

        Ok(ControlHandle {
            node: node.clone(),
            surface,
            scroll_subscription,
            subscriptions,
            occlusion: None,
            effective: effective.clone(),
            visibility: Visibility::Hidden,
        })
    }

    fn restyle(
        &mut self,
        detection: Option<DetectionResult>,
        colors: Option<ThemeColors>,
        companion: Option<H::Element>,
    ) {
        let effective = self.resolve_effective(detection.as_ref(), colors.as_ref());
        self.engine.set_threshold(effective.scroll_threshold);

        let Lifecycle::Active(handle) = &mut self.lifecycle else {
            return;
        };
        if let Err(err) = apply_dynamic_styles(&self.host, &handle.node, &effective) {
            tracing::error!("failed to restyle control: {}", err);
            return;
        }
        handle.effective = effective.clone();
        if let (Some(guard), Some(companion)) = (&mut handle.occlusion, companion) {
            guard.reference = companion;
        }

        let mut snapshot = DetectionSnapshot::capture(&effective, detection, self.clock.now());
        if let Some(previous) = self.snapshot.take() {
            snapshot.last_scroll = previous.last_scroll;
            snapshot.surface = previous.surface;
        }
        self.snapshot = Some(snapshot);
        self.check_visibility();
    }

    fn dismount(&mut self) {
        let Lifecycle::Active(handle) = std::mem::replace(&mut self.lifecycle, Lifecycle::Inactive)
        else {
            return;
        };
        if let Some(guard) = &handle.occlusion {
            self.timers.cancel(guard.timer);
        }
        self.host.remove(&handle.node);
        tracing::debug!(
            "control removed, releasing {} listeners",
            handle.subscriptions.len() + usize::from(handle.scroll_subscription.is_some())
        );
    }

    fn relayout(&mut self) {
        let Lifecycle::Active(handle) = &mut self.lifecycle else {
            return;
        };

        let view = self.host.active_view();
        let surface = self.config.surfaces.resolve(&self.host, view.as_ref());
        if surface != handle.surface {
            handle.scroll_subscription = None;
            if let Some(surface) = &surface {
                match self.host.subscribe(surface, ListenKind::Scroll) {
                    Ok(subscription) => handle.scroll_subscription = Some(subscription),
                    Err(err) => tracing::error!("failed to listen for scroll: {}", err),
                }
            }
            tracing::debug!("tracked surface changed after layout change");
            handle.surface = surface;
        }

        self.check_visibility();
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    fn check_visibility(&mut self) {
        if !self.is_active() {
            return;
        }
        if self.engine.is_suspended() {
            tracing::trace!("scroll check skipped while scrolling to top");
            return;
        }

        let view = self.host.active_view();
        let surface = self.config.surfaces.resolve(&self.host, view.as_ref());
        let scroll_top = surface
            .as_ref()
            .and_then(|surface| match self.host.scroll_metrics(surface) {
                Ok(metrics) => Some(metrics.scroll_top),
                Err(err) => {
                    tracing::error!("failed to read scroll position: {}", err);
                    None
                }
            });

        let Some(state) = self.engine.check(scroll_top) else {
            return;
        };
        if let Some(snapshot) = &mut self.snapshot {
            snapshot.mode = self.engine.mode();
            snapshot.last_scroll = Some(state);
            snapshot.surface = surface.as_ref().map(|surface| self.host.describe(surface));
        }
        self.present(Visibility::from_should_show(state.should_show));
    }

    fn present(&mut self, visibility: Visibility) {
        let Lifecycle::Active(handle) = &mut self.lifecycle else {
            return;
        };

        let opacity = visibility.opacity(handle.effective.opacity).to_string();
        let applied = self
            .host
            .set_style(&handle.node, "opacity", &opacity)
            .and_then(|()| self.host.set_style(&handle.node, "visibility", visibility.css()));

        match applied {
            Ok(()) => {
                if handle.visibility != visibility {
                    tracing::debug!("control {:?}", visibility);
                }
                handle.visibility = visibility;
            }
            Err(err) => tracing::error!("failed to update control visibility: {}", err),
        }
    }

    fn set_transform(&mut self, transform: &str) {
        let Lifecycle::Active(handle) = &self.lifecycle else {
            return;
        };
        if let Err(err) = self.host.set_style(&handle.node, "transform", transform) {
            tracing::error!("failed to set hover transform: {}", err);
        }
    }

    /// Probe the companion control, or the configured fallback element
    fn arm_occlusion_guard(&mut self, companion: Option<H::Element>) {
        let Lifecycle::Active(handle) = &mut self.lifecycle else {
            return;
        };
        if !self.host.form_factor().is_touch() || self.host.settings_open() {
            return;
        }
        let reference =
            companion.or_else(|| self.host.query(None, &self.config.occlusion_reference));
        let Some(reference) = reference else {
            tracing::debug!(
                "no companion control or {}, occlusion guard not armed",
                self.config.occlusion_reference
            );
            return;
        };

        let now = self.clock.now();
        let timer = self.timers.schedule_repeating(
            now,
            self.config.timings.occlusion_interval,
            Task::Occlusion,
        );
        handle.occlusion = Some(OcclusionGuard { reference, timer });
    }

    fn check_occlusion(&mut self) {
        let Lifecycle::Active(handle) = &self.lifecycle else {
            return;
        };
        let Some(guard) = &handle.occlusion else {
            return;
        };
        let reference = guard.reference.clone();

        let rect = match self.host.bounding_rect(&reference) {
            Ok(rect) => rect,
            Err(err) => {
                tracing::debug!("occlusion reference unavailable: {}", err);
                self.check_visibility();
                return;
            }
        };

        let probe = Point::new(
            rect.left + self.config.occlusion_probe_inset,
            rect.top + rect.height / 2.0,
        );
        let uncovered = self
            .host
            .element_from_point(probe)
            .is_some_and(|top| top == reference || self.host.contains(&reference, &top));

        if uncovered {
            self.check_visibility();
        } else {
            tracing::trace!("occlusion reference covered, hiding control");
            self.present(Visibility::Hidden);
        }
    }
}

/// Size, position and colors of the node and its icon
fn apply_dynamic_styles<H: Host>(
    host: &H,
    node: &H::Element,
    effective: &EffectiveSettings,
) -> backtop_platform::Result<()> {
    let size = effective.size.to_string();
    host.set_style(node, "bottom", &effective.bottom_offset.to_string())?;
    host.set_style(node, "right", &effective.right_offset.to_string())?;
    host.set_style(node, "width", &size)?;
    host.set_style(node, "height", &size)?;
    host.set_style(node, "background-color", effective.background_color.as_str())?;
    host.set_style(node, "color", effective.text_color.as_str())?;

    if let Some(icon) = host.query(Some(node), "svg") {
        let icon_size = effective.icon_size.to_string();
        for property in ICON_SIZE_PROPERTIES {
            host.set_style_important(&icon, property, &icon_size)?;
        }
    }
    Ok(())
}
