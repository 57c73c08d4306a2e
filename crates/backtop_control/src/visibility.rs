//! Scroll-driven visibility.
//!
//! The engine turns a scroll offset into a show/hide decision. While the
//! control's own scroll-to-top animation runs, the engine is suspended and
//! ignores scroll checks so the control does not flicker as the offset
//! sweeps past the threshold.

use std::time::Duration;

use backtop_core::StateMachine;
use serde::Serialize;

/// Whether scroll checks are currently honoured
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum VisibilityMode {
    #[default]
    Normal,
    /// A programmatic scroll is animating
    Suspended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModeEvent {
    Suspend,
    Resume,
}

/// Result of one visibility check
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub scroll_top: f64,
    pub should_show: bool,
}

/// Presented state of the control
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    Shown,
    #[default]
    Hidden,
}

impl Visibility {
    pub fn from_should_show(should_show: bool) -> Self {
        if should_show {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }

    /// Value of the CSS `visibility` property
    pub fn css(self) -> &'static str {
        match self {
            Visibility::Shown => "visible",
            Visibility::Hidden => "hidden",
        }
    }

    /// Opacity to present, given the opacity of the shown control
    pub fn opacity(self, shown_opacity: f64) -> f64 {
        match self {
            Visibility::Shown => shown_opacity,
            Visibility::Hidden => 0.0,
        }
    }
}

/// Threshold check with a timed suspension window
#[derive(Debug)]
pub struct ScrollVisibilityEngine {
    mode: StateMachine<VisibilityMode, ModeEvent>,
    threshold: f64,
    suspend_window: Duration,
    resume_at: Option<Duration>,
    evaluations: u64,
    last: Option<ScrollState>,
}

impl ScrollVisibilityEngine {
    pub fn new(threshold: f64, suspend_window: Duration) -> Self {
        let mode = StateMachine::builder(VisibilityMode::Normal)
            .on(VisibilityMode::Normal, ModeEvent::Suspend, VisibilityMode::Suspended)
            .on(VisibilityMode::Suspended, ModeEvent::Resume, VisibilityMode::Normal)
            .build();

        Self {
            mode,
            threshold,
            suspend_window,
            resume_at: None,
            evaluations: 0,
            last: None,
        }
    }

    pub fn mode(&self) -> VisibilityMode {
        self.mode.current_state()
    }

    pub fn is_suspended(&self) -> bool {
        self.mode.is_in(VisibilityMode::Suspended)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn suspend_window(&self) -> Duration {
        self.suspend_window
    }

    /// When a suspension ends, if one is running
    pub fn resume_at(&self) -> Option<Duration> {
        self.resume_at
    }

    /// Number of checks that produced a decision
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn last_state(&self) -> Option<ScrollState> {
        self.last
    }

    /// Enter (or extend) the suspension window starting at `now`.
    ///
    /// Returns the instant the window ends.
    pub fn suspend(&mut self, now: Duration) -> Duration {
        self.mode.send(ModeEvent::Suspend);
        let until = now + self.suspend_window;
        self.resume_at = Some(until);
        tracing::debug!("visibility suspended until {:?}", until);
        until
    }

    /// Leave suspension once the window has elapsed.
    ///
    /// Returns `true` exactly once per window, when the engine returns to
    /// normal; the caller then re-checks visibility.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.resume_at {
            Some(until) if now >= until => {
                self.resume_at = None;
                self.mode.send(ModeEvent::Resume);
                tracing::debug!("visibility resumed");
                true
            }
            _ => false,
        }
    }

    /// Pure threshold decision
    pub fn should_show(&self, scroll_top: f64) -> bool {
        scroll_top > self.threshold
    }

    /// Check the tracked surface's offset.
    ///
    /// `None` while suspended or when there is no surface (`scroll_top` is
    /// `None`); the caller keeps the current presentation in both cases.
    pub fn check(&mut self, scroll_top: Option<f64>) -> Option<ScrollState> {
        if self.is_suspended() {
            tracing::trace!("visibility check skipped while suspended");
            return None;
        }
        let scroll_top = scroll_top?;

        let state = ScrollState {
            scroll_top,
            should_show: self.should_show(scroll_top),
        };
        tracing::trace!(
            "scrollTop={} threshold={} shouldShow={}",
            scroll_top,
            self.threshold,
            state.should_show
        );
        self.evaluations += 1;
        self.last = Some(state);
        Some(state)
    }

    /// Back to normal with no pending window
    pub fn reset(&mut self) {
        self.mode.reset();
        self.resume_at = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut engine = ScrollVisibilityEngine::new(300.0, WINDOW);
        for offset in [0.0, 50.0, 299.0, 300.0, 300.5, 301.0, 5000.0] {
            let state = engine.check(Some(offset)).unwrap();
            assert_eq!(state.should_show, offset > 300.0, "offset {offset}");
        }
        assert_eq!(engine.evaluations(), 7);
    }

    #[test]
    fn test_missing_surface_is_a_no_op() {
        let mut engine = ScrollVisibilityEngine::new(300.0, WINDOW);
        engine.check(Some(400.0));
        assert_eq!(engine.check(None), None);
        assert_eq!(engine.last_state().map(|s| s.scroll_top), Some(400.0));
        assert_eq!(engine.evaluations(), 1);
    }

    #[test]
    fn test_suspension_window() {
        let mut engine = ScrollVisibilityEngine::new(300.0, WINDOW);
        assert_eq!(engine.suspend(ms(1000)), ms(1500));
        assert_eq!(engine.mode(), VisibilityMode::Suspended);

        for offset in [900.0, 400.0, 100.0, 0.0] {
            assert_eq!(engine.check(Some(offset)), None);
        }
        assert!(!engine.tick(ms(1499)));
        assert!(engine.tick(ms(1500)));
        assert!(!engine.tick(ms(1600)));
        assert_eq!(engine.mode(), VisibilityMode::Normal);
        assert_eq!(engine.evaluations(), 0);

        assert_eq!(engine.check(Some(0.0)).map(|s| s.should_show), Some(false));
    }

    #[test]
    fn test_resuspend_extends_window() {
        let mut engine = ScrollVisibilityEngine::new(300.0, WINDOW);
        engine.suspend(ms(0));
        engine.suspend(ms(300));

        assert!(!engine.tick(ms(500)));
        assert!(engine.is_suspended());
        assert!(engine.tick(ms(800)));
    }

    #[test]
    fn test_visibility_presentation() {
        assert_eq!(Visibility::from_should_show(true).css(), "visible");
        assert_eq!(Visibility::Shown.opacity(0.8), 0.8);
        assert_eq!(Visibility::Hidden.opacity(0.8), 0.0);
        assert_eq!(Visibility::from_should_show(false).css(), "hidden");
    }
}
