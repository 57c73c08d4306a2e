//! Companion control detection.
//!
//! On touch hosts the floating control sits just above a host-provided
//! control near the bottom of the screen and borrows its size and colors.
//! That control appears asynchronously, so detection is a bounded poll:
//! every attempt scans the selector list in priority order, and attempts are
//! spaced by a fixed interval until one qualifies or the budget runs out.
//!
//! The poll is an explicit state machine ([`LocatePoll`]) so the same logic
//! runs under the presenter's timer queue and under a synchronous driver
//! ([`HostElementLocator::locate`]) with an injected clock and delay.

use std::time::Duration;

use backtop_core::{Clock, Delay};
use backtop_platform::{Host, Rect, Viewport};

use crate::effective::{DetectionResult, ThemeColors};
use crate::settings::{CssColor, Length};

/// Decides whether a matched element is the companion control
pub type Qualifier = fn(&Rect, &Viewport) -> bool;

/// Laid out with a visible box whose top edge is in the bottom half of the
/// viewport. Filters out zero-size duplicates the host renders elsewhere.
pub fn in_bottom_half(rect: &Rect, viewport: &Viewport) -> bool {
    rect.has_area() && rect.top > viewport.height / 2.0
}

/// Selectors, poll budget and color fallbacks for detection
#[derive(Clone, Debug)]
pub struct LocatorConfig {
    /// Candidate selectors, highest priority first
    pub selectors: Vec<String>,
    pub max_attempts: u32,
    /// Delay between attempts
    pub interval: Duration,
    pub qualifies: Qualifier,
    /// Background sources: the element's own background, then theme variables
    pub background_chain: Vec<String>,
    /// Foreground sources, tried in order
    pub text_chain: Vec<String>,
    /// Foreground used when every source is empty
    pub fallback_text: CssColor,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            selectors: vec![
                r#".view-actions .view-action[aria-label*="Current view"]"#.to_string(),
            ],
            max_attempts: 10,
            interval: Duration::from_millis(50),
            qualifies: in_bottom_half,
            background_chain: vec![
                "background-color".to_string(),
                "--interactive-accent".to_string(),
                "--color-accent".to_string(),
            ],
            text_chain: vec![
                "color".to_string(),
                "--text-on-accent".to_string(),
                "--text-normal".to_string(),
            ],
            fallback_text: CssColor::from("#ffffff"),
        }
    }
}

impl LocatorConfig {
    /// Worst-case time before a poll gives up
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// A qualifying companion control
#[derive(Clone, Debug, PartialEq)]
pub struct Located<E> {
    pub element: E,
    pub rect: Rect,
    /// Host description of the element, usually its class list
    pub class_name: String,
}

/// Outcome of polling once
#[derive(Clone, Debug, PartialEq)]
pub enum LocateStep<E> {
    Found(Located<E>),
    /// Nothing yet; poll again at `at`
    Retry { at: Duration },
    /// Attempt budget exhausted without a match
    Exhausted,
}

/// State of one bounded detection poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatePoll {
    attempt: u32,
    next_at: Duration,
}

impl LocatePoll {
    /// Start a poll whose first attempt is due at `now`
    pub fn new(now: Duration) -> Self {
        Self {
            attempt: 0,
            next_at: now,
        }
    }

    /// Attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// When the next attempt (or the exhaustion verdict) is due
    pub fn next_at(&self) -> Duration {
        self.next_at
    }

    /// Advance the poll at `now`.
    ///
    /// Calling early is harmless: the poll just reports when it is due.
    pub fn poll<H: Host>(
        &mut self,
        locator: &HostElementLocator,
        host: &H,
        now: Duration,
    ) -> LocateStep<H::Element> {
        if now < self.next_at {
            return LocateStep::Retry { at: self.next_at };
        }
        if self.attempt >= locator.config.max_attempts {
            return LocateStep::Exhausted;
        }

        if let Some(found) = locator.scan(host) {
            return LocateStep::Found(found);
        }

        self.attempt += 1;
        self.next_at = now + locator.config.interval;
        tracing::trace!(
            "companion attempt {}/{}, waiting {:?}",
            self.attempt,
            locator.config.max_attempts,
            locator.config.interval
        );
        LocateStep::Retry { at: self.next_at }
    }
}

/// Finds the companion control and reads its geometry and colors
#[derive(Clone, Debug, Default)]
pub struct HostElementLocator {
    config: LocatorConfig,
}

impl HostElementLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Begin a poll at `now`
    pub fn start(&self, now: Duration) -> LocatePoll {
        LocatePoll::new(now)
    }

    /// Run a complete poll, sleeping through `delay` between attempts.
    ///
    /// Gives up after `max_attempts` attempts spaced `interval` apart; a
    /// miss is a normal outcome.
    pub fn locate<H, C, D>(&self, host: &H, clock: &C, delay: &mut D) -> Option<Located<H::Element>>
    where
        H: Host,
        C: Clock,
        D: Delay,
    {
        let mut poll = self.start(clock.now());
        loop {
            let now = clock.now();
            match poll.poll(self, host, now) {
                LocateStep::Found(found) => return Some(found),
                LocateStep::Exhausted => {
                    tracing::warn!(
                        "no companion control found after {} attempts",
                        poll.attempts()
                    );
                    return None;
                }
                LocateStep::Retry { at } => delay.delay(at.saturating_sub(now)),
            }
        }
    }

    /// One pass over every selector; the first qualifying element wins
    pub fn scan<H: Host>(&self, host: &H) -> Option<Located<H::Element>> {
        let viewport = host.viewport();
        for selector in &self.config.selectors {
            tracing::trace!("checking selector {}", selector);
            for element in host.query_all(None, selector) {
                let Ok(rect) = host.bounding_rect(&element) else {
                    continue;
                };
                if (self.config.qualifies)(&rect, &viewport) {
                    tracing::debug!(
                        "found companion control {}x{} at {},{}",
                        rect.width,
                        rect.height,
                        rect.left,
                        rect.top
                    );
                    return Some(Located {
                        class_name: host.describe(&element),
                        element,
                        rect,
                    });
                }
            }
        }
        None
    }

    /// Geometry that places the floating control `gap` pixels above the
    /// companion control, right-aligned with it
    pub fn detection<E>(located: &Located<E>, viewport: Viewport, gap: f64) -> DetectionResult {
        let rect = located.rect;
        DetectionResult {
            size: Length::px(rect.width.max(rect.height).round()),
            bottom_offset: Length::px(viewport.height - rect.top + gap),
            right_offset: Length::px(viewport.width - rect.right()),
            source_rect: rect,
            class_name: located.class_name.clone(),
        }
    }

    /// Colors from the companion control's computed style.
    ///
    /// `None` when no background source yields a visible color.
    pub fn theme_colors<H: Host>(&self, host: &H, element: &H::Element) -> Option<ThemeColors> {
        let resolve = |property: &String| host.computed_style(element, property).map(CssColor::new);

        let background_color = self
            .config
            .background_chain
            .iter()
            .filter_map(resolve)
            .find(CssColor::is_visible)?;

        let text_color = self
            .config
            .text_chain
            .iter()
            .filter_map(resolve)
            .find(|color| !color.is_empty())
            .unwrap_or_else(|| self.config.fallback_text.clone());

        let opacity = host
            .computed_style(element, "opacity")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| (0.0..=1.0).contains(value))
            .unwrap_or(1.0);

        Some(ThemeColors {
            background_color,
            text_color,
            opacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtop_core::ManualClock;
    use backtop_platform::headless::{ElementSpec, HeadlessHost, NodeId};
    use backtop_platform::FormFactor;

    const LABEL: &str = "Current view: editing";

    fn phone() -> (HeadlessHost, NodeId) {
        let host = HeadlessHost::new(Viewport::new(390.0, 844.0), FormFactor::Touch);
        let actions = host.append(host.body(), ElementSpec::new("div").class("view-actions"));
        (host, actions)
    }

    fn companion(host: &HeadlessHost, parent: NodeId, rect: Rect) -> NodeId {
        host.append(
            parent,
            ElementSpec::new("button")
                .class("view-action clickable-icon")
                .attr("aria-label", LABEL)
                .rect(rect),
        )
    }

    #[test]
    fn test_bottom_half_heuristic() {
        let viewport = Viewport::new(390.0, 844.0);
        assert!(in_bottom_half(&Rect::new(0.0, 700.0, 48.0, 48.0), &viewport));
        assert!(!in_bottom_half(&Rect::new(0.0, 400.0, 48.0, 48.0), &viewport));
        assert!(!in_bottom_half(&Rect::new(0.0, 700.0, 0.0, 48.0), &viewport));
    }

    #[test]
    fn test_found_on_first_attempt() {
        let (host, actions) = phone();
        let button = companion(&host, actions, Rect::new(320.0, 700.0, 48.0, 48.0));
        let mut clock = ManualClock::new();
        let locator = HostElementLocator::default();

        let found = locator.locate(&host, &clock.clone(), &mut clock).unwrap();
        assert_eq!(found.element, button);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_skips_zero_size_and_top_half_duplicates() {
        let (host, actions) = phone();
        companion(&host, actions, Rect::default());
        companion(&host, actions, Rect::new(320.0, 60.0, 48.0, 48.0));
        let real = companion(&host, actions, Rect::new(320.0, 700.0, 48.0, 48.0));

        let located = HostElementLocator::default().scan(&host).unwrap();
        assert_eq!(located.element, real);
        assert_eq!(located.class_name, "view-action clickable-icon");
    }

    #[test]
    fn test_exhausts_after_full_budget() {
        let (host, _) = phone();
        let mut clock = ManualClock::new();
        let locator = HostElementLocator::default();

        assert!(locator.locate(&host, &clock.clone(), &mut clock).is_none());
        let elapsed = clock.now();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(600));
    }

    #[test]
    fn test_poll_state_machine() {
        let (host, actions) = phone();
        let locator = HostElementLocator::default();
        let mut poll = locator.start(Duration::ZERO);

        assert_eq!(
            poll.poll(&locator, &host, Duration::ZERO),
            LocateStep::Retry {
                at: Duration::from_millis(50)
            }
        );
        // Early polls do not consume attempts
        assert_eq!(
            poll.poll(&locator, &host, Duration::from_millis(20)),
            LocateStep::Retry {
                at: Duration::from_millis(50)
            }
        );
        assert_eq!(poll.attempts(), 1);

        let button = companion(&host, actions, Rect::new(320.0, 700.0, 48.0, 48.0));
        match poll.poll(&locator, &host, Duration::from_millis(50)) {
            LocateStep::Found(found) => assert_eq!(found.element, button),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_appears_mid_poll() {
        let (host, actions) = phone();
        let locator = HostElementLocator::default();
        let mut poll = locator.start(Duration::ZERO);
        let mut now = Duration::ZERO;

        for _ in 0..3 {
            match poll.poll(&locator, &host, now) {
                LocateStep::Retry { at } => now = at,
                other => panic!("unexpected {other:?}"),
            }
        }
        companion(&host, actions, Rect::new(320.0, 700.0, 48.0, 48.0));
        assert!(matches!(poll.poll(&locator, &host, now), LocateStep::Found(_)));
        assert_eq!(now, Duration::from_millis(150));
    }

    #[test]
    fn test_detection_geometry() {
        let located = Located {
            element: (),
            rect: Rect::new(320.0, 700.0, 47.6, 44.0),
            class_name: "view-action".to_string(),
        };
        let viewport = Viewport::new(390.0, 844.0);
        let detection = HostElementLocator::detection(&located, viewport, 20.0);

        assert_eq!(detection.size, Length::px(48.0));
        assert_eq!(detection.bottom_offset, Length::px(844.0 - 700.0 + 20.0));
        assert_eq!(detection.right_offset, Length::px(390.0 - (320.0 + 47.6)));
    }

    #[test]
    fn test_theme_color_fallbacks() {
        let (host, actions) = phone();
        let button = companion(&host, actions, Rect::new(320.0, 700.0, 48.0, 48.0));
        let locator = HostElementLocator::default();

        host.set_computed(button, "background-color", "rgba(0, 0, 0, 0)");
        assert_eq!(locator.theme_colors(&host, &button), None);

        host.set_computed(button, "--interactive-accent", "");
        host.set_computed(button, "--color-accent", "rgb(127, 109, 242)");
        host.set_computed(button, "--text-normal", "rgb(220, 221, 222)");
        host.set_computed(button, "opacity", "0.9");

        let colors = locator.theme_colors(&host, &button).unwrap();
        assert_eq!(colors.background_color, CssColor::from("rgb(127, 109, 242)"));
        assert_eq!(colors.text_color, CssColor::from("rgb(220, 221, 222)"));
        assert_eq!(colors.opacity, 0.9);

        host.set_computed(button, "--text-normal", "");
        host.set_computed(button, "opacity", "");
        let colors = locator.theme_colors(&host, &button).unwrap();
        assert_eq!(colors.text_color, CssColor::from("#ffffff"));
        assert_eq!(colors.opacity, 1.0);
    }
}
