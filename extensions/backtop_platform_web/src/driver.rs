//! JavaScript-facing driver.
//!
//! Owns the presenter, delivers queued DOM events to it, and keeps a single
//! `setTimeout` armed for the presenter's next deadline. Every entry point
//! runs the presenter to quiescence before returning.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use backtop_control::{BacktopSettings, FloatingControlPresenter};
use backtop_core::Clock;
use backtop_platform::FormFactor;
use gloo::timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::clock::PerformanceClock;
use crate::host::WebHost;
use crate::logging;

struct Core {
    host: WebHost,
    clock: PerformanceClock,
    presenter: FloatingControlPresenter<WebHost, PerformanceClock>,
    timeout: Option<Timeout>,
    /// Timeout whose callback is running; dropped once it has returned
    fired: Option<Timeout>,
    persist: Option<BacktopSettings>,
    this: Weak<RefCell<Core>>,
}

impl Core {
    /// Deliver events and run due timers until nothing is left, then re-arm
    fn settle(&mut self) {
        loop {
            let events = self.host.take_events();
            let ran = self.presenter.pump();
            if events.is_empty() && ran == 0 {
                break;
            }
            for event in events {
                self.presenter.handle(event);
            }
        }

        if let Some(persist) = self.presenter.take_settings_to_persist() {
            logging::set_level(persist.log_level);
            tracing::debug!("log level changed to {}", persist.log_level.name());
            self.persist = Some(persist);
        }
        self.rearm();
    }

    fn rearm(&mut self) {
        self.timeout = None;
        let Some(deadline) = self.presenter.next_deadline() else {
            return;
        };

        let millis = delay_millis(deadline, self.clock.now());
        let this = self.this.clone();
        self.timeout = Some(Timeout::new(millis, move || fire(&this)));
    }
}

/// Settle the core unless it is already borrowed; the holder settles before
/// releasing it
fn wake(core: &Weak<RefCell<Core>>) {
    with_free(core, Core::settle);
}

/// Timeout callback
fn fire(core: &Weak<RefCell<Core>>) {
    with_free(core, |core| {
        core.fired = core.timeout.take();
        core.settle();
    });
}

/// Run `action` on a live, unborrowed cell. Returns whether it ran.
fn with_free<T>(cell: &Weak<RefCell<T>>, action: impl FnOnce(&mut T)) -> bool {
    let Some(cell) = cell.upgrade() else {
        return false;
    };
    let borrowed = cell.try_borrow_mut();
    match borrowed {
        Ok(mut value) => {
            action(&mut value);
            true
        }
        Err(_) => false,
    }
}

/// Milliseconds until `deadline`, rounded up so the timeout never fires early
fn delay_millis(deadline: Duration, now: Duration) -> u32 {
    let delay = deadline.saturating_sub(now);
    let millis = delay.as_millis() + u128::from(delay.subsec_nanos() % 1_000_000 != 0);
    u32::try_from(millis).unwrap_or(u32::MAX)
}

/// Floating back-to-top control bound to the current document
#[wasm_bindgen]
pub struct BacktopControl {
    core: Rc<RefCell<Core>>,
}

#[wasm_bindgen]
impl BacktopControl {
    /// Create the control. `settings` is the host's stored settings blob
    /// (JSON); missing keys take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: Option<String>, is_mobile: bool) -> Result<BacktopControl, JsValue> {
        let settings = match settings.as_deref() {
            Some(json) if !json.trim().is_empty() => {
                BacktopSettings::from_json_str(json).map_err(to_js)?
            }
            _ => BacktopSettings::default(),
        };
        logging::init(settings.log_level);

        let form_factor = if is_mobile {
            FormFactor::Touch
        } else {
            FormFactor::Desktop
        };
        let host = WebHost::new(form_factor).map_err(to_js)?;
        let clock = PerformanceClock::new();
        let presenter =
            FloatingControlPresenter::with_defaults(host.clone(), clock.clone(), settings);

        let core = Rc::new_cyclic(|this| {
            RefCell::new(Core {
                host: host.clone(),
                clock,
                presenter,
                timeout: None,
                fired: None,
                persist: None,
                this: this.clone(),
            })
        });

        let weak = Rc::downgrade(&core);
        host.set_waker(move || wake(&weak));

        tracing::info!("backtop loaded ({})", form_factor.label());
        Ok(BacktopControl { core })
    }

    /// Schedule the first activation
    pub fn start(&self) {
        self.with_core(|core| core.presenter.start());
    }

    /// The host switched to another content view (`None` when no trackable
    /// view is active)
    #[wasm_bindgen(js_name = notifyActiveViewChanged)]
    pub fn notify_active_view_changed(&self, view: Option<Element>) {
        self.with_core(|core| core.host.set_active_view(view));
    }

    #[wasm_bindgen(js_name = notifyLayoutChanged)]
    pub fn notify_layout_changed(&self) {
        self.with_core(|core| core.host.layout_changed());
    }

    #[wasm_bindgen(js_name = setSettingsOpen)]
    pub fn set_settings_open(&self, open: bool) {
        self.with_core(|core| core.host.set_settings_open(open));
    }

    /// Replace the settings with a JSON blob and restyle
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, json: &str) -> Result<(), JsValue> {
        let settings = BacktopSettings::from_json_str(json).map_err(to_js)?;
        logging::set_level(settings.log_level);
        self.with_core(|core| core.presenter.update_settings(settings));
        Ok(())
    }

    #[wasm_bindgen(js_name = scrollToTop)]
    pub fn scroll_to_top(&self) {
        self.with_core(|core| core.presenter.scroll_to_top());
    }

    /// Remove the control and release every listener and timer
    pub fn teardown(&self) {
        let mut core = self.core.borrow_mut();
        core.host.clear_waker();
        core.presenter.teardown();
        core.timeout = None;
    }

    /// Diagnostics of the last applied settings, as JSON
    pub fn snapshot(&self) -> Option<String> {
        self.core
            .borrow()
            .presenter
            .last_detection_snapshot()
            .and_then(|snapshot| snapshot.to_json())
    }

    /// Settings the control changed on its own (log level downgrade) that
    /// the host should save, as JSON. Returns each change once.
    #[wasm_bindgen(js_name = takeSettingsToPersist)]
    pub fn take_settings_to_persist(&self) -> Option<String> {
        let settings = self.core.borrow_mut().persist.take()?;
        match settings.to_json_string() {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::error!("failed to serialize settings: {}", err);
                None
            }
        }
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.core.borrow().presenter.is_active()
    }

    fn with_core(&self, action: impl FnOnce(&mut Core)) {
        let mut core = self.core.borrow_mut();
        action(&mut core);
        core.settle();
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_skip_busy_or_dropped_cells() {
        let cell = Rc::new(RefCell::new(0));
        let weak = Rc::downgrade(&cell);

        assert!(with_free(&weak, |count| *count += 1));
        {
            let _held = cell.borrow_mut();
            assert!(!with_free(&weak, |count| *count += 1));
        }
        assert_eq!(*cell.borrow(), 1);

        drop(cell);
        assert!(!with_free(&weak, |count| *count += 1));
    }

    #[test]
    fn delay_rounds_up_and_saturates() {
        let ms = Duration::from_millis;
        assert_eq!(delay_millis(ms(600), ms(100)), 500);
        assert_eq!(delay_millis(ms(100), ms(600)), 0);
        assert_eq!(delay_millis(Duration::from_micros(1_001), Duration::ZERO), 2);
        assert_eq!(delay_millis(Duration::MAX, Duration::ZERO), u32::MAX);
    }
}
