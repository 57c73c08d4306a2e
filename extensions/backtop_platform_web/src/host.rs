//! Browser DOM implementation of [`Host`]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use backtop_platform::{
    ControlMarkup, FormFactor, Host, HostEvent, ListenKind, PlatformError, Point, Rect, Result,
    ScrollBehavior, ScrollMetrics, ScrollTarget, Viewport,
};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement, ScrollToOptions, Window};

/// Called after a listener queued an event
type Waker = Rc<dyn Fn()>;

/// State the embedding page pushes in, and events listeners push out
#[derive(Default)]
struct WebState {
    form_factor: FormFactor,
    settings_open: bool,
    active_view: Option<Element>,
    events: VecDeque<HostEvent>,
    waker: Option<Waker>,
}

/// The live document of the current window
#[derive(Clone)]
pub struct WebHost {
    window: Window,
    document: Document,
    state: Rc<RefCell<WebState>>,
}

impl WebHost {
    pub fn new(form_factor: FormFactor) -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| PlatformError::Unavailable("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| PlatformError::Unavailable("document".to_string()))?;

        Ok(Self {
            window,
            document,
            state: Rc::new(RefCell::new(WebState {
                form_factor,
                ..WebState::default()
            })),
        })
    }

    /// Record the active view and queue a notification
    pub fn set_active_view(&self, view: Option<Element>) {
        self.state.borrow_mut().active_view = view;
        self.push(HostEvent::ActiveViewChanged);
    }

    pub fn set_settings_open(&self, open: bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.settings_open != open;
            state.settings_open = open;
            changed
        };
        if changed {
            self.push(if open {
                HostEvent::SettingsOpened
            } else {
                HostEvent::SettingsClosed
            });
        }
    }

    pub fn layout_changed(&self) {
        self.push(HostEvent::LayoutChanged);
    }

    /// Drain queued notifications
    pub fn take_events(&self) -> Vec<HostEvent> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    /// Install the callback run whenever an event is queued
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        self.state.borrow_mut().waker = Some(Rc::new(waker));
    }

    pub fn clear_waker(&self) {
        self.state.borrow_mut().waker = None;
    }

    fn push(&self, event: HostEvent) {
        push_event(&self.state, event);
    }

    fn body(&self) -> Result<HtmlElement> {
        self.document
            .body()
            .ok_or_else(|| PlatformError::Unavailable("document body".to_string()))
    }

    fn scrolling_element(&self) -> Option<Element> {
        self.document
            .scrolling_element()
            .or_else(|| self.document.document_element())
    }

    fn resolve_target(&self, target: &ScrollTarget<Element>) -> Result<Element> {
        match target {
            ScrollTarget::Element(element) => {
                ensure_connected(element)?;
                Ok(element.clone())
            }
            ScrollTarget::Document => self
                .scrolling_element()
                .ok_or_else(|| PlatformError::Unavailable("scrolling element".to_string())),
        }
    }
}

fn push_event(state: &Rc<RefCell<WebState>>, event: HostEvent) {
    let waker = {
        let mut state = state.borrow_mut();
        state.events.push_back(event);
        state.waker.clone()
    };
    if let Some(waker) = waker {
        waker();
    }
}

fn ensure_connected(element: &Element) -> Result<()> {
    if element.is_connected() {
        Ok(())
    } else {
        Err(PlatformError::Detached(element.class_name()))
    }
}

/// Inline style of an HTML or SVG element
fn inline_style(element: &Element) -> Result<CssStyleDeclaration> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        return Ok(html.style());
    }
    if let Some(svg) = element.dyn_ref::<web_sys::SvgElement>() {
        return Ok(svg.style());
    }
    Err(PlatformError::Dom(format!(
        "<{}> has no inline style",
        element.tag_name().to_lowercase()
    )))
}

fn js_error(context: &str, err: wasm_bindgen::JsValue) -> PlatformError {
    PlatformError::Dom(format!("{}: {:?}", context, err))
}

impl Host for WebHost {
    type Element = Element;
    type Subscription = EventListener;

    fn form_factor(&self) -> FormFactor {
        self.state.borrow().form_factor
    }

    fn settings_open(&self) -> bool {
        self.state.borrow().settings_open
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: std::result::Result<wasm_bindgen::JsValue, _>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or_default()
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn active_view(&self) -> Option<Element> {
        self.state
            .borrow()
            .active_view
            .clone()
            .filter(|view| view.is_connected())
    }

    fn query_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        let list = match found {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("selector `{}` rejected: {:?}", selector, err);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn bounding_rect(&self, element: &Element) -> Result<Rect> {
        ensure_connected(element)?;
        let rect = element.get_bounding_client_rect();
        Ok(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn is_rendered(&self, element: &Element) -> bool {
        if !element.is_connected() {
            return false;
        }
        match element.dyn_ref::<HtmlElement>() {
            // Fixed-position elements have no offset parent even when shown
            Some(html) => html.offset_parent().is_some() || element.get_client_rects().length() > 0,
            None => element.get_client_rects().length() > 0,
        }
    }

    fn scroll_metrics(&self, element: &Element) -> Result<ScrollMetrics> {
        ensure_connected(element)?;
        Ok(ScrollMetrics {
            scroll_top: f64::from(element.scroll_top()),
            scroll_height: f64::from(element.scroll_height()),
            client_height: f64::from(element.client_height()),
        })
    }

    fn computed_style(&self, element: &Element, property: &str) -> Option<String> {
        let style = self.window.get_computed_style(element).ok()??;
        let value = style.get_property_value(property).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn element_from_point(&self, point: Point) -> Option<Element> {
        self.document
            .element_from_point(point.x as f32, point.y as f32)
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn describe(&self, element: &Element) -> String {
        element.class_name()
    }

    fn scroll_to_top(
        &self,
        target: &ScrollTarget<Element>,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(match behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });

        match target {
            ScrollTarget::Element(element) => {
                ensure_connected(element)?;
                element.scroll_to_with_scroll_to_options(&options);
            }
            ScrollTarget::Document => self.window.scroll_to_with_scroll_to_options(&options),
        }
        Ok(())
    }

    fn set_scroll_top(&self, target: &ScrollTarget<Element>, offset: f64) -> Result<()> {
        let element = self.resolve_target(target)?;
        element.set_scroll_top(offset.round() as i32);
        if matches!(target, ScrollTarget::Document) {
            if let Ok(body) = self.body() {
                body.set_scroll_top(offset.round() as i32);
            }
        }
        Ok(())
    }

    fn create_control(&self, markup: &ControlMarkup) -> Result<Element> {
        let button = self
            .document
            .create_element("button")
            .map_err(|err| js_error("create button", err))?;
        button.set_class_name(markup.class_name);
        button
            .set_attribute("title", markup.title)
            .and_then(|()| button.set_attribute("aria-label", markup.title))
            .map_err(|err| js_error("set control attributes", err))?;
        button.set_inner_html(markup.icon_svg);

        self.body()?
            .append_child(&button)
            .map_err(|err| js_error("append control", err))?;
        Ok(button)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) -> Result<()> {
        inline_style(element)?
            .set_property(property, value)
            .map_err(|_| PlatformError::StyleRejected {
                property: property.to_string(),
                value: value.to_string(),
            })
    }

    fn set_style_important(&self, element: &Element, property: &str, value: &str) -> Result<()> {
        inline_style(element)?
            .set_property_with_priority(property, value, "important")
            .map_err(|_| PlatformError::StyleRejected {
                property: property.to_string(),
                value: value.to_string(),
            })
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn subscribe(&self, element: &Element, kind: ListenKind) -> Result<EventListener> {
        ensure_connected(element)?;
        let state = Rc::downgrade(&self.state);
        let event = HostEvent::from(kind);
        Ok(EventListener::new(element, kind.dom_event(), move |_| {
            if let Some(state) = state.upgrade() {
                push_event(&state, event);
            }
        }))
    }
}
