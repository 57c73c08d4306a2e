//! The host document interface.
//!
//! A [`Host`] is everything the floating control needs from the embedding
//! application: element selection, layout geometry, computed style,
//! hit testing, scrolling, a handful of mutations for the control's own
//! node, and event subscriptions. All calls are synchronous and happen on
//! the host's single UI thread.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::event::ListenKind;
use crate::geometry::{Point, Rect, ScrollMetrics, Viewport};

/// Primary input modality of the host, read once per activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    /// Pointer-primary (mouse/trackpad).
    #[default]
    Desktop,
    /// Touch-primary (phone/tablet).
    Touch,
}

impl FormFactor {
    pub fn is_touch(&self) -> bool {
        matches!(self, FormFactor::Touch)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormFactor::Desktop => "Desktop",
            FormFactor::Touch => "Mobile",
        }
    }
}

/// What a scroll operation acts on.
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollTarget<E> {
    /// A scroll container inside the document.
    Element(E),
    /// The top-level document.
    Document,
}

/// Scroll animation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Instant scroll (no animation)
    #[default]
    Auto,
    /// Smooth animated scroll
    Smooth,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollBehavior::Auto => "auto",
            ScrollBehavior::Smooth => "smooth",
        }
    }
}

/// Static markup of the floating control node.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlMarkup {
    /// Class the node is created with.
    pub class_name: &'static str,
    /// Tooltip and accessible label.
    pub title: &'static str,
    /// Inline SVG icon placed inside the button.
    pub icon_svg: &'static str,
}

/// Document access for the floating control.
pub trait Host {
    /// Handle to a document element. Cheap to clone; equality is identity.
    type Element: Clone + PartialEq + fmt::Debug;

    /// Keeps an event listener registered until dropped.
    type Subscription;

    /// Primary input modality.
    fn form_factor(&self) -> FormFactor;

    /// Whether the host's settings surface is currently open.
    fn settings_open(&self) -> bool;

    /// Current layout viewport.
    fn viewport(&self) -> Viewport;

    /// Content root of the active content view, if one is trackable.
    fn active_view(&self) -> Option<Self::Element>;

    /// All elements matching `selector` in document order, searching the
    /// descendants of `scope` or the whole document.
    fn query_all(&self, scope: Option<&Self::Element>, selector: &str) -> Vec<Self::Element>;

    /// First element matching `selector`.
    fn query(&self, scope: Option<&Self::Element>, selector: &str) -> Option<Self::Element> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Border box relative to the viewport.
    fn bounding_rect(&self, element: &Self::Element) -> Result<Rect>;

    /// Attached and laid out (not `display: none`, not detached).
    fn is_rendered(&self, element: &Self::Element) -> bool;

    /// Scroll offset and extents of a scroll container.
    fn scroll_metrics(&self, element: &Self::Element) -> Result<ScrollMetrics>;

    /// Resolved value of a CSS property or custom property (`--name`).
    /// `None` when the host cannot resolve it.
    fn computed_style(&self, element: &Self::Element, property: &str) -> Option<String>;

    /// Topmost element at a viewport point.
    fn element_from_point(&self, point: Point) -> Option<Self::Element>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;

    /// Short human-readable description (usually the class list).
    fn describe(&self, element: &Self::Element) -> String;

    /// Scroll a target to offset zero.
    fn scroll_to_top(
        &self,
        target: &ScrollTarget<Self::Element>,
        behavior: ScrollBehavior,
    ) -> Result<()>;

    /// Hard-set the scroll offset of a target.
    fn set_scroll_top(&self, target: &ScrollTarget<Self::Element>, offset: f64) -> Result<()>;

    /// Create the control node and attach it to the document body.
    fn create_control(&self, markup: &ControlMarkup) -> Result<Self::Element>;

    /// Set an inline style declaration.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str) -> Result<()>;

    /// Set an inline style declaration with `!important` priority.
    fn set_style_important(
        &self,
        element: &Self::Element,
        property: &str,
        value: &str,
    ) -> Result<()> {
        self.set_style(element, property, value)
    }

    /// Detach an element from the document.
    fn remove(&self, element: &Self::Element);

    /// Listen for `kind` on `element` until the returned subscription drops.
    fn subscribe(&self, element: &Self::Element, kind: ListenKind) -> Result<Self::Subscription>;
}
