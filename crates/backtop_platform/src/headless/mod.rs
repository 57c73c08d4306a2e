//! Headless document for testing.
//!
//! Provides an in-memory [`Host`] so the floating control can be exercised
//! without a browser, useful for:
//! - Unit and integration testing of the presenter
//! - Replaying scripted scenarios from the CLI
//!
//! The document is a tree of nodes with explicit layout boxes, scroll
//! extents and computed styles. Events raised by simulated input (or by the
//! control's own scrolling) are queued and drained by the caller, mirroring
//! how a browser delivers them asynchronously.
//!
//! # Example
//!
//! ```rust
//! use backtop_platform::headless::{ElementSpec, HeadlessHost};
//! use backtop_platform::{FormFactor, Host, Rect, Viewport};
//!
//! let host = HeadlessHost::new(Viewport::new(390.0, 844.0), FormFactor::Touch);
//! let view = host.append(host.body(), ElementSpec::new("div").class("workspace-leaf-content"));
//! let preview = host.append(
//!     view,
//!     ElementSpec::new("div")
//!         .class("markdown-preview-view")
//!         .rect(Rect::new(0.0, 0.0, 390.0, 700.0))
//!         .scrollable(4000.0, 700.0),
//! );
//! host.set_active_view(Some(view));
//!
//! assert_eq!(host.query(Some(&view), ".markdown-preview-view"), Some(preview));
//! ```

mod selector;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};

use crate::error::{PlatformError, Result};
use crate::event::{HostEvent, ListenKind};
use crate::geometry::{Point, Rect, ScrollMetrics, Viewport};
use crate::host::{ControlMarkup, FormFactor, Host, ScrollBehavior, ScrollTarget};
use selector::SelectorList;

new_key_type! {
    /// Handle to a node in the headless document
    pub struct NodeId;
    struct ListenerId;
}

/// How the headless document reacts to smooth scroll requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothScroll {
    /// Jump straight to the destination, raising one scroll event
    #[default]
    Instant,
    /// Record the request but do not move (unsupported or interrupted)
    Ignored,
}

/// A node in the headless document
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) tag: String,
    pub(crate) classes: Vec<String>,
    attributes: FxHashMap<String, String>,
    pub(crate) parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Rect,
    rendered: bool,
    scroll: ScrollMetrics,
    z_index: i32,
    computed: FxHashMap<String, String>,
    inline: FxHashMap<String, String>,
}

impl Node {
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.attributes.get(name).map(String::as_str)
    }
}

/// Declarative description of a node to append
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    rect: Rect,
    rendered: bool,
    scroll: ScrollMetrics,
    z_index: i32,
    computed: Vec<(String, String)>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attributes: Vec::new(),
            rect: Rect::default(),
            rendered: true,
            scroll: ScrollMetrics::default(),
            z_index: 0,
            computed: Vec::new(),
        }
    }

    /// Add one or more space-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Content and visible extents of a scroll container
    pub fn scrollable(mut self, scroll_height: f64, client_height: f64) -> Self {
        self.scroll = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height,
            client_height,
        };
        self
    }

    /// Laid out (`true`) or `display: none` (`false`)
    pub fn rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Resolved style value reported by `computed_style`
    pub fn computed(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.computed.push((property.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    node: NodeId,
    kind: ListenKind,
}

#[derive(Debug)]
struct HeadlessDom {
    nodes: SlotMap<NodeId, Node>,
    body: NodeId,
    viewport: Viewport,
    form_factor: FormFactor,
    settings_open: bool,
    active_view: Option<NodeId>,
    listeners: SlotMap<ListenerId, Listener>,
    events: VecDeque<HostEvent>,
    smooth_scroll: SmoothScroll,
    smooth_requests: u32,
    document_scroll: ScrollMetrics,
    rejected_styles: FxHashSet<String>,
    style_writes: u64,
}

impl HeadlessDom {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| PlatformError::Detached(format!("{id:?}")))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| PlatformError::Detached(format!("{id:?}")))
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: ElementSpec) -> NodeId {
        let node = Node {
            tag: spec.tag,
            classes: spec.classes,
            attributes: spec.attributes.into_iter().collect(),
            parent,
            children: Vec::new(),
            rect: spec.rect,
            rendered: spec.rendered,
            scroll: spec.scroll,
            z_index: spec.z_index,
            computed: spec.computed.into_iter().collect(),
            inline: FxHashMap::default(),
        };
        let id = self.nodes.insert(node);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    /// Descendants of `root` in document (pre-)order, excluding `root`
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_rendered(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current) else {
                return false;
            };
            if !node.rendered {
                return false;
            }
            if current == self.body {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent);
        }
        false
    }

    fn emit(&mut self, node: NodeId, kind: ListenKind) {
        let count = self
            .listeners
            .values()
            .filter(|l| l.node == node && l.kind == kind)
            .count();
        for _ in 0..count {
            self.events.push_back(kind.into());
        }
    }

    fn write_scroll_top(&mut self, target: &ScrollTarget<NodeId>, offset: f64) -> Result<()> {
        let (metrics, node) = match target {
            ScrollTarget::Element(id) => (&mut self.node_mut(*id)?.scroll, Some(*id)),
            ScrollTarget::Document => (&mut self.document_scroll, None),
        };
        let max = (metrics.scroll_height - metrics.client_height).max(0.0);
        let clamped = offset.clamp(0.0, max);
        if metrics.scroll_top == clamped {
            return Ok(());
        }
        metrics.scroll_top = clamped;
        if let Some(node) = node {
            self.emit(node, ListenKind::Scroll);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let subtree = {
            let mut ids = self.descendants(id);
            ids.push(id);
            ids
        };
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        for node in subtree {
            self.nodes.remove(node);
        }
        if self.active_view.is_some_and(|view| !self.nodes.contains_key(view)) {
            self.active_view = None;
        }
    }
}

/// An in-memory document implementing [`Host`].
///
/// Clones share the same document.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    dom: Rc<RefCell<HeadlessDom>>,
}

/// Keeps a headless listener registered until dropped
#[derive(Debug)]
pub struct HeadlessSubscription {
    id: ListenerId,
    dom: Weak<RefCell<HeadlessDom>>,
}

impl Drop for HeadlessSubscription {
    fn drop(&mut self) {
        if let Some(dom) = self.dom.upgrade() {
            if let Ok(mut dom) = dom.try_borrow_mut() {
                dom.listeners.remove(self.id);
            }
        }
    }
}

impl HeadlessHost {
    /// Create an empty document with a `body` element filling the viewport.
    pub fn new(viewport: Viewport, form_factor: FormFactor) -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Node {
            tag: "body".to_string(),
            classes: Vec::new(),
            attributes: FxHashMap::default(),
            parent: None,
            children: Vec::new(),
            rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
            rendered: true,
            scroll: ScrollMetrics::default(),
            z_index: 0,
            computed: FxHashMap::default(),
            inline: FxHashMap::default(),
        });

        let dom = HeadlessDom {
            nodes,
            body,
            viewport,
            form_factor,
            settings_open: false,
            active_view: None,
            listeners: SlotMap::with_key(),
            events: VecDeque::new(),
            smooth_scroll: SmoothScroll::default(),
            smooth_requests: 0,
            document_scroll: ScrollMetrics {
                scroll_top: 0.0,
                scroll_height: viewport.height,
                client_height: viewport.height,
            },
            rejected_styles: FxHashSet::default(),
            style_writes: 0,
        };

        Self {
            dom: Rc::new(RefCell::new(dom)),
        }
    }

    // =========================================================================
    // Document construction
    // =========================================================================

    pub fn body(&self) -> NodeId {
        self.dom.borrow().body
    }

    /// Append a new node under `parent`
    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        self.dom.borrow_mut().insert(Some(parent), spec)
    }

    /// Remove a node and its subtree from the document
    pub fn detach(&self, node: NodeId) {
        self.dom.borrow_mut().detach(node);
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.dom.borrow().nodes.contains_key(node)
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        if let Some(node) = self.dom.borrow_mut().nodes.get_mut(node) {
            node.rect = rect;
        }
    }

    pub fn set_rendered(&self, node: NodeId, rendered: bool) {
        if let Some(node) = self.dom.borrow_mut().nodes.get_mut(node) {
            node.rendered = rendered;
        }
    }

    pub fn set_scroll_extent(&self, node: NodeId, scroll_height: f64, client_height: f64) {
        if let Some(node) = self.dom.borrow_mut().nodes.get_mut(node) {
            node.scroll.scroll_height = scroll_height;
            node.scroll.client_height = client_height;
        }
    }

    pub fn set_computed(&self, node: NodeId, property: &str, value: &str) {
        if let Some(node) = self.dom.borrow_mut().nodes.get_mut(node) {
            node.computed.insert(property.to_string(), value.to_string());
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.dom.borrow_mut().viewport = viewport;
    }

    pub fn set_form_factor(&self, form_factor: FormFactor) {
        self.dom.borrow_mut().form_factor = form_factor;
    }

    pub fn set_smooth_scroll(&self, mode: SmoothScroll) {
        self.dom.borrow_mut().smooth_scroll = mode;
    }

    /// Make `set_style` fail for `property`, simulating a throwing host
    pub fn reject_style(&self, property: &str) {
        self.dom
            .borrow_mut()
            .rejected_styles
            .insert(property.to_string());
    }

    /// Set the active view without notifying
    pub fn set_active_view(&self, view: Option<NodeId>) {
        self.dom.borrow_mut().active_view = view;
    }

    // =========================================================================
    // Simulated input
    // =========================================================================

    /// User scroll of a container to an absolute offset
    pub fn scroll_to(&self, node: NodeId, offset: f64) {
        // Detached targets are ignored, like scrolling a removed element
        let _ = self
            .dom
            .borrow_mut()
            .write_scroll_top(&ScrollTarget::Element(node), offset);
    }

    pub fn pointer_enter(&self, node: NodeId) {
        self.dom.borrow_mut().emit(node, ListenKind::PointerEnter);
    }

    pub fn pointer_leave(&self, node: NodeId) {
        self.dom.borrow_mut().emit(node, ListenKind::PointerLeave);
    }

    pub fn click(&self, node: NodeId) {
        self.dom.borrow_mut().emit(node, ListenKind::Click);
    }

    /// Switch the active view and queue the notification
    pub fn switch_view(&self, view: Option<NodeId>) {
        let mut dom = self.dom.borrow_mut();
        dom.active_view = view;
        dom.events.push_back(HostEvent::ActiveViewChanged);
    }

    pub fn layout_changed(&self) {
        self.dom.borrow_mut().events.push_back(HostEvent::LayoutChanged);
    }

    pub fn set_settings_open(&self, open: bool) {
        let mut dom = self.dom.borrow_mut();
        if dom.settings_open == open {
            return;
        }
        dom.settings_open = open;
        dom.events.push_back(if open {
            HostEvent::SettingsOpened
        } else {
            HostEvent::SettingsClosed
        });
    }

    /// Drain queued events in delivery order
    pub fn take_events(&self) -> Vec<HostEvent> {
        self.dom.borrow_mut().events.drain(..).collect()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn scroll_top(&self, node: NodeId) -> Option<f64> {
        self.dom.borrow().nodes.get(node).map(|n| n.scroll.scroll_top)
    }

    pub fn document_scroll_top(&self) -> f64 {
        self.dom.borrow().document_scroll.scroll_top
    }

    /// Inline style written through [`Host::set_style`]
    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.dom
            .borrow()
            .nodes
            .get(node)
            .and_then(|n| n.inline.get(property).cloned())
    }

    /// Nodes carrying `class`, anywhere in the document
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let dom = self.dom.borrow();
        dom.descendants(dom.body)
            .into_iter()
            .filter(|id| dom.nodes[*id].classes.iter().any(|c| c == class))
            .collect()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.dom
            .borrow()
            .nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Number of live listeners (leak checks)
    pub fn listener_count(&self) -> usize {
        self.dom.borrow().listeners.len()
    }

    pub fn smooth_scroll_requests(&self) -> u32 {
        self.dom.borrow().smooth_requests
    }

    pub fn style_writes(&self) -> u64 {
        self.dom.borrow().style_writes
    }
}

impl Host for HeadlessHost {
    type Element = NodeId;
    type Subscription = HeadlessSubscription;

    fn form_factor(&self) -> FormFactor {
        self.dom.borrow().form_factor
    }

    fn settings_open(&self) -> bool {
        self.dom.borrow().settings_open
    }

    fn viewport(&self) -> Viewport {
        self.dom.borrow().viewport
    }

    fn active_view(&self) -> Option<NodeId> {
        let dom = self.dom.borrow();
        dom.active_view.filter(|view| dom.nodes.contains_key(*view))
    }

    fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
        let selectors = match SelectorList::parse(selector) {
            Ok(selectors) => selectors,
            Err(err) => {
                tracing::warn!("headless: rejecting selector: {}", err);
                return Vec::new();
            }
        };
        let dom = self.dom.borrow();
        let root = scope.copied().unwrap_or(dom.body);
        dom.descendants(root)
            .into_iter()
            .filter(|id| selectors.matches(&dom.nodes, *id))
            .collect()
    }

    fn bounding_rect(&self, element: &NodeId) -> Result<Rect> {
        let dom = self.dom.borrow();
        let node = dom.node(*element)?;
        // Nodes that are not laid out report an empty box
        if dom.is_rendered(*element) {
            Ok(node.rect)
        } else {
            Ok(Rect::default())
        }
    }

    fn is_rendered(&self, element: &NodeId) -> bool {
        self.dom.borrow().is_rendered(*element)
    }

    fn scroll_metrics(&self, element: &NodeId) -> Result<ScrollMetrics> {
        Ok(self.dom.borrow().node(*element)?.scroll)
    }

    fn computed_style(&self, element: &NodeId, property: &str) -> Option<String> {
        let dom = self.dom.borrow();
        let node = dom.nodes.get(*element)?;
        node.inline
            .get(property)
            .or_else(|| node.computed.get(property))
            .cloned()
    }

    fn element_from_point(&self, point: Point) -> Option<NodeId> {
        let dom = self.dom.borrow();
        dom.descendants(dom.body)
            .into_iter()
            .enumerate()
            .filter(|(_, id)| dom.is_rendered(*id))
            .filter(|(_, id)| {
                let node = &dom.nodes[*id];
                node.rect.has_area() && node.rect.contains(point)
            })
            .max_by_key(|(order, id)| (dom.nodes[*id].z_index, *order))
            .map(|(_, id)| id)
            .or(Some(dom.body))
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.dom.borrow().contains(*ancestor, *node)
    }

    fn describe(&self, element: &NodeId) -> String {
        self.dom
            .borrow()
            .nodes
            .get(*element)
            .map(|n| n.classes.join(" "))
            .unwrap_or_default()
    }

    fn scroll_to_top(&self, target: &ScrollTarget<NodeId>, behavior: ScrollBehavior) -> Result<()> {
        let mut dom = self.dom.borrow_mut();
        if behavior == ScrollBehavior::Smooth {
            dom.smooth_requests += 1;
            if dom.smooth_scroll == SmoothScroll::Ignored {
                if let ScrollTarget::Element(id) = target {
                    dom.node(*id)?;
                }
                return Ok(());
            }
        }
        dom.write_scroll_top(target, 0.0)
    }

    fn set_scroll_top(&self, target: &ScrollTarget<NodeId>, offset: f64) -> Result<()> {
        self.dom.borrow_mut().write_scroll_top(target, offset)
    }

    fn create_control(&self, markup: &ControlMarkup) -> Result<NodeId> {
        let mut dom = self.dom.borrow_mut();
        let body = dom.body;
        let button = dom.insert(
            Some(body),
            ElementSpec::new("button")
                .class(markup.class_name)
                .attr("title", markup.title)
                .attr("aria-label", markup.title)
                .z_index(999),
        );
        dom.insert(Some(button), ElementSpec::new("svg"));
        Ok(button)
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) -> Result<()> {
        let mut dom = self.dom.borrow_mut();
        if dom.rejected_styles.contains(property) {
            return Err(PlatformError::StyleRejected {
                property: property.to_string(),
                value: value.to_string(),
            });
        }
        dom.node_mut(*element)?
            .inline
            .insert(property.to_string(), value.to_string());
        dom.style_writes += 1;
        Ok(())
    }

    fn remove(&self, element: &NodeId) {
        self.dom.borrow_mut().detach(*element);
    }

    fn subscribe(&self, element: &NodeId, kind: ListenKind) -> Result<HeadlessSubscription> {
        let mut dom = self.dom.borrow_mut();
        dom.node(*element)?;
        let id = dom.listeners.insert(Listener {
            node: *element,
            kind,
        });
        Ok(HeadlessSubscription {
            id,
            dom: Rc::downgrade(&self.dom),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HeadlessHost {
        HeadlessHost::new(Viewport::new(400.0, 800.0), FormFactor::Touch)
    }

    #[test]
    fn test_query_scoped_in_document_order() {
        let host = host();
        let a = host.append(host.body(), ElementSpec::new("div").class("view"));
        let first = host.append(a, ElementSpec::new("div").class("item"));
        let b = host.append(host.body(), ElementSpec::new("div").class("view"));
        let second = host.append(b, ElementSpec::new("div").class("item"));

        assert_eq!(host.query_all(None, ".item"), vec![first, second]);
        assert_eq!(host.query_all(Some(&b), ".item"), vec![second]);
        assert_eq!(host.query_all(None, ".view .item"), vec![first, second]);
        assert!(host.query_all(None, ".missing .item").is_empty());
    }

    #[test]
    fn test_rendered_follows_ancestors() {
        let host = host();
        let hidden = host.append(host.body(), ElementSpec::new("div").rendered(false));
        let child = host.append(
            hidden,
            ElementSpec::new("div").rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
        );

        assert!(!host.is_rendered(&child));
        assert_eq!(host.bounding_rect(&child).unwrap(), Rect::default());

        host.set_rendered(hidden, true);
        assert!(host.is_rendered(&child));
    }

    #[test]
    fn test_hit_testing_prefers_z_index_then_order() {
        let host = host();
        let bar = host.append(
            host.body(),
            ElementSpec::new("div").rect(Rect::new(0.0, 700.0, 400.0, 100.0)),
        );
        let icon = host.append(
            bar,
            ElementSpec::new("span").rect(Rect::new(0.0, 700.0, 40.0, 40.0)),
        );

        assert_eq!(host.element_from_point(Point::new(20.0, 720.0)), Some(icon));
        assert_eq!(host.element_from_point(Point::new(200.0, 750.0)), Some(bar));

        let sheet = host.append(
            host.body(),
            ElementSpec::new("div")
                .rect(Rect::new(0.0, 400.0, 400.0, 400.0))
                .z_index(50),
        );
        assert_eq!(host.element_from_point(Point::new(20.0, 720.0)), Some(sheet));
        assert!(host.contains(&bar, &icon));
        assert!(!host.contains(&bar, &sheet));
    }

    #[test]
    fn test_scroll_events_follow_listeners() {
        let host = host();
        let surface = host.append(host.body(), ElementSpec::new("div").scrollable(4000.0, 700.0));

        host.scroll_to(surface, 100.0);
        assert!(host.take_events().is_empty());

        let subscription = host.subscribe(&surface, ListenKind::Scroll).unwrap();
        host.scroll_to(surface, 10_000.0);
        assert_eq!(host.take_events(), vec![HostEvent::Scroll]);
        assert_eq!(host.scroll_top(surface), Some(3300.0));

        // Writing the same offset raises nothing
        host.scroll_to(surface, 3300.0);
        assert!(host.take_events().is_empty());

        drop(subscription);
        assert_eq!(host.listener_count(), 0);
        host.scroll_to(surface, 0.0);
        assert!(host.take_events().is_empty());
    }

    #[test]
    fn test_smooth_scroll_modes() {
        let host = host();
        let surface = host.append(host.body(), ElementSpec::new("div").scrollable(4000.0, 700.0));
        let target = ScrollTarget::Element(surface);
        host.scroll_to(surface, 1000.0);

        host.set_smooth_scroll(SmoothScroll::Ignored);
        host.scroll_to_top(&target, ScrollBehavior::Smooth).unwrap();
        assert_eq!(host.scroll_top(surface), Some(1000.0));

        host.set_smooth_scroll(SmoothScroll::Instant);
        host.scroll_to_top(&target, ScrollBehavior::Smooth).unwrap();
        assert_eq!(host.scroll_top(surface), Some(0.0));
        assert_eq!(host.smooth_scroll_requests(), 2);
    }

    #[test]
    fn test_control_lifecycle() {
        let host = host();
        let markup = ControlMarkup {
            class_name: "back-to-top-btn",
            title: "Back to Top",
            icon_svg: "<svg></svg>",
        };
        let control = host.create_control(&markup).unwrap();
        assert_eq!(host.find_by_class("back-to-top-btn"), vec![control]);
        assert!(host.query(Some(&control), "svg").is_some());

        host.set_style(&control, "opacity", "0").unwrap();
        assert_eq!(host.inline_style(control, "opacity").as_deref(), Some("0"));

        host.reject_style("bottom");
        assert!(matches!(
            host.set_style(&control, "bottom", "50px"),
            Err(PlatformError::StyleRejected { .. })
        ));

        host.remove(&control);
        assert!(!host.exists(control));
        assert!(host.find_by_class("back-to-top-btn").is_empty());
        assert!(host.set_style(&control, "opacity", "1").is_err());
    }
}
