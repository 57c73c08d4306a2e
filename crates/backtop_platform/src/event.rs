//! Host notifications delivered to the presenter.

use serde::{Deserialize, Serialize};

/// Element-level events the presenter can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenKind {
    Scroll,
    PointerEnter,
    PointerLeave,
    Click,
}

impl ListenKind {
    /// DOM event name for this kind.
    pub fn dom_event(&self) -> &'static str {
        match self {
            ListenKind::Scroll => "scroll",
            ListenKind::PointerEnter => "mouseenter",
            ListenKind::PointerLeave => "mouseleave",
            ListenKind::Click => "click",
        }
    }
}

/// A notification from the host.
///
/// Element events arrive only for live subscriptions; workspace events are
/// forwarded by whoever embeds the presenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// The tracked surface scrolled.
    Scroll,
    PointerEnter,
    PointerLeave,
    Click,
    /// A different content view became active.
    ActiveViewChanged,
    /// The host rearranged its layout (pane split, mode switch).
    LayoutChanged,
    SettingsOpened,
    SettingsClosed,
}

impl From<ListenKind> for HostEvent {
    fn from(kind: ListenKind) -> Self {
        match kind {
            ListenKind::Scroll => HostEvent::Scroll,
            ListenKind::PointerEnter => HostEvent::PointerEnter,
            ListenKind::PointerLeave => HostEvent::PointerLeave,
            ListenKind::Click => HostEvent::Click,
        }
    }
}
