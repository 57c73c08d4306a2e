//! Scenario definition for headless replays.
//!
//! A scenario describes a document (a tree of nodes with geometry, scroll
//! extents and computed styles), the settings to run with, and a list of
//! steps mixing host input, elapsed time and assertions.

use anyhow::{Context, Result};
use backtop_control::BacktopSettings;
use backtop_platform::headless::ElementSpec;
use backtop_platform::{FormFactor, Rect, Viewport};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A scripted headless run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub form_factor: FormFactor,
    #[serde(default)]
    pub settings: BacktopSettings,
    /// Nodes appended under the document body
    #[serde(default)]
    pub document: Vec<NodeSpec>,
    /// Id of the node that is the active view when the run starts
    #[serde(default)]
    pub active_view: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(input)?;
        scenario
            .settings
            .validate()
            .context("Scenario settings are invalid")?;
        Ok(scenario)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// One node of the scripted document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Name steps use to refer to this node
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Space-separated class list
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub scroll: Option<ScrollExtent>,
    #[serde(default = "default_true")]
    pub rendered: bool,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

fn default_true() -> bool {
    true
}

/// Content and visible extents of a scroll container
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollExtent {
    pub scroll_height: f64,
    pub client_height: f64,
}

impl NodeSpec {
    /// Element description for the headless document, without children
    pub fn element(&self) -> ElementSpec {
        let mut spec = ElementSpec::new(self.tag.as_str())
            .class(&self.class)
            .rendered(self.rendered)
            .z_index(self.z_index);
        if let Some(rect) = self.rect {
            spec = spec.rect(rect);
        }
        if let Some(extent) = self.scroll {
            spec = spec.scrollable(extent.scroll_height, extent.client_height);
        }
        for (name, value) in &self.attrs {
            spec = spec.attr(name.as_str(), value.as_str());
        }
        for (property, value) in &self.computed {
            spec = spec.computed(property.as_str(), value.as_str());
        }
        spec
    }
}

/// Scenario steps
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Schedule the first activation after the settle delay
    Start,
    Activate,
    RefreshAppearance,
    /// Let virtual time pass, firing timers at their deadlines
    Wait {
        ms: u64,
    },
    /// User scroll of a container
    Scroll {
        target: String,
        offset: f64,
    },
    Click,
    PointerEnter,
    PointerLeave,
    SwitchView {
        #[serde(default)]
        view: Option<String>,
    },
    LayoutChanged,
    SettingsOpen {
        open: bool,
    },
    /// Replace the settings with a host JSON blob
    UpdateSettings {
        settings: serde_json::Value,
    },
    Append {
        #[serde(default)]
        parent: Option<String>,
        node: NodeSpec,
    },
    Detach {
        target: String,
    },
    ScrollToTop,
    Teardown,
    AssertActive {
        active: bool,
    },
    AssertVisible {
        visible: bool,
    },
    AssertStyle {
        property: String,
        value: String,
    },
    AssertScrollTop {
        target: String,
        value: f64,
    },
}

impl ScenarioStep {
    /// Name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::Start => "start",
            ScenarioStep::Activate => "activate",
            ScenarioStep::RefreshAppearance => "refresh_appearance",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Scroll { .. } => "scroll",
            ScenarioStep::Click => "click",
            ScenarioStep::PointerEnter => "pointer_enter",
            ScenarioStep::PointerLeave => "pointer_leave",
            ScenarioStep::SwitchView { .. } => "switch_view",
            ScenarioStep::LayoutChanged => "layout_changed",
            ScenarioStep::SettingsOpen { .. } => "settings_open",
            ScenarioStep::UpdateSettings { .. } => "update_settings",
            ScenarioStep::Append { .. } => "append",
            ScenarioStep::Detach { .. } => "detach",
            ScenarioStep::ScrollToTop => "scroll_to_top",
            ScenarioStep::Teardown => "teardown",
            ScenarioStep::AssertActive { .. } => "assert_active",
            ScenarioStep::AssertVisible { .. } => "assert_visible",
            ScenarioStep::AssertStyle { .. } => "assert_style",
            ScenarioStep::AssertScrollTop { .. } => "assert_scroll_top",
        }
    }

    pub fn is_assertion(&self) -> bool {
        self.name().starts_with("assert_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_document_and_steps() {
        let scenario = Scenario::from_json(
            r#"{
                "formFactor": "touch",
                "viewport": { "width": 390, "height": 844 },
                "settings": { "scrollThreshold": 120 },
                "activeView": "view",
                "document": [{
                    "id": "view",
                    "class": "workspace-leaf-content",
                    "children": [{
                        "id": "editor",
                        "class": "cm-scroller",
                        "rect": { "left": 0, "top": 48, "width": 390, "height": 700 },
                        "scroll": { "scrollHeight": 6000, "clientHeight": 700 }
                    }]
                }],
                "steps": [
                    { "type": "activate" },
                    { "type": "scroll", "target": "editor", "offset": 400 },
                    { "type": "wait", "ms": 500 },
                    { "type": "assert_visible", "visible": true }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.form_factor, FormFactor::Touch);
        assert_eq!(scenario.viewport, Viewport::new(390.0, 844.0));
        assert_eq!(scenario.settings.scroll_threshold, 120.0);
        assert_eq!(scenario.settings.button_opacity, 0.8);

        let editor = &scenario.document[0].children[0];
        assert_eq!(editor.tag, "div");
        assert!(editor.rendered);
        assert_eq!(editor.scroll.unwrap().scroll_height, 6000.0);

        assert_eq!(scenario.steps.len(), 4);
        assert!(matches!(
            scenario.steps[1],
            ScenarioStep::Scroll { ref target, offset } if target == "editor" && offset == 400.0
        ));
        assert!(scenario.steps[3].is_assertion());
        assert!(!scenario.steps[2].is_assertion());
    }

    #[test]
    fn rejects_invalid_settings() {
        let err = Scenario::from_json(r#"{ "settings": { "buttonOpacity": 2 }, "steps": [] }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("buttonOpacity"));
    }

    #[test]
    fn rejects_unknown_step() {
        assert!(Scenario::from_json(r#"{ "steps": [{ "type": "explode" }] }"#).is_err());
    }
}
