//! Scenario runner driving the presenter in virtual time.

use anyhow::{anyhow, bail, Context, Result};
use backtop_control::{FloatingControlPresenter, Visibility};
use backtop_core::{Clock, ManualClock};
use backtop_platform::headless::{HeadlessHost, NodeId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::report::ScenarioReport;
use crate::scenario::{NodeSpec, Scenario, ScenarioStep};

/// Run every step of a scenario.
///
/// Malformed scenarios (unknown node ids, rejected settings) are errors;
/// failed assertions end the run with a failed report.
pub fn run(scenario: &Scenario) -> Result<ScenarioReport> {
    let mut session = Session::new(scenario)?;

    for (index, step) in scenario.steps.iter().enumerate() {
        debug!("step {}: {}", index, step.name());
        if let Some(message) = session
            .step(step)
            .with_context(|| format!("Step {} ({}) failed", index, step.name()))?
        {
            return Ok(ScenarioReport::failed(
                step.name(),
                index,
                message,
                session.elapsed_ms(),
                session.snapshot(),
            ));
        }
    }

    Ok(ScenarioReport::passed(
        session.elapsed_ms(),
        session.snapshot(),
    ))
}

struct Session {
    host: HeadlessHost,
    clock: ManualClock,
    presenter: FloatingControlPresenter<HeadlessHost, ManualClock>,
    nodes: HashMap<String, NodeId>,
}

impl Session {
    fn new(scenario: &Scenario) -> Result<Self> {
        let host = HeadlessHost::new(scenario.viewport, scenario.form_factor);
        let mut nodes = HashMap::new();
        let body = host.body();
        for node in &scenario.document {
            build(&host, body, node, &mut nodes);
        }

        let clock = ManualClock::new();
        let presenter = FloatingControlPresenter::with_defaults(
            host.clone(),
            clock.clone(),
            scenario.settings.clone(),
        );
        let session = Self {
            host,
            clock,
            presenter,
            nodes,
        };

        if let Some(name) = &scenario.active_view {
            let view = session.node(name)?;
            session.host.set_active_view(Some(view));
        }
        Ok(session)
    }

    fn node(&self, name: &str) -> Result<NodeId> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Unknown node `{}`", name))
    }

    fn control(&self) -> Result<NodeId> {
        self.presenter
            .control()
            .copied()
            .ok_or_else(|| anyhow!("No control is mounted"))
    }

    fn elapsed_ms(&self) -> u64 {
        self.clock.now().as_millis() as u64
    }

    fn snapshot(&self) -> Option<backtop_control::DetectionSnapshot> {
        self.presenter.last_detection_snapshot().cloned()
    }

    /// Hand queued host events to the presenter until none are left
    fn deliver(&mut self) {
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

    fn wait(&mut self, by: Duration) {
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

    /// Run one step. `Ok(Some(message))` is a failed assertion.
    fn step(&mut self, step: &ScenarioStep) -> Result<Option<String>> {
        match step {
            ScenarioStep::Start => self.presenter.start(),
            ScenarioStep::Activate => self.presenter.activate(),
            ScenarioStep::RefreshAppearance => self.presenter.refresh_appearance(),
            ScenarioStep::Wait { ms } => self.wait(Duration::from_millis(*ms)),
            ScenarioStep::Scroll { target, offset } => {
                let node = self.node(target)?;
                self.host.scroll_to(node, *offset);
            }
            ScenarioStep::Click => {
                let control = self.control()?;
                self.host.click(control);
            }
            ScenarioStep::PointerEnter => {
                let control = self.control()?;
                self.host.pointer_enter(control);
            }
            ScenarioStep::PointerLeave => {
                let control = self.control()?;
                self.host.pointer_leave(control);
            }
            ScenarioStep::SwitchView { view } => {
                let view = view.as_deref().map(|name| self.node(name)).transpose()?;
                self.host.switch_view(view);
            }
            ScenarioStep::LayoutChanged => self.host.layout_changed(),
            ScenarioStep::SettingsOpen { open } => self.host.set_settings_open(*open),
            ScenarioStep::UpdateSettings { settings } => {
                self.presenter
                    .apply_settings_json(&settings.to_string())
                    .context("Settings were rejected")?;
            }
            ScenarioStep::Append { parent, node } => {
                let parent = match parent {
                    Some(name) => self.node(name)?,
                    None => self.host.body(),
                };
                build(&self.host, parent, node, &mut self.nodes);
            }
            ScenarioStep::Detach { target } => {
                let node = self.node(target)?;
                self.host.detach(node);
            }
            ScenarioStep::ScrollToTop => self.presenter.scroll_to_top(),
            ScenarioStep::Teardown => self.presenter.teardown(),
            ScenarioStep::AssertActive { active } => {
                let actual = self.presenter.is_active();
                return Ok((actual != *active)
                    .then(|| format!("expected active={}, got active={}", active, actual)));
            }
            ScenarioStep::AssertVisible { visible } => {
                let Some(visibility) = self.presenter.visibility() else {
                    return Ok(Some("no control is mounted".to_string()));
                };
                let expected = Visibility::from_should_show(*visible);
                return Ok((visibility != expected)
                    .then(|| format!("expected {:?}, got {:?}", expected, visibility)));
            }
            ScenarioStep::AssertStyle { property, value } => {
                let control = self.control()?;
                let actual = self.host.inline_style(control, property);
                return Ok((actual.as_deref() != Some(value.as_str())).then(|| {
                    format!(
                        "{}: expected `{}`, got `{}`",
                        property,
                        value,
                        actual.unwrap_or_default()
                    )
                }));
            }
            ScenarioStep::AssertScrollTop { target, value } => {
                let node = self.node(target)?;
                let Some(actual) = self.host.scroll_top(node) else {
                    bail!("`{}` is not in the document", target);
                };
                return Ok(((actual - value).abs() > f64::EPSILON)
                    .then(|| format!("{}: expected scrollTop {}, got {}", target, value, actual)));
            }
        }

        self.deliver();
        Ok(None)
    }
}

fn build(
    host: &HeadlessHost,
    parent: NodeId,
    spec: &NodeSpec,
    nodes: &mut HashMap<String, NodeId>,
) {
    let id = host.append(parent, spec.element());
    if let Some(name) = &spec.id {
        nodes.insert(name.clone(), id);
    }
    for child in &spec.children {
        build(host, id, child, nodes);
    }
}
