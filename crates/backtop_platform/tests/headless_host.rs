//! Behaviour of the headless document through the `Host` trait.

use backtop_platform::headless::{ElementSpec, HeadlessHost};
use backtop_platform::{FormFactor, Host, HostEvent, ListenKind, Point, Rect, Viewport};

fn mobile_workspace() -> (HeadlessHost, backtop_platform::headless::NodeId) {
    let host = HeadlessHost::new(Viewport::new(390.0, 844.0), FormFactor::Touch);
    let actions = host.append(host.body(), ElementSpec::new("div").class("view-actions"));
    // Zero-size duplicate rendered off screen
    host.append(
        actions,
        ElementSpec::new("button")
            .class("view-action clickable-icon")
            .attr("aria-label", "Current view: reading"),
    );
    let live = host.append(
        actions,
        ElementSpec::new("button")
            .class("view-action clickable-icon")
            .attr("aria-label", "Current view: editing")
            .rect(Rect::new(320.0, 700.0, 48.0, 48.0)),
    );
    (host, live)
}

#[test]
fn attribute_substring_selector_matches_both_duplicates() {
    let (host, live) = mobile_workspace();
    let found = host.query_all(None, r#".view-actions .view-action[aria-label*="Current view"]"#);
    assert_eq!(found.len(), 2);
    assert_eq!(found[1], live);

    let sized: Vec<_> = found
        .into_iter()
        .filter(|el| host.bounding_rect(el).map(|r| r.has_area()).unwrap_or(false))
        .collect();
    assert_eq!(sized, vec![live]);
}

#[test]
fn computed_style_prefers_inline_values() {
    let (host, live) = mobile_workspace();
    host.set_computed(live, "background-color", "rgb(10, 20, 30)");
    host.set_computed(live, "--interactive-accent", "#7f6df2");

    assert_eq!(
        host.computed_style(&live, "background-color").as_deref(),
        Some("rgb(10, 20, 30)")
    );
    host.set_style(&live, "background-color", "red").unwrap();
    assert_eq!(host.computed_style(&live, "background-color").as_deref(), Some("red"));
    assert_eq!(host.computed_style(&live, "color"), None);
}

#[test]
fn detached_nodes_report_errors() {
    let (host, live) = mobile_workspace();
    host.detach(live);

    assert!(host.bounding_rect(&live).is_err());
    assert!(host.scroll_metrics(&live).is_err());
    assert!(host.subscribe(&live, ListenKind::Click).is_err());
    assert!(!host.is_rendered(&live));
}

#[test]
fn overlay_covers_companion_control() {
    let (host, live) = mobile_workspace();
    let point = Point::new(340.0, 724.0);
    assert_eq!(host.element_from_point(point), Some(live));

    let keyboard = host.append(
        host.body(),
        ElementSpec::new("div")
            .class("keyboard")
            .rect(Rect::new(0.0, 500.0, 390.0, 344.0)),
    );
    assert_eq!(host.element_from_point(point), Some(keyboard));
    assert!(!host.contains(&live, &keyboard));

    host.set_rendered(keyboard, false);
    assert_eq!(host.element_from_point(point), Some(live));
}

#[test]
fn notifications_are_queued_in_order() {
    let (host, live) = mobile_workspace();
    let _click = host.subscribe(&live, ListenKind::Click).unwrap();

    host.switch_view(None);
    host.click(live);
    host.set_settings_open(true);
    host.set_settings_open(true);
    host.set_settings_open(false);
    host.layout_changed();

    assert_eq!(
        host.take_events(),
        vec![
            HostEvent::ActiveViewChanged,
            HostEvent::Click,
            HostEvent::SettingsOpened,
            HostEvent::SettingsClosed,
            HostEvent::LayoutChanged,
        ]
    );
    assert!(host.take_events().is_empty());
}
