//! Read-only state for diagnostic displays.

use std::time::Duration;

use backtop_platform::FormFactor;
use serde::Serialize;

use crate::effective::{DetectionResult, EffectiveSettings};
use crate::settings::{CssColor, Length};
use crate::visibility::{ScrollState, VisibilityMode};

/// What the control last applied, and where it came from
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSnapshot {
    pub form_factor: FormFactor,
    pub size: Length,
    pub icon_size: Length,
    pub bottom_offset: Length,
    pub right_offset: Length,
    pub background_color: CssColor,
    pub text_color: CssColor,
    pub opacity: f64,
    pub scroll_threshold: f64,
    /// Companion control the geometry was mirrored from
    pub detection: Option<DetectionResult>,
    pub themed_colors: bool,
    /// Clock time the settings were applied, in milliseconds
    pub captured_at_ms: u64,
    pub mode: VisibilityMode,
    pub last_scroll: Option<ScrollState>,
    /// Description of the tracked surface at the last check
    pub surface: Option<String>,
}

impl DetectionSnapshot {
    pub fn capture(
        effective: &EffectiveSettings,
        detection: Option<DetectionResult>,
        captured_at: Duration,
    ) -> Self {
        Self {
            form_factor: effective.form_factor,
            size: effective.size,
            icon_size: effective.icon_size,
            bottom_offset: effective.bottom_offset,
            right_offset: effective.right_offset,
            background_color: effective.background_color.clone(),
            text_color: effective.text_color.clone(),
            opacity: effective.opacity,
            scroll_threshold: effective.scroll_threshold,
            detection: detection.filter(|_| effective.detected_geometry),
            themed_colors: effective.themed_colors,
            captured_at_ms: captured_at.as_millis() as u64,
            mode: VisibilityMode::Normal,
            last_scroll: None,
            surface: None,
        }
    }

    /// Pretty JSON for display. `None` (logged) if serialization fails.
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string_pretty(self) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::error!("failed to serialize detection snapshot: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BacktopSettings;

    #[test]
    fn desktop_snapshot_serializes() {
        let settings = BacktopSettings::default();
        let effective = EffectiveSettings::resolve(&settings, FormFactor::Desktop, None, None);
        let snapshot = DetectionSnapshot::capture(&effective, None, Duration::from_millis(1250));

        let json = snapshot.to_json().expect("snapshot serializes");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["capturedAtMs"], 1250);
        assert_eq!(value["bottomOffset"], "50px");
        assert!(value["detection"].is_null());
    }
}
