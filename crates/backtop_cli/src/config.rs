//! Settings file handling

use anyhow::{Context, Result};
use backtop_control::{BacktopSettings, EffectiveSettings};
use backtop_platform::FormFactor;
use serde::Serialize;
use std::path::Path;

/// Output format for rendered settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

/// Load and validate a settings file
pub fn load_settings(path: &Path) -> Result<BacktopSettings> {
    BacktopSettings::load(path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

pub fn render(settings: &BacktopSettings, format: SettingsFormat) -> Result<String> {
    let rendered = match format {
        SettingsFormat::Toml => settings.to_toml_string(),
        SettingsFormat::Json => settings.to_json_string(),
    };
    rendered.context("Failed to serialize settings")
}

/// What the control applies before any companion detection
#[derive(Serialize)]
struct EffectiveReport {
    desktop: EffectiveSettings,
    touch: EffectiveSettings,
}

/// Resolved settings for both form factors, as pretty JSON
pub fn describe_effective(settings: &BacktopSettings) -> Result<String> {
    let report = EffectiveReport {
        desktop: EffectiveSettings::resolve(settings, FormFactor::Desktop, None, None),
        touch: EffectiveSettings::resolve(settings, FormFactor::Touch, None, None),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize effective settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtop_control::Length;

    #[test]
    fn rendered_defaults_parse_back() {
        let defaults = BacktopSettings::default();

        let toml = render(&defaults, SettingsFormat::Toml).unwrap();
        assert_eq!(BacktopSettings::from_toml_str(&toml).unwrap(), defaults);

        let json = render(&defaults, SettingsFormat::Json).unwrap();
        assert!(json.contains("\"scrollThreshold\": 300.0"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_settings(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.toml"));
    }

    #[test]
    fn effective_report_covers_both_form_factors() {
        let settings = BacktopSettings {
            mobile_bottom_position: Length::px(96.0),
            ..BacktopSettings::default()
        };
        let report = describe_effective(&settings).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["desktop"]["bottomOffset"], "50px");
        assert_eq!(value["touch"]["bottomOffset"], "96px");
        assert_eq!(value["touch"]["formFactor"], "touch");
    }
}
