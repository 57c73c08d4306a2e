//! Persisted configuration.
//!
//! [`BacktopSettings`] is the flat object the host stores for the control.
//! Missing keys take their defaults and unknown keys are ignored, so both an
//! old settings blob and a hand-written TOML file load cleanly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::SettingsError;
use crate::log_level::LogLevel;

/// Unit of a CSS length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Percent,
    Vh,
    Vw,
}

impl LengthUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Em => "em",
            LengthUnit::Rem => "rem",
            LengthUnit::Percent => "%",
            LengthUnit::Vh => "vh",
            LengthUnit::Vw => "vw",
        }
    }
}

/// A CSS length such as `35px` or `2.5rem`.
///
/// Bare numbers are pixels. Serialized as its CSS text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "String")]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// Pixel value, if this length is in pixels
    pub fn as_px(&self) -> Option<f64> {
        (self.unit == LengthUnit::Px).then_some(self.value)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(text.len());
        let (number, suffix) = text.split_at(split);

        let value: f64 = number
            .parse()
            .map_err(|_| format!("`{input}` is not a CSS length"))?;
        if !value.is_finite() {
            return Err(format!("`{input}` is not a CSS length"));
        }

        let unit = match suffix.trim() {
            "" | "px" => LengthUnit::Px,
            "em" => LengthUnit::Em,
            "rem" => LengthUnit::Rem,
            "%" => LengthUnit::Percent,
            "vh" => LengthUnit::Vh,
            "vw" => LengthUnit::Vw,
            other => return Err(format!("unsupported unit `{other}` in `{input}`")),
        };

        Ok(Self { value, unit })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(value) if value.is_finite() => Ok(Length::px(value)),
            LengthRepr::Number(value) => Err(format!("{value} is not a CSS length")),
            LengthRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// An opaque CSS color value (`#007acc`, `rgb(..)`, `var(--x)`, ...)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssColor(pub String);

impl CssColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value is empty (an unset custom property resolves to "")
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Non-empty and not fully transparent
    pub fn is_visible(&self) -> bool {
        let value = self.0.trim();
        !value.is_empty() && value != "transparent" && value != "rgba(0, 0, 0, 0)"
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CssColor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Configuration for the floating control
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BacktopSettings {
    /// Pixels scrolled before the control shows
    pub scroll_threshold: f64,
    /// Show the control as soon as it is created
    pub show_on_load: bool,

    // Desktop
    pub button_size: Length,
    pub font_size: Length,
    pub bottom_position: Length,
    pub right_position: Length,
    pub button_color: CssColor,
    pub text_color: CssColor,
    /// Opacity of the shown control unless theme colors provide one
    pub button_opacity: f64,

    // Touch
    /// Mirror the companion control's size and position
    pub auto_adapt_mobile: bool,
    /// Mirror the companion control's colors
    pub use_mobile_theme_colors: bool,
    /// Gap kept above the companion control, in px
    pub mobile_button_offset: Length,
    pub mobile_button_size: Length,
    pub mobile_font_size: Length,
    pub mobile_bottom_position: Length,
    pub mobile_right_position: Length,
    pub mobile_button_color: CssColor,
    pub mobile_text_color: CssColor,

    // Logging
    pub log_level: LogLevel,
    /// Minutes before an elevated log level falls back to info; 0 disables
    pub auto_downgrade_level_minutes: u32,
}

impl Default for BacktopSettings {
    fn default() -> Self {
        Self {
            scroll_threshold: 300.0,
            show_on_load: false,
            button_size: Length::px(35.0),
            font_size: Length::px(30.0),
            bottom_position: Length::px(50.0),
            right_position: Length::px(20.0),
            button_color: CssColor::from("#007acc"),
            text_color: CssColor::from("#ffffff"),
            button_opacity: 0.8,
            auto_adapt_mobile: true,
            use_mobile_theme_colors: true,
            mobile_button_offset: Length::px(20.0),
            mobile_button_size: Length::px(40.0),
            mobile_font_size: Length::px(32.0),
            mobile_bottom_position: Length::px(120.0),
            mobile_right_position: Length::px(20.0),
            mobile_button_color: CssColor::from("#007acc"),
            mobile_text_color: CssColor::from("#ffffff"),
            log_level: LogLevel::Info,
            auto_downgrade_level_minutes: 5,
        }
    }
}

impl BacktopSettings {
    /// Check ranges that the type system does not capture
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            return Err(SettingsError::Invalid {
                field: "scrollThreshold",
                reason: format!("{} is not a non-negative number", self.scroll_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.button_opacity) {
            return Err(SettingsError::Invalid {
                field: "buttonOpacity",
                reason: format!("{} is outside 0..=1", self.button_opacity),
            });
        }
        Ok(())
    }

    /// Gap above the companion control in pixels, falling back to the
    /// default when the configured value is not a pixel length
    pub fn mobile_gap_px(&self) -> f64 {
        match self.mobile_button_offset.as_px() {
            Some(px) => px,
            None => {
                let fallback = Self::default().mobile_button_offset.value;
                tracing::warn!(
                    "mobileButtonOffset `{}` is not in px, using {}px",
                    self.mobile_button_offset,
                    fallback
                );
                fallback
            }
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(input).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(input).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Load from a `.json` file or, for any other extension, TOML
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_parsing() {
        assert_eq!("35px".parse::<Length>(), Ok(Length::px(35.0)));
        assert_eq!(" 35 ".parse::<Length>(), Ok(Length::px(35.0)));
        assert_eq!(
            "2.5rem".parse::<Length>(),
            Ok(Length {
                value: 2.5,
                unit: LengthUnit::Rem
            })
        );
        assert_eq!("50%".parse::<Length>().map(|l| l.unit), Ok(LengthUnit::Percent));
        assert!("px".parse::<Length>().is_err());
        assert!("12pt".parse::<Length>().is_err());
        assert!("".parse::<Length>().is_err());
    }

    #[test]
    fn test_length_display() {
        assert_eq!(Length::px(35.0).to_string(), "35px");
        assert_eq!(Length::px(774.5).to_string(), "774.5px");
        assert_eq!("10vh".parse::<Length>().unwrap().to_string(), "10vh");
    }

    #[test]
    fn test_color_visibility() {
        assert!(CssColor::from("#007acc").is_visible());
        assert!(!CssColor::from("rgba(0, 0, 0, 0)").is_visible());
        assert!(!CssColor::from("transparent").is_visible());
        assert!(!CssColor::from("  ").is_visible());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings = BacktopSettings::from_json_str(
            r#"{
                "scrollThreshold": 120,
                "buttonSize": 48,
                "logLevel": 6,
                "enableDebugging": true
            }"#,
        )
        .unwrap();

        assert_eq!(settings.scroll_threshold, 120.0);
        assert_eq!(settings.button_size, Length::px(48.0));
        assert_eq!(settings.log_level, LogLevel::Trace);
        assert_eq!(settings.mobile_bottom_position, Length::px(120.0));
        assert_eq!(settings.button_opacity, 0.8);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = BacktopSettings::default();
        settings.mobile_button_offset = "1.5rem".parse().unwrap();
        settings.log_level = LogLevel::Debug;

        let text = settings.to_toml_string().unwrap();
        assert!(text.contains("mobileButtonOffset"));
        assert!(text.contains("1.5rem"));
        assert_eq!(BacktopSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_json_output_uses_host_keys() {
        let json = BacktopSettings::default().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["buttonSize"], "35px");
        assert_eq!(value["logLevel"], 3);
        assert_eq!(value["autoDowngradeLevelMinutes"], 5);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            BacktopSettings::from_json_str(r#"{ "buttonOpacity": 1.5 }"#),
            Err(SettingsError::Invalid { field: "buttonOpacity", .. })
        ));
        assert!(matches!(
            BacktopSettings::from_toml_str("scrollThreshold = -1"),
            Err(SettingsError::Invalid { field: "scrollThreshold", .. })
        ));
        assert!(matches!(
            BacktopSettings::from_json_str(r#"{ "buttonSize": "big" }"#),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            BacktopSettings::from_json_str(r#"{ "logLevel": 9 }"#),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_mobile_gap_requires_px() {
        let mut settings = BacktopSettings::default();
        settings.mobile_button_offset = Length::px(32.0);
        assert_eq!(settings.mobile_gap_px(), 32.0);

        settings.mobile_button_offset = "2em".parse().unwrap();
        assert_eq!(settings.mobile_gap_px(), 20.0);
    }
}
