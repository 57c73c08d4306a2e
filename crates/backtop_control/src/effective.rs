//! Effective settings for one activation or refresh.
//!
//! Merges the persisted settings for the current form factor with whatever
//! the companion control detection produced. The result is always fully
//! populated: anything detection did not supply comes from the settings.

use backtop_platform::{FormFactor, Rect};
use serde::Serialize;

use crate::settings::{BacktopSettings, CssColor, Length};

/// Geometry mirrored from a located companion control
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub size: Length,
    pub bottom_offset: Length,
    pub right_offset: Length,
    /// Bounding box of the companion control when it was located
    pub source_rect: Rect,
    /// Class list of the companion control
    pub class_name: String,
}

/// Colors resolved from the companion control's computed style
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background_color: CssColor,
    pub text_color: CssColor,
    pub opacity: f64,
}

/// Fully resolved presentation values
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub form_factor: FormFactor,
    pub scroll_threshold: f64,
    pub show_on_load: bool,
    pub size: Length,
    /// Size of the arrow icon inside the control
    pub icon_size: Length,
    pub bottom_offset: Length,
    pub right_offset: Length,
    pub background_color: CssColor,
    pub text_color: CssColor,
    /// Opacity of the control while shown
    pub opacity: f64,
    /// Geometry came from detection rather than settings
    pub detected_geometry: bool,
    /// Colors came from the host theme rather than settings
    pub themed_colors: bool,
}

impl EffectiveSettings {
    /// Resolve the values to present.
    ///
    /// Detection and theme colors only apply on touch hosts, and only while
    /// their settings gate (`autoAdaptMobile`, `useMobileThemeColors`) is on.
    pub fn resolve(
        settings: &BacktopSettings,
        form_factor: FormFactor,
        detection: Option<&DetectionResult>,
        colors: Option<&ThemeColors>,
    ) -> Self {
        if !form_factor.is_touch() {
            return Self {
                form_factor,
                scroll_threshold: settings.scroll_threshold,
                show_on_load: settings.show_on_load,
                size: settings.button_size,
                icon_size: settings.font_size,
                bottom_offset: settings.bottom_position,
                right_offset: settings.right_position,
                background_color: settings.button_color.clone(),
                text_color: settings.text_color.clone(),
                opacity: settings.button_opacity,
                detected_geometry: false,
                themed_colors: false,
            };
        }

        let detection = detection.filter(|_| settings.auto_adapt_mobile);
        let colors = colors.filter(|_| settings.use_mobile_theme_colors);

        let (size, bottom_offset, right_offset) = match detection {
            Some(found) => (found.size, found.bottom_offset, found.right_offset),
            None => (
                settings.mobile_button_size,
                settings.mobile_bottom_position,
                settings.mobile_right_position,
            ),
        };

        let (background_color, text_color, opacity) = match colors {
            Some(theme) => (
                theme.background_color.clone(),
                theme.text_color.clone(),
                theme.opacity,
            ),
            None => (
                settings.mobile_button_color.clone(),
                settings.mobile_text_color.clone(),
                settings.button_opacity,
            ),
        };

        Self {
            form_factor,
            scroll_threshold: settings.scroll_threshold,
            show_on_load: settings.show_on_load,
            size,
            icon_size: settings.mobile_font_size,
            bottom_offset,
            right_offset,
            background_color,
            text_color,
            opacity,
            detected_geometry: detection.is_some(),
            themed_colors: colors.is_some(),
        }
    }
}
