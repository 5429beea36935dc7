//! Theme definition data model.
//!
//! Everything the chart canvas, task table and panels paint with lives in
//! [`ThemeDefinition`]. Themes are JSON with `#RRGGBB` / `#RRGGBBAA` colour
//! strings so they can be edited by hand; every section carries
//! `#[serde(default)]`, so a partial file fills the gaps from the defaults.

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::chart::colors;

pub mod hex_color {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::chart::colors;

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        serializer.serialize_str(&colors::to_hex([r, g, b, a]))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_color(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
        let [r, g, b, a] = colors::parse_hex(s)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

/// A project colour string as an egui colour, falling back when malformed.
pub fn project_color(hex: &str, fallback: &str) -> Color32 {
    let normalized = colors::normalize_or(Some(hex), fallback);
    hex_color::parse_hex_color(&normalized).unwrap_or(Color32::GRAY)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDefinition {
    pub meta: ThemeMeta,
    pub colors: ThemeColors,
    pub typography: ThemeTypography,
    pub spacing: ThemeSpacing,
    pub sizing: ThemeSizing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeMeta {
    pub name: String,
    pub author: String,
    pub description: String,
    /// "dark" or "light"; picks the egui base visuals.
    pub variant: String,
}

impl Default for ThemeMeta {
    fn default() -> Self {
        Self {
            name: "Default Light".into(),
            author: "Built-in".into(),
            description: "Bright slide-like chart on a light canvas.".into(),
            variant: "light".into(),
        }
    }
}

impl ThemeMeta {
    pub fn is_dark(&self) -> bool {
        self.variant.eq_ignore_ascii_case("dark")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    #[serde(with = "hex_color")]
    pub bg_canvas: Color32,
    #[serde(with = "hex_color")]
    pub bg_panel: Color32,
    #[serde(with = "hex_color")]
    pub bg_header: Color32,
    #[serde(with = "hex_color")]
    pub bg_row_even: Color32,
    #[serde(with = "hex_color")]
    pub bg_selected: Color32,
    #[serde(with = "hex_color")]
    pub bg_drop_target: Color32,

    #[serde(with = "hex_color")]
    pub border_subtle: Color32,
    #[serde(with = "hex_color")]
    pub border_accent: Color32,

    #[serde(with = "hex_color")]
    pub text_primary: Color32,
    #[serde(with = "hex_color")]
    pub text_secondary: Color32,
    #[serde(with = "hex_color")]
    pub text_dim: Color32,

    #[serde(with = "hex_color")]
    pub accent: Color32,
    #[serde(with = "hex_color")]
    pub today_line: Color32,
    #[serde(with = "hex_color")]
    pub grid_line: Color32,
    #[serde(with = "hex_color")]
    pub handle_color: Color32,
    /// Light strokes laid over hatched bars.
    #[serde(with = "hex_color")]
    pub hatch_stroke: Color32,

    #[serde(with = "hex_color")]
    pub status_complete: Color32,
    #[serde(with = "hex_color")]
    pub status_in_progress: Color32,
    #[serde(with = "hex_color")]
    pub status_not_started: Color32,

    #[serde(with = "hex_color")]
    pub widget_bg_inactive: Color32,
    #[serde(with = "hex_color")]
    pub widget_bg_hovered: Color32,
    #[serde(with = "hex_color")]
    pub widget_bg_active: Color32,
    #[serde(with = "hex_color")]
    pub extreme_bg: Color32,

    #[serde(with = "hex_color")]
    pub status_bar_bg: Color32,
    #[serde(with = "hex_color")]
    pub row_selected_stroke: Color32,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg_canvas: Color32::from_rgb(255, 255, 255),
            bg_panel: Color32::from_rgb(248, 249, 252),
            bg_header: Color32::from_rgb(240, 242, 245),
            bg_row_even: Color32::from_rgba_unmultiplied(0, 0, 0, 6),
            bg_selected: Color32::from_rgba_unmultiplied(21, 101, 192, 28),
            bg_drop_target: Color32::from_rgba_unmultiplied(21, 101, 192, 60),

            border_subtle: Color32::from_rgb(208, 212, 219),
            border_accent: Color32::from_rgb(21, 101, 192),

            text_primary: Color32::from_rgb(26, 31, 54),
            text_secondary: Color32::from_rgb(74, 85, 104),
            text_dim: Color32::from_rgb(113, 128, 150),

            accent: Color32::from_rgb(21, 101, 192),
            today_line: Color32::from_rgb(198, 40, 40),
            grid_line: Color32::from_rgb(236, 237, 240),
            handle_color: Color32::from_rgb(60, 60, 70),
            hatch_stroke: Color32::from_rgba_unmultiplied(255, 255, 255, 128),

            status_complete: Color32::from_rgb(46, 125, 50),
            status_in_progress: Color32::from_rgb(21, 101, 192),
            status_not_started: Color32::from_rgb(158, 158, 158),

            widget_bg_inactive: Color32::from_rgb(232, 235, 240),
            widget_bg_hovered: Color32::from_rgb(220, 224, 232),
            widget_bg_active: Color32::from_rgb(208, 212, 222),
            extreme_bg: Color32::from_rgb(255, 255, 255),

            status_bar_bg: Color32::from_rgb(235, 237, 242),
            row_selected_stroke: Color32::from_rgba_unmultiplied(21, 101, 192, 140),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeTypography {
    pub font_header_size: f32,
    pub font_sub_size: f32,
    pub font_body_size: f32,
    pub font_small_size: f32,
    pub font_marker_size: f32,
    /// Menu / toolbar button text
    pub font_menu_size: f32,
    pub font_status_size: f32,
}

impl Default for ThemeTypography {
    fn default() -> Self {
        Self {
            font_header_size: 12.0,
            font_sub_size: 10.5,
            font_body_size: 12.0,
            font_small_size: 9.0,
            font_marker_size: 12.0,
            font_menu_size: 12.0,
            font_status_size: 11.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSpacing {
    pub item_spacing_x: f32,
    pub item_spacing_y: f32,
    pub button_padding_x: f32,
    pub button_padding_y: f32,
    pub widget_rounding: f32,
    pub window_rounding: f32,
}

impl Default for ThemeSpacing {
    fn default() -> Self {
        Self {
            item_spacing_x: 8.0,
            item_spacing_y: 4.0,
            button_padding_x: 8.0,
            button_padding_y: 4.0,
            widget_rounding: 4.0,
            window_rounding: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSizing {
    pub row_height: f32,
    pub header_band_height: f32,
    pub separator_height: f32,
    pub handle_width: f32,
    pub bar_rounding: f32,
    pub bar_inset: f32,
    pub name_column_width: f32,
    pub status_column_width: f32,
    pub comment_column_width: f32,
    pub status_bar_height: f32,
    pub side_panel_default_width: f32,
    pub side_panel_min_width: f32,
}

impl Default for ThemeSizing {
    fn default() -> Self {
        Self {
            row_height: 34.0,
            header_band_height: 20.0,
            separator_height: 6.0,
            handle_width: 6.0,
            bar_rounding: 3.0,
            bar_inset: 9.0,
            name_column_width: 220.0,
            status_column_width: 110.0,
            comment_column_width: 160.0,
            status_bar_height: 24.0,
            side_panel_default_width: 360.0,
            side_panel_min_width: 240.0,
        }
    }
}
