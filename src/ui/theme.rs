//! Accessors for the active theme.
//!
//! Painting code calls free functions (`theme::accent()`, `theme::row_height()`)
//! rather than threading a theme reference through every widget. The app
//! installs the current [`ThemeDefinition`] once per frame with [`set_active`].

use std::cell::RefCell;

use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::TaskStatus;
use crate::ui::theme_def::{ThemeColors, ThemeDefinition, ThemeSizing};

thread_local! {
    static ACTIVE: RefCell<ThemeDefinition> = RefCell::new(ThemeDefinition::default());
}

pub fn set_active(theme: &ThemeDefinition) {
    ACTIVE.with(|active| {
        let mut active = active.borrow_mut();
        if active.meta.name != theme.meta.name {
            *active = theme.clone();
        }
    });
}

/// Forces a refresh even when the name is unchanged (after a reload).
pub fn replace_active(theme: &ThemeDefinition) {
    ACTIVE.with(|active| *active.borrow_mut() = theme.clone());
}

fn with<R>(f: impl FnOnce(&ThemeDefinition) -> R) -> R {
    ACTIVE.with(|active| f(&active.borrow()))
}

fn color(pick: impl FnOnce(&ThemeColors) -> Color32) -> Color32 {
    with(|t| pick(&t.colors))
}

fn size(pick: impl FnOnce(&ThemeSizing) -> f32) -> f32 {
    with(|t| pick(&t.sizing))
}

// ── Colours ─────────────────────────────────────────────────────────────────

pub fn bg_canvas() -> Color32 {
    color(|c| c.bg_canvas)
}
pub fn bg_panel() -> Color32 {
    color(|c| c.bg_panel)
}
pub fn bg_header() -> Color32 {
    color(|c| c.bg_header)
}
pub fn bg_row_even() -> Color32 {
    color(|c| c.bg_row_even)
}
pub fn bg_selected() -> Color32 {
    color(|c| c.bg_selected)
}
pub fn bg_drop_target() -> Color32 {
    color(|c| c.bg_drop_target)
}
pub fn border_subtle() -> Color32 {
    color(|c| c.border_subtle)
}
pub fn text_primary() -> Color32 {
    color(|c| c.text_primary)
}
pub fn text_secondary() -> Color32 {
    color(|c| c.text_secondary)
}
pub fn text_dim() -> Color32 {
    color(|c| c.text_dim)
}
pub fn accent() -> Color32 {
    color(|c| c.accent)
}
pub fn today_line() -> Color32 {
    color(|c| c.today_line)
}
pub fn grid_line() -> Color32 {
    color(|c| c.grid_line)
}
pub fn handle_color() -> Color32 {
    color(|c| c.handle_color)
}
pub fn hatch_stroke() -> Color32 {
    color(|c| c.hatch_stroke)
}
pub fn status_bar_bg() -> Color32 {
    color(|c| c.status_bar_bg)
}
pub fn row_selected_stroke() -> Color32 {
    color(|c| c.row_selected_stroke)
}

pub fn status_color(status: TaskStatus) -> Color32 {
    color(|c| match status {
        TaskStatus::Complete => c.status_complete,
        TaskStatus::InProgress => c.status_in_progress,
        TaskStatus::NotStarted => c.status_not_started,
    })
}

// ── Sizes ───────────────────────────────────────────────────────────────────

pub fn row_height() -> f32 {
    size(|s| s.row_height)
}
pub fn header_band_height() -> f32 {
    size(|s| s.header_band_height)
}
pub fn separator_height() -> f32 {
    size(|s| s.separator_height)
}
pub fn handle_width() -> f32 {
    size(|s| s.handle_width)
}
pub fn bar_rounding() -> f32 {
    size(|s| s.bar_rounding)
}
pub fn bar_inset() -> f32 {
    size(|s| s.bar_inset)
}
pub fn name_column_width() -> f32 {
    size(|s| s.name_column_width)
}
pub fn status_column_width() -> f32 {
    size(|s| s.status_column_width)
}
pub fn comment_column_width() -> f32 {
    size(|s| s.comment_column_width)
}
pub fn status_bar_height() -> f32 {
    size(|s| s.status_bar_height)
}
pub fn side_panel_default_width() -> f32 {
    size(|s| s.side_panel_default_width)
}
pub fn side_panel_min_width() -> f32 {
    size(|s| s.side_panel_min_width)
}

// ── Fonts ───────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(with(|t| t.typography.font_header_size))
}
pub fn font_sub() -> FontId {
    FontId::proportional(with(|t| t.typography.font_sub_size))
}
pub fn font_body() -> FontId {
    FontId::proportional(with(|t| t.typography.font_body_size))
}
pub fn font_small() -> FontId {
    FontId::proportional(with(|t| t.typography.font_small_size))
}
pub fn font_marker() -> FontId {
    FontId::proportional(with(|t| t.typography.font_marker_size))
}
pub fn font_menu() -> FontId {
    FontId::proportional(with(|t| t.typography.font_menu_size))
}
pub fn font_status() -> FontId {
    FontId::proportional(with(|t| t.typography.font_status_size))
}

// ── Visuals ─────────────────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    with(|t| {
        let c = &t.colors;
        let rounding = Rounding::same(t.spacing.widget_rounding);
        let mut visuals = if t.meta.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.override_text_color = Some(c.text_primary);
        visuals.panel_fill = c.bg_panel;
        visuals.window_fill = c.bg_panel;
        visuals.extreme_bg_color = c.extreme_bg;
        visuals.faint_bg_color = c.bg_row_even;

        visuals.widgets.noninteractive.bg_fill = c.bg_panel;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, c.border_subtle);
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, c.text_secondary);
        visuals.widgets.noninteractive.rounding = rounding;

        visuals.widgets.inactive.bg_fill = c.widget_bg_inactive;
        visuals.widgets.inactive.weak_bg_fill = c.widget_bg_inactive;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, c.border_subtle);
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, c.text_primary);
        visuals.widgets.inactive.rounding = rounding;

        visuals.widgets.hovered.bg_fill = c.widget_bg_hovered;
        visuals.widgets.hovered.weak_bg_fill = c.widget_bg_hovered;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, c.accent);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, c.text_primary);
        visuals.widgets.hovered.rounding = rounding;

        visuals.widgets.active.bg_fill = c.widget_bg_active;
        visuals.widgets.active.weak_bg_fill = c.widget_bg_active;
        visuals.widgets.active.bg_stroke = Stroke::new(1.0, c.accent);
        visuals.widgets.active.fg_stroke = Stroke::new(2.0, c.text_primary);
        visuals.widgets.active.rounding = rounding;

        visuals.selection.bg_fill = c.bg_selected;
        visuals.selection.stroke = Stroke::new(1.0, c.accent);

        visuals.window_rounding = Rounding::same(t.spacing.window_rounding);
        visuals.window_stroke = Stroke::new(1.0, c.border_subtle);
        visuals.striped = false;

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(t.spacing.item_spacing_x, t.spacing.item_spacing_y);
        style.spacing.button_padding = egui::vec2(t.spacing.button_padding_x, t.spacing.button_padding_y);
        ctx.set_style(style);
    });
}
