//! Loads, switches and persists themes and the per-user app settings.

use std::path::{Path, PathBuf};

use egui::Color32;
use tracing::{debug, warn};

use crate::chart::session::DEFAULT_ZOOM;
use crate::ui::theme_def::{ThemeDefinition, ThemeMeta};

/// Persisted user settings (lives in the OS config directory).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub active_theme: String,
    pub zoom: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            active_theme: ThemeMeta::default().name,
            zoom: DEFAULT_ZOOM,
        }
    }
}

pub struct ThemeManager {
    /// Built-ins first, then user themes, unique by `meta.name`.
    themes: Vec<ThemeDefinition>,
    active_index: usize,
    themes_dir: PathBuf,
    settings_path: PathBuf,
    settings: AppSettings,
}

impl ThemeManager {
    /// Discovers the config dir, loads built-in and user themes and applies
    /// the persisted preference.
    pub fn new() -> Self {
        let (themes_dir, settings_path) = Self::config_paths();
        if let Err(e) = std::fs::create_dir_all(&themes_dir) {
            warn!(dir = %themes_dir.display(), error = %e, "cannot create themes directory");
        }
        let settings = Self::load_settings(&settings_path);

        let mut themes = builtin_themes();
        scan_user_themes(&themes_dir, &mut themes);

        let reference_path = themes_dir.join("_reference_default.json");
        if !reference_path.exists() {
            if let Ok(json) = serde_json::to_string_pretty(&ThemeDefinition::default()) {
                if let Err(e) = std::fs::write(&reference_path, json) {
                    debug!(error = %e, "reference theme not written");
                }
            }
        }

        let active_index = themes
            .iter()
            .position(|t| t.meta.name == settings.active_theme)
            .unwrap_or(0);

        Self {
            themes,
            active_index,
            themes_dir,
            settings_path,
            settings,
        }
    }

    pub fn active(&self) -> &ThemeDefinition {
        &self.themes[self.active_index]
    }

    /// (index, name) for every available theme.
    pub fn list(&self) -> Vec<(usize, String)> {
        self.themes
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.meta.name.clone()))
            .collect()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn saved_zoom(&self) -> u32 {
        self.settings.zoom
    }

    pub fn set_active(&mut self, index: usize) {
        if index < self.themes.len() && index != self.active_index {
            self.active_index = index;
            self.settings.active_theme = self.themes[index].meta.name.clone();
            self.save_settings();
        }
    }

    pub fn remember_zoom(&mut self, zoom: u32) {
        if self.settings.zoom != zoom {
            self.settings.zoom = zoom;
            self.save_settings();
        }
    }

    /// Re-reads the user directory, e.g. after a theme file was edited.
    pub fn reload_user_themes(&mut self) {
        let active_name = self.active().meta.name.clone();
        self.themes = builtin_themes();
        scan_user_themes(&self.themes_dir, &mut self.themes);
        self.active_index = self
            .themes
            .iter()
            .position(|t| t.meta.name == active_name)
            .unwrap_or(0);
        debug!(count = self.themes.len(), "themes reloaded");
    }

    fn config_paths() -> (PathBuf, PathBuf) {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "TimelineGantt") {
            let config = proj_dirs.config_dir().to_path_buf();
            (config.join("themes"), config.join("settings.json"))
        } else {
            let dir = PathBuf::from(".");
            (dir.join("themes"), dir.join("settings.json"))
        }
    }

    fn load_settings(path: &Path) -> AppSettings {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return AppSettings::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            AppSettings::default()
        })
    }

    fn save_settings(&self) {
        let Ok(json) = serde_json::to_string_pretty(&self.settings) else {
            return;
        };
        if let Some(parent) = self.settings_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.settings_path, json) {
            warn!(path = %self.settings_path.display(), error = %e, "settings not saved");
        }
    }
}

/// Appends every parseable `*.json` theme in `dir` whose name is not taken.
fn scan_user_themes(dir: &Path, themes: &mut Vec<ThemeDefinition>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(contents) = std::fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str::<ThemeDefinition>(&contents) {
            Ok(def) if !themes.iter().any(|t| t.meta.name == def.meta.name) => themes.push(def),
            Ok(def) => debug!(name = %def.meta.name, "duplicate theme name skipped"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to parse theme"),
        }
    }
}

fn builtin_themes() -> Vec<ThemeDefinition> {
    vec![ThemeDefinition::default(), default_dark()]
}

fn default_dark() -> ThemeDefinition {
    let mut t = ThemeDefinition::default();
    t.meta = ThemeMeta {
        name: "Default Dark".into(),
        author: "Built-in".into(),
        description: "Dark canvas with the same bar palette.".into(),
        variant: "dark".into(),
    };
    t.colors.bg_canvas = Color32::from_rgb(24, 24, 32);
    t.colors.bg_panel = Color32::from_rgb(27, 30, 39);
    t.colors.bg_header = Color32::from_rgb(31, 35, 46);
    t.colors.bg_row_even = Color32::from_rgba_unmultiplied(255, 255, 255, 6);
    t.colors.bg_selected = Color32::from_rgba_unmultiplied(95, 145, 220, 34);
    t.colors.bg_drop_target = Color32::from_rgba_unmultiplied(95, 145, 220, 70);
    t.colors.border_subtle = Color32::from_rgb(47, 51, 63);
    t.colors.border_accent = Color32::from_rgb(90, 140, 220);
    t.colors.text_primary = Color32::from_rgb(230, 232, 240);
    t.colors.text_secondary = Color32::from_rgb(162, 168, 186);
    t.colors.text_dim = Color32::from_rgb(111, 118, 136);
    t.colors.accent = Color32::from_rgb(80, 140, 220);
    t.colors.today_line = Color32::from_rgb(240, 75, 75);
    t.colors.grid_line = Color32::from_rgb(40, 44, 56);
    t.colors.handle_color = Color32::from_rgb(255, 255, 255);
    t.colors.status_in_progress = Color32::from_rgb(80, 140, 220);
    t.colors.widget_bg_inactive = Color32::from_rgb(38, 42, 54);
    t.colors.widget_bg_hovered = Color32::from_rgb(48, 53, 67);
    t.colors.widget_bg_active = Color32::from_rgb(57, 62, 78);
    t.colors.extreme_bg = Color32::from_rgb(19, 21, 29);
    t.colors.status_bar_bg = Color32::from_rgb(26, 26, 36);
    t.colors.row_selected_stroke = Color32::from_rgba_unmultiplied(110, 165, 245, 140);
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_have_unique_names() {
        let themes = builtin_themes();
        let names: Vec<&str> = themes.iter().map(|t| t.meta.name.as_str()).collect();
        assert_eq!(names, vec!["Default Light", "Default Dark"]);
        assert!(themes[1].meta.is_dark());
    }

    #[test]
    fn user_themes_skip_duplicates_and_garbage() {
        let dir = std::env::temp_dir().join(format!("timeline-gantt-themes-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        std::fs::write(dir.join("ocean.json"), r#"{ "meta": { "name": "Ocean" } }"#).expect("write");
        std::fs::write(dir.join("dup.json"), r#"{ "meta": { "name": "Default Dark" } }"#).expect("write");
        std::fs::write(dir.join("broken.json"), "{").expect("write");
        std::fs::write(dir.join("notes.txt"), "ignored").expect("write");

        let mut themes = builtin_themes();
        scan_user_themes(&dir, &mut themes);
        let _ = std::fs::remove_dir_all(&dir);

        let names: Vec<&str> = themes.iter().map(|t| t.meta.name.as_str()).collect();
        assert_eq!(names, vec!["Default Light", "Default Dark", "Ocean"]);
    }

    #[test]
    fn settings_tolerate_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{ "active_theme": "Default Dark" }"#).expect("parse");
        assert_eq!(settings.zoom, DEFAULT_ZOOM);
    }
}
