use crate::app::GanttApp;
use crate::chart::session::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::model::{DateFormat, GanttStore};
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

fn tool_button(ui: &mut Ui, icon: &str, text: &str) -> bool {
    ui.button(RichText::new(format!("{icon} {text}")).font(theme::font_menu()))
        .clicked()
}

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Project").clicked() {
                app.new_project();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Export Slide...").clicked() {
                app.export_slide();
                ui.close_menu();
            }
            if ui.button("  Load Sample").clicked() {
                app.load_sample();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Project Name").small().weak());
            let mut name = app.store.project().name.clone();
            let response = ui.text_edit_singleline(&mut name);
            if response.changed() {
                app.rename_project(name);
            }
            ui.menu_button("  Milestone Types", |ui| {
                for ty in app.store.milestone_types() {
                    ui.label(format!("{}  {}", ty.key, ty.label));
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut app.new_type_key).desired_width(60.0).hint_text("Key"));
                    if ui.button("Add").clicked() {
                        app.add_milestone_type();
                    }
                });
            });
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            let settings = app.store.settings().clone();

            ui.label(RichText::new("Time Bands").small().weak());
            let mut scale = settings.time_scale;
            let mut changed = ui.checkbox(&mut scale.show_years, "Years").changed();
            changed |= ui.checkbox(&mut scale.show_months, "Months").changed();
            changed |= ui.checkbox(&mut scale.show_weeks, "Weeks").changed();
            if changed {
                app.store.update_settings(|s| s.time_scale = scale);
            }

            ui.separator();
            let mut show_today = settings.show_today;
            if ui.checkbox(&mut show_today, "Today Marker").changed() {
                app.store.update_settings(|s| s.show_today = show_today);
            }
            let mut show_legend = settings.show_legend;
            if ui.checkbox(&mut show_legend, "Legend").changed() {
                app.store.update_settings(|s| s.show_legend = show_legend);
            }
            let mut show_ms_dates = settings.show_ms_dates;
            if ui.checkbox(&mut show_ms_dates, "Milestone Dates").changed() {
                app.store.update_settings(|s| s.show_ms_dates = show_ms_dates);
            }

            ui.separator();
            ui.label(RichText::new("Date Format").small().weak());
            for format in DateFormat::ALL {
                if ui.radio(settings.date_format == format, format.label()).clicked() {
                    app.store.update_settings(|s| s.date_format = format);
                    ui.close_menu();
                }
            }

            ui.separator();
            ui.label(RichText::new("Theme").small().weak());
            let themes = app.theme_manager.list();
            let active_idx = app.theme_manager.active_index();
            for (idx, name) in &themes {
                if ui.radio(*idx == active_idx, name).clicked() {
                    app.theme_manager.set_active(*idx);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Reload Themes").clicked() {
                app.theme_manager.reload_user_themes();
                theme::replace_active(app.theme_manager.active());
                ui.close_menu();
            }
            if ui.button("  Open Themes Folder").clicked() {
                if let Err(e) = open::that(app.theme_manager.themes_dir()) {
                    app.status_message = format!("Cannot open themes folder: {e}");
                }
                ui.close_menu();
            }
        });

        ui.separator();
        if tool_button(ui, icons::PLUS, "Task") {
            app.add_task();
        }
        if tool_button(ui, icons::DIAMOND, "Milestone") {
            app.add_milestone();
        }
        let has_selection = app.store.selected().is_some();
        if ui
            .add_enabled(
                has_selection,
                egui::Button::new(RichText::new(format!("{} Delete", icons::TRASH)).font(theme::font_menu())),
            )
            .clicked()
        {
            app.delete_selected();
        }

        ui.separator();
        ui.label(RichText::new(icons::MAGNIFYING_GLASS).font(theme::font_menu()));
        let mut zoom = app.chart.zoom();
        let slider = egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM)
            .step_by(f64::from(ZOOM_STEP))
            .suffix("%")
            .show_value(true);
        if ui.add(slider).changed() {
            app.chart.set_zoom(zoom);
            app.theme_manager.remember_zoom(app.chart.zoom());
        }

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = match (&app.file_path, app.is_dirty()) {
                (None, _) => " (unsaved)",
                (Some(_), true) => " •",
                (Some(_), false) => "",
            };
            ui.label(
                RichText::new(format!("{}{}", app.store.project().name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
