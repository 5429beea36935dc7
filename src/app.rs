use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chart::interaction::DropOutcome;
use crate::chart::ChartSession;
use crate::model::scope::SCOPE_PALETTE;
use crate::model::{GanttStore, Project, ProjectStore, TaskPatch, TaskStatus, UpdateMode};
use crate::ui;
use crate::ui::task_editor::{EditorAction, EditorContext};
use crate::ui::task_table::{TableAction, TaskTable};
use crate::ui::theme_manager::ThemeManager;

/// Main application state.
pub struct GanttApp {
    pub store: ProjectStore,
    pub chart: ChartSession,
    pub table: TaskTable,
    pub file_path: Option<PathBuf>,
    /// Store revision at the last open/save.
    saved_revision: u64,
    /// Key typed into the File > Milestone Types field.
    pub new_type_key: String,

    // Status message
    pub status_message: String,

    // Theme engine
    pub theme_manager: ThemeManager,

    /// Set by the store listener when the table must be rebuilt.
    table_dirty: Rc<Cell<bool>>,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let theme_manager = ThemeManager::new();
        let mut chart = ChartSession::default();
        chart.set_zoom(theme_manager.saved_zoom());

        let table_dirty = Rc::new(Cell::new(true));
        let mut store = ProjectStore::new(Project::sample(chart.today()));
        let flag = Rc::clone(&table_dirty);
        let ctx = cc.egui_ctx.clone();
        store.on_change(move |notice| {
            if ui::task_table::needs_rebuild(notice) {
                flag.set(true);
            }
            ctx.request_repaint();
        });

        Self {
            store,
            chart,
            table: TaskTable::default(),
            file_path: None,
            saved_revision: 0,
            new_type_key: String::new(),
            status_message: "Ready".to_string(),
            theme_manager,
            table_dirty,
        }
    }

    fn today(&self) -> NaiveDate {
        self.chart.today()
    }

    /// Whether the document changed since it was last opened or saved.
    pub fn is_dirty(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    pub fn rename_project(&mut self, name: String) {
        if !name.trim().is_empty() && name != self.store.project().name {
            self.store.set_project_name(name);
        }
    }

    /// Adds a catalog entry from the typed key; duplicate keys are ignored.
    pub fn add_milestone_type(&mut self) {
        let key = self.new_type_key.trim().to_uppercase();
        if key.is_empty() || self.store.milestone_types().iter().any(|t| t.key == key) {
            return;
        }
        self.store.add_milestone_type(&key, &key, None);
        self.status_message = format!("Milestone type '{}' added", key);
        self.new_type_key.clear();
    }

    // --- File operations ---

    pub fn new_project(&mut self) {
        self.store.replace_project(Project::default());
        self.file_path = None;
        self.status_message = "New project created".to_string();
    }

    pub fn load_sample(&mut self) {
        self.store.replace_project(Project::sample(self.today()));
        self.file_path = None;
        self.status_message = "Sample project loaded".to_string();
    }

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &["gantt.json", "json"])
            .pick_file()
        {
            match crate::io::file::load_project(&path) {
                Ok(project) => {
                    self.store.replace_project(project);
                    self.saved_revision = self.store.revision();
                    self.file_path = Some(path);
                    self.status_message = "Project loaded".to_string();
                }
                Err(e) => {
                    warn!(error = %e, "open failed");
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_project(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_project(path);
        } else {
            self.save_project_as();
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline Project", &["gantt.json", "json"])
            .set_file_name(format!("{}.gantt.json", self.store.project().name))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.write_project(path);
        }
    }

    fn write_project(&mut self, path: PathBuf) {
        self.store.touch();
        match crate::io::file::save_project(self.store.project(), &path) {
            Ok(()) => {
                self.saved_revision = self.store.revision();
                self.status_message = "Project saved".to_string();
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    pub fn export_slide(&mut self) {
        if self.store.tasks().is_empty() {
            self.status_message = "Nothing to export: the project has no tasks".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Slide Document", &["slide.json", "json"])
            .set_file_name(format!("{}.slide.json", self.store.project().name))
            .save_file()
        {
            match crate::io::slide::write_slide_document(&self.store, self.today(), &path) {
                Ok(()) => self.status_message = format!("Slide exported to {}", path.display()),
                Err(e) => {
                    warn!(error = %e, "export failed");
                    self.status_message = format!("Export failed: {}", e);
                }
            }
        }
    }

    // --- Task operations ---

    pub fn add_task(&mut self) {
        self.store.add_task(self.today());
        self.status_message = "Task added".to_string();
    }

    pub fn add_milestone(&mut self) {
        self.store.add_milestone(self.today());
        self.status_message = "Milestone added".to_string();
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.store.selected() {
            self.store.delete_task(id);
            self.status_message = "Task deleted".to_string();
        }
    }

    fn apply_table_action(&mut self, action: TableAction) {
        match action {
            TableAction::Select(id) => self.store.select(Some(id)),
            TableAction::Delete(id) => {
                self.store.delete_task(id);
                self.status_message = "Task deleted".to_string();
            }
            TableAction::Move(id, direction) => self.store.move_task(id, direction),
            TableAction::AddSegment(id) => {
                if self.store.add_segment(id).is_some() {
                    self.status_message = "Segment added".to_string();
                }
            }
            TableAction::RemoveSegment(id, index) => self.store.remove_segment(id, index),
            TableAction::CycleStatus(id) => {
                if let Some(task) = self.store.task(id) {
                    let pos = TaskStatus::ALL.iter().position(|s| *s == task.status).unwrap_or(0);
                    let next = TaskStatus::ALL[(pos + 1) % TaskStatus::ALL.len()];
                    let patch = TaskPatch {
                        status: Some(next),
                        ..Default::default()
                    };
                    self.store.update_task(id, patch, UpdateMode::Full);
                }
            }
            TableAction::AssignScope(id, scope) => {
                let patch = TaskPatch {
                    scope: Some(scope),
                    ..Default::default()
                };
                self.store.update_task(id, patch, UpdateMode::Full);
            }
            TableAction::RecolorScope(id) => {
                let current = self
                    .store
                    .scopes()
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| s.color.clone())
                    .unwrap_or_default();
                let pos = SCOPE_PALETTE
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(&current))
                    .map_or(0, |p| p + 1);
                let next = SCOPE_PALETTE[pos % SCOPE_PALETTE.len()].to_string();
                self.store.update_scope(id, None, Some(next));
            }
            TableAction::DeleteScope(id) => self.store.delete_scope(id),
            TableAction::AddScope => {
                let name = format!("Scope {}", self.store.scopes().len() + 1);
                self.store.add_scope(name, None);
            }
        }
    }

    fn apply_editor_action(&mut self, task: Uuid, action: EditorAction) {
        match action {
            EditorAction::Task(patch) => self.store.update_task(task, patch, UpdateMode::Full),
            EditorAction::Segment(index, patch) => {
                self.store.update_segment(task, index, patch, UpdateMode::Full)
            }
            EditorAction::Milestone(index, patch) => {
                self.store
                    .update_activity_milestone(task, index, patch, UpdateMode::Full)
            }
            EditorAction::AddMilestone(kind) => self.store.add_activity_milestone(task, &kind, None),
            EditorAction::RemoveMilestone(index) => self.store.remove_activity_milestone(task, index),
        }
    }

    fn report_drop(&mut self, outcome: DropOutcome) {
        let format = self.store.settings().date_format;
        self.status_message = match outcome {
            DropOutcome::NoChange => return,
            DropOutcome::Committed => match self.store.selected().and_then(|id| self.store.task(id)) {
                Some(task) => format!(
                    "Updated '{}' ({} → {})",
                    task.name,
                    format.format(task.start),
                    format.format(task.end)
                ),
                None => "Timeline updated".to_string(),
            },
            DropOutcome::Retargeted { to } => {
                let name = self.store.task(to).map(|t| t.name.clone()).unwrap_or_default();
                format!("Moved to '{}'", name)
            }
            DropOutcome::Reordered { from, to } => format!("Moved row {} to {}", from + 1, to + 1),
        };
        info!(?outcome, "drag finished");
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::set_active(self.theme_manager.active());
        ui::theme::apply_theme(ctx);
        self.chart.set_today(Local::now().date_naive());

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        let should_delete = !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Delete));
        if should_save {
            self.save_project();
        }
        if should_delete && !self.chart.controller.is_dragging() {
            self.delete_selected();
        }

        if self.table_dirty.replace(false) {
            self.table.rebuild(&self.store);
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::status_bar_height())
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::status_bar_bg())
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::text_secondary()),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.store.tasks().len()))
                                .size(10.5)
                                .color(ui::theme::text_dim()),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::text_dim()));
                        ui.label(
                            egui::RichText::new(format!("Zoom: {}%", self.chart.zoom()))
                                .size(10.5)
                                .color(ui::theme::text_dim()),
                        );
                        if let Some(window) = self.chart.window() {
                            let format = self.store.settings().date_format;
                            ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::text_dim()));
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} – {}",
                                    format.format(window.min_date),
                                    format.format(window.max_date)
                                ))
                                .size(10.5)
                                .color(ui::theme::text_dim()),
                            );
                        }
                    });
                });
            });

        // Left panel: editor + task table
        let mut table_action = None;
        let mut editor_action = None;
        let selected = self.store.selected();
        egui::SidePanel::left("task_panel")
            .default_width(ui::theme::side_panel_default_width())
            .min_width(ui::theme::side_panel_min_width())
            .max_width(ui::theme::side_panel_default_width() * 2.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::bg_panel())
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::border_subtle())),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("editor-scroll")
                    .max_height(ui.available_height() * 0.5)
                    .show(ui, |ui| {
                        if let Some(task) = selected.and_then(|id| self.store.task(id)) {
                            let editor_ctx = EditorContext {
                                scopes: self.store.scopes(),
                                milestone_types: self.store.milestone_types(),
                                regular_tasks: self
                                    .store
                                    .tasks()
                                    .iter()
                                    .filter(|t| t.is_regular())
                                    .map(|t| (t.id, t.name.clone()))
                                    .collect(),
                            };
                            editor_action = ui::task_editor::show_task_editor(task, &editor_ctx, ui)
                                .map(|a| (task.id, a));
                        }
                    });
                ui.separator();

                let selected_scope = selected.map(|id| (id, self.store.task(id).and_then(|t| t.scope)));
                if let Some(a) = ui::task_table::show_scope_chips(self.store.scopes(), selected_scope, ui) {
                    table_action = Some(a);
                }
                ui.add_space(4.0);
                let format = self.store.settings().date_format;
                if let Some(a) = self.table.show(selected, format, ui) {
                    table_action = Some(a);
                }
            });

        if let Some((task, action)) = editor_action {
            self.apply_editor_action(task, action);
        }
        if let Some(action) = table_action {
            self.apply_table_action(action);
        }

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::bg_canvas())
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let interaction = ui::gantt_chart::show_gantt_chart(&mut self.store, &mut self.chart, ui);
            if interaction.zoom_changed {
                self.theme_manager.remember_zoom(self.chart.zoom());
            }
            if let Some(outcome) = interaction.outcome {
                self.report_drop(outcome);
            }
        });

        if self.chart.controller.is_dragging() {
            ctx.request_repaint();
        }
    }
}

