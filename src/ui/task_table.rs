use egui::{Color32, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};
use uuid::Uuid;

use crate::chart::colors;
use crate::model::{ChangeNotice, ChangeScope, DateFormat, Direction, GanttStore, Scope, TaskStatus};
use crate::ui::theme;
use crate::ui::theme_def::project_color;

const ROW_HEIGHT: f32 = 22.0;

/// Actions that the task table can request.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    Select(Uuid),
    Delete(Uuid),
    Move(Uuid, Direction),
    AddSegment(Uuid),
    RemoveSegment(Uuid, usize),
    CycleStatus(Uuid),
    AssignScope(Uuid, Option<Uuid>),
    RecolorScope(Uuid),
    DeleteScope(Uuid),
    AddScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Task { milestone: bool },
    Segment { index: usize },
}

/// One pre-formatted line of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub task: Uuid,
    pub kind: EntryKind,
    pub name: String,
    pub color: String,
    pub start: String,
    pub end: String,
    pub status: TaskStatus,
}

/// Only structural edits refresh the table; drag previews and selection
/// changes leave the cached rows alone.
pub fn needs_rebuild(notice: &ChangeNotice) -> bool {
    notice.scope == ChangeScope::Full
}

/// Left-panel listing of tasks and their segments, cached between changes.
#[derive(Debug, Default)]
pub struct TaskTable {
    entries: Vec<TableEntry>,
}

impl TaskTable {
    pub fn rebuild(&mut self, store: &dyn GanttStore) {
        let format = store.settings().date_format;
        let scopes = store.scopes();
        self.entries.clear();
        for task in store.tasks() {
            let color = store.task_color(task);
            self.entries.push(TableEntry {
                task: task.id,
                kind: EntryKind::Task {
                    milestone: task.is_milestone,
                },
                name: task.name.clone(),
                color: color.clone(),
                start: format.format(task.start),
                end: if task.is_milestone {
                    String::new()
                } else {
                    format.format(task.end)
                },
                status: task.status,
            });
            for (index, seg) in task.segments.iter().enumerate() {
                let name = if seg.name.is_empty() {
                    format!("Segment {}", index + 1)
                } else {
                    seg.name.clone()
                };
                self.entries.push(TableEntry {
                    task: task.id,
                    kind: EntryKind::Segment { index },
                    name,
                    color: colors::segment_color(seg, &color, scopes),
                    start: format.format(seg.start),
                    end: format.format(seg.end),
                    status: seg.status,
                });
            }
        }
        tracing::trace!(rows = self.entries.len(), "task table rebuilt");
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Render the table; `selected` highlights the owning task's rows.
    pub fn show(&self, selected: Option<Uuid>, format: DateFormat, ui: &mut Ui) -> Option<TableAction> {
        let mut action = None;
        let task_count = self
            .entries()
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Task { .. }))
            .count();

        ui.horizontal(|ui| {
            ui.label(RichText::new("Activities").strong().size(15.0).color(theme::text_primary()));
            ui.label(RichText::new(format!("({task_count})")).size(11.0).color(theme::text_dim()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format.label()).size(10.0).color(theme::text_dim()));
            });
        });
        ui.add_space(4.0);

        TableBuilder::new(ui)
            .striped(true)
            .sense(Sense::click())
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(12.0))
            .column(Column::remainder().at_least(90.0).clip(true))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::exact(18.0))
            .column(Column::exact(64.0))
            .header(18.0, |mut header| {
                for title in ["", "NAME", "START", "END", "", ""] {
                    header.col(|ui| {
                        ui.label(RichText::new(title).size(9.0).strong().color(theme::text_dim()));
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, self.entries.len(), |mut row| {
                    let entry = &self.entries[row.index()];
                    row.set_selected(selected == Some(entry.task));

                    row.col(|ui| {
                        let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), Sense::hover());
                        let color = project_color(&entry.color, colors::DEFAULT_BAR);
                        if entry.kind == (EntryKind::Task { milestone: true }) {
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                "▲",
                                theme::font_small(),
                                color,
                            );
                        } else {
                            ui.painter().circle_filled(rect.center(), 3.5, color);
                        }
                    });
                    row.col(|ui| {
                        let text = match entry.kind {
                            EntryKind::Task { .. } => RichText::new(&entry.name).size(12.0).color(theme::text_primary()),
                            EntryKind::Segment { .. } => {
                                RichText::new(format!("   ↳ {}", entry.name)).size(11.0).color(theme::text_secondary())
                            }
                        };
                        ui.add(egui::Label::new(text).truncate().selectable(false));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(&entry.start).size(10.0).color(theme::text_secondary()));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(&entry.end).size(10.0).color(theme::text_secondary()));
                    });
                    row.col(|ui| {
                        let dot = ui
                            .add(
                                egui::Button::new(RichText::new("●").size(10.0).color(theme::status_color(entry.status)))
                                    .frame(false),
                            )
                            .on_hover_text(entry.status.label());
                        if dot.clicked() && matches!(entry.kind, EntryKind::Task { .. }) {
                            action = Some(TableAction::CycleStatus(entry.task));
                        }
                    });
                    row.col(|ui| {
                        ui.spacing_mut().item_spacing.x = 2.0;
                        if let Some(a) = row_buttons(ui, entry) {
                            action = Some(a);
                        }
                    });

                    if action.is_none() && row.response().clicked() {
                        action = Some(TableAction::Select(entry.task));
                    }
                });
            });

        action
    }
}

fn icon_button(ui: &mut Ui, icon: &str, hover: &str) -> bool {
    ui.add(egui::Button::new(RichText::new(icon).size(11.0).color(theme::text_dim())).frame(false))
        .on_hover_text(hover)
        .clicked()
}

fn row_buttons(ui: &mut Ui, entry: &TableEntry) -> Option<TableAction> {
    use egui_phosphor::regular as icons;
    match entry.kind {
        EntryKind::Task { milestone } => {
            if icon_button(ui, icons::ARROW_UP, "Move up") {
                return Some(TableAction::Move(entry.task, Direction::Up));
            }
            if icon_button(ui, icons::ARROW_DOWN, "Move down") {
                return Some(TableAction::Move(entry.task, Direction::Down));
            }
            if !milestone && icon_button(ui, icons::PLUS, "Add segment") {
                return Some(TableAction::AddSegment(entry.task));
            }
            if icon_button(ui, icons::X, "Delete") {
                return Some(TableAction::Delete(entry.task));
            }
            None
        }
        EntryKind::Segment { index } => icon_button(ui, icons::X, "Remove segment")
            .then_some(TableAction::RemoveSegment(entry.task, index)),
    }
}

/// Scope chips under the table. Clicking a chip assigns it to the selected
/// task; the context menu recolours or deletes it.
pub fn show_scope_chips(
    scopes: &[Scope],
    selected: Option<(Uuid, Option<Uuid>)>,
    ui: &mut Ui,
) -> Option<TableAction> {
    let mut action = None;
    ui.label(RichText::new("SCOPES").size(9.0).strong().color(theme::text_dim()));
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(4.0, 4.0);
        for scope in scopes {
            let color = project_color(&scope.color, colors::SCOPE_FALLBACK);
            let current = selected.and_then(|(_, s)| s) == Some(scope.id);
            let chip = egui::Button::new(RichText::new(&scope.name).size(11.0).color(Color32::WHITE))
                .fill(color)
                .stroke(if current {
                    egui::Stroke::new(2.0, theme::text_primary())
                } else {
                    egui::Stroke::NONE
                })
                .rounding(egui::Rounding::same(8.0));
            let response = ui.add(chip).on_hover_text(&scope.description);
            if response.clicked() {
                if let Some((task, _)) = selected {
                    let next = if current { None } else { Some(scope.id) };
                    action = Some(TableAction::AssignScope(task, next));
                }
            }
            response.context_menu(|ui| {
                if ui.button("Next colour").clicked() {
                    action = Some(TableAction::RecolorScope(scope.id));
                    ui.close_menu();
                }
                if ui.button("Delete scope").clicked() {
                    action = Some(TableAction::DeleteScope(scope.id));
                    ui.close_menu();
                }
            });
        }
        if ui
            .add(egui::Button::new(RichText::new(egui_phosphor::regular::PLUS).size(11.0)).frame(false))
            .on_hover_text("Add scope")
            .clicked()
        {
            action = Some(TableAction::AddScope);
        }
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, ProjectStore, Segment, Task, TaskPatch, UpdateMode};
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::rc::Rc;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).expect("valid date")
    }

    fn sample_store() -> ProjectStore {
        let mut task = Task::new("Build", d(1, 1), d(1, 10));
        task.segments.push(Segment::new(d(1, 12), d(1, 15), Default::default()));
        let milestone = Task::new_milestone("Launch", d(1, 20));
        let mut project = Project::new("table");
        project.tasks = vec![task, milestone];
        ProjectStore::new(project)
    }

    #[test]
    fn entries_list_tasks_then_their_segments() {
        let store = sample_store();
        let mut table = TaskTable::default();
        table.rebuild(&store);

        let kinds: Vec<EntryKind> = table.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Task { milestone: false },
                EntryKind::Segment { index: 0 },
                EntryKind::Task { milestone: true },
            ]
        );
        assert_eq!(table.entries()[1].name, "Segment 1");
        assert_eq!(table.entries()[0].start, "01.01.2024");
        assert!(table.entries()[2].end.is_empty());
    }

    #[test]
    fn preview_writes_leave_the_table_alone() {
        let mut store = sample_store();
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        store.on_change(move |notice| {
            if needs_rebuild(notice) {
                flag.set(true);
            }
        });
        let id = store.tasks()[0].id;

        store.update_task(id, TaskPatch::dates(d(1, 2), d(1, 11)), UpdateMode::PreviewOnly);
        store.select(Some(id));
        assert!(!dirty.get());

        store.update_task(id, TaskPatch::dates(d(1, 2), d(1, 11)), UpdateMode::Full);
        assert!(dirty.get());
    }

    #[test]
    fn rebuild_picks_up_committed_dates() {
        let mut store = sample_store();
        let mut table = TaskTable::default();
        table.rebuild(&store);
        let id = store.tasks()[0].id;
        store.update_task(id, TaskPatch::dates(d(2, 1), d(2, 5)), UpdateMode::Full);

        assert_eq!(table.entries()[0].start, "01.01.2024");
        table.rebuild(&store);
        assert_eq!(table.entries()[0].start, "01.02.2024");
        assert_eq!(table.entries()[0].end, "05.02.2024");
    }
}
