use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::chart::colors;
use crate::model::scope::SCOPE_PALETTE;
use crate::model::{BarStyle, MilestonePatch, MilestoneType, PinMode, Scope, SegmentPatch, Task, TaskPatch, TaskStatus};
use crate::ui::theme;
use crate::ui::theme_def::project_color;

/// Edits the editor can request for the selected task.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Task(TaskPatch),
    Segment(usize, SegmentPatch),
    Milestone(usize, MilestonePatch),
    AddMilestone(String),
    RemoveMilestone(usize),
}

/// Everything the editor reads besides the task itself.
pub struct EditorContext<'a> {
    pub scopes: &'a [Scope],
    pub milestone_types: &'a [MilestoneType],
    /// Candidate rows a standalone milestone can be linked to.
    pub regular_tasks: Vec<(Uuid, String)>,
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::text_dim()).strong());
}

fn scope_name(scopes: &[Scope], id: Option<Uuid>) -> String {
    id.and_then(|id| scopes.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "None".to_string())
}

/// Unlinked standalone milestones sit on the row closest to their date.
const NEAREST_ROW: &str = "Nearest row";

fn link_label(task: &Task, regular_tasks: &[(Uuid, String)]) -> String {
    task.linked_task
        .and_then(|id| regular_tasks.iter().find(|(t, _)| *t == id))
        .map(|(_, n)| n.clone())
        .unwrap_or_else(|| NEAREST_ROW.to_string())
}

fn date_picker(ui: &mut Ui, date: NaiveDate, salt: &str) -> Option<NaiveDate> {
    let mut value = date;
    let response = ui.add(egui_extras::DatePickerButton::new(&mut value).id_salt(salt));
    (response.changed() && value != date).then_some(value)
}

/// Render an inline editor for the selected task. Changes come back as
/// patches; the caller commits them through the store.
pub fn show_task_editor(task: &Task, ctx: &EditorContext<'_>, ui: &mut Ui) -> Option<EditorAction> {
    let mut action = None;

    ui.add_space(6.0);
    ui.label(
        RichText::new(if task.is_milestone { "Edit Milestone" } else { "Edit Activity" })
            .strong()
            .size(13.0)
            .color(theme::text_primary()),
    );
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::bg_canvas(),
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        stroke: egui::Stroke::new(1.0, theme::border_subtle()),
        ..Default::default()
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        field_label(ui, "Name");
        let mut name = task.name.clone();
        if ui
            .add_sized([ui.available_width(), 24.0], egui::TextEdit::singleline(&mut name))
            .changed()
        {
            action = Some(EditorAction::Task(TaskPatch {
                name: Some(name),
                ..Default::default()
            }));
        }

        if task.is_milestone {
            field_label(ui, "Date");
            if let Some(date) = date_picker(ui, task.start, &format!("ed-ms-date-{}", task.id)) {
                action = Some(EditorAction::Task(TaskPatch {
                    start: Some(date),
                    ..Default::default()
                }));
            }
            field_label(ui, "Shown on row");
            let current = link_label(task, &ctx.regular_tasks);
            egui::ComboBox::from_id_salt(("ed-link", task.id))
                .selected_text(current)
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    if ui.selectable_label(task.linked_task.is_none(), NEAREST_ROW).clicked() {
                        action = Some(EditorAction::Task(TaskPatch {
                            linked_task: Some(None),
                            ..Default::default()
                        }));
                    }
                    for (id, name) in &ctx.regular_tasks {
                        if ui.selectable_label(task.linked_task == Some(*id), name).clicked() {
                            action = Some(EditorAction::Task(TaskPatch {
                                linked_task: Some(Some(*id)),
                                ..Default::default()
                            }));
                        }
                    }
                });
        } else {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    field_label(ui, "Start");
                    if let Some(start) = date_picker(ui, task.start, &format!("ed-start-{}", task.id)) {
                        action = Some(EditorAction::Task(TaskPatch::dates(start, task.end.max(start))));
                    }
                });
                ui.add_space(8.0);
                ui.vertical(|ui| {
                    field_label(ui, "End");
                    if let Some(end) = date_picker(ui, task.end, &format!("ed-end-{}", task.id)) {
                        action = Some(EditorAction::Task(TaskPatch::dates(task.start.min(end), end)));
                    }
                });
            });

            field_label(ui, "Bar style");
            egui::ComboBox::from_id_salt(("ed-style", task.id))
                .selected_text(task.bar_style.label())
                .show_ui(ui, |ui| {
                    for style in BarStyle::ALL {
                        if ui.selectable_label(task.bar_style == style, style.label()).clicked() {
                            action = Some(EditorAction::Task(TaskPatch {
                                bar_style: Some(style),
                                ..Default::default()
                            }));
                        }
                    }
                });
        }

        field_label(ui, "Status");
        egui::ComboBox::from_id_salt(("ed-status", task.id))
            .selected_text(task.status.label())
            .show_ui(ui, |ui| {
                for status in TaskStatus::ALL {
                    if ui.selectable_label(task.status == status, status.label()).clicked() {
                        action = Some(EditorAction::Task(TaskPatch {
                            status: Some(status),
                            ..Default::default()
                        }));
                    }
                }
            });

        field_label(ui, "Scope");
        egui::ComboBox::from_id_salt(("ed-scope", task.id))
            .selected_text(scope_name(ctx.scopes, task.scope))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if ui.selectable_label(task.scope.is_none(), "None").clicked() {
                    action = Some(EditorAction::Task(TaskPatch {
                        scope: Some(None),
                        ..Default::default()
                    }));
                }
                for scope in ctx.scopes {
                    if ui.selectable_label(task.scope == Some(scope.id), &scope.name).clicked() {
                        action = Some(EditorAction::Task(TaskPatch {
                            scope: Some(Some(scope.id)),
                            ..Default::default()
                        }));
                    }
                }
            });

        field_label(ui, "Colour");
        if let Some(color) = colour_swatches(ui, task.color.as_deref()) {
            action = Some(EditorAction::Task(TaskPatch {
                color: Some(color),
                ..Default::default()
            }));
        }

        field_label(ui, "Progress");
        let mut progress = task.progress;
        if ui
            .add(egui::Slider::new(&mut progress, 0..=100).suffix("%"))
            .changed()
        {
            action = Some(EditorAction::Task(TaskPatch {
                progress: Some(progress),
                ..Default::default()
            }));
        }

        field_label(ui, "Comment");
        let mut comment = task.comment.clone();
        if ui
            .add_sized(
                [ui.available_width(), 48.0],
                egui::TextEdit::multiline(&mut comment).hint_text("Shown in the comment column..."),
            )
            .changed()
        {
            action = Some(EditorAction::Task(TaskPatch {
                comment: Some(comment),
                ..Default::default()
            }));
        }

        if !task.is_milestone {
            if let Some(a) = segment_section(task, ui) {
                action = Some(a);
            }
            if let Some(a) = milestone_section(task, ctx, ui) {
                action = Some(a);
            }
        }
    });

    action
}

/// Palette chips plus a reset chip. `Some(None)` clears the override.
fn colour_swatches(ui: &mut Ui, current: Option<&str>) -> Option<Option<String>> {
    let mut picked = None;
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(4.0, 4.0);
        let reset = ui
            .add(egui::Button::new(RichText::new(egui_phosphor::regular::PROHIBIT).size(12.0)).frame(false))
            .on_hover_text("Use the scope colour");
        if reset.clicked() && current.is_some() {
            picked = Some(None);
        }
        for hex in SCOPE_PALETTE {
            let is_current = current.is_some_and(|c| c.eq_ignore_ascii_case(hex));
            let size = if is_current { 18.0 } else { 14.0 };
            let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
            ui.painter()
                .rect_filled(rect, egui::Rounding::same(3.0), project_color(hex, colors::DEFAULT_BAR));
            if is_current {
                ui.painter().rect_stroke(
                    rect.expand(1.0),
                    egui::Rounding::same(4.0),
                    egui::Stroke::new(2.0, theme::text_primary()),
                );
            }
            if response.on_hover_text(hex).clicked() && !is_current {
                picked = Some(Some(hex.to_string()));
            }
        }
    });
    picked
}

fn segment_section(task: &Task, ui: &mut Ui) -> Option<EditorAction> {
    if task.segments.is_empty() {
        return None;
    }
    let mut action = None;
    ui.separator();
    field_label(ui, "Segments");
    for (index, seg) in task.segments.iter().enumerate() {
        ui.horizontal(|ui| {
            let mut name = seg.name.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut name).desired_width(80.0).hint_text(format!("Segment {}", index + 1)))
                .changed()
            {
                action = Some(EditorAction::Segment(
                    index,
                    SegmentPatch {
                        name: Some(name),
                        ..Default::default()
                    },
                ));
            }
            if let Some(start) = date_picker(ui, seg.start, &format!("ed-seg-start-{}", seg.id)) {
                action = Some(EditorAction::Segment(index, SegmentPatch::dates(start, seg.end.max(start))));
            }
            if let Some(end) = date_picker(ui, seg.end, &format!("ed-seg-end-{}", seg.id)) {
                action = Some(EditorAction::Segment(index, SegmentPatch::dates(seg.start.min(end), end)));
            }
            egui::ComboBox::from_id_salt(("ed-seg-style", seg.id))
                .selected_text(seg.bar_style.label())
                .width(72.0)
                .show_ui(ui, |ui| {
                    for style in BarStyle::ALL.into_iter().filter(|s| s.is_visible()) {
                        if ui.selectable_label(seg.bar_style == style, style.label()).clicked() {
                            action = Some(EditorAction::Segment(
                                index,
                                SegmentPatch {
                                    bar_style: Some(style),
                                    ..Default::default()
                                },
                            ));
                        }
                    }
                });
        });
    }
    action
}

fn milestone_section(task: &Task, ctx: &EditorContext<'_>, ui: &mut Ui) -> Option<EditorAction> {
    let mut action = None;
    ui.separator();
    field_label(ui, "Milestones");
    for (index, ms) in task.milestones.iter().enumerate() {
        ui.horizontal(|ui| {
            let mut done = ms.done;
            if ui.checkbox(&mut done, "").on_hover_text("Done").changed() {
                action = Some(EditorAction::Milestone(
                    index,
                    MilestonePatch {
                        done: Some(done),
                        ..Default::default()
                    },
                ));
            }
            egui::ComboBox::from_id_salt(("ed-ms-kind", ms.id))
                .selected_text(&ms.kind)
                .width(52.0)
                .show_ui(ui, |ui| {
                    for ty in ctx.milestone_types {
                        if ui.selectable_label(ms.kind == ty.key, &ty.label).clicked() {
                            action = Some(EditorAction::Milestone(
                                index,
                                MilestonePatch {
                                    kind: Some(ty.key.clone()),
                                    ..Default::default()
                                },
                            ));
                        }
                    }
                });
            ui.add_enabled_ui(ms.pin == PinMode::Manual || ms.pin == PinMode::Fixed, |ui| {
                if let Some(date) = date_picker(ui, ms.date, &format!("ed-ms-{}", ms.id)) {
                    action = Some(EditorAction::Milestone(
                        index,
                        MilestonePatch {
                            date: Some(date),
                            ..Default::default()
                        },
                    ));
                }
            });
            egui::ComboBox::from_id_salt(("ed-ms-pin", ms.id))
                .selected_text(ms.pin.label())
                .width(72.0)
                .show_ui(ui, |ui| {
                    for pin in PinMode::ALL {
                        if ui.selectable_label(ms.pin == pin, pin.label()).clicked() {
                            action = Some(EditorAction::Milestone(
                                index,
                                MilestonePatch {
                                    pin: Some(pin),
                                    ..Default::default()
                                },
                            ));
                        }
                    }
                });
            if ui
                .add(egui::Button::new(RichText::new(egui_phosphor::regular::X).size(11.0).color(theme::text_dim())).frame(false))
                .on_hover_text("Remove milestone")
                .clicked()
            {
                action = Some(EditorAction::RemoveMilestone(index));
            }
        });
    }
    ui.horizontal_wrapped(|ui| {
        for ty in ctx.milestone_types {
            let color = project_color(&ty.color, colors::ACTIVITY_MILESTONE_DEFAULT);
            let button = egui::Button::new(RichText::new(format!("+ {}", ty.key)).size(11.0).color(Color32::WHITE)).fill(color);
            if ui.add(button).on_hover_text(&ty.label).clicked() {
                action = Some(EditorAction::AddMilestone(ty.key.clone()));
            }
        }
    });
    action
}
