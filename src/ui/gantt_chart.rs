use egui::{Align2, CursorIcon, Id, Pos2, Rect, Response, RichText, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::chart::colors;
use crate::chart::interaction::{BarGrip, DragContext, DragCursor, DragTarget, DropOutcome, InteractionController, RowBand};
use crate::chart::layout::{BarKind, BarShape, HeaderCell, LegendEntry, MarkerKind, MarkerShape, TaskRow, VisualRow};
use crate::chart::ChartSession;
use crate::model::{BarStyle, DateFormat, GanttStore};
use crate::ui::theme;
use crate::ui::theme_def::project_color;

const TODAY_ROW_HEIGHT: f32 = 16.0;
const LEGEND_ROW_HEIGHT: f32 = 26.0;
const GRIP_WIDTH: f32 = 18.0;
const MIN_BAR_WIDTH: f32 = 4.0;
const HATCH_PITCH: f32 = 6.0;
const MARKER_SIZE: f32 = 6.0;

/// What happened in the chart this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartInteraction {
    pub outcome: Option<DropOutcome>,
    pub zoom_changed: bool,
}

/// Horizontal layout of the four columns, in screen points.
struct Columns {
    left: f32,
    chart_left: f32,
    chart_w: f32,
    status_left: f32,
    comment_left: f32,
    right: f32,
}

impl Columns {
    fn x_at(&self, pct: f64) -> f32 {
        self.chart_left + (pct / 100.0) as f32 * self.chart_w
    }

    fn width_of(&self, pct: f64) -> f32 {
        (pct / 100.0) as f32 * self.chart_w
    }
}

/// Pointer events collected while painting, applied once painting is done.
#[derive(Default)]
struct RowEvents {
    begin: Option<(DragTarget, Pos2)>,
    clicked: Option<Uuid>,
}

impl RowEvents {
    fn start(&mut self, target: DragTarget, response: &Response, ui: &Ui) {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(origin) = origin {
            self.begin.get_or_insert((target, origin));
        }
    }
}

fn row_height(row: &VisualRow) -> f32 {
    match row {
        VisualRow::Placeholder { .. } => theme::row_height() * 3.0,
        VisualRow::YearHeader(_) | VisualRow::MonthHeader(_) | VisualRow::WeekHeader(_) => {
            theme::header_band_height()
        }
        VisualRow::ScopeSeparator { .. } => theme::separator_height(),
        VisualRow::Task(_) => theme::row_height(),
        VisualRow::TodayMarker { .. } => TODAY_ROW_HEIGHT,
        VisualRow::Legend(_) => LEGEND_ROW_HEIGHT,
    }
}

fn is_header(row: &VisualRow) -> bool {
    matches!(
        row,
        VisualRow::YearHeader(_) | VisualRow::MonthHeader(_) | VisualRow::WeekHeader(_)
    )
}

/// Render the chart (central panel) and drive the drag controller.
pub fn show_gantt_chart(store: &mut dyn GanttStore, session: &mut ChartSession, ui: &mut Ui) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();

    if ui.rect_contains_pointer(ui.max_rect()) {
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if zoom_delta > 1.0 {
            session.zoom_in();
            interaction.zoom_changed = true;
        } else if zoom_delta < 1.0 {
            session.zoom_out();
            interaction.zoom_changed = true;
        }
    }

    let tree = session.layout(&*store);
    let Some(window) = tree.window else {
        if let Some(VisualRow::Placeholder { message }) = tree.rows.first() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(message).size(14.0).color(theme::text_dim()));
            });
        }
        return interaction;
    };

    let format = store.settings().date_format;
    let name_w = theme::name_column_width();
    let status_w = theme::status_column_width();
    let comment_w = theme::comment_column_width();
    let available = ui.available_size();
    let chart_w = tree
        .chart_min_width
        .max(available.x - name_w - status_w - comment_w);
    let total_w = name_w + chart_w + status_w + comment_w;
    let total_h: f32 = tree.rows.iter().map(row_height).sum();
    let last_header = tree.rows.iter().rposition(is_header);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(total_w, total_h.max(available.y)), Sense::hover());
            let origin = response.rect.min;
            painter.rect_filled(response.rect, 0.0, theme::bg_canvas());

            let cols = Columns {
                left: origin.x,
                chart_left: origin.x + name_w,
                chart_w,
                status_left: origin.x + name_w + chart_w,
                comment_left: origin.x + name_w + chart_w + status_w,
                right: origin.x + total_w,
            };

            let mut tops = Vec::with_capacity(tree.rows.len());
            let mut y = origin.y;
            for row in &tree.rows {
                tops.push(y);
                y += row_height(row);
            }
            let bands: Vec<RowBand> = tree
                .rows
                .iter()
                .zip(&tops)
                .filter_map(|(row, top)| match row {
                    VisualRow::Task(task) => Some(RowBand {
                        task: task.task_id,
                        top: *top,
                        bottom: *top + theme::row_height(),
                    }),
                    _ => None,
                })
                .collect();

            let mut events = RowEvents::default();
            let drop_target = session.controller.drop_target();
            for (i, (row, top)) in tree.rows.iter().zip(&tops).enumerate() {
                let top = *top;
                match row {
                    VisualRow::Placeholder { .. } => {}
                    VisualRow::YearHeader(cells) | VisualRow::MonthHeader(cells) | VisualRow::WeekHeader(cells) => {
                        paint_header(&painter, &cols, top, cells, Some(i) == last_header);
                    }
                    VisualRow::ScopeSeparator { scope } => {
                        let color = project_color(&store.scope_color(*scope), colors::SCOPE_FALLBACK);
                        let rect = Rect::from_min_max(
                            Pos2::new(cols.left, top + 1.0),
                            Pos2::new(cols.right, top + theme::separator_height() - 1.0),
                        );
                        painter.rect_filled(rect, 0.0, color.gamma_multiply(0.35));
                    }
                    VisualRow::Task(task_row) => {
                        let is_drop_target = drop_target == Some(task_row.task_id);
                        paint_task_row(
                            ui,
                            &painter,
                            &cols,
                            top,
                            task_row,
                            &session.controller,
                            is_drop_target,
                            format,
                            &mut events,
                        );
                    }
                    VisualRow::TodayMarker { left_pct, label } => {
                        painter.text(
                            Pos2::new(cols.x_at(*left_pct), top + TODAY_ROW_HEIGHT / 2.0),
                            Align2::CENTER_CENTER,
                            label,
                            theme::font_small(),
                            theme::today_line(),
                        );
                    }
                    VisualRow::Legend(entries) => paint_legend(&painter, &cols, top, entries),
                }
            }

            let context = DragContext {
                window,
                chart_width: chart_w,
                row_height: theme::row_height(),
                rows: bands,
            };
            if let Some((target, pointer)) = events.begin {
                session.controller.begin(store, target, pointer, context);
            }

            if session.controller.is_dragging() {
                let (latest, released) = ui.input(|i| (i.pointer.latest_pos(), i.pointer.any_released()));
                let fallback = session.controller.session().map(|s| s.pointer);
                if let Some(pointer) = latest.or(fallback) {
                    if released {
                        interaction.outcome = Some(session.controller.pointer_up(store, pointer));
                    } else {
                        session.controller.pointer_move(store, pointer);
                    }
                }
            } else if let Some(id) = events.clicked {
                store.select(Some(id));
            }

            if let Some(feedback) = session.controller.feedback() {
                ui.ctx().set_cursor_icon(match feedback.cursor {
                    DragCursor::Grabbing => CursorIcon::Grabbing,
                    DragCursor::ResizeHorizontal => CursorIcon::ResizeHorizontal,
                });
                ui.style_mut().interaction.selectable_labels = !feedback.text_selection_disabled;
                egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), Id::new("gantt-drag-tip"), |ui| {
                    ui.label(RichText::new(&feedback.tooltip).strong());
                });
            }
        });

    interaction
}

fn paint_header(painter: &egui::Painter, cols: &Columns, top: f32, cells: &[HeaderCell], titles: bool) {
    let h = theme::header_band_height();
    let band = Rect::from_min_max(Pos2::new(cols.left, top), Pos2::new(cols.right, top + h));
    painter.rect_filled(band, 0.0, theme::bg_header());

    for cell in cells {
        let x = cols.x_at(cell.left_pct);
        let rect = Rect::from_min_size(Pos2::new(x, top), Vec2::new(cols.width_of(cell.width_pct), h));
        painter.line_segment(
            [Pos2::new(x, top), Pos2::new(x, top + h)],
            Stroke::new(0.5, theme::border_subtle()),
        );
        painter.with_clip_rect(rect).text(
            rect.center(),
            Align2::CENTER_CENTER,
            &cell.label,
            theme::font_sub(),
            theme::text_secondary(),
        );
    }

    if titles {
        for (title, x) in [
            ("Activity", cols.left + GRIP_WIDTH + 6.0),
            ("Status", cols.status_left + 8.0),
            ("Comment", cols.comment_left + 8.0),
        ] {
            painter.text(
                Pos2::new(x, top + h / 2.0),
                Align2::LEFT_CENTER,
                title,
                theme::font_header(),
                theme::text_secondary(),
            );
        }
    }

    painter.line_segment(
        [Pos2::new(cols.left, top + h), Pos2::new(cols.right, top + h)],
        Stroke::new(1.0, theme::border_subtle()),
    );
}

#[allow(clippy::too_many_arguments)]
fn paint_task_row(
    ui: &Ui,
    painter: &egui::Painter,
    cols: &Columns,
    top: f32,
    row: &TaskRow,
    controller: &InteractionController,
    is_drop_target: bool,
    format: DateFormat,
    events: &mut RowEvents,
) {
    let h = theme::row_height();
    let top = top + controller.row_offset(row.task_id);
    let rect = Rect::from_min_max(Pos2::new(cols.left, top), Pos2::new(cols.right, top + h));

    let bg = if is_drop_target {
        Some(theme::bg_drop_target())
    } else if row.selected {
        Some(theme::bg_selected())
    } else if row.index % 2 == 0 {
        Some(theme::bg_row_even())
    } else {
        None
    };
    if let Some(bg) = bg {
        painter.rect_filled(rect, 0.0, bg);
    }
    if row.selected {
        painter.rect_stroke(rect.shrink(0.5), 0.0, Stroke::new(1.0, theme::row_selected_stroke()));
    }
    painter.line_segment(
        [Pos2::new(cols.left, top + h), Pos2::new(cols.right, top + h)],
        Stroke::new(0.5, theme::grid_line()),
    );

    for pct in &row.grid_pcts {
        let x = cols.x_at(*pct);
        painter.line_segment([Pos2::new(x, top), Pos2::new(x, top + h)], Stroke::new(0.5, theme::grid_line()));
    }
    if let Some(pct) = row.today_pct {
        let x = cols.x_at(pct);
        painter.extend(Shape::dashed_line(
            &[Pos2::new(x, top), Pos2::new(x, top + h)],
            Stroke::new(1.5, theme::today_line()),
            4.0,
            3.0,
        ));
    }

    let row_response = ui.interact(rect, Id::new(("gantt-row", row.task_id)), Sense::click());
    if row_response.clicked() {
        events.clicked = Some(row.task_id);
    }

    // Name column with reorder grip
    let grip = Rect::from_min_size(Pos2::new(cols.left, top), Vec2::new(GRIP_WIDTH, h));
    painter.text(
        grip.center(),
        Align2::CENTER_CENTER,
        egui_phosphor::regular::DOTS_SIX_VERTICAL,
        theme::font_body(),
        theme::text_dim(),
    );
    let grip_response = ui.interact(grip, Id::new(("gantt-grip", row.task_id)), Sense::drag());
    if grip_response.hovered() {
        ui.ctx().set_cursor_icon(CursorIcon::Grab);
    }
    if grip_response.drag_started() {
        events.start(DragTarget::RowHandle { task: row.task_id }, &grip_response, ui);
    }
    let name_rect = Rect::from_min_max(Pos2::new(grip.right() + 6.0, top), Pos2::new(cols.chart_left - 4.0, top + h));
    painter.with_clip_rect(name_rect).text(
        Pos2::new(name_rect.left(), name_rect.center().y),
        Align2::LEFT_CENTER,
        &row.name,
        theme::font_body(),
        theme::text_primary(),
    );

    let chart_clip = Rect::from_min_max(Pos2::new(cols.chart_left, top - h), Pos2::new(cols.status_left, top + 2.0 * h));
    let chart_painter = painter.with_clip_rect(chart_clip.intersect(painter.clip_rect()));
    for bar in &row.bars {
        paint_bar(ui, &chart_painter, cols, top, row, bar, controller, format, events);
    }
    for marker in &row.markers {
        paint_marker(ui, &chart_painter, cols, top, row, marker, controller, events);
    }

    // Status and comment columns
    let cy = top + h / 2.0;
    painter.circle_filled(Pos2::new(cols.status_left + 12.0, cy), 4.0, theme::status_color(row.status));
    painter.text(
        Pos2::new(cols.status_left + 22.0, cy),
        Align2::LEFT_CENTER,
        row.status.label(),
        theme::font_small(),
        theme::text_secondary(),
    );
    if !row.comment.is_empty() {
        let comment_rect = Rect::from_min_max(Pos2::new(cols.comment_left + 8.0, top), Pos2::new(cols.right - 4.0, top + h));
        painter.with_clip_rect(comment_rect).text(
            Pos2::new(comment_rect.left(), cy),
            Align2::LEFT_CENTER,
            &row.comment,
            theme::font_small(),
            theme::text_dim(),
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_bar(
    ui: &Ui,
    painter: &egui::Painter,
    cols: &Columns,
    top: f32,
    row: &TaskRow,
    bar: &BarShape,
    controller: &InteractionController,
    format: DateFormat,
    events: &mut RowEvents,
) {
    let h = theme::row_height();
    let segment = match bar.kind {
        BarKind::Primary => None,
        BarKind::Segment(i) => Some(i),
    };
    let inset = theme::bar_inset().min(h / 2.0 - 2.0);
    let bar_rect = Rect::from_min_size(
        Pos2::new(cols.x_at(bar.left_pct), top + inset + controller.bar_offset(row.task_id, segment)),
        Vec2::new(cols.width_of(bar.width_pct).max(MIN_BAR_WIDTH), h - inset * 2.0),
    );
    let color = project_color(&bar.color, colors::DEFAULT_BAR);
    let rounding = Rounding::same(theme::bar_rounding());

    match bar.style {
        BarStyle::Dashed => {
            let (lt, rt, rb, lb) = (
                bar_rect.left_top(),
                bar_rect.right_top(),
                bar_rect.right_bottom(),
                bar_rect.left_bottom(),
            );
            painter.extend(Shape::dashed_line(&[lt, rt, rb, lb, lt], Stroke::new(1.5, color), 5.0, 3.0));
        }
        BarStyle::Hatched => {
            painter.rect_filled(bar_rect, rounding, color);
            let hatch = painter.with_clip_rect(bar_rect.intersect(painter.clip_rect()));
            let rise = bar_rect.height();
            let mut x = bar_rect.left() - rise;
            while x < bar_rect.right() {
                hatch.line_segment(
                    [Pos2::new(x, bar_rect.bottom()), Pos2::new(x + rise, bar_rect.top())],
                    Stroke::new(1.5, theme::hatch_stroke()),
                );
                x += HATCH_PITCH;
            }
        }
        BarStyle::Solid | BarStyle::None => {
            painter.rect_filled(bar_rect, rounding, color);
        }
    }
    if row.selected {
        painter.rect_stroke(bar_rect.expand(1.5), rounding, Stroke::new(1.5, theme::accent()));
    }

    let key = ("gantt-bar", row.task_id, bar.kind);
    let body = ui.interact(bar_rect, Id::new(key), Sense::click_and_drag());
    let handle_size = Vec2::new(theme::handle_width(), bar_rect.height());
    let start = ui.interact(
        Rect::from_center_size(bar_rect.left_center(), handle_size),
        Id::new((key, "start")),
        Sense::drag(),
    );
    let end = ui.interact(
        Rect::from_center_size(bar_rect.right_center(), handle_size),
        Id::new((key, "end")),
        Sense::drag(),
    );

    for (response, grip) in [(&body, BarGrip::Body), (&start, BarGrip::StartHandle), (&end, BarGrip::EndHandle)] {
        if response.drag_started() {
            let target = DragTarget::Bar {
                task: row.task_id,
                segment,
                grip,
            };
            events.start(target, response, ui);
        }
    }
    if body.clicked() {
        events.clicked = Some(row.task_id);
    }

    let dragging = controller.is_dragging();
    if start.hovered() || end.hovered() {
        ui.ctx().set_cursor_icon(CursorIcon::ResizeHorizontal);
    } else if body.hovered() && !dragging {
        ui.ctx().set_cursor_icon(CursorIcon::Grab);
    }
    if row.selected || start.hovered() || end.hovered() {
        let pill = Vec2::new(3.0, bar_rect.height() * 0.55);
        for x in [bar_rect.left() + 2.5, bar_rect.right() - 2.5] {
            let rect = Rect::from_center_size(Pos2::new(x, bar_rect.center().y), pill);
            painter.rect_filled(rect, Rounding::same(1.5), theme::handle_color());
        }
    }
    if body.hovered() && !dragging {
        egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), Id::new((key, "tip")), |ui| {
            ui.strong(&row.name);
            ui.label(format!("{}  →  {}", format.format(bar.start), format.format(bar.end)));
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_marker(
    ui: &Ui,
    painter: &egui::Painter,
    cols: &Columns,
    top: f32,
    row: &TaskRow,
    marker: &MarkerShape,
    controller: &InteractionController,
    events: &mut RowEvents,
) {
    let h = theme::row_height();
    let (offset, target, key) = match marker.kind {
        MarkerKind::Activity { index, draggable } => (
            Vec2::new(0.0, controller.activity_offset(row.task_id)),
            draggable.then_some(DragTarget::ActivityMilestone {
                task: row.task_id,
                index,
            }),
            Id::new(("gantt-activity", row.task_id, index)),
        ),
        MarkerKind::Standalone { id } => (
            controller.standalone_offset(id),
            Some(DragTarget::StandaloneMilestone { id }),
            Id::new(("gantt-standalone", id)),
        ),
    };
    let center = Pos2::new(cols.x_at(marker.center_pct), top + h * 0.36) + offset;
    let color = project_color(&marker.color, colors::ACTIVITY_MILESTONE_DEFAULT);

    if marker.done {
        painter.text(
            center,
            Align2::CENTER_CENTER,
            egui_phosphor::regular::CHECK,
            theme::font_marker(),
            color,
        );
    } else {
        painter.add(Shape::convex_polygon(
            vec![
                center + Vec2::new(0.0, -MARKER_SIZE),
                center + Vec2::new(MARKER_SIZE, MARKER_SIZE * 0.8),
                center + Vec2::new(-MARKER_SIZE, MARKER_SIZE * 0.8),
            ],
            color,
            Stroke::NONE,
        ));
    }
    let caption = match &marker.date_label {
        Some(date) => format!("{} {}", marker.label, date),
        None => marker.label.clone(),
    };
    painter.text(
        Pos2::new(center.x, top + h - 1.0 + offset.y),
        Align2::CENTER_BOTTOM,
        caption,
        theme::font_small(),
        theme::text_secondary(),
    );

    let hit = Rect::from_center_size(center, Vec2::splat(MARKER_SIZE * 2.0 + 4.0));
    let sense = if target.is_some() { Sense::click_and_drag() } else { Sense::hover() };
    let response = ui.interact(hit, key, sense);
    if let Some(target) = target {
        if response.drag_started() {
            events.start(target, &response, ui);
        }
        if response.hovered() && !controller.is_dragging() {
            ui.ctx().set_cursor_icon(CursorIcon::Grab);
        }
    }
    if response.hovered() && !controller.is_dragging() {
        egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), key.with("tip"), |ui| {
            ui.label(format!("{} {}", marker.glyph(), marker.title));
        });
    }
}

fn paint_legend(painter: &egui::Painter, cols: &Columns, top: f32, entries: &[LegendEntry]) {
    let cy = top + LEGEND_ROW_HEIGHT / 2.0;
    let mut x = cols.left + GRIP_WIDTH + 6.0;
    for entry in entries {
        let swatch = Rect::from_center_size(Pos2::new(x + 5.0, cy), Vec2::splat(10.0));
        painter.rect_filled(swatch, Rounding::same(2.0), project_color(&entry.color, colors::SCOPE_FALLBACK));
        let galley = painter.layout_no_wrap(entry.name.clone(), theme::font_small(), theme::text_secondary());
        let width = galley.size().x;
        painter.galley(Pos2::new(x + 14.0, cy - galley.size().y / 2.0), galley, theme::text_secondary());
        x += width + 32.0;
    }
}
