//! Projects the project onto a fixed-size slide canvas.
//!
//! Same window, same fractional math and same colour chains as the
//! interactive chart; only the axis is in inches. The resulting
//! [`ExportCanvas`] is a flat list of positioned shapes that a slide
//! generator can replay one-to-one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::colors;
use super::geometry::{self, AxisProjector, PhysicalProjector};
use super::lanes::{self, ScopeRun};
use crate::model::{BarStyle, GanttStore, Task, TaskStatus, TimelineWindow};

pub const SLIDE_W: f64 = 13.33;
pub const SLIDE_H: f64 = 7.5;
pub const MARGIN_L: f64 = 0.3;
pub const MARGIN_R: f64 = 0.2;
pub const MARGIN_T: f64 = 0.15;
pub const SCOPE_COL_W: f64 = 0.12;
pub const LABEL_COL_W: f64 = 2.3;
pub const STATUS_COL_W: f64 = 1.0;
pub const COMMENT_COL_W: f64 = 1.3;

pub const CHART_L: f64 = MARGIN_L + SCOPE_COL_W + LABEL_COL_W;
pub const CHART_R: f64 = SLIDE_W - MARGIN_R - STATUS_COL_W - COMMENT_COL_W;
pub const CHART_W: f64 = CHART_R - CHART_L;

pub const SCOPE_BAND_H: f64 = 0.22;
pub const MONTH_ROW_H: f64 = 0.22;
pub const DAY_ROW_H: f64 = 0.18;
pub const HEADER_H: f64 = SCOPE_BAND_H + MONTH_ROW_H + DAY_ROW_H;
pub const ROW_H: f64 = 0.28;
pub const BAR_H: f64 = 0.17;
pub const SCOPE_GAP: f64 = 0.06;
const MIN_BAR_W: f64 = 0.04;
const HATCH_PITCH: f64 = 0.06;
const HATCH_W: f64 = 0.04;

pub const FONT_FACE: &str = "Segoe UI";

const GRID: &str = "D0D4DB";
const GRID_LIGHT: &str = "ECEDF0";
const HEADER_TEXT: &str = "4A5568";
const LABEL_TEXT: &str = "1A1F36";
const MUTED_TEXT: &str = "718096";
const WHITE: &str = "FFFFFF";
const TODAY: &str = "C62828";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    #[serde(default)]
    pub dash: bool,
    /// Percent, 0 = opaque.
    #[serde(default)]
    pub transparency: u8,
}

impl LineStyle {
    fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: false,
            transparency: 0,
        }
    }

    fn dashed(color: &str, width: f64) -> Self {
        Self {
            dash: true,
            ..Self::solid(color, width)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub color: String,
    #[serde(default)]
    pub bold: bool,
}

/// One positioned primitive. Coordinates are inches from the slide's
/// top-left corner; colours are bare `RRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportShape {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Option<String>,
        line: Option<LineStyle>,
    },
    /// From `(x, y)` to `(x + w, y + h)`.
    Line {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        line: LineStyle,
    },
    Text {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        runs: Vec<TextRun>,
        align: Align,
        valign: VAlign,
        wrap: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportCanvas {
    pub width: f64,
    pub height: f64,
    pub font_face: String,
    pub shapes: Vec<ExportShape>,
}

impl ExportCanvas {
    fn new() -> Self {
        Self {
            width: SLIDE_W,
            height: SLIDE_H,
            font_face: FONT_FACE.to_string(),
            shapes: Vec::new(),
        }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Option<String>, line: Option<LineStyle>) {
        self.shapes.push(ExportShape::Rect { x, y, w, h, fill, line });
    }

    fn line(&mut self, x: f64, y: f64, w: f64, h: f64, line: LineStyle) {
        self.shapes.push(ExportShape::Line { x, y, w, h, line });
    }

    fn label(&mut self, rect: [f64; 4], run: TextRun, align: Align, valign: VAlign) {
        self.text(rect, vec![run], align, valign, false);
    }

    fn text(&mut self, [x, y, w, h]: [f64; 4], runs: Vec<TextRun>, align: Align, valign: VAlign, wrap: bool) {
        self.shapes.push(ExportShape::Text {
            x,
            y,
            w,
            h,
            runs,
            align,
            valign,
            wrap,
        });
    }
}

fn run(text: impl Into<String>, font_size: f32, color: &str, bold: bool) -> TextRun {
    TextRun {
        text: text.into(),
        font_size,
        color: color.to_string(),
        bold,
    }
}

const PROJECTOR: PhysicalProjector = PhysicalProjector {
    origin: CHART_L,
    width: CHART_W,
};

fn status_style(status: TaskStatus) -> (&'static str, &'static str) {
    match status {
        TaskStatus::Complete => ("●", "2E7D32"),
        TaskStatus::InProgress => ("◐", "1565C0"),
        TaskStatus::NotStarted => ("○", "9E9E9E"),
    }
}

/// Top of the row at `index`, counting the gaps inserted at scope breaks.
pub fn row_top(chart_top: f64, index: usize, breaks: &[usize]) -> f64 {
    let gaps = breaks.iter().filter(|b| **b <= index).count();
    chart_top + index as f64 * ROW_H + gaps as f64 * SCOPE_GAP
}

/// Lays out the whole project as one slide.
pub fn project_slide(store: &dyn GanttStore, today: NaiveDate) -> ExportCanvas {
    let tasks = store.tasks();
    let settings = store.settings();
    let window = TimelineWindow::compute(tasks, today);
    let regular: Vec<&Task> = tasks.iter().filter(|t| t.is_regular()).collect();
    let (linked, unlinked): (Vec<&Task>, Vec<&Task>) = tasks
        .iter()
        .filter(|t| t.is_milestone)
        .partition(|m| {
            m.linked_task
                .is_some_and(|id| regular.iter().any(|t| t.id == id))
        });

    let breaks = lanes::scope_run_breaks(&regular);
    let chart_top = MARGIN_T + HEADER_H;
    let body_h = regular.len() as f64 * ROW_H + breaks.len() as f64 * SCOPE_GAP;

    let mut canvas = ExportCanvas::new();
    draw_scope_bands(&mut canvas, store, &window, &lanes::scope_runs(&regular));
    draw_month_header(&mut canvas, &window, MARGIN_T + SCOPE_BAND_H);
    draw_day_header(&mut canvas, &window, MARGIN_T + SCOPE_BAND_H + MONTH_ROW_H);
    draw_column_headers(&mut canvas, MARGIN_T + SCOPE_BAND_H + MONTH_ROW_H);
    for tick in window.week_ticks() {
        let x = PROJECTOR.project(&window, tick.offset as f64);
        canvas.line(x, chart_top, 0.0, body_h, LineStyle::dashed(GRID, 0.3));
    }
    for (i, task) in regular.iter().enumerate() {
        let y = row_top(chart_top, i, &breaks);
        let on_row: Vec<&Task> = linked
            .iter()
            .copied()
            .filter(|m| m.linked_task == Some(task.id))
            .collect();
        draw_task_row(&mut canvas, store, &window, task, &on_row, y);
    }
    if settings.show_today {
        if let Some(offset) = window.today_offset(today) {
            let x = PROJECTOR.project(&window, offset as f64);
            canvas.line(x, chart_top, 0.0, body_h, LineStyle::dashed(TODAY, 1.2));
            canvas.label(
                [x - 0.22, chart_top + body_h + 0.02, 0.44, 0.14],
                run(super::layout::TODAY_LABEL, 6.0, TODAY, true),
                Align::Center,
                VAlign::Middle,
            );
        }
    }
    draw_milestone_band(&mut canvas, store, &window, &unlinked, chart_top, chart_top + body_h);
    draw_borders(&mut canvas, chart_top, body_h);
    canvas
}

fn draw_scope_bands(canvas: &mut ExportCanvas, store: &dyn GanttStore, window: &TimelineWindow, runs: &[ScopeRun]) {
    for scope_run in runs {
        let Some(scope) = store.scopes().iter().find(|s| s.id == scope_run.scope) else {
            continue;
        };
        let (x, w) = PROJECTOR.project_span(window, geometry::bar_span(window, scope_run.start, scope_run.end));
        if w < 0.01 {
            continue;
        }
        let color = colors::clean_hex(Some(&scope.color), colors::SCOPE_FALLBACK);
        canvas.rect(x, MARGIN_T, w, SCOPE_BAND_H, Some(color), None);
        canvas.label(
            [x, MARGIN_T, w, SCOPE_BAND_H],
            run(scope.name.to_uppercase(), 7.0, WHITE, true),
            Align::Center,
            VAlign::Middle,
        );
    }
}

fn draw_month_header(canvas: &mut ExportCanvas, window: &TimelineWindow, top: f64) {
    canvas.rect(CHART_L, top, CHART_W, MONTH_ROW_H, Some(WHITE.into()), Some(LineStyle::solid(GRID, 0.3)));
    for band in window.month_bands(false) {
        let x = PROJECTOR.project(window, band.offset as f64);
        let w = window.fraction(band.span_days as f64) * CHART_W;
        if w < 0.01 {
            continue;
        }
        canvas.line(x, top, 0.0, MONTH_ROW_H, LineStyle::solid(GRID, 0.4));
        canvas.label(
            [x, top, w, MONTH_ROW_H],
            run(band.label, 8.0, HEADER_TEXT, true),
            Align::Center,
            VAlign::Middle,
        );
    }
}

fn draw_day_header(canvas: &mut ExportCanvas, window: &TimelineWindow, top: f64) {
    for tick in window.week_ticks() {
        let x = PROJECTOR.project(window, tick.offset as f64);
        canvas.label(
            [x - 0.12, top, 0.24, DAY_ROW_H],
            run(tick.label, 7.0, MUTED_TEXT, false),
            Align::Center,
            VAlign::Middle,
        );
    }
}

fn draw_column_headers(canvas: &mut ExportCanvas, top: f64) {
    let columns = [
        ("Activity", MARGIN_L + SCOPE_COL_W + 0.08, LABEL_COL_W - 0.16),
        ("Status", CHART_R + 0.05, STATUS_COL_W - 0.1),
        ("Comment", CHART_R + STATUS_COL_W + 0.05, COMMENT_COL_W - 0.1),
    ];
    for (title, x, w) in columns {
        canvas.label(
            [x, top, w, DAY_ROW_H],
            run(title, 7.0, HEADER_TEXT, true),
            Align::Left,
            VAlign::Middle,
        );
    }
}

fn draw_bar(canvas: &mut ExportCanvas, window: &TimelineWindow, start: NaiveDate, end: NaiveDate, color: String, style: BarStyle, row_y: f64) {
    if !style.is_visible() {
        return;
    }
    let (x, w) = PROJECTOR.project_span(window, geometry::bar_span(window, start, end));
    let w = w.max(MIN_BAR_W);
    let y = row_y + (ROW_H - BAR_H) / 2.0;
    match style {
        BarStyle::Dashed => canvas.rect(x, y, w, BAR_H, None, Some(LineStyle::dashed(&color, 1.2))),
        BarStyle::Hatched => {
            canvas.rect(x, y, w, BAR_H, Some(color), None);
            let strokes = (w / HATCH_PITCH).ceil() as usize;
            for i in 0..strokes {
                let line = LineStyle {
                    transparency: 50,
                    ..LineStyle::solid(WHITE, 0.4)
                };
                canvas.line(x + i as f64 * HATCH_PITCH, y, HATCH_W, BAR_H, line);
            }
        }
        BarStyle::Solid | BarStyle::None => canvas.rect(x, y, w, BAR_H, Some(color), None),
    }
}

fn draw_task_row(
    canvas: &mut ExportCanvas,
    store: &dyn GanttStore,
    window: &TimelineWindow,
    task: &Task,
    linked: &[&Task],
    y: f64,
) {
    let scopes = store.scopes();
    let settings = store.settings();
    canvas.line(MARGIN_L, y + ROW_H, SLIDE_W - MARGIN_L - MARGIN_R, 0.0, LineStyle::solid(GRID_LIGHT, 0.3));

    if let Some(scope) = task.scope.and_then(|id| scopes.iter().find(|s| s.id == id)) {
        let color = colors::clean_hex(Some(&scope.color), colors::SCOPE_FALLBACK);
        canvas.rect(MARGIN_L, y, SCOPE_COL_W - 0.02, ROW_H, Some(color), None);
    }
    canvas.label(
        [MARGIN_L + SCOPE_COL_W + 0.08, y, LABEL_COL_W - 0.16, ROW_H],
        run(&task.name, 8.0, LABEL_TEXT, false),
        Align::Left,
        VAlign::Middle,
    );

    let bar_color = colors::task_color(task, scopes);
    draw_bar(canvas, window, task.start, task.end, bare(&bar_color), task.bar_style, y);
    for seg in &task.segments {
        let color = colors::segment_color(seg, &bar_color, scopes);
        draw_bar(canvas, window, seg.start, seg.end, bare(&color), seg.bar_style.for_segment(), y);
    }

    for ms in &task.milestones {
        let x = PROJECTOR.project(window, geometry::point_center(window, ms.date));
        let color = colors::activity_milestone_color(ms, store.milestone_types(), settings);
        let glyph = if ms.done { "✓" } else { "▲" };
        canvas.label([x - 0.06, y, 0.12, ROW_H * 0.6], run(glyph, 8.0, &bare(&color), false), Align::Center, VAlign::Middle);
        canvas.label(
            [x - 0.15, y + ROW_H * 0.5, 0.3, ROW_H * 0.5],
            run(&ms.kind, 5.0, HEADER_TEXT, true),
            Align::Center,
            VAlign::Top,
        );
    }
    for ms in linked {
        let x = PROJECTOR.project(window, geometry::point_center(window, ms.start));
        let color = colors::standalone_milestone_color(ms, settings);
        canvas.label([x - 0.08, y, 0.16, ROW_H * 0.6], run("▲", 8.0, &bare(&color), false), Align::Center, VAlign::Middle);
        canvas.text(
            [x - 0.4, y + ROW_H * 0.55, 0.8, ROW_H * 0.45],
            vec![run(&ms.name, 5.0, HEADER_TEXT, false)],
            Align::Center,
            VAlign::Top,
            true,
        );
    }

    let (dot, dot_color) = status_style(task.status);
    canvas.text(
        [CHART_R + 0.05, y, STATUS_COL_W - 0.1, ROW_H],
        vec![
            run(format!("{dot} "), 8.0, dot_color, false),
            run(task.status.label(), 7.0, MUTED_TEXT, false),
        ],
        Align::Left,
        VAlign::Middle,
        false,
    );
    if !task.comment.is_empty() {
        canvas.label(
            [CHART_R + STATUS_COL_W + 0.05, y, COMMENT_COL_W - 0.1, ROW_H],
            run(&task.comment, 7.0, MUTED_TEXT, false),
            Align::Left,
            VAlign::Middle,
        );
    }
}

/// Unlinked standalone milestones sit in a band under the body, with a
/// guide line running up through the rows.
fn draw_milestone_band(
    canvas: &mut ExportCanvas,
    store: &dyn GanttStore,
    window: &TimelineWindow,
    milestones: &[&Task],
    chart_top: f64,
    top: f64,
) {
    if milestones.is_empty() {
        return;
    }
    canvas.line(CHART_L, top, CHART_W, 0.0, LineStyle::solid(GRID, 0.8));
    for ms in milestones {
        let x = PROJECTOR.project(window, geometry::point_center(window, ms.start));
        let color = colors::standalone_milestone_color(ms, store.settings());
        canvas.line(x, chart_top, 0.0, top - chart_top, LineStyle::dashed(GRID, 0.5));
        canvas.label([x - 0.08, top + 0.02, 0.16, 0.14], run("▲", 8.0, &bare(&color), false), Align::Center, VAlign::Middle);
        canvas.text(
            [x - 0.5, top + 0.16, 1.0, 0.35],
            vec![run(&ms.name, 6.0, HEADER_TEXT, false)],
            Align::Center,
            VAlign::Top,
            true,
        );
    }
}

fn draw_borders(canvas: &mut ExportCanvas, chart_top: f64, body_h: f64) {
    let full_w = SLIDE_W - MARGIN_L - MARGIN_R;
    let header_bottom = MARGIN_T + SCOPE_BAND_H + MONTH_ROW_H;
    let column_h = chart_top + body_h - header_bottom;
    canvas.line(MARGIN_L, chart_top, full_w, 0.0, LineStyle::solid(GRID, 0.6));
    canvas.line(MARGIN_L, chart_top + body_h, full_w, 0.0, LineStyle::solid(GRID, 0.6));
    canvas.line(CHART_L, chart_top, 0.0, body_h, LineStyle::solid(GRID, 0.4));
    canvas.line(CHART_R, header_bottom, 0.0, column_h, LineStyle::solid(GRID, 0.3));
    canvas.line(CHART_R + STATUS_COL_W, header_bottom, 0.0, column_h, LineStyle::solid(GRID, 0.3));
}

fn bare(color: &str) -> String {
    colors::clean_hex(Some(color), colors::DEFAULT_BAR)
}
