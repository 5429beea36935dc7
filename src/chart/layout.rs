//! Builds the ordered row list the interactive chart paints.
//!
//! Composition is a pure function of the store snapshot, the zoom level and
//! today's date, so composing twice gives equal trees.

use chrono::NaiveDate;
use uuid::Uuid;

use super::colors;
use super::geometry::{self, AxisProjector, PercentProjector};
use super::lanes;
use crate::model::{BarStyle, GanttStore, Task, TaskStatus, TimelineWindow};

pub const PLACEHOLDER_MESSAGE: &str = "Add tasks to see the Gantt chart";
pub const TODAY_LABEL: &str = "TODAY";

/// A labelled cell of a header band, in percent of the chart column.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarKind {
    Primary,
    Segment(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarShape {
    pub kind: BarKind,
    pub left_pct: f64,
    pub width_pct: f64,
    pub color: String,
    pub style: BarStyle,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Index into the lane task's activity milestones.
    Activity { index: usize, draggable: bool },
    /// A standalone milestone task resolved onto this lane.
    Standalone { id: Uuid },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerShape {
    pub kind: MarkerKind,
    pub center_pct: f64,
    pub color: String,
    pub label: String,
    pub title: String,
    pub date: NaiveDate,
    pub date_label: Option<String>,
    pub done: bool,
}

impl MarkerShape {
    pub fn glyph(&self) -> &'static str {
        if self.done {
            "✓"
        } else {
            "▲"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task_id: Uuid,
    /// Position in the full task list, milestones included.
    pub index: usize,
    pub name: String,
    pub status: TaskStatus,
    pub comment: String,
    pub selected: bool,
    pub bars: Vec<BarShape>,
    pub markers: Vec<MarkerShape>,
    pub grid_pcts: Vec<f64>,
    pub today_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualRow {
    Placeholder { message: String },
    YearHeader(Vec<HeaderCell>),
    MonthHeader(Vec<HeaderCell>),
    WeekHeader(Vec<HeaderCell>),
    ScopeSeparator { scope: Uuid },
    Task(TaskRow),
    TodayMarker { left_pct: f64, label: String },
    Legend(Vec<LegendEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub window: Option<TimelineWindow>,
    pub chart_min_width: f32,
    pub rows: Vec<VisualRow>,
}

#[cfg(test)]
impl VisualTree {
    pub fn is_placeholder(&self) -> bool {
        self.window.is_none()
    }

    pub fn task_rows(&self) -> impl Iterator<Item = &TaskRow> {
        self.rows.iter().filter_map(|row| match row {
            VisualRow::Task(task) => Some(task),
            _ => None,
        })
    }
}

fn percent_cells(window: &TimelineWindow, cells: impl Iterator<Item = (String, i64, i64)>) -> Vec<HeaderCell> {
    cells
        .map(|(label, offset, days)| HeaderCell {
            label,
            left_pct: PercentProjector.project(window, offset as f64),
            width_pct: window.fraction(days as f64) * 100.0,
        })
        .collect()
}

/// Composes the full visual tree for the current store contents.
pub fn compose(store: &dyn GanttStore, zoom_percent: u32, today: NaiveDate) -> VisualTree {
    let chart_min_width = geometry::chart_min_width(zoom_percent);
    let tasks = store.tasks();
    let regular: Vec<&Task> = tasks.iter().filter(|t| t.is_regular()).collect();

    if regular.is_empty() {
        return VisualTree {
            window: None,
            chart_min_width,
            rows: vec![VisualRow::Placeholder {
                message: PLACEHOLDER_MESSAGE.to_string(),
            }],
        };
    }

    let settings = store.settings();
    let window = TimelineWindow::compute(tasks, today);
    let mut rows = Vec::new();

    let scale = settings.time_scale;
    if scale.show_years {
        let years = window.year_bands().into_iter();
        rows.push(VisualRow::YearHeader(percent_cells(
            &window,
            years.map(|b| (b.label, b.offset, b.span_days)),
        )));
    }
    if scale.show_months {
        let months = window.month_bands(scale.show_years).into_iter();
        rows.push(VisualRow::MonthHeader(percent_cells(
            &window,
            months.map(|b| (b.label, b.offset, b.span_days)),
        )));
    }
    let ticks = window.week_ticks();
    if scale.show_weeks {
        let total = window.total_days;
        rows.push(VisualRow::WeekHeader(percent_cells(
            &window,
            ticks
                .iter()
                .map(|t| (t.label.clone(), t.offset, 7.min(total - t.offset))),
        )));
    }

    let grid_pcts: Vec<f64> = ticks
        .iter()
        .map(|t| PercentProjector.project(&window, t.offset as f64))
        .collect();
    let today_pct = settings
        .show_today
        .then(|| window.today_offset(today))
        .flatten()
        .map(|off| PercentProjector.project(&window, off as f64));

    let lane_index = lanes::lane_map(tasks);
    let breaks = lanes::scope_run_breaks(&regular);
    let selected = store.selected();

    for (pos, task) in regular.iter().enumerate() {
        if breaks.contains(&pos) {
            if let Some(scope) = task.scope {
                rows.push(VisualRow::ScopeSeparator { scope });
            }
        }
        let index = tasks.iter().position(|t| t.id == task.id).unwrap_or(pos);
        let lane_milestones = lane_index.get(&task.id).map(Vec::as_slice).unwrap_or(&[]);
        rows.push(VisualRow::Task(task_row(
            store,
            &window,
            task,
            index,
            lane_milestones,
            selected == Some(task.id),
            grid_pcts.clone(),
            today_pct,
        )));
    }

    if let Some(left_pct) = today_pct {
        rows.push(VisualRow::TodayMarker {
            left_pct,
            label: TODAY_LABEL.to_string(),
        });
    }

    let scopes = store.scopes();
    if !scopes.is_empty() && settings.show_legend {
        rows.push(VisualRow::Legend(
            scopes
                .iter()
                .map(|s| LegendEntry {
                    name: s.name.clone(),
                    color: colors::scope_color(Some(s.id), scopes),
                })
                .collect(),
        ));
    }

    VisualTree {
        window: Some(window),
        chart_min_width,
        rows,
    }
}

#[allow(clippy::too_many_arguments)]
fn task_row(
    store: &dyn GanttStore,
    window: &TimelineWindow,
    task: &Task,
    index: usize,
    lane_milestones: &[&Task],
    selected: bool,
    grid_pcts: Vec<f64>,
    today_pct: Option<f64>,
) -> TaskRow {
    let settings = store.settings();
    let scopes = store.scopes();
    let bar_color = colors::task_color(task, scopes);
    let date_label = |date: NaiveDate| {
        settings
            .show_ms_dates
            .then(|| settings.date_format.format(date))
    };

    let mut bars = Vec::with_capacity(task.segments.len() + 1);
    if task.bar_style.is_visible() {
        bars.push(bar_shape(window, BarKind::Primary, task.start, task.end, bar_color.clone(), task.bar_style));
    }
    for (i, seg) in task.segments.iter().enumerate() {
        bars.push(bar_shape(
            window,
            BarKind::Segment(i),
            seg.start,
            seg.end,
            colors::segment_color(seg, &bar_color, scopes),
            seg.bar_style.for_segment(),
        ));
    }

    let mut markers = Vec::with_capacity(task.milestones.len() + lane_milestones.len());
    for (i, ms) in task.milestones.iter().enumerate() {
        let label = ms.display_label().to_string();
        markers.push(MarkerShape {
            kind: MarkerKind::Activity {
                index: i,
                draggable: ms.pin.is_draggable(),
            },
            center_pct: PercentProjector.project(window, geometry::point_center(window, ms.date)),
            color: colors::activity_milestone_color(ms, store.milestone_types(), settings),
            title: format!("{}: {}", ms.kind, label),
            label,
            date: ms.date,
            date_label: date_label(ms.date),
            done: ms.done,
        });
    }
    for ms in lane_milestones {
        markers.push(MarkerShape {
            kind: MarkerKind::Standalone { id: ms.id },
            center_pct: PercentProjector.project(window, geometry::point_center(window, ms.start)),
            color: colors::standalone_milestone_color(ms, settings),
            label: ms.name.clone(),
            title: ms.name.clone(),
            date: ms.start,
            date_label: date_label(ms.start),
            done: ms.status == TaskStatus::Complete,
        });
    }

    TaskRow {
        task_id: task.id,
        index,
        name: task.name.clone(),
        status: task.status,
        comment: task.comment.clone(),
        selected,
        bars,
        markers,
        grid_pcts,
        today_pct,
    }
}

fn bar_shape(
    window: &TimelineWindow,
    kind: BarKind,
    start: NaiveDate,
    end: NaiveDate,
    color: String,
    style: BarStyle,
) -> BarShape {
    let (left_pct, width_pct) =
        PercentProjector.project_span(window, geometry::bar_span(window, start, end));
    BarShape {
        kind,
        left_pct,
        width_pct,
        color,
        style,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityMilestone, Project, ProjectStore, Scope, Segment};
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn store_with(tasks: Vec<Task>, scopes: Vec<Scope>) -> ProjectStore {
        let mut project = Project::new("layout");
        project.tasks = tasks;
        project.scopes = scopes;
        ProjectStore::new(project)
    }

    #[test]
    fn empty_set_is_a_bare_placeholder() {
        let store = store_with(Vec::new(), Vec::new());
        let tree = compose(&store, 100, d(2024, 1, 1));
        assert!(tree.is_placeholder());
        assert_eq!(
            tree.rows,
            vec![VisualRow::Placeholder {
                message: PLACEHOLDER_MESSAGE.into()
            }]
        );
    }

    #[test]
    fn milestones_alone_still_show_placeholder() {
        let store = store_with(vec![Task::new_milestone("M", d(2024, 1, 1))], Vec::new());
        assert!(compose(&store, 100, d(2024, 1, 1)).is_placeholder());
    }

    #[test]
    fn headers_follow_visibility_flags() {
        let mut store = store_with(vec![Task::new("A", d(2024, 1, 1), d(2024, 1, 7))], Vec::new());
        store.update_settings(|s| s.time_scale.show_months = false);
        let tree = compose(&store, 100, d(2024, 1, 1));
        assert!(matches!(tree.rows[0], VisualRow::YearHeader(_)));
        assert!(matches!(tree.rows[1], VisualRow::WeekHeader(_)));
        assert!(matches!(tree.rows[2], VisualRow::Task(_)));
    }

    #[test]
    fn task_row_geometry_matches_dates() {
        let task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let store = store_with(vec![task], Vec::new());
        let tree = compose(&store, 100, d(2024, 1, 3));
        let row = tree.task_rows().next().expect("task row");
        let bar = &row.bars[0];
        // Window is 2023-12-25..2024-01-21, 28 days.
        assert_relative_eq!(bar.left_pct, 7.0 / 28.0 * 100.0);
        assert_relative_eq!(bar.width_pct, 7.0 / 28.0 * 100.0);
        assert_eq!(bar.color, colors::DEFAULT_BAR);
        assert_eq!(row.grid_pcts.len(), 4);
        assert_relative_eq!(row.today_pct.expect("today in range"), 9.0 / 28.0 * 100.0);
        assert!(matches!(tree.rows.last(), Some(VisualRow::TodayMarker { .. })));
    }

    #[test]
    fn hidden_bar_keeps_row_and_segments() {
        let mut task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        task.bar_style = BarStyle::None;
        task.segments
            .push(Segment::new(d(2024, 1, 10), d(2024, 1, 12), BarStyle::Dashed));
        let store = store_with(vec![task], Vec::new());
        let tree = compose(&store, 100, d(2024, 1, 1));
        let row = tree.task_rows().next().expect("task row");
        assert_eq!(row.bars.len(), 1);
        assert_eq!(row.bars[0].kind, BarKind::Segment(0));
        assert_eq!(row.bars[0].style, BarStyle::Dashed);
    }

    #[test]
    fn separators_and_legend_follow_scopes() {
        let build = Scope::new("Build", "#388E3C");
        let ship = Scope::new("Ship", "#1565C0");
        let mut a = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        a.scope = Some(build.id);
        let mut b = Task::new("B", d(2024, 1, 8), d(2024, 1, 9));
        b.scope = Some(ship.id);
        let store = store_with(vec![a, b], vec![build, ship.clone()]);
        let tree = compose(&store, 100, d(2030, 1, 1));

        let kinds: Vec<&str> = tree
            .rows
            .iter()
            .map(|r| match r {
                VisualRow::ScopeSeparator { .. } => "sep",
                VisualRow::Task(_) => "task",
                VisualRow::Legend(_) => "legend",
                _ => "header",
            })
            .collect();
        assert_eq!(kinds, vec!["header", "header", "header", "task", "sep", "task", "legend"]);
        assert!(tree
            .rows
            .contains(&VisualRow::ScopeSeparator { scope: ship.id }));
    }

    #[test]
    fn standalone_milestones_ride_on_resolved_lane() {
        let mut a = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let b = Task::new("B", d(2024, 2, 1), d(2024, 2, 7));
        let ms = Task::new_milestone("Gate", d(2024, 2, 3));
        a.milestones.push(ActivityMilestone::new("IA", d(2024, 1, 2)));
        let b_id = b.id;
        let store = store_with(vec![a, ms, b], Vec::new());
        let tree = compose(&store, 100, d(2024, 1, 1));
        let rows: Vec<&TaskRow> = tree.task_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].markers.len(), 1);
        assert_eq!(rows[1].task_id, b_id);
        assert_eq!(rows[1].index, 2);
        assert!(matches!(rows[1].markers[0].kind, MarkerKind::Standalone { .. }));
        assert_eq!(rows[1].markers[0].date_label.as_deref(), Some("03.02.2024"));
    }

    #[test]
    fn composition_is_idempotent() {
        let store = ProjectStore::new(Project::sample(d(2024, 6, 1)));
        let today = d(2024, 6, 1);
        assert_eq!(compose(&store, 125, today), compose(&store, 125, today));
    }
}
