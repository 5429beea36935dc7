//! Pointer-driven editing: move, resize, reorder and retarget.
//!
//! The controller is `Idle` until a press lands on something draggable.
//! While dragging it keeps an explicit session record and writes live
//! previews through the store with [`UpdateMode::PreviewOnly`]. Release
//! always commits whatever the preview reached.

use chrono::{Duration, NaiveDate};
use egui::{Pos2, Vec2};
use tracing::{debug, info};
use uuid::Uuid;

use super::geometry;
use crate::model::{
    GanttStore, MilestonePatch, SegmentPatch, TaskPatch, TimelineWindow, UpdateMode,
};

/// What the press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// A primary bar or one of its segments (`segment = Some(index)`).
    Bar {
        task: Uuid,
        segment: Option<usize>,
        grip: BarGrip,
    },
    StandaloneMilestone { id: Uuid },
    ActivityMilestone { task: Uuid, index: usize },
    /// The reorder grip at the start of a row.
    RowHandle { task: Uuid },
}

/// Which part of a bar was grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarGrip {
    Body,
    StartHandle,
    EndHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    BarMove,
    SegmentMove,
    ResizeStart,
    ResizeEnd,
    StandaloneMove,
    ActivityMove,
    RowReorder,
}

impl DragMode {
    fn is_move(self) -> bool {
        matches!(self, Self::BarMove | Self::SegmentMove)
    }
}

/// Vertical extent of a task row in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBand {
    pub task: Uuid,
    pub top: f32,
    pub bottom: f32,
}

impl RowBand {
    fn contains(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom
    }

    fn mid(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Geometry captured when a drag begins.
#[derive(Debug, Clone)]
pub struct DragContext {
    pub window: TimelineWindow,
    pub chart_width: f32,
    pub row_height: f32,
    pub rows: Vec<RowBand>,
}

/// Pointer affordance to show while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragCursor {
    Grabbing,
    ResizeHorizontal,
}

/// Everything the presentation needs to render an active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragFeedback {
    pub tooltip: String,
    pub pointer: Pos2,
    pub cursor: DragCursor,
    pub text_selection_disabled: bool,
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing moved; the store was left alone.
    NoChange,
    Committed,
    Retargeted { to: Uuid },
    Reordered { from: usize, to: usize },
}

/// The in-memory record of one drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub mode: DragMode,
    pub task: Uuid,
    pub task_index: usize,
    pub segment: Option<usize>,
    pub milestone: Option<usize>,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
    pub linked_milestones: Vec<Uuid>,
    pub origin: Pos2,
    pub pointer: Pos2,
    context: DragContext,
    applied: (NaiveDate, NaiveDate),
    drop_target: Option<Uuid>,
    tooltip: String,
}

impl DragSession {
    fn delta(&self) -> Vec2 {
        self.pointer - self.origin
    }

    fn day_delta(&self) -> i64 {
        geometry::day_delta(
            self.delta().x,
            self.context.chart_width,
            self.context.window.total_days,
        )
    }

    /// Dates the current pointer position resolves to.
    fn resolved_dates(&self) -> (NaiveDate, NaiveDate) {
        let dd = Duration::days(self.day_delta());
        let (start, end) = (self.original_start, self.original_end);
        match self.mode {
            DragMode::BarMove | DragMode::SegmentMove => (start + dd, end + dd),
            DragMode::ResizeStart => ((start + dd).min(end), end),
            DragMode::ResizeEnd => (start, (end + dd).max(start)),
            DragMode::StandaloneMove | DragMode::ActivityMove => (start + dd, start + dd),
            DragMode::RowReorder => (start, end),
        }
    }

    fn rows_moved(&self) -> i64 {
        if self.context.row_height <= 0.0 {
            return 0;
        }
        (self.delta().y / self.context.row_height).round() as i64
    }

    fn reorder_target(&self, task_count: usize) -> usize {
        let last = task_count.saturating_sub(1) as i64;
        (self.task_index as i64 + self.rows_moved()).clamp(0, last) as usize
    }

    fn row_under_pointer(&self) -> Option<Uuid> {
        self.context
            .rows
            .iter()
            .filter(|row| row.task != self.task && row.contains(self.pointer.y))
            .last()
            .map(|row| row.task)
    }

    fn closest_row(&self) -> Option<Uuid> {
        let mut best: Option<(Uuid, f32)> = None;
        for row in &self.context.rows {
            let dist = (self.pointer.y - row.mid()).abs();
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((row.task, dist));
            }
        }
        best.map(|(task, _)| task)
    }
}

#[derive(Debug, Default)]
enum InteractionState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// One drag at a time; pointer move and release are the only transitions.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            InteractionState::Dragging(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    /// Starts a drag. Returns `false` (and stays idle) when a drag is
    /// already running, the target no longer exists, or it is pinned.
    pub fn begin(
        &mut self,
        store: &mut dyn GanttStore,
        target: DragTarget,
        pointer: Pos2,
        context: DragContext,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(session) = Self::open_session(store, target, pointer, context) else {
            debug!(?target, "drag refused");
            return false;
        };
        if session.mode != DragMode::ActivityMove {
            store.select(Some(session.task));
        }
        debug!(mode = ?session.mode, task = %session.task, "drag started");
        self.state = InteractionState::Dragging(session);
        true
    }

    fn open_session(
        store: &dyn GanttStore,
        target: DragTarget,
        pointer: Pos2,
        context: DragContext,
    ) -> Option<DragSession> {
        let format = store.settings().date_format;
        let (task_id, mode, segment, milestone) = match target {
            DragTarget::Bar { task, segment, grip } => {
                let mode = match (grip, segment) {
                    (BarGrip::StartHandle, _) => DragMode::ResizeStart,
                    (BarGrip::EndHandle, _) => DragMode::ResizeEnd,
                    (BarGrip::Body, Some(_)) => DragMode::SegmentMove,
                    (BarGrip::Body, None) => DragMode::BarMove,
                };
                (task, mode, segment, None)
            }
            DragTarget::StandaloneMilestone { id } => (id, DragMode::StandaloneMove, None, None),
            DragTarget::ActivityMilestone { task, index } => {
                (task, DragMode::ActivityMove, None, Some(index))
            }
            DragTarget::RowHandle { task } => (task, DragMode::RowReorder, None, None),
        };

        let task_index = store.task_index(task_id)?;
        let task = store.task(task_id)?;
        let (original_start, original_end) = match (segment, milestone) {
            (Some(i), _) => {
                let seg = task.segments.get(i)?;
                (seg.start, seg.end)
            }
            (None, Some(i)) => {
                let ms = task.milestones.get(i)?;
                if !ms.pin.is_draggable() {
                    return None;
                }
                (ms.date, ms.date)
            }
            (None, None) => (task.start, task.end),
        };
        if mode == DragMode::StandaloneMove && !task.is_milestone {
            return None;
        }

        let linked_milestones = if mode == DragMode::BarMove {
            store
                .tasks()
                .iter()
                .filter(|t| t.is_milestone && t.linked_task == Some(task_id))
                .map(|t| t.id)
                .collect()
        } else {
            Vec::new()
        };

        let mut session = DragSession {
            mode,
            task: task_id,
            task_index,
            segment,
            milestone,
            original_start,
            original_end,
            linked_milestones,
            origin: pointer,
            pointer,
            context,
            applied: (original_start, original_end),
            drop_target: None,
            tooltip: String::new(),
        };
        session.tooltip = tooltip_for(&session, store.tasks().len(), |d| format.format(d));
        Some(session)
    }

    /// Tracks the pointer and writes a preview when the resolved dates change.
    pub fn pointer_move(&mut self, store: &mut dyn GanttStore, pointer: Pos2) {
        let InteractionState::Dragging(session) = &mut self.state else {
            return;
        };
        session.pointer = pointer;
        session.drop_target = if session.mode.is_move() {
            session.row_under_pointer()
        } else {
            None
        };

        let format = store.settings().date_format;
        session.tooltip = tooltip_for(session, store.tasks().len(), |d| format.format(d));

        let dates = session.resolved_dates();
        if dates != session.applied && session.mode != DragMode::StandaloneMove {
            apply_dates(store, session, dates, UpdateMode::PreviewOnly);
            session.applied = dates;
        }
    }

    /// Ends the drag and commits. The controller is idle afterwards no
    /// matter what happened.
    pub fn pointer_up(&mut self, store: &mut dyn GanttStore, pointer: Pos2) -> DropOutcome {
        self.pointer_move(store, pointer);
        let InteractionState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DropOutcome::NoChange;
        };

        if session.delta() == Vec2::ZERO {
            return DropOutcome::NoChange;
        }

        let outcome = match session.mode {
            DragMode::BarMove => match session.drop_target {
                Some(to) => {
                    store.move_bar_to_task(session.task, to);
                    for ms in &session.linked_milestones {
                        let patch = TaskPatch {
                            linked_task: Some(Some(to)),
                            ..Default::default()
                        };
                        store.update_task(*ms, patch, UpdateMode::Full);
                    }
                    DropOutcome::Retargeted { to }
                }
                None => commit_dates(store, &session),
            },
            DragMode::SegmentMove => match (session.drop_target, session.segment) {
                (Some(to), Some(index)) => {
                    store.move_segment_to_task(session.task, index, to);
                    DropOutcome::Retargeted { to }
                }
                _ => commit_dates(store, &session),
            },
            DragMode::ResizeStart | DragMode::ResizeEnd | DragMode::ActivityMove => {
                commit_dates(store, &session)
            }
            DragMode::StandaloneMove => {
                let (date, _) = session.resolved_dates();
                let patch = TaskPatch {
                    start: Some(date),
                    end: Some(date),
                    linked_task: session.closest_row().map(Some),
                    ..Default::default()
                };
                store.update_task(session.task, patch, UpdateMode::Full);
                DropOutcome::Committed
            }
            DragMode::RowReorder => {
                let to = session.reorder_target(store.tasks().len());
                if to == session.task_index {
                    DropOutcome::NoChange
                } else {
                    store.reorder_task(session.task_index, to);
                    DropOutcome::Reordered {
                        from: session.task_index,
                        to,
                    }
                }
            }
        };
        info!(mode = ?session.mode, task = %session.task, ?outcome, "drag finished");
        outcome
    }

    pub fn feedback(&self) -> Option<DragFeedback> {
        let session = self.session()?;
        let cursor = match session.mode {
            DragMode::ResizeStart | DragMode::ResizeEnd => DragCursor::ResizeHorizontal,
            _ => DragCursor::Grabbing,
        };
        Some(DragFeedback {
            tooltip: session.tooltip.clone(),
            pointer: session.pointer,
            cursor,
            text_selection_disabled: true,
        })
    }

    /// Row currently highlighted as a retarget destination.
    pub fn drop_target(&self) -> Option<Uuid> {
        self.session().and_then(|s| s.drop_target)
    }

    /// Vertical preview offset for a bar (`segment = None` for the primary).
    pub fn bar_offset(&self, task: Uuid, segment: Option<usize>) -> f32 {
        match self.session() {
            Some(s) if s.mode.is_move() && s.task == task && s.segment == segment => s.delta().y,
            _ => 0.0,
        }
    }

    /// Activity milestones ride along with their moving primary bar.
    pub fn activity_offset(&self, task: Uuid) -> f32 {
        match self.session() {
            Some(s) if s.mode == DragMode::BarMove && s.task == task => s.delta().y,
            _ => 0.0,
        }
    }

    /// Preview translation for a standalone milestone.
    pub fn standalone_offset(&self, id: Uuid) -> Vec2 {
        match self.session() {
            Some(s) if s.mode == DragMode::StandaloneMove && s.task == id => s.delta(),
            Some(s) if s.mode == DragMode::BarMove && s.linked_milestones.contains(&id) => {
                Vec2::new(0.0, s.delta().y)
            }
            _ => Vec2::ZERO,
        }
    }

    /// Vertical offset of a row being reordered.
    pub fn row_offset(&self, task: Uuid) -> f32 {
        match self.session() {
            Some(s) if s.mode == DragMode::RowReorder && s.task == task => s.delta().y,
            _ => 0.0,
        }
    }
}

fn tooltip_for(
    session: &DragSession,
    task_count: usize,
    format: impl Fn(NaiveDate) -> String,
) -> String {
    let (start, end) = session.resolved_dates();
    match session.mode {
        DragMode::StandaloneMove | DragMode::ActivityMove => format(start),
        DragMode::RowReorder => format!("Row {}", session.reorder_target(task_count) + 1),
        _ => format!("{}  →  {}", format(start), format(end)),
    }
}

fn apply_dates(
    store: &mut dyn GanttStore,
    session: &DragSession,
    (start, end): (NaiveDate, NaiveDate),
    mode: UpdateMode,
) {
    match (session.mode, session.segment, session.milestone) {
        (DragMode::ActivityMove, _, Some(index)) => {
            let patch = MilestonePatch {
                date: Some(start),
                ..Default::default()
            };
            store.update_activity_milestone(session.task, index, patch, mode);
        }
        (_, Some(index), _) => {
            store.update_segment(session.task, index, SegmentPatch::dates(start, end), mode);
        }
        _ => store.update_task(session.task, TaskPatch::dates(start, end), mode),
    }
}

fn commit_dates(store: &mut dyn GanttStore, session: &DragSession) -> DropOutcome {
    if session.applied == (session.original_start, session.original_end) {
        return DropOutcome::NoChange;
    }
    apply_dates(store, session, session.applied, UpdateMode::Full);
    DropOutcome::Committed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActivityMilestone, BarStyle, ChangeScope, PinMode, Project, ProjectStore, Segment, Task,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    const ROW_H: f32 = 30.0;
    const WIDTH: f32 = 280.0;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn store_with(tasks: Vec<Task>) -> ProjectStore {
        let mut project = Project::new("drag");
        project.tasks = tasks;
        ProjectStore::new(project)
    }

    /// A 28-day window on a 280-wide chart: ten points per day.
    fn context(store: &ProjectStore) -> DragContext {
        let rows = store
            .tasks()
            .iter()
            .filter(|t| t.is_regular())
            .enumerate()
            .map(|(i, t)| RowBand {
                task: t.id,
                top: i as f32 * ROW_H,
                bottom: (i + 1) as f32 * ROW_H,
            })
            .collect();
        DragContext {
            window: TimelineWindow {
                min_date: d(2023, 12, 25),
                max_date: d(2024, 1, 21),
                total_days: 28,
            },
            chart_width: WIDTH,
            row_height: ROW_H,
            rows,
        }
    }

    fn body(task: Uuid) -> DragTarget {
        DragTarget::Bar {
            task,
            segment: None,
            grip: BarGrip::Body,
        }
    }

    #[test]
    fn moving_a_bar_shifts_both_dates() {
        let task = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        assert!(ctl.begin(&mut store, body(id), Pos2::new(100.0, 15.0), ctx));
        ctl.pointer_move(&mut store, Pos2::new(130.0, 15.0));
        let live = store.task(id).expect("task");
        assert_eq!((live.start, live.end), (d(2024, 1, 4), d(2024, 1, 10)));

        let outcome = ctl.pointer_up(&mut store, Pos2::new(130.0, 15.0));
        assert_eq!(outcome, DropOutcome::Committed);
        let done = store.task(id).expect("task");
        assert_eq!((done.start, done.end), (d(2024, 1, 4), d(2024, 1, 10)));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn previews_skip_the_table_and_drop_refreshes_it() {
        let task = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.on_change(move |n| sink.borrow_mut().push(n.scope));
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, body(id), Pos2::new(100.0, 15.0), ctx);
        ctl.pointer_move(&mut store, Pos2::new(110.0, 15.0));
        ctl.pointer_move(&mut store, Pos2::new(112.0, 15.0));
        ctl.pointer_move(&mut store, Pos2::new(120.0, 15.0));
        ctl.pointer_up(&mut store, Pos2::new(120.0, 15.0));

        assert_eq!(
            *seen.borrow(),
            vec![
                ChangeScope::Selection,
                ChangeScope::ChartOnly,
                ChangeScope::ChartOnly,
                ChangeScope::Full,
            ]
        );
    }

    #[test]
    fn resize_start_clamps_to_end() {
        let task = Task::new("t", d(2024, 1, 5), d(2024, 1, 10));
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        let target = DragTarget::Bar {
            task: id,
            segment: None,
            grip: BarGrip::StartHandle,
        };

        ctl.begin(&mut store, target, Pos2::new(110.0, 15.0), ctx);
        // Seven days right lands on 2024-01-12, past the end.
        ctl.pointer_up(&mut store, Pos2::new(180.0, 15.0));

        let task = store.task(id).expect("task");
        assert_eq!((task.start, task.end), (d(2024, 1, 10), d(2024, 1, 10)));
    }

    #[test]
    fn resize_end_never_precedes_start() {
        let task = Task::new("t", d(2024, 1, 5), d(2024, 1, 10));
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        let target = DragTarget::Bar {
            task: id,
            segment: None,
            grip: BarGrip::EndHandle,
        };

        ctl.begin(&mut store, target, Pos2::new(160.0, 15.0), ctx);
        ctl.pointer_up(&mut store, Pos2::new(0.0, 15.0));

        let task = store.task(id).expect("task");
        assert_eq!((task.start, task.end), (d(2024, 1, 5), d(2024, 1, 5)));
    }

    fn parent_with_segment() -> (ProjectStore, Uuid) {
        let mut parent = Task::new("parent", d(2024, 1, 1), d(2024, 1, 3));
        parent
            .segments
            .push(Segment::new(d(2024, 1, 5), d(2024, 1, 10), BarStyle::Solid));
        let id = parent.id;
        (store_with(vec![parent]), id)
    }

    #[test]
    fn segment_resize_start_clamps_and_leaves_parent() {
        let (mut store, id) = parent_with_segment();
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        let target = DragTarget::Bar {
            task: id,
            segment: Some(0),
            grip: BarGrip::StartHandle,
        };

        assert!(ctl.begin(&mut store, target, Pos2::new(110.0, 15.0), ctx));
        let outcome = ctl.pointer_up(&mut store, Pos2::new(180.0, 15.0));

        assert_eq!(outcome, DropOutcome::Committed);
        let parent = store.task(id).expect("parent");
        assert_eq!((parent.start, parent.end), (d(2024, 1, 1), d(2024, 1, 3)));
        let seg = &parent.segments[0];
        assert_eq!((seg.start, seg.end), (d(2024, 1, 10), d(2024, 1, 10)));
    }

    #[test]
    fn segment_resize_end_clamps_and_leaves_parent() {
        let (mut store, id) = parent_with_segment();
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        let target = DragTarget::Bar {
            task: id,
            segment: Some(0),
            grip: BarGrip::EndHandle,
        };

        assert!(ctl.begin(&mut store, target, Pos2::new(160.0, 15.0), ctx));
        ctl.pointer_move(&mut store, Pos2::new(180.0, 15.0));
        let live = &store.task(id).expect("parent").segments[0];
        assert_eq!((live.start, live.end), (d(2024, 1, 5), d(2024, 1, 12)));
        ctl.pointer_up(&mut store, Pos2::new(0.0, 15.0));

        let parent = store.task(id).expect("parent");
        assert_eq!((parent.start, parent.end), (d(2024, 1, 1), d(2024, 1, 3)));
        let seg = &parent.segments[0];
        assert_eq!((seg.start, seg.end), (d(2024, 1, 5), d(2024, 1, 5)));
    }

    #[test]
    fn dropping_a_bar_on_another_row_retargets_it() {
        let mut t1 = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        t1.color = Some("#AD1457".into());
        let t2 = Task::new("t2", d(2024, 1, 8), d(2024, 1, 12));
        let mut linked = Task::new_milestone("gate", d(2024, 1, 3));
        linked.linked_task = Some(t1.id);
        let (id1, id2, ms_id) = (t1.id, t2.id, linked.id);
        let mut store = store_with(vec![t1, t2, linked]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, body(id1), Pos2::new(100.0, 15.0), ctx);
        ctl.pointer_move(&mut store, Pos2::new(100.0, 45.0));
        assert_eq!(ctl.drop_target(), Some(id2));
        assert_eq!(ctl.bar_offset(id1, None), 30.0);
        assert_eq!(ctl.standalone_offset(ms_id), Vec2::new(0.0, 30.0));
        let outcome = ctl.pointer_up(&mut store, Pos2::new(100.0, 45.0));

        assert_eq!(outcome, DropOutcome::Retargeted { to: id2 });
        let source = store.task(id1).expect("source");
        assert_eq!(source.bar_style, BarStyle::None);
        let target = store.task(id2).expect("target");
        assert_eq!(target.segments.len(), 1);
        let seg = &target.segments[0];
        assert_eq!((seg.start, seg.end), (d(2024, 1, 1), d(2024, 1, 7)));
        assert_eq!(seg.color.as_deref(), Some("#AD1457"));
        assert_eq!(store.task(ms_id).expect("milestone").linked_task, Some(id2));
    }

    #[test]
    fn segment_drop_transfers_ownership() {
        let mut t1 = Task::new("t1", d(2024, 1, 1), d(2024, 1, 3));
        t1.segments
            .push(Segment::new(d(2024, 1, 5), d(2024, 1, 7), BarStyle::Solid));
        let t2 = Task::new("t2", d(2024, 1, 8), d(2024, 1, 12));
        let (id1, id2) = (t1.id, t2.id);
        let mut store = store_with(vec![t1, t2]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        let target = DragTarget::Bar {
            task: id1,
            segment: Some(0),
            grip: BarGrip::Body,
        };

        ctl.begin(&mut store, target, Pos2::new(120.0, 15.0), ctx);
        let outcome = ctl.pointer_up(&mut store, Pos2::new(140.0, 50.0));

        assert_eq!(outcome, DropOutcome::Retargeted { to: id2 });
        assert!(store.task(id1).expect("t1").segments.is_empty());
        let moved = &store.task(id2).expect("t2").segments[0];
        assert_eq!((moved.start, moved.end), (d(2024, 1, 7), d(2024, 1, 9)));
    }

    #[test]
    fn drop_outside_any_row_keeps_dragged_dates() {
        let task = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, body(id), Pos2::new(100.0, 15.0), ctx);
        let outcome = ctl.pointer_up(&mut store, Pos2::new(120.0, 400.0));

        assert_eq!(outcome, DropOutcome::Committed);
        let task = store.task(id).expect("task");
        assert_eq!((task.start, task.end), (d(2024, 1, 3), d(2024, 1, 9)));
        assert_eq!(task.bar_style, BarStyle::Solid);
    }

    #[test]
    fn zero_displacement_is_a_no_op() {
        let t1 = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let t2 = Task::new("t2", d(2024, 1, 8), d(2024, 1, 12));
        let id1 = t1.id;
        let mut store = store_with(vec![t1, t2]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, body(id1), Pos2::new(100.0, 15.0), ctx.clone());
        let revision = store.revision();
        assert_eq!(ctl.pointer_up(&mut store, Pos2::new(100.0, 15.0)), DropOutcome::NoChange);
        assert_eq!(store.revision(), revision);

        let handle = DragTarget::RowHandle { task: id1 };
        ctl.begin(&mut store, handle, Pos2::new(5.0, 15.0), ctx);
        assert_eq!(ctl.pointer_up(&mut store, Pos2::new(5.0, 15.0)), DropOutcome::NoChange);
        assert_eq!(store.tasks()[0].id, id1);
    }

    #[test]
    fn row_reorder_moves_by_whole_rows() {
        let tasks: Vec<Task> = (0..5)
            .map(|i| Task::new(format!("t{i}"), d(2024, 1, 1), d(2024, 1, 7)))
            .collect();
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let mut store = store_with(tasks);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, DragTarget::RowHandle { task: ids[1] }, Pos2::new(5.0, 45.0), ctx);
        ctl.pointer_move(&mut store, Pos2::new(5.0, 80.0));
        assert_eq!(ctl.row_offset(ids[1]), 35.0);
        let outcome = ctl.pointer_up(&mut store, Pos2::new(5.0, 105.0));

        assert_eq!(outcome, DropOutcome::Reordered { from: 1, to: 3 });
        let order: Vec<Uuid> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3], ids[1], ids[4]]);
    }

    #[test]
    fn row_reorder_clamps_to_list_bounds() {
        let tasks: Vec<Task> = (0..3)
            .map(|i| Task::new(format!("t{i}"), d(2024, 1, 1), d(2024, 1, 7)))
            .collect();
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let mut store = store_with(tasks);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, DragTarget::RowHandle { task: ids[1] }, Pos2::new(5.0, 45.0), ctx);
        let outcome = ctl.pointer_up(&mut store, Pos2::new(5.0, -400.0));
        assert_eq!(outcome, DropOutcome::Reordered { from: 1, to: 0 });
    }

    #[test]
    fn standalone_milestone_relinks_to_closest_row() {
        let t1 = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let t2 = Task::new("t2", d(2024, 1, 8), d(2024, 1, 12));
        let mut ms = Task::new_milestone("gate", d(2024, 1, 3));
        ms.linked_task = Some(t1.id);
        let (id2, ms_id) = (t2.id, ms.id);
        let mut store = store_with(vec![t1, t2, ms]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(
            &mut store,
            DragTarget::StandaloneMilestone { id: ms_id },
            Pos2::new(95.0, 15.0),
            ctx,
        );
        ctl.pointer_move(&mut store, Pos2::new(115.0, 40.0));
        // Free 2-D preview: nothing is written until release.
        assert_eq!(store.task(ms_id).expect("ms").start, d(2024, 1, 3));
        assert_eq!(ctl.standalone_offset(ms_id), Vec2::new(20.0, 25.0));
        assert_eq!(ctl.feedback().expect("dragging").tooltip, "05.01.2024");

        ctl.pointer_up(&mut store, Pos2::new(115.0, 40.0));
        let ms = store.task(ms_id).expect("ms");
        assert_eq!((ms.start, ms.end), (d(2024, 1, 5), d(2024, 1, 5)));
        assert_eq!(ms.linked_task, Some(id2));
    }

    #[test]
    fn pinned_activity_milestones_refuse_to_drag() {
        let mut task = Task::new("t", d(2024, 1, 1), d(2024, 1, 7));
        let mut pinned = ActivityMilestone::new("FA", d(2024, 1, 7));
        pinned.pin = PinMode::End;
        let mut fixed = ActivityMilestone::new("IA", d(2024, 1, 2));
        fixed.pin = PinMode::Fixed;
        task.milestones = vec![pinned, fixed, ActivityMilestone::new("TL", d(2024, 1, 4))];
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        for index in 0..2 {
            let target = DragTarget::ActivityMilestone { task: id, index };
            assert!(!ctl.begin(&mut store, target, Pos2::new(10.0, 15.0), ctx.clone()));
        }

        let target = DragTarget::ActivityMilestone { task: id, index: 2 };
        assert!(ctl.begin(&mut store, target, Pos2::new(100.0, 15.0), ctx));
        ctl.pointer_move(&mut store, Pos2::new(120.0, 60.0));
        assert_eq!(store.task(id).expect("task").milestones[2].date, d(2024, 1, 6));
        ctl.pointer_up(&mut store, Pos2::new(120.0, 60.0));
        assert_eq!(store.task(id).expect("task").milestones[2].date, d(2024, 1, 6));
    }

    #[test]
    fn moving_a_bar_drags_pinned_milestones_along() {
        let mut task = Task::new("t", d(2024, 1, 1), d(2024, 1, 7));
        let mut pinned = ActivityMilestone::new("FA", d(2024, 1, 7));
        pinned.pin = PinMode::End;
        task.milestones.push(pinned);
        let id = task.id;
        let mut store = store_with(vec![task]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        ctl.begin(&mut store, body(id), Pos2::new(100.0, 15.0), ctx);
        ctl.pointer_move(&mut store, Pos2::new(120.0, 15.0));
        assert_eq!(store.task(id).expect("task").milestones[0].date, d(2024, 1, 9));
        ctl.pointer_up(&mut store, Pos2::new(120.0, 15.0));
        assert_eq!(store.task(id).expect("task").milestones[0].date, d(2024, 1, 9));
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let t1 = Task::new("t1", d(2024, 1, 1), d(2024, 1, 7));
        let t2 = Task::new("t2", d(2024, 1, 8), d(2024, 1, 12));
        let (id1, id2) = (t1.id, t2.id);
        let mut store = store_with(vec![t1, t2]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();

        assert!(ctl.begin(&mut store, body(id1), Pos2::new(100.0, 15.0), ctx.clone()));
        assert!(!ctl.begin(&mut store, body(id2), Pos2::new(100.0, 45.0), ctx));
        let feedback = ctl.feedback().expect("dragging");
        assert_eq!(feedback.cursor, DragCursor::Grabbing);
        assert!(feedback.text_selection_disabled);
        assert_eq!(feedback.tooltip, "01.01.2024  →  07.01.2024");
        ctl.pointer_up(&mut store, Pos2::new(100.0, 15.0));
        assert!(ctl.feedback().is_none());
    }

    #[test]
    fn vanished_targets_are_ignored() {
        let mut store = store_with(vec![Task::new("t", d(2024, 1, 1), d(2024, 1, 7))]);
        let ctx = context(&store);
        let mut ctl = InteractionController::new();
        assert!(!ctl.begin(&mut store, body(Uuid::new_v4()), Pos2::ZERO, ctx));
        assert!(!ctl.is_dragging());
    }
}
