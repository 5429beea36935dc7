//! The data store the chart reads from and writes through.
//!
//! Every mutation goes through [`ProjectStore`], bumps the revision and
//! fires the single change subscriber. Drag previews write with
//! [`UpdateMode::PreviewOnly`] so listeners can skip the task table.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use super::project::Project;
use super::scope::{MilestoneType, Scope, SCOPE_PALETTE};
use super::settings::DisplaySettings;
use super::task::{ActivityMilestone, BarStyle, PinMode, Segment, Task, TaskStatus};
use crate::chart::colors;

/// Whether a write is a live drag preview or a committed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Full,
    PreviewOnly,
}

/// What a change notice asks listeners to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Chart and task table.
    Full,
    /// Chart only; produced by preview writes.
    ChartOnly,
    /// Only the highlighted row changed.
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub revision: u64,
    pub scope: ChangeScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Field-wise task edit. `None` leaves a field untouched; nested options
/// clear the field when set to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub scope: Option<Option<Uuid>>,
    pub status: Option<TaskStatus>,
    pub bar_style: Option<BarStyle>,
    pub color: Option<Option<String>>,
    pub linked_task: Option<Option<Uuid>>,
    pub comment: Option<String>,
    pub progress: Option<u8>,
}

impl TaskPatch {
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub bar_style: Option<BarStyle>,
    pub scope: Option<Option<Uuid>>,
    pub color: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub comment: Option<String>,
}

impl SegmentPatch {
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePatch {
    pub kind: Option<String>,
    pub date: Option<NaiveDate>,
    pub label: Option<String>,
    pub color: Option<Option<String>>,
    pub done: Option<bool>,
    pub pin: Option<PinMode>,
}

/// The operations the chart core needs from whoever owns the data.
pub trait GanttStore {
    fn tasks(&self) -> &[Task];
    fn scopes(&self) -> &[Scope];
    fn milestone_types(&self) -> &[MilestoneType];
    fn settings(&self) -> &DisplaySettings;
    fn selected(&self) -> Option<Uuid>;

    fn update_task(&mut self, id: Uuid, patch: TaskPatch, mode: UpdateMode);
    fn update_segment(&mut self, task: Uuid, index: usize, patch: SegmentPatch, mode: UpdateMode);
    fn update_activity_milestone(
        &mut self,
        task: Uuid,
        index: usize,
        patch: MilestonePatch,
        mode: UpdateMode,
    );
    fn reorder_task(&mut self, from: usize, to: usize);
    fn move_segment_to_task(&mut self, from: Uuid, index: usize, to: Uuid);
    fn move_bar_to_task(&mut self, from: Uuid, to: Uuid);
    fn select(&mut self, id: Option<Uuid>);

    fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    fn task_index(&self, id: Uuid) -> Option<usize> {
        self.tasks().iter().position(|t| t.id == id)
    }

    /// Effective bar colour: override, then scope, then the default.
    fn task_color(&self, task: &Task) -> String {
        colors::task_color(task, self.scopes())
    }

    fn scope_color(&self, id: Uuid) -> String {
        colors::scope_color(Some(id), self.scopes())
    }
}

type ChangeListener = Box<dyn FnMut(&ChangeNotice)>;

/// In-memory owner of a [`Project`] plus the current selection.
pub struct ProjectStore {
    project: Project,
    selected: Option<Uuid>,
    revision: u64,
    listener: Option<ChangeListener>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("project", &self.project.name)
            .field("tasks", &self.project.tasks.len())
            .field("selected", &self.selected)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(Project::default())
    }
}

impl ProjectStore {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            selected: None,
            revision: 0,
            listener: None,
        }
    }

    /// Registers the change subscriber, replacing any previous one.
    pub fn on_change(&mut self, listener: impl FnMut(&ChangeNotice) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
        self.commit(ChangeScope::Full);
    }

    /// Swaps the whole document, e.g. after opening a file.
    pub fn replace_project(&mut self, project: Project) {
        info!(name = %project.name, tasks = project.tasks.len(), "project replaced");
        self.project = project;
        self.selected = None;
        self.commit(ChangeScope::Full);
    }

    /// Stamps the modified time before saving.
    pub fn touch(&mut self) {
        self.project.touch();
    }

    fn commit(&mut self, scope: ChangeScope) {
        self.revision += 1;
        if scope != ChangeScope::Selection {
            self.project.touch();
        }
        let notice = ChangeNotice {
            revision: self.revision,
            scope,
        };
        if let Some(listener) = self.listener.as_mut() {
            listener(&notice);
        }
    }

    fn commit_mode(&mut self, mode: UpdateMode) {
        self.commit(match mode {
            UpdateMode::Full => ChangeScope::Full,
            UpdateMode::PreviewOnly => ChangeScope::ChartOnly,
        });
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.project.tasks.iter_mut().find(|t| t.id == id)
    }

    // ── Tasks ───────────────────────────────────────────────────

    /// Appends a week-long task starting `today` in the scope of the last
    /// regular task, and selects it.
    pub fn add_task(&mut self, today: NaiveDate) -> Uuid {
        let mut task = Task::new("New Task", today, today + Duration::days(7));
        task.scope = self
            .project
            .tasks
            .iter()
            .rev()
            .find(|t| t.is_regular())
            .and_then(|t| t.scope);
        self.push_task(task)
    }

    pub fn add_milestone(&mut self, today: NaiveDate) -> Uuid {
        self.push_task(Task::new_milestone("Milestone", today))
    }

    fn push_task(&mut self, task: Task) -> Uuid {
        let id = task.id;
        debug!(%id, milestone = task.is_milestone, "task added");
        self.project.tasks.push(task);
        self.selected = Some(id);
        self.commit(ChangeScope::Full);
        id
    }

    /// Removes a task, unlinks milestones that pointed at it and moves the
    /// selection to the first remaining task.
    pub fn delete_task(&mut self, id: Uuid) {
        let before = self.project.tasks.len();
        self.project.tasks.retain(|t| t.id != id);
        if self.project.tasks.len() == before {
            return;
        }
        for task in &mut self.project.tasks {
            if task.linked_task == Some(id) {
                task.linked_task = None;
            }
        }
        if self.selected == Some(id) {
            self.selected = self.project.tasks.first().map(|t| t.id);
        }
        debug!(%id, "task deleted");
        self.commit(ChangeScope::Full);
    }

    /// Swaps a task with its neighbour.
    pub fn move_task(&mut self, id: Uuid, direction: Direction) {
        let Some(idx) = self.task_index(id) else {
            return;
        };
        let target = match direction {
            Direction::Up => idx.checked_sub(1),
            Direction::Down => Some(idx + 1).filter(|t| *t < self.project.tasks.len()),
        };
        if let Some(target) = target {
            self.project.tasks.swap(idx, target);
            self.commit(ChangeScope::Full);
        }
    }

    // ── Segments ────────────────────────────────────────────────

    /// Appends a week-long segment the day after the last segment (or the
    /// task's own end).
    pub fn add_segment(&mut self, task: Uuid) -> Option<Uuid> {
        let t = self.task_mut(task).filter(|t| t.is_regular())?;
        let last_end = t.segments.last().map(|s| s.end).unwrap_or(t.end);
        let segment = Segment::new(
            last_end + Duration::days(1),
            last_end + Duration::days(7),
            t.bar_style,
        );
        let id = segment.id;
        t.segments.push(segment);
        self.commit(ChangeScope::Full);
        Some(id)
    }

    pub fn remove_segment(&mut self, task: Uuid, index: usize) {
        let Some(t) = self.task_mut(task) else {
            return;
        };
        if index < t.segments.len() {
            t.segments.remove(index);
            self.commit(ChangeScope::Full);
        }
    }

    // ── Activity milestones ─────────────────────────────────────

    /// Adds a milestone of `kind`, dated at the task's end unless given.
    pub fn add_activity_milestone(&mut self, task: Uuid, kind: &str, date: Option<NaiveDate>) {
        let Some(t) = self.task_mut(task).filter(|t| t.is_regular()) else {
            return;
        };
        let date = date.unwrap_or(t.end);
        t.milestones.push(ActivityMilestone::new(kind, date));
        self.commit(ChangeScope::Full);
    }

    pub fn remove_activity_milestone(&mut self, task: Uuid, index: usize) {
        let Some(t) = self.task_mut(task) else {
            return;
        };
        if index < t.milestones.len() {
            t.milestones.remove(index);
            self.commit(ChangeScope::Full);
        }
    }

    // ── Scopes and catalog ──────────────────────────────────────

    pub fn add_scope(&mut self, name: impl Into<String>, color: Option<String>) -> Uuid {
        let color = color.unwrap_or_else(|| {
            SCOPE_PALETTE[self.project.scopes.len() % SCOPE_PALETTE.len()].to_string()
        });
        let scope = Scope::new(name, color);
        let id = scope.id;
        self.project.scopes.push(scope);
        self.commit(ChangeScope::Full);
        id
    }

    pub fn update_scope(&mut self, id: Uuid, name: Option<String>, color: Option<String>) {
        let Some(scope) = self.project.scopes.iter_mut().find(|s| s.id == id) else {
            return;
        };
        if let Some(name) = name {
            scope.name = name;
        }
        if let Some(color) = color {
            scope.color = color;
        }
        self.commit(ChangeScope::Full);
    }

    /// Deletes a scope and clears every task and segment reference to it.
    pub fn delete_scope(&mut self, id: Uuid) {
        self.project.scopes.retain(|s| s.id != id);
        for task in &mut self.project.tasks {
            if task.scope == Some(id) {
                task.scope = None;
            }
            for seg in &mut task.segments {
                if seg.scope == Some(id) {
                    seg.scope = None;
                }
            }
        }
        self.commit(ChangeScope::Full);
    }

    pub fn add_milestone_type(&mut self, key: &str, label: &str, color: Option<&str>) {
        self.project
            .milestone_types
            .push(MilestoneType::new(key, label, color.unwrap_or(colors::SCOPE_FALLBACK)));
        self.commit(ChangeScope::Full);
    }

    pub fn update_settings(&mut self, update: impl FnOnce(&mut DisplaySettings)) {
        update(&mut self.project.settings);
        self.commit(ChangeScope::Full);
    }
}

impl GanttStore for ProjectStore {
    fn tasks(&self) -> &[Task] {
        &self.project.tasks
    }

    fn scopes(&self) -> &[Scope] {
        &self.project.scopes
    }

    fn milestone_types(&self) -> &[MilestoneType] {
        &self.project.milestone_types
    }

    fn settings(&self) -> &DisplaySettings {
        &self.project.settings
    }

    fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    fn update_task(&mut self, id: Uuid, patch: TaskPatch, mode: UpdateMode) {
        let Some(task) = self.task_mut(id) else {
            debug!(%id, "update for unknown task ignored");
            return;
        };
        let dates_changed = patch.start.is_some() || patch.end.is_some();
        if let Some(name) = patch.name {
            task.name = name;
        }
        if let Some(start) = patch.start {
            task.start = start;
        }
        if let Some(end) = patch.end {
            task.end = end;
        }
        if task.is_milestone && patch.start.is_some() && patch.end.is_none() {
            task.end = task.start;
        }
        if let Some(scope) = patch.scope {
            task.scope = scope;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(style) = patch.bar_style {
            task.bar_style = style;
        }
        if let Some(color) = patch.color {
            task.color = color;
        }
        if let Some(link) = patch.linked_task {
            task.linked_task = link;
        }
        if let Some(comment) = patch.comment {
            task.comment = comment;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress.min(100);
        }
        if dates_changed {
            task.sync_pinned_milestones();
        }
        self.commit_mode(mode);
    }

    fn update_segment(&mut self, task: Uuid, index: usize, patch: SegmentPatch, mode: UpdateMode) {
        let Some(seg) = self
            .task_mut(task)
            .and_then(|t| t.segments.get_mut(index))
        else {
            return;
        };
        if let Some(name) = patch.name {
            seg.name = name;
        }
        if let Some(start) = patch.start {
            seg.start = start;
        }
        if let Some(end) = patch.end {
            seg.end = end;
        }
        if let Some(style) = patch.bar_style {
            seg.bar_style = style.for_segment();
        }
        if let Some(scope) = patch.scope {
            seg.scope = scope;
        }
        if let Some(color) = patch.color {
            seg.color = color;
        }
        if let Some(status) = patch.status {
            seg.status = status;
        }
        if let Some(comment) = patch.comment {
            seg.comment = comment;
        }
        self.commit_mode(mode);
    }

    fn update_activity_milestone(
        &mut self,
        task: Uuid,
        index: usize,
        patch: MilestonePatch,
        mode: UpdateMode,
    ) {
        let Some(t) = self.task_mut(task) else {
            return;
        };
        let (start, end) = (t.start, t.end);
        let Some(ms) = t.milestones.get_mut(index) else {
            return;
        };
        if let Some(kind) = patch.kind {
            ms.kind = kind;
        }
        if let Some(date) = patch.date {
            ms.date = date;
        }
        if let Some(label) = patch.label {
            ms.label = label;
        }
        if let Some(color) = patch.color {
            ms.color = color;
        }
        if let Some(done) = patch.done {
            ms.done = done;
        }
        if let Some(pin) = patch.pin {
            ms.pin = pin;
        }
        match ms.pin {
            PinMode::Start => ms.date = start,
            PinMode::End => ms.date = end,
            PinMode::Manual | PinMode::Fixed => {}
        }
        self.commit_mode(mode);
    }

    fn reorder_task(&mut self, from: usize, to: usize) {
        let len = self.project.tasks.len();
        if from == to || from >= len || to >= len {
            return;
        }
        let task = self.project.tasks.remove(from);
        self.project.tasks.insert(to, task);
        debug!(from, to, "task reordered");
        self.commit(ChangeScope::Full);
    }

    fn move_segment_to_task(&mut self, from: Uuid, index: usize, to: Uuid) {
        if from == to {
            return;
        }
        let target_ok = self.task(to).is_some_and(Task::is_regular);
        let source_ok = self.task(from).is_some_and(|t| index < t.segments.len());
        if !target_ok || !source_ok {
            debug!(%from, %to, index, "segment move rejected");
            return;
        }
        let Some(segment) = self.task_mut(from).map(|t| t.segments.remove(index)) else {
            return;
        };
        if let Some(target) = self.task_mut(to) {
            target.segments.push(segment);
        }
        info!(%from, %to, "segment moved");
        self.commit(ChangeScope::Full);
    }

    fn move_bar_to_task(&mut self, from: Uuid, to: Uuid) {
        if from == to {
            return;
        }
        let (Some(source), Some(target)) = (self.task(from), self.task(to)) else {
            return;
        };
        if source.is_milestone || target.is_milestone {
            return;
        }
        let segment = Segment {
            id: Uuid::new_v4(),
            name: source.name.clone(),
            start: source.start,
            end: source.end,
            bar_style: source.bar_style.for_segment(),
            scope: source.scope,
            color: source.color.clone(),
            status: source.status,
            comment: source.comment.clone(),
        };
        if let Some(target) = self.task_mut(to) {
            target.segments.push(segment);
        }
        if let Some(source) = self.task_mut(from) {
            source.bar_style = BarStyle::None;
        }
        info!(%from, %to, "bar converted to segment");
        self.commit(ChangeScope::Full);
    }

    fn select(&mut self, id: Option<Uuid>) {
        if self.selected == id {
            return;
        }
        self.selected = id;
        self.commit(ChangeScope::Selection);
    }
}
