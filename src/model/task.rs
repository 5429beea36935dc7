use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Execution status shown in the status column and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Complete];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Complete => "Complete",
        }
    }
}

/// How a bar is painted. `None` keeps the task's row but draws no primary bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarStyle {
    #[default]
    Solid,
    Hatched,
    Dashed,
    None,
}

impl BarStyle {
    pub const ALL: [BarStyle; 4] = [Self::Solid, Self::Hatched, Self::Dashed, Self::None];

    pub fn label(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Hatched => "Hatched",
            Self::Dashed => "Dashed",
            Self::None => "None",
        }
    }

    pub fn is_visible(self) -> bool {
        self != Self::None
    }

    /// Segments can't be hidden; a hidden style falls back to solid.
    pub fn for_segment(self) -> Self {
        if self.is_visible() {
            self
        } else {
            Self::Solid
        }
    }
}

/// Binding of an activity milestone's date to its parent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinMode {
    #[default]
    Manual,
    Fixed,
    Start,
    End,
}

impl PinMode {
    pub const ALL: [PinMode; 4] = [Self::Manual, Self::Fixed, Self::Start, Self::End];

    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Fixed => "Fixed",
            Self::Start => "Task start",
            Self::End => "Task end",
        }
    }

    /// Only unpinned milestones accept drags.
    pub fn is_draggable(self) -> bool {
        self == Self::Manual
    }
}

/// A secondary bar owned by a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub bar_style: BarStyle,
    #[serde(default)]
    pub scope: Option<Uuid>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub comment: String,
}

impl Segment {
    pub fn new(start: NaiveDate, end: NaiveDate, bar_style: BarStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            start,
            end: end.max(start),
            bar_style: bar_style.for_segment(),
            scope: None,
            color: None,
            status: TaskStatus::NotStarted,
            comment: String::new(),
        }
    }
}

/// A point-in-time marker riding on its parent task's lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMilestone {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Key into the milestone-type catalog.
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub pin: PinMode,
}

impl ActivityMilestone {
    pub fn new(kind: impl Into<String>, date: NaiveDate) -> Self {
        let kind = kind.into();
        Self {
            id: Uuid::new_v4(),
            label: kind.clone(),
            kind,
            date,
            color: None,
            done: false,
            pin: PinMode::Manual,
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.kind
        } else {
            &self.label
        }
    }
}

/// A row of the chart, or a standalone milestone when `is_milestone` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub scope: Option<Uuid>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub bar_style: BarStyle,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub milestones: Vec<ActivityMilestone>,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub linked_task: Option<Uuid>,
    #[serde(default)]
    pub comment: String,
    /// 0..=100, informational only.
    #[serde(default)]
    pub progress: u8,
}

impl Task {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start,
            end: end.max(start),
            scope: None,
            status: TaskStatus::NotStarted,
            bar_style: BarStyle::Solid,
            color: None,
            segments: Vec::new(),
            milestones: Vec::new(),
            is_milestone: false,
            linked_task: None,
            comment: String::new(),
            progress: 0,
        }
    }

    pub fn new_milestone(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            is_milestone: true,
            ..Self::new(name, date, date)
        }
    }

    /// Regular tasks own a lane; standalone milestones borrow one.
    pub fn is_regular(&self) -> bool {
        !self.is_milestone
    }

    /// Re-applies start/end pins after the task's dates moved.
    pub fn sync_pinned_milestones(&mut self) {
        for ms in &mut self.milestones {
            match ms.pin {
                PinMode::Start => ms.date = self.start,
                PinMode::End => ms.date = self.end,
                PinMode::Manual | PinMode::Fixed => {}
            }
        }
    }

    /// Every date this task contributes to the visible window.
    pub fn visible_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let own = if self.is_milestone || self.bar_style.is_visible() {
            vec![self.start, self.end]
        } else {
            Vec::new()
        };
        own.into_iter()
            .chain(self.segments.iter().flat_map(|s| [s.start, s.end]))
            .chain(self.milestones.iter().map(|m| m.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn pins_follow_parent_dates() {
        let mut task = Task::new("Build", d(2024, 1, 1), d(2024, 1, 10));
        let mut start = ActivityMilestone::new("IA", d(2024, 1, 3));
        start.pin = PinMode::Start;
        let mut end = ActivityMilestone::new("FA", d(2024, 1, 3));
        end.pin = PinMode::End;
        let mut fixed = ActivityMilestone::new("TL", d(2024, 1, 3));
        fixed.pin = PinMode::Fixed;
        task.milestones = vec![start, end, fixed];

        task.start = d(2024, 1, 2);
        task.end = d(2024, 1, 20);
        task.sync_pinned_milestones();

        assert_eq!(task.milestones[0].date, d(2024, 1, 2));
        assert_eq!(task.milestones[1].date, d(2024, 1, 20));
        assert_eq!(task.milestones[2].date, d(2024, 1, 3));
    }

    #[test]
    fn hidden_bar_still_contributes_children() {
        let mut task = Task::new("Hidden", d(2024, 1, 1), d(2024, 1, 10));
        task.bar_style = BarStyle::None;
        task.segments
            .push(Segment::new(d(2024, 2, 1), d(2024, 2, 5), BarStyle::Hatched));
        let dates: Vec<_> = task.visible_dates().collect();
        assert_eq!(dates, vec![d(2024, 2, 1), d(2024, 2, 5)]);
    }

    #[test]
    fn hidden_style_is_not_valid_for_segments() {
        let seg = Segment::new(d(2024, 1, 1), d(2024, 1, 2), BarStyle::None);
        assert_eq!(seg.bar_style, BarStyle::Solid);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in-progress\"");
    }
}
