//! Lane assignment for standalone milestones, and scope-run scanning.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::Task;

/// Days between `date` and the task's range; zero when inside it.
pub fn gap_days(date: NaiveDate, task: &Task) -> i64 {
    if date < task.start {
        (task.start - date).num_days()
    } else if date > task.end {
        (date - task.end).num_days()
    } else {
        0
    }
}

/// The lane a standalone milestone renders on.
///
/// A live link wins. Otherwise the regular task with the smallest gap, the
/// first in order on ties. `None` only when there are no regular tasks.
pub fn resolve_lane(milestone: &Task, regular: &[&Task]) -> Option<Uuid> {
    if let Some(linked) = milestone
        .linked_task
        .filter(|id| regular.iter().any(|t| t.id == *id))
    {
        return Some(linked);
    }
    let mut best: Option<(&Task, i64)> = None;
    for task in regular {
        let gap = gap_days(milestone.start, task);
        if best.map_or(true, |(_, best_gap)| gap < best_gap) {
            best = Some((task, gap));
        }
    }
    best.map(|(task, _)| task.id)
}

/// Standalone milestones grouped by the lane they resolved to, in task order.
pub fn lane_map(tasks: &[Task]) -> HashMap<Uuid, Vec<&Task>> {
    let regular: Vec<&Task> = tasks.iter().filter(|t| t.is_regular()).collect();
    let mut lanes: HashMap<Uuid, Vec<&Task>> = HashMap::new();
    for ms in tasks.iter().filter(|t| t.is_milestone) {
        if let Some(lane) = resolve_lane(ms, &regular) {
            lanes.entry(lane).or_default().push(ms);
        }
    }
    lanes
}

/// Positions (into `regular`) where a new scope run begins after an
/// earlier one. Unscoped tasks neither start nor end a run.
pub fn scope_run_breaks(regular: &[&Task]) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut last_scope: Option<Uuid> = None;
    for (i, task) in regular.iter().enumerate() {
        let Some(scope) = task.scope else {
            continue;
        };
        if last_scope.is_some_and(|last| last != scope) {
            breaks.push(i);
        }
        last_scope = Some(scope);
    }
    breaks
}

/// Contiguous runs of same-scope tasks, with their unioned date extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRun {
    pub scope: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn scope_runs(regular: &[&Task]) -> Vec<ScopeRun> {
    let mut runs: Vec<ScopeRun> = Vec::new();
    for task in regular {
        let Some(scope) = task.scope else {
            continue;
        };
        match runs.last_mut() {
            Some(run) if run.scope == scope => {
                run.start = run.start.min(task.start);
                run.end = run.end.max(task.end);
            }
            _ => runs.push(ScopeRun {
                scope,
                start: task.start,
                end: task.end,
            }),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).expect("valid date")
    }

    #[test]
    fn overlapping_task_wins() {
        let a = Task::new("A", d(1, 1), d(1, 5));
        let b = Task::new("B", d(1, 10), d(1, 20));
        let ms = Task::new_milestone("M", d(1, 12));
        assert_eq!(resolve_lane(&ms, &[&a, &b]), Some(b.id));
    }

    #[test]
    fn nearest_gap_then_first_in_order() {
        let a = Task::new("A", d(1, 1), d(1, 5));
        let b = Task::new("B", d(1, 11), d(1, 20));
        // 3 days after A, 3 days before B: tie goes to A.
        let ms = Task::new_milestone("M", d(1, 8));
        assert_eq!(resolve_lane(&ms, &[&a, &b]), Some(a.id));
        let later = Task::new_milestone("M", d(1, 9));
        assert_eq!(resolve_lane(&later, &[&a, &b]), Some(b.id));
    }

    #[test]
    fn stale_link_falls_back_to_nearest() {
        let a = Task::new("A", d(1, 1), d(1, 5));
        let mut ms = Task::new_milestone("M", d(1, 3));
        ms.linked_task = Some(Uuid::new_v4());
        assert_eq!(resolve_lane(&ms, &[&a]), Some(a.id));
        assert_eq!(resolve_lane(&ms, &[]), None);
    }

    #[test]
    fn live_link_beats_overlap() {
        let a = Task::new("A", d(1, 1), d(1, 5));
        let b = Task::new("B", d(3, 1), d(3, 5));
        let mut ms = Task::new_milestone("M", d(1, 3));
        ms.linked_task = Some(b.id);
        assert_eq!(resolve_lane(&ms, &[&a, &b]), Some(b.id));
    }

    #[test]
    fn lane_map_groups_by_resolved_task() {
        let a = Task::new("A", d(1, 1), d(1, 5));
        let m1 = Task::new_milestone("M1", d(1, 2));
        let m2 = Task::new_milestone("M2", d(1, 4));
        let a_id = a.id;
        let tasks = vec![a, m1, m2];
        let lanes = lane_map(&tasks);
        let names: Vec<&str> = lanes[&a_id].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["M1", "M2"]);
    }

    #[test]
    fn runs_break_only_between_different_scopes() {
        let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
        let mk = |scope: Option<Uuid>, from: u32, to: u32| {
            let mut t = Task::new("t", d(1, from), d(1, to));
            t.scope = scope;
            t
        };
        let tasks = [
            mk(Some(s1), 1, 3),
            mk(None, 4, 5),
            mk(Some(s1), 2, 9),
            mk(Some(s2), 10, 12),
            mk(Some(s1), 13, 14),
        ];
        let regular: Vec<&Task> = tasks.iter().collect();
        assert_eq!(scope_run_breaks(&regular), vec![3, 4]);

        let runs = scope_runs(&regular);
        assert_eq!(runs.len(), 3);
        assert_eq!((runs[0].start, runs[0].end), (d(1, 1), d(1, 9)));
        assert_eq!(runs[1].scope, s2);
    }
}
