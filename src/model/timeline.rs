//! Date arithmetic shared by the interactive chart and the slide export.
//!
//! All offsets are whole days between calendar dates, so time of day and
//! DST never leak into positions.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::model::Task;

/// Days added before the earliest visible date.
pub const PAD_BEFORE_DAYS: i64 = 5;
/// Days added after the latest visible date.
pub const PAD_AFTER_DAYS: i64 = 10;
/// Span of the window used when nothing has a date.
pub const EMPTY_WINDOW_DAYS: i64 = 30;

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday on or after `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    start_of_week(date) + Duration::days(6)
}

/// The derived `{min, max, total}` box every position is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    /// Inclusive day count.
    pub total_days: i64,
}

/// A week gridline with its day-of-month caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekTick {
    pub date: NaiveDate,
    pub offset: i64,
    pub label: String,
}

/// A calendar month or year clipped to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarBand {
    pub label: String,
    pub offset: i64,
    pub span_days: i64,
}

impl TimelineWindow {
    /// Builds the window around a set of dates. An empty set yields the
    /// thirty days starting at `today`.
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let (min, max) = dates
            .into_iter()
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
            .unwrap_or((today, today + Duration::days(EMPTY_WINDOW_DAYS)));

        let min_date = start_of_week(min - Duration::days(PAD_BEFORE_DAYS));
        let max_date = end_of_week(max + Duration::days(PAD_AFTER_DAYS));
        Self {
            min_date,
            max_date,
            total_days: days_between(min_date, max_date) + 1,
        }
    }

    /// Window for a full task list. Hidden bars only count through their
    /// segments and activity milestones.
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        Self::from_dates(tasks.iter().flat_map(Task::visible_dates), today)
    }

    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        days_between(self.min_date, date)
    }

    pub fn date_at(&self, offset: i64) -> NaiveDate {
        self.min_date + Duration::days(offset)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min_date && date <= self.max_date
    }

    /// Fraction of the total width covered by `days`.
    pub fn fraction(&self, days: f64) -> f64 {
        days / self.total_days as f64
    }

    /// `None` when today falls outside the window.
    pub fn today_offset(&self, today: NaiveDate) -> Option<i64> {
        self.contains(today).then(|| self.offset_of(today))
    }

    pub fn week_ticks(&self) -> Vec<WeekTick> {
        let mut ticks = Vec::new();
        let mut cur = self.min_date;
        while cur <= self.max_date {
            ticks.push(WeekTick {
                date: cur,
                offset: self.offset_of(cur),
                label: format!("{}.", cur.day()),
            });
            cur += Duration::days(7);
        }
        ticks
    }

    /// Calendar months overlapping the window. With `with_year` the label
    /// carries a two-digit year suffix (`Jan '24`).
    pub fn month_bands(&self, with_year: bool) -> Vec<CalendarBand> {
        let mut bands = Vec::new();
        let mut cur = first_of_month(self.min_date);
        while cur <= self.max_date {
            let Some(next) = cur.checked_add_months(Months::new(1)) else {
                break;
            };
            let visible_start = cur.max(self.min_date);
            let visible_end = (next - Duration::days(1)).min(self.max_date);
            let mut label = visible_start.format("%b").to_string();
            if with_year {
                label.push_str(&format!(" '{:02}", visible_start.year() % 100));
            }
            bands.push(self.band(label, visible_start, visible_end));
            cur = next;
        }
        bands
    }

    pub fn year_bands(&self) -> Vec<CalendarBand> {
        let mut bands = Vec::new();
        let mut year = self.min_date.year();
        while year <= self.max_date.year() {
            let (Some(first), Some(last)) = (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ) else {
                break;
            };
            bands.push(self.band(
                year.to_string(),
                first.max(self.min_date),
                last.min(self.max_date),
            ));
            year += 1;
        }
        bands
    }

    fn band(&self, label: String, from: NaiveDate, to: NaiveDate) -> CalendarBand {
        let offset = self.offset_of(from);
        CalendarBand {
            label,
            offset,
            span_days: self.offset_of(to) - offset + 1,
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn empty_set_defaults_to_thirty_days_from_today() {
        let today = d(2024, 5, 15);
        let window = TimelineWindow::compute(&[], today);
        assert_eq!(window.min_date, start_of_week(today - Duration::days(5)));
        assert_eq!(
            window.max_date,
            end_of_week(today + Duration::days(EMPTY_WINDOW_DAYS + 10))
        );
    }

    #[test]
    fn single_task_window_is_padded_and_week_aligned() {
        let task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let window = TimelineWindow::compute(&[task], d(2024, 1, 1));
        // 2023-12-27 is a Wednesday, 2024-01-17 a Wednesday.
        assert_eq!(window.min_date, d(2023, 12, 25));
        assert_eq!(window.max_date, d(2024, 1, 21));
        assert_eq!(window.total_days, 28);
    }

    #[test]
    fn hidden_bar_dates_are_ignored() {
        let mut hidden = Task::new("Hidden", d(2020, 1, 1), d(2020, 1, 2));
        hidden.bar_style = crate::model::BarStyle::None;
        let shown = Task::new("Shown", d(2024, 1, 1), d(2024, 1, 7));
        let window = TimelineWindow::compute(&[hidden, shown], d(2024, 1, 1));
        assert_eq!(window.min_date, d(2023, 12, 25));
    }

    #[test]
    fn today_outside_window_is_none() {
        let task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let window = TimelineWindow::compute(&[task], d(2024, 1, 1));
        assert_eq!(window.today_offset(d(2024, 1, 3)), Some(9));
        assert_eq!(window.today_offset(d(2024, 6, 1)), None);
        assert_eq!(window.today_offset(d(2023, 12, 24)), None);
        assert_eq!(window.today_offset(window.max_date), Some(window.total_days - 1));
    }

    #[test]
    fn week_ticks_step_by_seven_days() {
        let task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let window = TimelineWindow::compute(&[task], d(2024, 1, 1));
        let ticks = window.week_ticks();
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[0].label, "25.");
        assert_eq!(ticks[1].label, "1.");
        assert_eq!(ticks[3].offset, 21);
    }

    #[test]
    fn month_and_year_bands_are_clipped_to_the_window() {
        let task = Task::new("A", d(2024, 1, 1), d(2024, 1, 7));
        let window = TimelineWindow::compute(&[task], d(2024, 1, 1));

        let months = window.month_bands(true);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].label, "Dec '23");
        assert_eq!(months[0].offset, 0);
        assert_eq!(months[0].span_days, 7);
        assert_eq!(months[1].label, "Jan '24");
        assert_eq!(months[1].span_days, 21);
        assert_eq!(window.month_bands(false)[1].label, "Jan");

        let years = window.year_bands();
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].label, "2023");
        assert_eq!(years[1].offset, 7);
        let spanned: i64 = years.iter().map(|y| y.span_days).sum();
        assert_eq!(spanned, window.total_days);
    }

    type TaskSpec = (i64, i64, bool, bool, Vec<(i64, i64)>, Vec<i64>);

    /// Task start, length, hidden bar, standalone flag, segment spans and
    /// activity milestone offsets, all relative to a fixed base date.
    fn task_spec() -> impl Strategy<Value = TaskSpec> {
        (
            0i64..2000,
            0i64..120,
            any::<bool>(),
            prop::bool::weighted(0.2),
            prop::collection::vec((-200i64..400, 0i64..60), 0..3),
            prop::collection::vec(-200i64..400, 0..3),
        )
    }

    fn build_task(base: NaiveDate, spec: &TaskSpec) -> Task {
        let (start, len, hidden, standalone, segments, milestones) = spec;
        let s = base + Duration::days(*start);
        if *standalone {
            return Task::new_milestone("m", s);
        }
        let mut task = Task::new("t", s, s + Duration::days(*len));
        if *hidden {
            task.bar_style = crate::model::BarStyle::None;
        }
        for (offset, seg_len) in segments {
            let seg_start = s + Duration::days(*offset);
            task.segments.push(crate::model::Segment::new(
                seg_start,
                seg_start + Duration::days(*seg_len),
                task.bar_style,
            ));
        }
        for offset in milestones {
            task.milestones
                .push(crate::model::ActivityMilestone::new("IA", s + Duration::days(*offset)));
        }
        task
    }

    proptest! {
        #[test]
        fn window_bounds_hold_for_any_task_set(
            specs in prop::collection::vec(task_spec(), 1..12)
        ) {
            let base = d(2022, 1, 1);
            let tasks: Vec<Task> = specs.iter().map(|spec| build_task(base, spec)).collect();
            let window = TimelineWindow::compute(&tasks, base);

            prop_assert_eq!(window.min_date.weekday(), Weekday::Mon);
            prop_assert_eq!(window.max_date.weekday(), Weekday::Sun);
            prop_assert_eq!(window.total_days, days_between(window.min_date, window.max_date) + 1);
            for task in &tasks {
                for date in task.visible_dates() {
                    prop_assert!(window.contains(date));
                    let offset = window.offset_of(date);
                    prop_assert!(offset >= 0 && offset < window.total_days);
                }
                for seg in &task.segments {
                    prop_assert!(window.contains(seg.start) && window.contains(seg.end));
                }
                for ms in &task.milestones {
                    prop_assert!(window.contains(ms.date));
                }
            }
        }
    }
}
