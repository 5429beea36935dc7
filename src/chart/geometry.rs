//! Day offsets to horizontal positions, and back.
//!
//! Both renderers share the same fractional math (`days / total_days`);
//! only the output unit differs.

use chrono::NaiveDate;

use crate::model::timeline::TimelineWindow;

/// Base chart width in points at 100% zoom.
pub const BASE_CHART_WIDTH: f32 = 900.0;

/// Maps a fraction of the timeline onto an output axis.
pub trait AxisProjector {
    /// Position of the left edge of the axis.
    fn origin(&self) -> f64;
    /// Length of the whole timeline on this axis.
    fn extent(&self) -> f64;

    fn project(&self, window: &TimelineWindow, days: f64) -> f64 {
        self.origin() + window.fraction(days) * self.extent()
    }

    fn project_span(&self, window: &TimelineWindow, span: DaySpan) -> (f64, f64) {
        (
            self.project(window, span.offset),
            window.fraction(span.days) * self.extent(),
        )
    }
}

/// Percentage of the chart column, used by the interactive view.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentProjector;

impl AxisProjector for PercentProjector {
    fn origin(&self) -> f64 {
        0.0
    }

    fn extent(&self) -> f64 {
        100.0
    }
}

/// Absolute units (inches on a slide) starting at `origin`.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalProjector {
    pub origin: f64,
    pub width: f64,
}

impl AxisProjector for PhysicalProjector {
    fn origin(&self) -> f64 {
        self.origin
    }

    fn extent(&self) -> f64 {
        self.width
    }
}

/// A horizontal run measured in days from the window start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySpan {
    pub offset: f64,
    pub days: f64,
}

/// Bars cover whole days: both `start` and `end` are inclusive.
pub fn bar_span(window: &TimelineWindow, start: NaiveDate, end: NaiveDate) -> DaySpan {
    let start_off = window.offset_of(start);
    let end_off = window.offset_of(end.max(start));
    DaySpan {
        offset: start_off as f64,
        days: (end_off - start_off + 1) as f64,
    }
}

/// Point markers sit in the middle of their day.
pub fn point_center(window: &TimelineWindow, date: NaiveDate) -> f64 {
    window.offset_of(date) as f64 + 0.5
}

/// Whole-day displacement for a horizontal pointer delta over a chart
/// rendered `chart_width` wide.
pub fn day_delta(delta_x: f32, chart_width: f32, total_days: i64) -> i64 {
    if chart_width <= 0.0 {
        return 0;
    }
    ((delta_x / chart_width) as f64 * total_days as f64).round() as i64
}

/// Date under a pointer `x` measured from the chart's left edge.
pub fn date_at(window: &TimelineWindow, x: f32, chart_width: f32) -> NaiveDate {
    window.date_at(day_delta(x, chart_width, window.total_days))
}

/// Minimum rendered chart width for a zoom percentage.
pub fn chart_min_width(zoom_percent: u32) -> f32 {
    (BASE_CHART_WIDTH * zoom_percent as f32 / 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;
    use proptest::prelude::*;

    fn window() -> TimelineWindow {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        TimelineWindow::from_dates(
            [today, today + Duration::days(6)],
            today,
        )
    }

    #[test]
    fn bar_span_is_inclusive() {
        let w = window();
        let span = bar_span(&w, w.min_date, w.min_date);
        assert_relative_eq!(span.days, 1.0);
        let (left, width) = PercentProjector.project_span(&w, span);
        assert_relative_eq!(left, 0.0);
        assert_relative_eq!(width, 100.0 / 28.0);
    }

    #[test]
    fn inverted_range_collapses_to_one_day() {
        let w = window();
        let span = bar_span(&w, w.min_date + Duration::days(3), w.min_date);
        assert_relative_eq!(span.days, 1.0);
    }

    #[test]
    fn markers_center_on_their_day() {
        let w = window();
        let center = point_center(&w, w.min_date + Duration::days(2));
        assert_relative_eq!(PercentProjector.project(&w, center), 2.5 / 28.0 * 100.0);
    }

    #[test]
    fn physical_projection_offsets_by_origin() {
        let w = window();
        let proj = PhysicalProjector {
            origin: 2.72,
            width: 7.81,
        };
        assert_relative_eq!(proj.project(&w, 0.0), 2.72);
        assert_relative_eq!(proj.project(&w, 28.0), 2.72 + 7.81, epsilon = 1e-9);
    }

    #[test]
    fn zoom_scales_minimum_width() {
        assert_relative_eq!(chart_min_width(100), 900.0);
        assert_relative_eq!(chart_min_width(150), 1350.0);
        assert_relative_eq!(chart_min_width(75), 675.0);
    }

    #[test]
    fn degenerate_chart_width_yields_no_movement() {
        assert_eq!(day_delta(40.0, 0.0, 28), 0);
    }

    proptest! {
        #[test]
        fn every_day_survives_projection_round_trip(
            start in 0i64..3000,
            len in 0i64..400,
            width in 200.0f32..4000.0,
        ) {
            let base = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
            let first = base + Duration::days(start);
            let w = TimelineWindow::from_dates([first, first + Duration::days(len)], base);
            for offset in 0..w.total_days {
                let date = w.date_at(offset);
                let pct = PercentProjector.project(&w, w.offset_of(date) as f64);
                let x = (pct / 100.0) as f32 * width;
                prop_assert_eq!(date_at(&w, x, width), date);
            }
        }
    }
}
