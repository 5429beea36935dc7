use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date rendering used by tooltips, the table and milestone captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "DD.MM.YYYY")]
    DayMonthYearDots,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYearSlashes,
    #[serde(rename = "YYYY-MM-DD")]
    Iso,
    #[serde(rename = "DD MMM YYYY")]
    DayMonthNameYear,
    #[serde(rename = "MMM DD")]
    MonthNameDay,
}

impl DateFormat {
    pub const ALL: [DateFormat; 5] = [
        Self::DayMonthYearDots,
        Self::MonthDayYearSlashes,
        Self::Iso,
        Self::DayMonthNameYear,
        Self::MonthNameDay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DayMonthYearDots => "DD.MM.YYYY",
            Self::MonthDayYearSlashes => "MM/DD/YYYY",
            Self::Iso => "YYYY-MM-DD",
            Self::DayMonthNameYear => "DD MMM YYYY",
            Self::MonthNameDay => "MMM DD",
        }
    }

    pub fn format(self, date: NaiveDate) -> String {
        match self {
            Self::DayMonthYearDots => date.format("%d.%m.%Y").to_string(),
            Self::MonthDayYearSlashes => date.format("%m/%d/%Y").to_string(),
            Self::Iso => date.format("%Y-%m-%d").to_string(),
            Self::DayMonthNameYear => date.format("%d %b %Y").to_string(),
            Self::MonthNameDay => format!("{} {}", date.format("%b"), date.day()),
        }
    }
}

/// Which header bands the chart shows. Any subset may be hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeScale {
    pub show_years: bool,
    pub show_months: bool,
    pub show_weeks: bool,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            show_years: true,
            show_months: true,
            show_weeks: true,
        }
    }
}

/// Per-project display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub date_format: DateFormat,
    pub time_scale: TimeScale,
    pub show_today: bool,
    pub show_ms_dates: bool,
    pub show_legend: bool,
    pub ms_color: String,
    pub preset_ms_colors: Vec<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            time_scale: TimeScale::default(),
            show_today: true,
            show_ms_dates: true,
            show_legend: true,
            ms_color: "#37474F".into(),
            preset_ms_colors: vec!["#2E7D32".into(), "#F9A825".into(), "#C62828".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_every_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");
        assert_eq!(DateFormat::DayMonthYearDots.format(date), "07.03.2024");
        assert_eq!(DateFormat::MonthDayYearSlashes.format(date), "03/07/2024");
        assert_eq!(DateFormat::Iso.format(date), "2024-03-07");
        assert_eq!(DateFormat::DayMonthNameYear.format(date), "07 Mar 2024");
        assert_eq!(DateFormat::MonthNameDay.format(date), "Mar 7");
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: DisplaySettings =
            serde_json::from_str(r#"{ "date_format": "YYYY-MM-DD" }"#).expect("parse");
        assert_eq!(settings.date_format, DateFormat::Iso);
        assert!(settings.show_today);
        assert!(settings.time_scale.show_weeks);
    }
}
