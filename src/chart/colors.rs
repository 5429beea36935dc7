//! Colour resolution chains shared by the chart and the export.
//!
//! Colours travel as `#RRGGBB` strings. An override that doesn't parse is
//! treated as absent so one bad value never breaks a render.

use uuid::Uuid;

use crate::model::{ActivityMilestone, DisplaySettings, MilestoneType, Scope, Segment, Task, TaskStatus};

pub const DEFAULT_BAR: &str = "#1565C0";
pub const SCOPE_FALLBACK: &str = "#607D8B";
pub const DONE: &str = "#2E7D32";
pub const ACTIVITY_MILESTONE_DEFAULT: &str = "#607D8B";
pub const STANDALONE_MILESTONE_DEFAULT: &str = "#37474F";

/// Parses `#RRGGBB` or `#RRGGBBAA` (hash optional) into RGBA bytes.
pub fn parse_hex(s: &str) -> Result<[u8; 4], String> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(format!("Invalid hex color '{}': non-ASCII input", s));
    }
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string());
    match s.len() {
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
    }
}

pub fn to_hex([r, g, b, a]: [u8; 4]) -> String {
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Canonical `#RRGGBB`, or `None` for empty or malformed input.
pub fn normalize(color: Option<&str>) -> Option<String> {
    color
        .filter(|c| !c.trim().is_empty())
        .and_then(|c| parse_hex(c).ok())
        .map(to_hex)
}

pub fn normalize_or(color: Option<&str>, fallback: &str) -> String {
    normalize(color).unwrap_or_else(|| fallback.to_string())
}

/// Bare upper-case hex without `#`, as the slide generator expects.
pub fn clean_hex(color: Option<&str>, fallback: &str) -> String {
    normalize_or(color, fallback).trim_start_matches('#').to_string()
}

fn scope_by_id(id: Uuid, scopes: &[Scope]) -> Option<&Scope> {
    scopes.iter().find(|s| s.id == id)
}

/// A scope's colour; unknown or missing scopes get the neutral fallback.
pub fn scope_color(id: Option<Uuid>, scopes: &[Scope]) -> String {
    id.and_then(|id| scope_by_id(id, scopes))
        .map(|s| normalize_or(Some(&s.color), SCOPE_FALLBACK))
        .unwrap_or_else(|| SCOPE_FALLBACK.to_string())
}

fn known_scope_color(id: Option<Uuid>, scopes: &[Scope]) -> Option<String> {
    id.and_then(|id| scope_by_id(id, scopes))
        .and_then(|s| normalize(Some(&s.color)))
}

/// Override, then scope, then the default blue.
pub fn task_color(task: &Task, scopes: &[Scope]) -> String {
    normalize(task.color.as_deref())
        .or_else(|| known_scope_color(task.scope, scopes))
        .unwrap_or_else(|| DEFAULT_BAR.to_string())
}

/// Override, then the segment's own scope, then the parent's colour.
pub fn segment_color(segment: &Segment, parent_color: &str, scopes: &[Scope]) -> String {
    normalize(segment.color.as_deref())
        .or_else(|| known_scope_color(segment.scope, scopes))
        .unwrap_or_else(|| parent_color.to_string())
}

/// Done wins; otherwise override, catalog type, global setting, default.
pub fn activity_milestone_color(
    milestone: &ActivityMilestone,
    types: &[MilestoneType],
    settings: &DisplaySettings,
) -> String {
    if milestone.done {
        return DONE.to_string();
    }
    normalize(milestone.color.as_deref())
        .or_else(|| {
            types
                .iter()
                .find(|t| t.key == milestone.kind)
                .and_then(|t| normalize(Some(&t.color)))
        })
        .or_else(|| normalize(Some(&settings.ms_color)))
        .unwrap_or_else(|| ACTIVITY_MILESTONE_DEFAULT.to_string())
}

/// Complete wins; otherwise override, global setting, default.
pub fn standalone_milestone_color(milestone: &Task, settings: &DisplaySettings) -> String {
    if milestone.status == TaskStatus::Complete {
        return DONE.to_string();
    }
    normalize(milestone.color.as_deref())
        .or_else(|| normalize(Some(&settings.ms_color)))
        .unwrap_or_else(|| STANDALONE_MILESTONE_DEFAULT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BarStyle;
    use chrono::NaiveDate;

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    #[test]
    fn normalizes_case_and_hash() {
        assert_eq!(normalize(Some("e65100")).as_deref(), Some("#E65100"));
        assert_eq!(normalize(Some("  #abcdef80 ")).as_deref(), Some("#ABCDEF80"));
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(Some("#12")), None);
        assert_eq!(normalize(Some("#GGGGGG")), None);
        assert_eq!(clean_hex(Some("#1b5e20"), DEFAULT_BAR), "1B5E20");
        assert_eq!(clean_hex(None, DEFAULT_BAR), "1565C0");
    }

    #[test]
    fn task_color_chain() {
        let scope = Scope::new("Build", "#388E3C");
        let scopes = vec![scope.clone()];
        let mut task = Task::new("A", d(), d());
        assert_eq!(task_color(&task, &scopes), DEFAULT_BAR);

        task.scope = Some(scope.id);
        assert_eq!(task_color(&task, &scopes), "#388E3C");

        task.color = Some("not a colour".into());
        assert_eq!(task_color(&task, &scopes), "#388E3C");

        task.color = Some("#ff0000".into());
        assert_eq!(task_color(&task, &scopes), "#FF0000");
    }

    #[test]
    fn stale_scope_reference_falls_back() {
        let mut task = Task::new("A", d(), d());
        task.scope = Some(Uuid::new_v4());
        assert_eq!(task_color(&task, &[]), DEFAULT_BAR);
        assert_eq!(scope_color(task.scope, &[]), SCOPE_FALLBACK);
    }

    #[test]
    fn segment_inherits_parent_when_unset() {
        let scope = Scope::new("Ops", "#00695C");
        let mut seg = Segment::new(d(), d(), BarStyle::Solid);
        assert_eq!(segment_color(&seg, "#123456", &[scope.clone()]), "#123456");
        seg.scope = Some(scope.id);
        assert_eq!(segment_color(&seg, "#123456", &[scope]), "#00695C");
    }

    #[test]
    fn milestone_colors_prefer_done() {
        let settings = DisplaySettings::default();
        let types = crate::model::scope::default_milestone_types();
        let mut ms = ActivityMilestone::new("IA", d());
        assert_eq!(activity_milestone_color(&ms, &types, &settings), "#E65100");
        ms.kind = "XX".into();
        assert_eq!(activity_milestone_color(&ms, &types, &settings), "#37474F");
        ms.color = Some("#C62828".into());
        ms.done = true;
        assert_eq!(activity_milestone_color(&ms, &types, &settings), DONE);

        let mut standalone = Task::new_milestone("Go", d());
        assert_eq!(standalone_milestone_color(&standalone, &settings), "#37474F");
        standalone.status = TaskStatus::Complete;
        assert_eq!(standalone_milestone_color(&standalone, &settings), DONE);
    }
}
