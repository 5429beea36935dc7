use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scope::{default_milestone_types, MilestoneType, Scope};
use super::settings::DisplaySettings;
use super::task::{ActivityMilestone, BarStyle, PinMode, Segment, Task, TaskStatus};

/// Everything a chart document holds. Task order is display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default = "default_milestone_types")]
    pub milestone_types: Vec<MilestoneType>,
    #[serde(default)]
    pub settings: DisplaySettings,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: "Untitled Timeline".to_string(),
            tasks: Vec::new(),
            scopes: Vec::new(),
            milestone_types: default_milestone_types(),
            settings: DisplaySettings::default(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// A deal-process timeline: three scopes, twelve tasks and four
    /// standalone milestones, anchored five weeks before `today`.
    pub fn sample(today: NaiveDate) -> Self {
        let base = today - Duration::days(35);
        let day = |n: i64| base + Duration::days(n);

        let marketing = Scope {
            description: "Market positioning and outreach".into(),
            ..Scope::new("Marketing", "#388E3C")
        };
        let diligence = Scope {
            description: "Valuation, due diligence, analysis".into(),
            ..Scope::new("Valuation & DD", "#1565C0")
        };
        let closing = Scope {
            description: "Deal negotiation and closing".into(),
            ..Scope::new("Negotiation & Closing", "#880E4F")
        };

        let task = |name: &str,
                    from: i64,
                    to: i64,
                    scope: &Scope,
                    status: TaskStatus,
                    style: BarStyle,
                    progress: u8| {
            let mut t = Task::new(name, day(from), day(to));
            t.scope = Some(scope.id);
            t.status = status;
            t.bar_style = style;
            t.progress = progress;
            t
        };
        let pinned = |kind: &str, date: NaiveDate, pin: PinMode, done: bool| {
            let mut m = ActivityMilestone::new(kind, date);
            m.pin = pin;
            m.done = done;
            m
        };

        use BarStyle::{Dashed, Hatched, Solid};
        use TaskStatus::{Complete, InProgress, NotStarted};

        let t1 = task("Teaser sent", 0, 6, &marketing, Complete, Solid, 100);
        let mut t2 = task("NDA signed", 14, 20, &marketing, Complete, Solid, 100);
        t2.milestones.push(pinned("FA", day(20), PinMode::End, true));
        let mut t3 = task("CIM sent", 14, 27, &marketing, Complete, Solid, 100);
        t3.milestones.push(pinned("IA", day(14), PinMode::Start, true));
        let mut t4 = task("Calls with Management", 28, 42, &diligence, Complete, Hatched, 100);
        t4.segments.push(Segment::new(day(45), day(48), Hatched));
        let mut t5 = task("Financial Model & Valuation", 35, 55, &diligence, Complete, Solid, 100);
        t5.milestones.push(pinned("IA", day(35), PinMode::Start, true));
        t5.milestones.push(pinned("FA", day(55), PinMode::End, false));
        let t6 = task("Expression of Interest", 42, 52, &diligence, Complete, Solid, 100);
        let mut t7 = task("Data Room Access", 42, 62, &diligence, InProgress, Solid, 60);
        t7.comment = "1 week delay".into();
        t7.milestones.push(pinned("TL", day(62), PinMode::End, false));
        let mut t8 = task("Mgmt Meetings", 49, 69, &diligence, InProgress, Hatched, 50);
        t8.comment = "3 of 6 done".into();
        let mut t9 = task("Final Due Diligence", 56, 76, &diligence, InProgress, Dashed, 20);
        t9.comment = "Delay".into();
        t9.milestones.push(pinned("FA", day(76), PinMode::End, false));
        let t10 = task("Quality of Earnings", 77, 90, &closing, NotStarted, Solid, 0);
        let mut t11 = task("Definitive Agreements", 84, 104, &closing, NotStarted, Solid, 0);
        t11.milestones.push(pinned("TL", day(104), PinMode::End, false));
        let t12 = task("Shareholders' Agreement", 91, 97, &closing, NotStarted, Solid, 0);

        let mut ms1 = Task::new_milestone("CIM reviewed", day(30));
        ms1.status = Complete;
        ms1.linked_task = Some(t3.id);
        let mut ms2 = Task::new_milestone("Non-Binding Offer", day(50));
        ms2.linked_task = Some(t6.id);
        let ms3 = Task::new_milestone("Letter of Intent", day(70));
        let ms4 = Task::new_milestone("Agreements signed", day(98));

        Self {
            name: "Sample Deal Timeline".into(),
            tasks: vec![
                t1, t2, t3, t4, t5, t6, t7, t8, t9, t10, t11, t12, ms1, ms2, ms3, ms4,
            ],
            scopes: vec![marketing, diligence, closing],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_expected_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let project = Project::sample(today);
        assert_eq!(project.scopes.len(), 3);
        assert_eq!(project.tasks.iter().filter(|t| t.is_regular()).count(), 12);
        assert_eq!(project.tasks.iter().filter(|t| t.is_milestone).count(), 4);
    }

    #[test]
    fn project_survives_json() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let project = Project::sample(today);
        let json = serde_json::to_string(&project).expect("serialize");
        let back: Project = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.tasks, project.tasks);
        assert_eq!(back.scopes, project.scopes);
    }
}
