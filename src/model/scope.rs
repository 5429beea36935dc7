use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Colours handed out to new scopes, cycling by scope count.
pub const SCOPE_PALETTE: [&str; 12] = [
    "#388E3C", "#1565C0", "#880E4F", "#E65100", "#4527A0", "#00695C", "#37474F", "#AD1457",
    "#00838F", "#BF360C", "#283593", "#558B2F",
];

/// Named grouping/colouring tag shared by tasks and segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl Scope {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            description: String::new(),
        }
    }
}

/// Catalog entry for activity milestone kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneType {
    pub key: String,
    pub label: String,
    pub color: String,
}

impl MilestoneType {
    pub fn new(key: &str, label: &str, color: &str) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

pub fn default_milestone_types() -> Vec<MilestoneType> {
    vec![
        MilestoneType::new("IA", "Initial Approval", "#E65100"),
        MilestoneType::new("FA", "Final Approval", "#2E7D32"),
        MilestoneType::new("TL", "Technical Launch", "#1565C0"),
    ]
}
