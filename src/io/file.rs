use std::path::Path;

use tracing::info;

use crate::error::{GanttError, GanttResult};
use crate::model::Project;

/// Save a project to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> GanttResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).map_err(|e| GanttError::io(path, e))?;
    info!(path = %path.display(), tasks = project.tasks.len(), "project saved");
    Ok(())
}

/// Load a project from a JSON file.
pub fn load_project(path: &Path) -> GanttResult<Project> {
    let json = std::fs::read_to_string(path).map_err(|e| GanttError::io(path, e))?;
    let project: Project = serde_json::from_str(&json)?;
    info!(path = %path.display(), tasks = project.tasks.len(), "project loaded");
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityMilestone, Scope, Task};
    use chrono::NaiveDate;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("timeline-gantt-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn saved_project_loads_back() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date");
        let mut project = Project::new("Roadmap");
        let scope = Scope::new("Build", "#388E3C");
        let mut task = Task::new("Design", d(1), d(8));
        task.scope = Some(scope.id);
        task.milestones.push(ActivityMilestone::new("FA", d(8)));
        project.scopes.push(scope);
        project.tasks.push(task);

        let path = scratch("roundtrip");
        save_project(&project, &path).expect("save");
        let loaded = load_project(&path).expect("load");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.name, "Roadmap");
        assert_eq!(loaded.tasks, project.tasks);
        assert_eq!(loaded.scopes, project.scopes);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = scratch("missing");
        match load_project(&path) {
            Err(GanttError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let path = scratch("garbage");
        std::fs::write(&path, "{ not json").expect("write scratch file");
        let result = load_project(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(GanttError::Json(_))));
    }
}
