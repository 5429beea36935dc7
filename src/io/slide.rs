use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::chart::export;
use crate::error::{GanttError, GanttResult};
use crate::model::GanttStore;

/// Writes the slide canvas for the current project as pretty JSON.
pub fn write_slide_document(store: &dyn GanttStore, today: NaiveDate, path: &Path) -> GanttResult<()> {
    if store.tasks().is_empty() {
        return Err(GanttError::EmptyExport);
    }
    let canvas = export::project_slide(store, today);
    let json = serde_json::to_string_pretty(&canvas)?;
    std::fs::write(path, json).map_err(|e| GanttError::io(path, e))?;
    info!(path = %path.display(), shapes = canvas.shapes.len(), "slide exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::export::ExportCanvas;
    use crate::model::ProjectStore;

    #[test]
    fn empty_project_is_refused() {
        let store = ProjectStore::default();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let path = std::env::temp_dir().join("timeline-gantt-never-written.json");
        assert!(matches!(
            write_slide_document(&store, today, &path),
            Err(GanttError::EmptyExport)
        ));
    }

    #[test]
    fn written_document_parses_as_a_canvas() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let mut store = ProjectStore::default();
        store.add_task(today);
        let path = std::env::temp_dir().join(format!("timeline-gantt-slide-{}.json", uuid::Uuid::new_v4()));

        write_slide_document(&store, today, &path).expect("export");
        let json = std::fs::read_to_string(&path).expect("read back");
        let _ = std::fs::remove_file(&path);

        let canvas: ExportCanvas = serde_json::from_str(&json).expect("canvas json");
        let expected = export::project_slide(&store, today);
        assert_eq!(canvas.shapes.len(), expected.shapes.len());
        assert_eq!(canvas.font_face, expected.font_face);
    }
}
