pub mod gantt_chart;
pub mod task_editor;
pub mod task_table;
pub mod theme;
pub mod theme_def;
pub mod theme_manager;
pub mod toolbar;
