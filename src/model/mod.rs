pub mod project;
pub mod scope;
pub mod settings;
pub mod store;
pub mod task;
pub mod timeline;

pub use project::Project;
pub use scope::{MilestoneType, Scope};
pub use settings::{DateFormat, DisplaySettings};
pub use store::{
    ChangeNotice, ChangeScope, Direction, GanttStore, MilestonePatch, ProjectStore, SegmentPatch,
    TaskPatch, UpdateMode,
};
pub use task::{ActivityMilestone, BarStyle, PinMode, Segment, Task, TaskStatus};
pub use timeline::TimelineWindow;
