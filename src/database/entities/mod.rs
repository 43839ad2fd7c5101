pub mod project_phases;
pub mod projects;
pub mod subsystems;
pub mod task_buckets;
pub mod task_snapshots;
pub mod tasks;
pub mod teams;

pub use project_phases::Model as ProjectPhase;
pub use projects::Model as Project;
pub use subsystems::Model as Subsystem;
pub use task_buckets::Model as TaskBucket;
pub use task_snapshots::Model as TaskStatusSnapshot;
pub use tasks::Model as Task;
pub use teams::Model as Team;
