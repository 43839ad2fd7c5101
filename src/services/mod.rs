pub mod daily_summary_service;
pub mod hierarchy;
pub mod import_service;
pub mod ordering;
pub mod phase_service;
pub mod project_service;
pub mod snapshot_service;
pub mod store;
pub mod subsystem_service;
pub mod task_bucket_service;
pub mod task_service;
pub mod team_service;
pub mod validation;

pub use daily_summary_service::{DailySummary, DailySummaryQuery, DailySummaryService};
pub use hierarchy::{DeletePolicy, EntityKind};
pub use import_service::{ImportService, ImportSummary, SkippedRow};
pub use ordering::OrderScope;
pub use phase_service::{NewPhase, PhaseFilter, PhasePatch, PhaseService};
pub use project_service::{NewProject, ProjectPatch, ProjectService};
pub use snapshot_service::{NewSnapshot, SnapshotFilter, SnapshotPatch, SnapshotService};
pub use store::{EntityStore, Page};
pub use subsystem_service::{NewSubsystem, SubsystemPatch, SubsystemService};
pub use task_bucket_service::{NewTaskBucket, TaskBucketFilter, TaskBucketPatch, TaskBucketService};
pub use task_service::{NewTask, TaskFilter, TaskPatch, TaskService};
pub use team_service::{NewTeam, TeamPatch, TeamService};
pub use validation::ValidationService;
