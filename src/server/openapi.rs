use utoipa::OpenApi;

use crate::database::entities::{
    Project, ProjectPhase, Subsystem, Task, TaskBucket, TaskStatusSnapshot, Team,
};
use crate::server::handlers::{
    daily_summary, health, import, phases, projects, snapshots, subsystems, task_buckets, tasks,
    teams,
};
use crate::services::{
    DailySummary, ImportSummary, NewPhase, NewProject, NewSnapshot, NewSubsystem, NewTask,
    NewTaskBucket, NewTeam, PhasePatch, SkippedRow, TaskBucketPatch,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Taskboard API", description = "Project, phase, bucket and task tracking"),
    paths(
        health::health_check,
        teams::create_team,
        teams::list_teams,
        teams::get_team,
        teams::update_team,
        teams::delete_team,
        subsystems::create_subsystem,
        subsystems::list_subsystems,
        subsystems::get_subsystem,
        subsystems::update_subsystem,
        subsystems::delete_subsystem,
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        phases::create_phase,
        phases::list_phases,
        phases::list_phases_by_project,
        phases::renumber_phases,
        phases::get_phase,
        phases::update_phase,
        phases::delete_phase,
        task_buckets::create_task_bucket,
        task_buckets::list_task_buckets,
        task_buckets::renumber_task_buckets,
        task_buckets::get_task_bucket,
        task_buckets::update_task_bucket,
        task_buckets::delete_task_bucket,
        tasks::create_task,
        tasks::list_tasks,
        tasks::renumber_tasks,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        snapshots::create_snapshot,
        snapshots::list_snapshots,
        snapshots::capture_snapshots,
        snapshots::get_snapshot,
        snapshots::delete_snapshot,
        daily_summary::daily_summary,
        import::import_excel,
    ),
    components(schemas(
        Team,
        Subsystem,
        Project,
        ProjectPhase,
        TaskBucket,
        Task,
        TaskStatusSnapshot,
        NewTeam,
        NewSubsystem,
        NewProject,
        NewPhase,
        PhasePatch,
        NewTaskBucket,
        TaskBucketPatch,
        NewTask,
        NewSnapshot,
        DailySummary,
        ImportSummary,
        SkippedRow,
    ))
)]
pub struct ApiDoc;
