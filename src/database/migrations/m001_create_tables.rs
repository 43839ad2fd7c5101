use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teams::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Teams::EmailTo).text())
                    .col(ColumnDef::new(Teams::EmailCc).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subsystems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subsystems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subsystems::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Projects::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Projects::Description).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectPhases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectPhases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectPhases::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectPhases::Label).string().not_null())
                    .col(ColumnDef::new(ProjectPhases::Date).date())
                    .col(ColumnDef::new(ProjectPhases::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_phases_project_id")
                            .from(ProjectPhases::Table, ProjectPhases::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskBuckets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskBuckets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskBuckets::PhaseId).integer().not_null())
                    .col(ColumnDef::new(TaskBuckets::Name).string().not_null())
                    .col(ColumnDef::new(TaskBuckets::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_buckets_phase_id")
                            .from(TaskBuckets::Table, TaskBuckets::PhaseId)
                            .to(ProjectPhases::Table, ProjectPhases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::TaskBucketId).integer().not_null())
                    .col(ColumnDef::new(Tasks::SubsystemId).integer())
                    .col(ColumnDef::new(Tasks::TeamId).integer())
                    .col(ColumnDef::new(Tasks::VendorSystem).string())
                    .col(ColumnDef::new(Tasks::Subject).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).string().not_null())
                    .col(ColumnDef::new(Tasks::DetailedDescription).text())
                    .col(ColumnDef::new(Tasks::StartDate).date().not_null())
                    .col(ColumnDef::new(Tasks::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Tasks::StatusByDay)
                            .json_binary()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Tasks::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_task_bucket_id")
                            .from(Tasks::Table, Tasks::TaskBucketId)
                            .to(TaskBuckets::Table, TaskBuckets::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_subsystem_id")
                            .from(Tasks::Table, Tasks::SubsystemId)
                            .to(Subsystems::Table, Subsystems::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_team_id")
                            .from(Tasks::Table, Tasks::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskSnapshots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskSnapshots::TaskId).integer().not_null())
                    .col(ColumnDef::new(TaskSnapshots::Date).date().not_null())
                    .col(ColumnDef::new(TaskSnapshots::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_snapshots_task_id")
                            .from(TaskSnapshots::Table, TaskSnapshots::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sibling scopes and the daily summary range scan
        manager
            .create_index(
                Index::create()
                    .name("idx_project_phases_project_id")
                    .table(ProjectPhases::Table)
                    .col(ProjectPhases::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_buckets_phase_id")
                    .table(TaskBuckets::Table)
                    .col(TaskBuckets::PhaseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_task_bucket_id")
                    .table(Tasks::Table)
                    .col(Tasks::TaskBucketId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_date_range")
                    .table(Tasks::Table)
                    .col(Tasks::StartDate)
                    .col(Tasks::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_snapshots_task_id_date")
                    .table(TaskSnapshots::Table)
                    .col(TaskSnapshots::TaskId)
                    .col(TaskSnapshots::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskBuckets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectPhases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subsystems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Name,
    EmailTo,
    EmailCc,
}

#[derive(Iden)]
enum Subsystems {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
enum ProjectPhases {
    Table,
    Id,
    ProjectId,
    Label,
    Date,
    Order,
}

#[derive(Iden)]
enum TaskBuckets {
    Table,
    Id,
    PhaseId,
    Name,
    Order,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    TaskBucketId,
    SubsystemId,
    TeamId,
    VendorSystem,
    Subject,
    Description,
    DetailedDescription,
    StartDate,
    EndDate,
    StatusByDay,
    Order,
}

#[derive(Iden)]
enum TaskSnapshots {
    Table,
    Id,
    TaskId,
    Date,
    Status,
}
