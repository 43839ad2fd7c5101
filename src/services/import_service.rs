//! Bulk task import from an xlsx workbook
//!
//! Only the first worksheet is read. The header row names the columns
//! (case-insensitive); every following row becomes one task, with its
//! project, phase, bucket, team and subsystem found or created by name.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Range, Reader, Xlsx};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::{
    project_phases, projects, subsystems, task_buckets, tasks::STATUS_DATE_FORMAT, teams,
};
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::EntityKind;
use crate::services::ordering::{self, OrderScope};
use crate::services::task_service::{insert_task, NewTask};
use crate::services::validation::ValidationService;

const REQUIRED_COLUMNS: [&str; 5] = ["project", "phase", "bucket", "subject", "description"];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SkippedRow {
    /// 1-based sheet row, the header being row 1
    pub row: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct ImportSummary {
    pub rows_read: usize,
    pub tasks_created: usize,
    pub projects_created: usize,
    pub phases_created: usize,
    pub buckets_created: usize,
    pub teams_created: usize,
    pub subsystems_created: usize,
    pub skipped: Vec<SkippedRow>,
}

/// One data row after cell conversion and date resolution
#[derive(Debug)]
struct ImportRow {
    project: String,
    phase: String,
    bucket: String,
    subject: String,
    description: String,
    team: Option<String>,
    subsystem: Option<String>,
    vendor_system: Option<String>,
    detailed_description: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: Option<String>,
}

/// Column index by lowercase header name
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &[Data]) -> TrackerResult<Self> {
        let map: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell_text(cell).map(|name| (name.to_lowercase(), idx)))
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !map.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(TrackerError::invalid_argument(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }
        Ok(Self(map))
    }

    fn cell<'a>(&self, row: &'a [Data], name: &str) -> Option<&'a Data> {
        self.0.get(name).and_then(|idx| row.get(*idx))
    }

    fn text(&self, row: &[Data], name: &str) -> Option<String> {
        self.cell(row, name).and_then(cell_text)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell.as_date()?.format(STATUS_DATE_FORMAT).to_string(),
        Data::Error(_) | Data::Empty => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn cell_date(cell: &Data) -> TrackerResult<Option<NaiveDate>> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => ValidationService::parse_date(s).map(Some),
        other => other
            .as_date()
            .map(Some)
            .ok_or_else(|| TrackerError::invalid_argument(format!("'{}' is not a date", other))),
    }
}

impl ImportRow {
    fn parse(columns: &Columns, cells: &[Data]) -> Result<Self, String> {
        let required = |name: &str| {
            columns
                .text(cells, name)
                .ok_or_else(|| format!("missing {}", name))
        };

        // Parent names follow the CRUD name rules
        let named = |name: &str, kind: EntityKind| -> Result<String, String> {
            let value = required(name)?;
            ValidationService::validate_name(kind, &value).map_err(|e| e.to_string())?;
            Ok(value)
        };
        let optional_named = |name: &str, kind: EntityKind| -> Result<Option<String>, String> {
            match columns.text(cells, name) {
                Some(value) => {
                    ValidationService::validate_name(kind, &value).map_err(|e| e.to_string())?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        };

        let date = |name: &str| match columns.cell(cells, name) {
            Some(cell) => cell_date(cell).map_err(|e| format!("{}: {}", name, e)),
            None => Ok(None),
        };

        let (start_date, end_date) = match (date("start_date")?, date("end_date")?) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => (start, start),
            (None, Some(end)) => (end, end),
            (None, None) => return Err("missing start_date and end_date".to_string()),
        };
        if end_date < start_date {
            return Err(format!(
                "end_date {} is before start_date {}",
                end_date, start_date
            ));
        }

        Ok(Self {
            project: named("project", EntityKind::Project)?,
            phase: named("phase", EntityKind::ProjectPhase)?,
            bucket: named("bucket", EntityKind::TaskBucket)?,
            subject: required("subject")?,
            description: required("description")?,
            team: optional_named("team", EntityKind::Team)?,
            subsystem: optional_named("subsystem", EntityKind::Subsystem)?,
            vendor_system: columns.text(cells, "vendor_system"),
            detailed_description: columns.text(cells, "detailed_description"),
            start_date,
            end_date,
            status: columns.text(cells, "status"),
        })
    }
}

/// Reads the first worksheet into parsed rows and rows to skip
fn read_rows(range: &Range<Data>) -> TrackerResult<(Vec<(usize, ImportRow)>, Vec<SkippedRow>)> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| TrackerError::invalid_argument("Worksheet is empty"))?;
    let columns = Columns::from_header(header)?;

    let mut parsed = Vec::new();
    let mut skipped = Vec::new();
    for (idx, cells) in rows.enumerate() {
        let row = idx + 2;
        if cells.iter().all(|cell| cell_text(cell).is_none()) {
            continue;
        }
        match ImportRow::parse(&columns, cells) {
            Ok(parsed_row) => parsed.push((row, parsed_row)),
            Err(reason) => {
                warn!("Skipping import row {}: {}", row, reason);
                skipped.push(SkippedRow { row, reason });
            }
        }
    }
    Ok((parsed, skipped))
}

/// Rows found or created during one import, keyed by name within their parent
#[derive(Default)]
struct ParentCache {
    projects: HashMap<String, i32>,
    phases: HashMap<(i32, String), i32>,
    buckets: HashMap<(i32, String), i32>,
    teams: HashMap<String, i32>,
    subsystems: HashMap<String, i32>,
}

impl ParentCache {
    async fn project(
        &mut self,
        txn: &DatabaseTransaction,
        name: &str,
        summary: &mut ImportSummary,
    ) -> TrackerResult<i32> {
        if let Some(id) = self.projects.get(name) {
            return Ok(*id);
        }
        let existing = projects::Entity::find()
            .filter(projects::Column::Name.eq(name))
            .one(txn)
            .await?;
        let id = match existing {
            Some(project) => project.id,
            None => {
                summary.projects_created += 1;
                projects::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(None),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id
            }
        };
        self.projects.insert(name.to_string(), id);
        Ok(id)
    }

    async fn phase(
        &mut self,
        txn: &DatabaseTransaction,
        project_id: i32,
        label: &str,
        summary: &mut ImportSummary,
    ) -> TrackerResult<i32> {
        let key = (project_id, label.to_string());
        if let Some(id) = self.phases.get(&key) {
            return Ok(*id);
        }
        let existing = project_phases::Entity::find()
            .filter(project_phases::Column::ProjectId.eq(project_id))
            .filter(project_phases::Column::Label.eq(label))
            .one(txn)
            .await?;
        let id = match existing {
            Some(phase) => phase.id,
            None => {
                summary.phases_created += 1;
                let order = ordering::next_order(txn, OrderScope::Project(project_id)).await?;
                project_phases::ActiveModel {
                    project_id: Set(project_id),
                    label: Set(label.to_string()),
                    date: Set(None),
                    order: Set(order),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id
            }
        };
        self.phases.insert(key, id);
        Ok(id)
    }

    async fn bucket(
        &mut self,
        txn: &DatabaseTransaction,
        phase_id: i32,
        name: &str,
        summary: &mut ImportSummary,
    ) -> TrackerResult<i32> {
        let key = (phase_id, name.to_string());
        if let Some(id) = self.buckets.get(&key) {
            return Ok(*id);
        }
        let existing = task_buckets::Entity::find()
            .filter(task_buckets::Column::PhaseId.eq(phase_id))
            .filter(task_buckets::Column::Name.eq(name))
            .one(txn)
            .await?;
        let id = match existing {
            Some(bucket) => bucket.id,
            None => {
                summary.buckets_created += 1;
                let order = ordering::next_order(txn, OrderScope::Phase(phase_id)).await?;
                task_buckets::ActiveModel {
                    phase_id: Set(phase_id),
                    name: Set(name.to_string()),
                    order: Set(order),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id
            }
        };
        self.buckets.insert(key, id);
        Ok(id)
    }

    async fn team(
        &mut self,
        txn: &DatabaseTransaction,
        name: &str,
        summary: &mut ImportSummary,
    ) -> TrackerResult<i32> {
        if let Some(id) = self.teams.get(name) {
            return Ok(*id);
        }
        let existing = teams::Entity::find()
            .filter(teams::Column::Name.eq(name))
            .one(txn)
            .await?;
        let id = match existing {
            Some(team) => team.id,
            None => {
                summary.teams_created += 1;
                teams::ActiveModel {
                    name: Set(name.to_string()),
                    email_to: Set(None),
                    email_cc: Set(None),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id
            }
        };
        self.teams.insert(name.to_string(), id);
        Ok(id)
    }

    async fn subsystem(
        &mut self,
        txn: &DatabaseTransaction,
        name: &str,
        summary: &mut ImportSummary,
    ) -> TrackerResult<i32> {
        if let Some(id) = self.subsystems.get(name) {
            return Ok(*id);
        }
        let existing = subsystems::Entity::find()
            .filter(subsystems::Column::Name.eq(name))
            .one(txn)
            .await?;
        let id = match existing {
            Some(subsystem) => subsystem.id,
            None => {
                summary.subsystems_created += 1;
                subsystems::ActiveModel {
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id
            }
        };
        self.subsystems.insert(name.to_string(), id);
        Ok(id)
    }
}

pub struct ImportService {
    db: DatabaseConnection,
}

impl ImportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Imports every usable row of the workbook's first sheet in one transaction
    pub async fn import_xlsx(&self, xlsx_data: &[u8]) -> TrackerResult<ImportSummary> {
        info!("Importing XLSX file with {} bytes", xlsx_data.len());

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(xlsx_data))
            .map_err(|e| TrackerError::invalid_argument(format!("Unreadable workbook: {}", e)))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TrackerError::invalid_argument("Workbook has no worksheets"))?
            .map_err(|e| TrackerError::invalid_argument(format!("Unreadable worksheet: {}", e)))?;

        let (rows, skipped) = read_rows(&range)?;
        let mut summary = ImportSummary {
            rows_read: rows.len() + skipped.len(),
            skipped,
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let mut cache = ParentCache::default();
        for (row_number, row) in rows {
            let project_id = cache.project(&txn, &row.project, &mut summary).await?;
            let phase_id = cache.phase(&txn, project_id, &row.phase, &mut summary).await?;
            let bucket_id = cache.bucket(&txn, phase_id, &row.bucket, &mut summary).await?;
            let team_id = match &row.team {
                Some(name) => Some(cache.team(&txn, name, &mut summary).await?),
                None => None,
            };
            let subsystem_id = match &row.subsystem {
                Some(name) => Some(cache.subsystem(&txn, name, &mut summary).await?),
                None => None,
            };

            let mut status_by_day = BTreeMap::new();
            if let Some(status) = row.status {
                status_by_day.insert(
                    row.start_date.format(STATUS_DATE_FORMAT).to_string(),
                    status,
                );
            }

            let task = insert_task(
                &txn,
                NewTask {
                    task_bucket_id: bucket_id,
                    subsystem_id,
                    team_id,
                    vendor_system: row.vendor_system,
                    subject: row.subject,
                    description: row.description,
                    detailed_description: row.detailed_description,
                    start_date: row.start_date,
                    end_date: row.end_date,
                    status_by_day,
                    order: None,
                },
            )
            .await?;
            debug!("Imported row {} as task {}", row_number, task.id);
            summary.tasks_created += 1;
        }
        txn.commit().await?;

        info!(
            "Import finished: {} task(s) created, {} row(s) skipped",
            summary.tasks_created,
            summary.skipped.len()
        );
        Ok(summary)
    }
}
