use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::database::entities::{projects, subsystems, tasks::STATUS_DATE_FORMAT, teams};
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::EntityKind;

const MAX_NAME_LENGTH: usize = 255;

pub struct ValidationService;

impl ValidationService {
    /// Names must be non-blank and at most 255 characters
    pub fn validate_name(kind: EntityKind, name: &str) -> TrackerResult<()> {
        if name.trim().is_empty() {
            return Err(TrackerError::invalid_argument(format!(
                "{} name cannot be empty",
                kind
            )));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(TrackerError::invalid_argument(format!(
                "{} name cannot exceed {} characters",
                kind, MAX_NAME_LENGTH
            )));
        }
        Ok(())
    }

    /// Parses a zero-padded `YYYY-MM-DD` date
    ///
    /// Unpadded forms such as `2025-1-5` are rejected; stored status keys are
    /// looked up by their canonical form.
    pub fn parse_date(value: &str) -> TrackerResult<NaiveDate> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, STATUS_DATE_FORMAT)
            .ok()
            .filter(|day| day.format(STATUS_DATE_FORMAT).to_string() == trimmed)
            .ok_or_else(|| {
                TrackerError::invalid_argument(format!(
                    "'{}' is not a valid date, expected YYYY-MM-DD",
                    value
                ))
            })
    }

    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> TrackerResult<()> {
        if end < start {
            return Err(TrackerError::invalid_argument(format!(
                "end_date {} is before start_date {}",
                end, start
            )));
        }
        Ok(())
    }

    /// Checks every key is a `YYYY-MM-DD` date and converts the map to its stored JSON form
    pub fn status_map_to_json(status_by_day: &BTreeMap<String, String>) -> TrackerResult<serde_json::Value> {
        for key in status_by_day.keys() {
            if key.trim() != key {
                return Err(TrackerError::invalid_argument(format!(
                    "status key '{}' has surrounding whitespace",
                    key
                )));
            }
            Self::parse_date(key)?;
        }
        serde_json::to_value(status_by_day)
            .map_err(|e| TrackerError::Internal(format!("Failed to encode status map: {}", e)))
    }

    /// Fails with `Conflict` when another row of `kind` already uses `name`
    pub async fn ensure_name_available<C: ConnectionTrait>(
        conn: &C,
        kind: EntityKind,
        name: &str,
        exclude_id: Option<i32>,
    ) -> TrackerResult<()> {
        let taken = match kind {
            EntityKind::Team => {
                let mut query = teams::Entity::find().filter(teams::Column::Name.eq(name));
                if let Some(id) = exclude_id {
                    query = query.filter(teams::Column::Id.ne(id));
                }
                query.count(conn).await? > 0
            }
            EntityKind::Subsystem => {
                let mut query =
                    subsystems::Entity::find().filter(subsystems::Column::Name.eq(name));
                if let Some(id) = exclude_id {
                    query = query.filter(subsystems::Column::Id.ne(id));
                }
                query.count(conn).await? > 0
            }
            EntityKind::Project => {
                let mut query = projects::Entity::find().filter(projects::Column::Name.eq(name));
                if let Some(id) = exclude_id {
                    query = query.filter(projects::Column::Id.ne(id));
                }
                query.count(conn).await? > 0
            }
            _ => false,
        };

        if taken {
            Err(TrackerError::conflict(format!(
                "{} with name '{}' already exists",
                kind, name
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let err = ValidationService::validate_name(EntityKind::Team, "   ").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(_)));
        assert!(ValidationService::validate_name(EntityKind::Team, "Ops").is_ok());
    }

    #[test]
    fn test_long_name_rejected() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(ValidationService::validate_name(EntityKind::Project, &name).is_err());
    }

    #[test]
    fn test_parse_date() {
        let day = ValidationService::parse_date("2025-01-05").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert!(ValidationService::parse_date("05/01/2025").is_err());
        assert!(ValidationService::parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_unpadded_date_rejected() {
        assert!(ValidationService::parse_date("2025-1-5").is_err());
        assert!(ValidationService::parse_date("2025-01-5").is_err());
        assert!(ValidationService::parse_date(" 2025-01-05 ").is_ok());

        let mut map = BTreeMap::new();
        map.insert("2025-1-5".to_string(), "Done".to_string());
        let err = ValidationService::status_map_to_json(&map).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(_)));

        let mut padded = BTreeMap::new();
        padded.insert(" 2025-01-05".to_string(), "Done".to_string());
        assert!(ValidationService::status_map_to_json(&padded).is_err());
    }

    #[test]
    fn test_status_map_keys_must_be_dates() {
        let mut map = BTreeMap::new();
        map.insert("2025-01-05".to_string(), "Done".to_string());
        let json = ValidationService::status_map_to_json(&map).unwrap();
        assert_eq!(json["2025-01-05"], "Done");

        map.insert("tomorrow".to_string(), "Pending".to_string());
        let err = ValidationService::status_map_to_json(&map).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(_)));
    }

    #[test]
    fn test_date_range() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(ValidationService::validate_date_range(start, end).is_ok());
        assert!(ValidationService::validate_date_range(start, start).is_ok());
        assert!(ValidationService::validate_date_range(end, start).is_err());
    }
}
