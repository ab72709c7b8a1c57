//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::RecordState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Attributes, CarDetails, CarRecord, RunRecord, RunStatus, RunTotals};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str = "id, identity, state, title, subtitle, price, price_fairness,
     distance_km, power_kw, power_raw_label, range_wltp_km, fast_charge_minutes,
     previous_owners, discovered_at, discovered_run, detailed_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status,
     new_records, detailed_records, failed_records";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn find_by_state(&self, state: RecordState) -> StorageResult<Vec<CarRecord>> {
        let sql = format!(
            "SELECT {} FROM cars WHERE state = ?1 ORDER BY id",
            RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![state.to_db_string()], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Reads a text column that must hold one of a fixed set of names
fn decode_text<T>(
    row: &Row<'_>,
    idx: usize,
    what: &str,
    decode: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    decode(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown {} '{}'", what, text).into(),
        )
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CarRecord> {
    Ok(CarRecord {
        id: row.get(0)?,
        identity: row.get(1)?,
        state: decode_text(row, 2, "record state", RecordState::from_db_string)?,
        title: row.get(3)?,
        subtitle: row.get(4)?,
        price: row.get(5)?,
        price_fairness: row.get(6)?,
        attributes: Attributes {
            distance_km: row.get(7)?,
            power_kw: row.get(8)?,
            power_raw_label: row.get(9)?,
            range_wltp_km: row.get(10)?,
            fast_charge_minutes: row.get(11)?,
            previous_owners: row.get(12)?,
        },
        discovered_at: row.get(13)?,
        discovered_run: row.get(14)?,
        detailed_at: row.get(15)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: decode_text(row, 4, "run status", RunStatus::from_db_string)?,
        totals: RunTotals {
            new_records: row.get(5)?,
            detailed_records: row.get(6)?,
            failed_records: row.get(7)?,
        },
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, new_records = ?3,
             detailed_records = ?4, failed_records = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                totals.new_records,
                totals.detailed_records,
                totals.failed_records,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Record Management =====

    fn record_exists(&self, identity: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM cars WHERE identity = ?1",
                params![identity],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_pending(&mut self, identity: &str, discovered_run: i64) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO cars (identity, state, discovered_at, discovered_run)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                identity,
                RecordState::Pending.to_db_string(),
                now,
                discovered_run
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StorageError::DuplicateIdentity(identity.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_record(&self, identity: &str) -> StorageResult<Option<CarRecord>> {
        let sql = format!("SELECT {} FROM cars WHERE identity = ?1", RECORD_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![identity], record_from_row)
            .optional()?;
        Ok(record)
    }

    fn find_pending(&self) -> StorageResult<Vec<CarRecord>> {
        self.find_by_state(RecordState::Pending)
    }

    fn find_completed(&self) -> StorageResult<Vec<CarRecord>> {
        self.find_by_state(RecordState::Completed)
    }

    fn complete_record(&mut self, identity: &str, details: &CarDetails) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT state FROM cars WHERE identity = ?1",
                params![identity],
                |row| row.get(0),
            )
            .optional()?;
        let current =
            current.ok_or_else(|| StorageError::RecordNotFound(identity.to_string()))?;
        let current = RecordState::from_db_string(&current).ok_or_else(|| {
            StorageError::Database(format!(
                "unknown record state '{}' for {}",
                current, identity
            ))
        })?;

        if !current.can_transition_to(RecordState::Completed) {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: RecordState::Completed,
            });
        }

        let now = Utc::now().to_rfc3339();
        let attributes = &details.attributes;
        tx.execute(
            "UPDATE cars SET state = ?1, title = ?2, subtitle = ?3, price = ?4,
             price_fairness = ?5, distance_km = ?6, power_kw = ?7, power_raw_label = ?8,
             range_wltp_km = ?9, fast_charge_minutes = ?10, previous_owners = ?11,
             detailed_at = ?12
             WHERE identity = ?13",
            params![
                RecordState::Completed.to_db_string(),
                details.title,
                details.subtitle,
                details.price,
                details.price_fairness,
                attributes.distance_km,
                attributes.power_kw,
                attributes.power_raw_label,
                attributes.range_wltp_km,
                attributes.fast_charge_minutes,
                attributes.previous_owners,
                now,
                identity
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_records_by_state(&self, state: RecordState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cars WHERE state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_records_discovered_in(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cars WHERE discovered_run = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAR_A: &str = "https://example.com/detalles.html?id=1";
    const CAR_B: &str = "https://example.com/detalles.html?id=2";

    fn storage_with_run() -> (SqliteStorage, i64) {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();
        (storage, run_id)
    }

    fn sample_details() -> CarDetails {
        CarDetails {
            title: Some("Tesla Model 3".to_string()),
            subtitle: Some("Long Range AWD".to_string()),
            price: Some(31_990),
            price_fairness: Some("Buen precio".to_string()),
            attributes: Attributes {
                distance_km: Some(42_000),
                power_kw: Some(366),
                power_raw_label: Some("366 kW (498 CV)".to_string()),
                range_wltp_km: Some(602),
                fast_charge_minutes: Some(27),
                previous_owners: Some(1),
            },
        }
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_create_and_finish_run() {
        let (mut storage, run_id) = storage_with_run();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());

        let totals = RunTotals {
            new_records: 3,
            detailed_records: 2,
            failed_records: 1,
        };
        storage
            .finish_run(run_id, RunStatus::Completed, &totals)
            .unwrap();

        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.totals, totals);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_finish_unknown_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.finish_run(99, RunStatus::Failed, &RunTotals::default());
        assert!(matches!(result, Err(StorageError::RunNotFound(99))));
    }

    #[test]
    fn test_insert_pending_record() {
        let (mut storage, run_id) = storage_with_run();

        assert!(!storage.record_exists(CAR_A).unwrap());
        let id = storage.insert_pending(CAR_A, run_id).unwrap();
        assert!(id > 0);
        assert!(storage.record_exists(CAR_A).unwrap());

        let record = storage.get_record(CAR_A).unwrap().unwrap();
        assert!(record.needs_details());
        assert_eq!(record.discovered_run, run_id);
        assert_eq!(record.title, None);
        assert_eq!(record.price, None);
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_insert_duplicate_identity_is_rejected() {
        let (mut storage, run_id) = storage_with_run();
        storage.insert_pending(CAR_A, run_id).unwrap();

        let result = storage.insert_pending(CAR_A, run_id);
        assert!(matches!(result, Err(StorageError::DuplicateIdentity(_))));
        assert_eq!(storage.count_total_records().unwrap(), 1);
    }

    #[test]
    fn test_complete_record_writes_all_fields() {
        let (mut storage, run_id) = storage_with_run();
        storage.insert_pending(CAR_A, run_id).unwrap();

        storage.complete_record(CAR_A, &sample_details()).unwrap();

        let record = storage.get_record(CAR_A).unwrap().unwrap();
        assert!(!record.needs_details());
        assert_eq!(record.title.as_deref(), Some("Tesla Model 3"));
        assert_eq!(record.price, Some(31_990));
        assert_eq!(record.attributes, sample_details().attributes);
        assert!(record.detailed_at.is_some());
    }

    #[test]
    fn test_recompletion_overwrites_instead_of_merging() {
        let (mut storage, run_id) = storage_with_run();
        storage.insert_pending(CAR_A, run_id).unwrap();
        storage.complete_record(CAR_A, &sample_details()).unwrap();

        let sparse = CarDetails {
            title: Some("Tesla Model 3".to_string()),
            price: None,
            ..CarDetails::default()
        };
        storage.complete_record(CAR_A, &sparse).unwrap();

        let record = storage.get_record(CAR_A).unwrap().unwrap();
        assert!(!record.needs_details());
        assert_eq!(record.price, None);
        assert_eq!(record.subtitle, None);
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_complete_unknown_record() {
        let (mut storage, _) = storage_with_run();
        let result = storage.complete_record(CAR_A, &sample_details());
        assert!(matches!(result, Err(StorageError::RecordNotFound(_))));
    }

    #[test]
    fn test_pending_and_completed_queries() {
        let (mut storage, run_id) = storage_with_run();
        storage.insert_pending(CAR_A, run_id).unwrap();
        storage.insert_pending(CAR_B, run_id).unwrap();
        storage.complete_record(CAR_B, &sample_details()).unwrap();

        let pending = storage.find_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identity, CAR_A);

        let completed = storage.find_completed().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].identity, CAR_B);

        assert_eq!(
            storage
                .count_records_by_state(RecordState::Pending)
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .count_records_by_state(RecordState::Completed)
                .unwrap(),
            1
        );
        assert_eq!(storage.count_total_records().unwrap(), 2);
    }

    #[test]
    fn test_count_records_discovered_in_run() {
        let (mut storage, first_run) = storage_with_run();
        storage.insert_pending(CAR_A, first_run).unwrap();
        let second_run = storage.create_run("test_hash").unwrap();
        storage.insert_pending(CAR_B, second_run).unwrap();

        assert_eq!(storage.count_records_discovered_in(first_run).unwrap(), 1);
        assert_eq!(storage.count_records_discovered_in(second_run).unwrap(), 1);
        assert_eq!(
            storage.count_records_discovered_in(second_run + 1).unwrap(),
            0
        );
    }

    #[test]
    fn test_unknown_record_state_is_an_error() {
        let (mut storage, run_id) = storage_with_run();
        storage
            .conn
            .execute(
                "INSERT INTO cars (identity, state, discovered_at, discovered_run)
                 VALUES (?1, 'archived', 't', ?2)",
                params![CAR_A, run_id],
            )
            .unwrap();

        assert!(matches!(
            storage.get_record(CAR_A),
            Err(StorageError::Sqlite(
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, _)
            ))
        ));
        assert!(storage.find_pending().unwrap().is_empty());
        assert!(matches!(
            storage.complete_record(CAR_A, &sample_details()),
            Err(StorageError::Database(_))
        ));
        let state: String = storage
            .conn
            .query_row(
                "SELECT state FROM cars WHERE identity = ?1",
                params![CAR_A],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(state, "archived");
    }

    #[test]
    fn test_unknown_run_status_is_an_error() {
        let (storage, run_id) = storage_with_run();
        storage
            .conn
            .execute(
                "UPDATE runs SET status = 'paused' WHERE id = ?1",
                params![run_id],
            )
            .unwrap();

        assert!(matches!(
            storage.get_run(run_id),
            Err(StorageError::Sqlite(
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, _)
            ))
        ));
        assert!(storage.get_latest_run().is_err());
    }

    #[test]
    fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run("hash").unwrap();
            storage.insert_pending(CAR_A, run_id).unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert!(storage.record_exists(CAR_A).unwrap());
    }
}
