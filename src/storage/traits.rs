//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::state::RecordState;
use crate::storage::{CarDetails, CarRecord, RunRecord, RunStatus, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    DuplicateIdentity(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition { from: RecordState, to: RecordState },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// The harvester owns exactly one store per run and threads it through both
/// stages; implementations need no internal locking.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run and returns its ID
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as finished with the given status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()>;

    // ===== Record Management =====

    /// Returns true if a record with this identity exists
    fn record_exists(&self, identity: &str) -> StorageResult<bool>;

    /// Inserts a new pending record
    ///
    /// Fails with `DuplicateIdentity` if the identity is already stored; an
    /// existing record is never touched.
    ///
    /// # Returns
    ///
    /// The row ID of the new record
    fn insert_pending(&mut self, identity: &str, discovered_run: i64) -> StorageResult<i64>;

    /// Gets a record by identity
    fn get_record(&self, identity: &str) -> StorageResult<Option<CarRecord>>;

    /// Gets every record still waiting for its detail fetch, oldest first
    fn find_pending(&self) -> StorageResult<Vec<CarRecord>>;

    /// Gets every record whose details have been fetched, oldest first
    fn find_completed(&self) -> StorageResult<Vec<CarRecord>>;

    /// Overwrites all derived fields of a record and marks it completed
    ///
    /// The write is a single statement keyed by identity, so a record is
    /// either fully updated or left as it was.
    fn complete_record(&mut self, identity: &str, details: &CarDetails) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts records in a given state
    fn count_records_by_state(&self, state: RecordState) -> StorageResult<u64>;

    /// Counts all records
    fn count_total_records(&self) -> StorageResult<u64>;

    /// Counts records first discovered by the given run
    fn count_records_discovered_in(&self, run_id: i64) -> StorageResult<u64>;
}
