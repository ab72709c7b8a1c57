//! Storage module for persisting crawl records
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Listing records keyed by canonical identity
//! - The pending → completed detail lifecycle
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::RecordState;
use crate::HarvestError;

use std::path::Path;

/// Opens (or creates) the SQLite record store at `path`
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// One listed vehicle, keyed by its canonical identity
#[derive(Debug, Clone, PartialEq)]
pub struct CarRecord {
    pub id: i64,
    pub identity: String,
    pub state: RecordState,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub price: Option<u64>,
    pub price_fairness: Option<String>,
    pub attributes: Attributes,
    pub discovered_at: String,
    pub discovered_run: i64,
    pub detailed_at: Option<String>,
}

impl CarRecord {
    /// Returns true while the record is waiting for its detail fetch
    pub fn needs_details(&self) -> bool {
        self.state.needs_details()
    }
}

/// Normalized values read from a listing's key-features panel
///
/// Each field is `Some` only when the panel had the matching label and its
/// value passed normalization. `power_raw_label` keeps the panel text as shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub distance_km: Option<u64>,
    pub power_kw: Option<u64>,
    pub power_raw_label: Option<String>,
    pub range_wltp_km: Option<u64>,
    pub fast_charge_minutes: Option<u64>,
    pub previous_owners: Option<u32>,
}

impl Attributes {
    /// Returns true if no attribute was extracted
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Lists the present attributes as `(name, value)` pairs
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(v) = self.distance_km {
            entries.push(("distanceKm", v.to_string()));
        }
        if let Some(v) = self.power_kw {
            entries.push(("powerKw", v.to_string()));
        }
        if let Some(v) = &self.power_raw_label {
            entries.push(("powerRawLabel", v.clone()));
        }
        if let Some(v) = self.range_wltp_km {
            entries.push(("rangeWltpKm", v.to_string()));
        }
        if let Some(v) = self.fast_charge_minutes {
            entries.push(("fastChargeMinutes", v.to_string()));
        }
        if let Some(v) = self.previous_owners {
            entries.push(("previousOwners", v.to_string()));
        }
        entries
    }
}

/// Everything a detail fetch writes back onto a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarDetails {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub price: Option<u64>,
    pub price_fairness: Option<String>,
    pub attributes: Attributes,
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Counters recorded when a run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub new_records: u64,
    pub detailed_records: u64,
    pub failed_records: u64,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_string())
    }
}
