//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Car-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    new_records INTEGER NOT NULL DEFAULT 0,
    detailed_records INTEGER NOT NULL DEFAULT 0,
    failed_records INTEGER NOT NULL DEFAULT 0
);

-- One row per listing, keyed by canonical identity
CREATE TABLE IF NOT EXISTS cars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL UNIQUE,
    state TEXT NOT NULL,
    title TEXT,
    subtitle TEXT,
    price INTEGER,
    price_fairness TEXT,
    distance_km INTEGER,
    power_kw INTEGER,
    power_raw_label TEXT,
    range_wltp_km INTEGER,
    fast_charge_minutes INTEGER,
    previous_owners INTEGER,
    discovered_at TEXT NOT NULL,
    discovered_run INTEGER NOT NULL REFERENCES runs(id),
    detailed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_cars_state ON cars(state);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
