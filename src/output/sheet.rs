//! Spreadsheet export of completed records
//!
//! Writes CSV with a fixed header row.

use crate::storage::{CarRecord, Storage};
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header row, in column order
pub const SHEET_COLUMNS: [&str; 10] = [
    "title",
    "subtitle",
    "price",
    "price fairness",
    "Kilometraje",
    "Autonomía WLTP (Km)",
    "Potencia (Kw)",
    "Potentia detalle",
    "Propietarios anteriores",
    "URL",
];

/// Builds the cells of one record, in [`SHEET_COLUMNS`] order
///
/// Missing values become empty cells.
pub fn sheet_row(record: &CarRecord) -> Vec<String> {
    fn cell<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    let attributes = &record.attributes;
    vec![
        cell(&record.title),
        cell(&record.subtitle),
        cell(&record.price),
        cell(&record.price_fairness),
        cell(&attributes.distance_km),
        cell(&attributes.range_wltp_km),
        cell(&attributes.power_kw),
        cell(&attributes.power_raw_label),
        cell(&attributes.previous_owners),
        record.identity.trim().to_string(),
    ]
}

/// Writes the header row and one row per record
pub fn write_sheet<W: Write>(w: W, records: &[CarRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(SHEET_COLUMNS)?;
    for record in records {
        writer.write_record(sheet_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports every completed record to `path`
///
/// # Returns
///
/// The number of records written
pub fn export_sheet(storage: &dyn Storage, path: &Path) -> Result<usize> {
    let records = storage.find_completed()?;
    let file = File::create(path)?;
    write_sheet(file, &records)?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}
