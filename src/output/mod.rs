//! Output module for presenting harvested records
//!
//! This module handles:
//! - Listing completed records on stdout
//! - Exporting completed records as a spreadsheet
//! - Reporting store and run statistics

mod listing;
mod sheet;
pub mod stats;

pub use listing::{format_record, print_records};
pub use sheet::{export_sheet, sheet_row, write_sheet, SHEET_COLUMNS};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
