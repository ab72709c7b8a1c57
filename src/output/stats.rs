//! Statistics generation from the record store
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::state::RecordState;
use crate::storage::{RunRecord, Storage};
use crate::Result;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of listings ever discovered
    pub total_records: u64,

    /// Listings waiting for their detail fetch
    pub pending_records: u64,

    /// Listings with stored details
    pub completed_records: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl HarvestStatistics {
    /// Share of discovered listings with stored details, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.completed_records as f64 / self.total_records as f64) * 100.0
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics> {
    Ok(HarvestStatistics {
        total_records: storage.count_total_records()?,
        pending_records: storage.count_records_by_state(RecordState::Pending)?,
        completed_records: storage.count_records_by_state(RecordState::Completed)?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Records:");
    println!("  Total discovered: {}", stats.total_records);
    println!("  Pending details: {}", stats.pending_records);
    println!(
        "  Completed: {} ({:.1}%)",
        stats.completed_records,
        stats.completion_rate()
    );
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  New listings: {}", run.totals.new_records);
            println!("  Detailed: {}", run.totals.detailed_records);
            println!("  Left pending: {}", run.totals.failed_records);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No runs recorded yet."),
    }
}
