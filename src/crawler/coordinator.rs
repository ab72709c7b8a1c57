//! Harvest coordinator - run bookkeeping around the two stages
//!
//! The coordinator owns the browser and the record store for one run. It
//! exposes discovery and details as separate calls; neither triggers the
//! other.

use crate::browser::{Browser, HttpBrowser};
use crate::config::Config;
use crate::crawler::details::{run_details, DetailReport};
use crate::crawler::discovery::{run_discovery, DiscoveryReport};
use crate::storage::{RunStatus, RunTotals, SqliteStorage, Storage};
use crate::Result;
use std::path::Path;
use std::time::Instant;

/// Which stages an update runs
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    pub skip_search: bool,
    pub skip_details: bool,
}

/// Drives one harvest run over a browser and a record store
pub struct Harvester<B, S> {
    config: Config,
    browser: B,
    storage: S,
    run_id: i64,
    totals: RunTotals,
}

impl<B: Browser, S: Storage> Harvester<B, S> {
    /// Creates a harvester and opens a new run in the store
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `browser` - Navigation context shared by both stages
    /// * `storage` - Record store shared by both stages
    /// * `config_hash` - Hash of the configuration file, stored with the run
    pub fn new(config: Config, browser: B, mut storage: S, config_hash: &str) -> Result<Self> {
        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Starting harvest run {}", run_id);

        Ok(Self {
            config,
            browser,
            storage,
            run_id,
            totals: RunTotals::default(),
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Counters accumulated by the stages run so far
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Runs the discovery stage
    ///
    /// The run's new-record count is read back from the store, so listings
    /// inserted before an abort are still counted.
    pub async fn run_discovery(&mut self) -> Result<DiscoveryReport> {
        let result = run_discovery(
            &mut self.browser,
            &mut self.storage,
            &self.config.site,
            &self.config.selectors,
            self.run_id,
        )
        .await;

        match self.storage.count_records_discovered_in(self.run_id) {
            Ok(count) => self.totals.new_records = count,
            Err(e) => tracing::warn!("Could not count new records of run {}: {}", self.run_id, e),
        }
        result
    }

    /// Runs the detail stage
    pub async fn run_details(&mut self) -> Result<DetailReport> {
        let report = run_details(&mut self.browser, &mut self.storage, &self.config.selectors).await?;
        self.totals.detailed_records += report.completed;
        self.totals.failed_records += report.failed;
        Ok(report)
    }

    /// Runs the stages selected by `options`, discovery first
    pub async fn update(&mut self, options: UpdateOptions) -> Result<()> {
        if options.skip_search {
            tracing::info!("Skipping discovery");
        } else {
            self.run_discovery().await?;
        }

        if options.skip_details {
            tracing::info!("Skipping details");
        } else {
            self.run_details().await?;
        }

        Ok(())
    }

    /// Records the final status and counters of the run
    pub fn finish(&mut self, status: RunStatus) -> Result<RunTotals> {
        self.storage.finish_run(self.run_id, status, &self.totals)?;
        tracing::info!(
            "Run {} {}: {} new, {} detailed, {} left pending",
            self.run_id,
            status,
            self.totals.new_records,
            self.totals.detailed_records,
            self.totals.failed_records
        );
        Ok(self.totals)
    }
}

/// Runs an update against the configured site and database
///
/// The run is recorded as failed when a stage aborts; the stage's error is
/// returned.
pub async fn run_update(
    config: Config,
    config_hash: &str,
    options: UpdateOptions,
) -> Result<RunTotals> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let browser = HttpBrowser::new(&config.user_agent, &config.crawler)?;
    let mut harvester = Harvester::new(config, browser, storage, config_hash)?;

    let start_time = Instant::now();
    let outcome = harvester.update(options).await;
    tracing::debug!("Update finished in {:?}", start_time.elapsed());

    match outcome {
        Ok(()) => harvester.finish(RunStatus::Completed),
        Err(e) => {
            tracing::error!("Run {} aborted: {}", harvester.run_id(), e);
            if let Err(finish_err) = harvester.finish(RunStatus::Failed) {
                tracing::error!("Failed to record run failure: {}", finish_err);
            }
            Err(e)
        }
    }
}
