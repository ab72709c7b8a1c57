//! Crawler module: the discovery and detail stages and their coordinator
//!
//! - Discovery walks the search result pages and records unseen listings as
//!   pending
//! - Details visits each pending listing and stores its normalized fields
//! - The coordinator threads one browser and one store through both stages
//!   and records the run

mod coordinator;
mod details;
mod discovery;

pub use coordinator::{run_update, Harvester, UpdateOptions};
pub use details::{apply_features, fetch_details, run_details, DetailReport};
pub use discovery::{discover_page, read_page_count, run_discovery, DiscoveryReport};
