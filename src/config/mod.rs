//! Configuration module for Car-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use car_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Searching: {}", config.site.search_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

/// Builds a valid configuration around `search_url` for unit tests
#[cfg(test)]
pub(crate) fn sample_config(search_url: &str) -> Config {
    Config {
        site: SiteConfig {
            search_url: search_url.to_string(),
            page_param: "pageNumber".to_string(),
            max_pages: None,
        },
        selectors: SelectorConfig {
            pagination: "ul.pagination li.last".to_string(),
            listing_link: "a.listing".to_string(),
            title: "h2.title".to_string(),
            subtitle: "div.subtitle".to_string(),
            price: "div.price".to_string(),
            price_fairness: "div.fairness".to_string(),
            feature: "div.feature".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvest".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        },
        crawler: CrawlerConfig {
            request_delay: 0,
            request_timeout: 5,
        },
        output: OutputConfig::default(),
    }
}
