//! Car-Harvest: an incremental listing crawler
//!
//! This crate walks the result pages of a vehicle listing search, records every
//! previously unseen listing as a pending record, then visits each pending
//! listing to extract and normalize its details.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod normalize;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Car-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("No page loaded before querying '{selector}'")]
    NoPageLoaded { selector: String },

    #[error("Missing {field} on {url} (selector '{selector}')")]
    MissingElement {
        url: String,
        field: &'static str,
        selector: String,
    },

    #[error("Unreadable page count '{text}' on {url}")]
    Pagination { url: String, text: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if the error only concerns the listing being fetched
    ///
    /// Item-level errors leave the record pending and let the detail stage
    /// move on to the next listing. Everything else aborts the stage. Only
    /// `404 Not Found` and `410 Gone` mark a single listing as unavailable;
    /// other statuses (rate limits, server errors) concern the whole site.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::MissingElement { .. } | Self::HttpStatus { status: 404 | 410, .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Empty link")]
    EmptyLink,
}

/// Result type alias for Car-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use normalize::{parse_count, parse_km, parse_kw, parse_minutes, parse_price_eur};
pub use state::RecordState;
pub use storage::{Attributes, CarRecord};
pub use crate::url::canonical_identity;
