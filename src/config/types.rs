use serde::Deserialize;

/// Main configuration structure for Car-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The listing search to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Search result URL with all filters applied (page 1, no page parameter)
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Query parameter that selects the result page
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,

    /// Upper bound on result pages visited per run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

/// CSS selectors for the parts of the site the stages read
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Pagination entry holding the last page number
    pub pagination: String,

    /// Anchor of each result on a listing page
    #[serde(rename = "listing-link")]
    pub listing_link: String,

    pub title: String,

    pub subtitle: String,

    pub price: String,

    #[serde(rename = "price-fairness")]
    pub price_fairness: String,

    /// One element per key-feature label/value pair
    pub feature: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Request pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between two navigations (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path of the spreadsheet written by `sheet`
    #[serde(rename = "sheet-path", default = "default_sheet_path")]
    pub sheet_path: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pagination: r#"ul[class*="pagination_Pagination__"] li:nth-last-child(2)"#.to_string(),
            listing_link: r#"a[class*="BaseListing_containerLink"]"#.to_string(),
            title: r#"h2[class*="typography_headline"]"#.to_string(),
            subtitle: r#"div[class*="MainCtaBox_subTitle"]"#.to_string(),
            price: r#"div[class*="MainPriceArea_mainPrice__"]"#.to_string(),
            price_fairness: r#"div[class*="priceRatingBadge_PriceRatingBadge--label_"]"#
                .to_string(),
            feature: r#"div[class*="KeyFeatures_content__"]"#.to_string(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            sheet_path: default_sheet_path(),
        }
    }
}

fn default_page_param() -> String {
    "pageNumber".to_string()
}

fn default_request_delay() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_database_path() -> String {
    "./cars.db".to_string()
}

fn default_sheet_path() -> String {
    "./coches.csv".to_string()
}
