//! Discovery stage: walk result pages and record unseen listings

use crate::browser::Browser;
use crate::config::{SelectorConfig, SiteConfig};
use crate::normalize::parse_count;
use crate::storage::Storage;
use crate::url::{canonical_identity, listing_page_url};
use crate::{HarvestError, Result};

/// Outcome of one discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Page count read from the pagination control, after any `max-pages` cap
    pub total_pages: u32,
    pub pages_visited: u32,
    pub new_records: u64,
    /// True when a page without new listings ended the pass before the last page
    pub stopped_early: bool,
}

/// Reads the number of result pages from the currently loaded page
///
/// A page without a pagination control has a single page of results.
pub fn read_page_count<B: Browser>(browser: &B, selectors: &SelectorConfig) -> Result<u32> {
    let Some(element) = browser.query_one(&selectors.pagination)? else {
        return Ok(1);
    };

    let text = element.text().trim();
    match parse_count(text) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(HarvestError::Pagination {
            url: current_url(browser),
            text: text.to_string(),
        }),
    }
}

/// Loads result page `page` and inserts every listing not yet in the store
///
/// Returns the number of records inserted. Listings already stored, whatever
/// their state, are left untouched.
pub async fn discover_page<B: Browser, S: Storage>(
    browser: &mut B,
    storage: &mut S,
    site: &SiteConfig,
    selectors: &SelectorConfig,
    page: u32,
    run_id: i64,
) -> Result<u64> {
    let url = listing_page_url(&site.search_url, &site.page_param, page)?;
    browser.load(url.as_str()).await?;

    let base = match browser.document() {
        Some(document) => document.url().clone(),
        None => url,
    };

    let mut inserted = 0;
    for link in browser.query_all(&selectors.listing_link)? {
        let Some(href) = link.attribute("href") else {
            tracing::debug!("Listing link without href on page {}", page);
            continue;
        };

        let identity = match canonical_identity(href, &base) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!("Skipping listing link '{}': {}", href, e);
                continue;
            }
        };

        if storage.record_exists(&identity)? {
            tracing::debug!("Already known: {}", identity);
            continue;
        }

        storage.insert_pending(&identity, run_id)?;
        tracing::debug!("New listing: {}", identity);
        inserted += 1;
    }

    tracing::info!("Page {}: {} new listings", page, inserted);
    Ok(inserted)
}

/// Walks the result pages in order until one yields no new listing
///
/// The page count is read once from the search page. Results are sorted
/// newest first, so a page made only of known listings ends the pass even
/// when later pages exist.
pub async fn run_discovery<B: Browser, S: Storage>(
    browser: &mut B,
    storage: &mut S,
    site: &SiteConfig,
    selectors: &SelectorConfig,
    run_id: i64,
) -> Result<DiscoveryReport> {
    browser.load(&site.search_url).await?;

    let mut total_pages = read_page_count(browser, selectors)?;
    if let Some(max_pages) = site.max_pages {
        if total_pages > max_pages {
            tracing::info!(
                "Capping {} result pages at max-pages = {}",
                total_pages,
                max_pages
            );
            total_pages = max_pages;
        }
    }
    tracing::info!("Discovery: {} result pages", total_pages);

    let mut report = DiscoveryReport {
        total_pages,
        ..DiscoveryReport::default()
    };

    for page in 1..=total_pages {
        let inserted = discover_page(browser, storage, site, selectors, page, run_id).await?;
        report.pages_visited += 1;
        report.new_records += inserted;

        if inserted == 0 {
            report.stopped_early = page < total_pages;
            if report.stopped_early {
                tracing::info!("No new listings on page {}, stopping discovery", page);
            }
            break;
        }
    }

    Ok(report)
}

fn current_url<B: Browser>(browser: &B) -> String {
    browser
        .document()
        .map(|document| document.url().to_string())
        .unwrap_or_default()
}
