//! Page access for the crawl stages
//!
//! The stages only need a narrow contract: navigate to a URL, then run CSS
//! queries against whatever page is loaded. [`Browser`] captures that contract;
//! [`HttpBrowser`] implements it with a plain HTTP client and static HTML
//! parsing.

mod document;
mod http;

#[cfg(test)]
pub(crate) mod fixture;

pub use document::{Document, Element};
pub use http::{build_http_client, HttpBrowser};

use crate::{HarvestError, Result};
use async_trait::async_trait;

/// A single navigation context that can load pages and query them
#[async_trait]
pub trait Browser: Send {
    /// Navigates to `url`, replacing the current page
    async fn load(&mut self, url: &str) -> Result<()>;

    /// Returns the page loaded by the last successful `load`
    fn document(&self) -> Option<&Document>;

    /// Returns the first element matching `selector` on the current page
    fn query_one(&self, selector: &str) -> Result<Option<Element>> {
        require_document(self.document(), selector)?.select_one(selector)
    }

    /// Returns every element matching `selector` on the current page, in
    /// document order
    fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        require_document(self.document(), selector)?.select_all(selector)
    }
}

fn require_document<'a>(document: Option<&'a Document>, selector: &str) -> Result<&'a Document> {
    document.ok_or_else(|| HarvestError::NoPageLoaded {
        selector: selector.to_string(),
    })
}
