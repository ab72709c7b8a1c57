//! In-memory browser serving canned HTML

use crate::browser::{Browser, Document};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use url::Url;

/// Serves fixed HTML per URL and records every navigation
#[derive(Debug, Default)]
pub(crate) struct FixtureBrowser {
    pages: HashMap<String, String>,
    statuses: HashMap<String, u16>,
    pub(crate) visited: Vec<String>,
    document: Option<Document>,
}

impl FixtureBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Answers `url` with an error status instead of a page
    pub(crate) fn status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }
}

#[async_trait]
impl Browser for FixtureBrowser {
    async fn load(&mut self, url: &str) -> Result<()> {
        self.visited.push(url.to_string());
        self.document = None;

        if let Some(&status) = self.statuses.get(url) {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let html = self
            .pages
            .get(url)
            .ok_or_else(|| HarvestError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })?;
        let parsed = Url::parse(url).map_err(|e| crate::UrlError::Parse(e.to_string()))?;

        self.document = Some(Document::new(parsed, html.clone()));
        Ok(())
    }

    fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }
}
