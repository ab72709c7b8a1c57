//! Loaded HTML pages and element snapshots

use crate::{HarvestError, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A loaded page: its final URL and raw HTML
///
/// The HTML is re-parsed per query; parsed trees are not `Send`, and a page
/// is only queried a handful of times.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    html: String,
}

/// An owned snapshot of a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    text: String,
    lines: Vec<String>,
    attributes: Vec<(String, String)>,
}

impl Document {
    pub fn new(url: Url, html: String) -> Self {
        Self { url, html }
    }

    /// The URL the page was served from, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn select_one(&self, selector: &str) -> Result<Option<Element>> {
        let selector = compile(selector)?;
        let html = Html::parse_document(&self.html);
        let first = html.select(&selector).next().map(snapshot);
        Ok(first)
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<Element>> {
        let selector = compile(selector)?;
        let html = Html::parse_document(&self.html);
        let all = html.select(&selector).map(snapshot).collect();
        Ok(all)
    }
}

impl Element {
    /// Concatenated text of the element and its descendants, untrimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The element's text nodes, trimmed, with blank ones dropped
    ///
    /// A label/value pair rendered as two child elements yields two lines.
    pub fn text_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

fn snapshot(element: ElementRef<'_>) -> Element {
    let text = element.text().collect::<String>();
    let lines = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let attributes = element
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Element {
        text,
        lines,
        attributes,
    }
}
