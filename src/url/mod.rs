//! URL handling module for Car-Harvest
//!
//! This module derives canonical listing identities from result-page links and
//! builds the URLs of numbered result pages.

use crate::{UrlError, UrlResult};
use url::Url;

/// Derives the canonical identity of a listing from a result-page link
///
/// The link is resolved against the page it was found on, then cut at the
/// first `&`: listing links carry the item id as their first query parameter
/// and every parameter after it (search echo, session ids, referrer tags)
/// changes between crawls.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base` - The URL of the page the link was found on
///
/// # Examples
///
/// ```
/// use car_harvest::url::canonical_identity;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com/buscar.html?s=Car").unwrap();
/// let a = canonical_identity("/detalles.html?id=123&sb=doc&ref=srp", &base).unwrap();
/// let b = canonical_identity("/detalles.html?id=123&ref=srp", &base).unwrap();
/// assert_eq!(a, "https://www.example.com/detalles.html?id=123");
/// assert_eq!(a, b);
/// ```
pub fn canonical_identity(href: &str, base: &Url) -> UrlResult<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::EmptyLink);
    }

    // Markup sometimes leaves the entity in the attribute value
    let href = href.replace("&amp;", "&");

    let resolved = base
        .join(&href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(resolved.scheme().to_string()));
    }

    let serialized = resolved.as_str();
    let identity = match serialized.find('&') {
        Some(cut) => &serialized[..cut],
        None => serialized,
    };

    Ok(identity.to_string())
}

/// Builds the URL of a numbered result page
///
/// The page parameter is appended to the search URL's existing query, so the
/// search filters are sent unchanged.
///
/// # Examples
///
/// ```
/// use car_harvest::url::listing_page_url;
///
/// let url = listing_page_url("https://example.com/buscar.html?s=Car", "pageNumber", 3).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/buscar.html?s=Car&pageNumber=3");
/// ```
pub fn listing_page_url(search_url: &str, page_param: &str, page: u32) -> UrlResult<Url> {
    let mut url = Url::parse(search_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair(page_param, &page.to_string());
    Ok(url)
}
