//! Detail stage: fetch each pending listing and normalize its fields

use crate::browser::Browser;
use crate::config::SelectorConfig;
use crate::normalize::{parse_count, parse_km, parse_kw, parse_minutes, parse_price_eur};
use crate::storage::{Attributes, CarDetails, Storage};
use crate::{HarvestError, Result};

/// Feature-panel labels the detail stage understands
pub const LABEL_DISTANCE: &str = "Kilometraje";
pub const LABEL_POWER: &str = "Potencia";
pub const LABEL_FAST_CHARGE: &str = "Tiempo de carga rápida";
pub const LABEL_RANGE_WLTP: &str = "Autonomía (WLTP)";
pub const LABEL_PREVIOUS_OWNERS: &str = "Propietarios anteriores";

/// Outcome of one detail pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailReport {
    pub attempted: u64,
    pub completed: u64,
    /// Listings left pending after an item-level failure
    pub failed: u64,
}

/// Maps feature-panel label/value pairs onto normalized attributes
///
/// Unknown labels are ignored. A known label whose value does not normalize
/// leaves its attribute unset. When a label repeats, the last pair wins.
///
/// # Examples
///
/// ```
/// use car_harvest::crawler::apply_features;
///
/// let attributes = apply_features([
///     ("Kilometraje", "8.000 km"),
///     ("Potencia", "150 kW (204 cv)"),
///     ("Propietarios anteriores", "01"),
/// ]);
/// assert_eq!(attributes.distance_km, Some(8000));
/// assert_eq!(attributes.power_kw, Some(150));
/// assert_eq!(attributes.power_raw_label.as_deref(), Some("150 kW (204 cv)"));
/// assert_eq!(attributes.previous_owners, None);
/// ```
pub fn apply_features<'a, I>(features: I) -> Attributes
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut attributes = Attributes::default();

    for (label, value) in features {
        match label.trim() {
            LABEL_DISTANCE => attributes.distance_km = parse_km(value).ok(),
            LABEL_POWER => {
                attributes.power_kw = parse_kw(value).ok();
                attributes.power_raw_label = Some(value.trim().to_string());
            }
            LABEL_FAST_CHARGE => attributes.fast_charge_minutes = parse_minutes(value).ok(),
            LABEL_RANGE_WLTP => attributes.range_wltp_km = parse_km(value).ok(),
            LABEL_PREVIOUS_OWNERS => attributes.previous_owners = parse_count(value).ok(),
            other => tracing::trace!("Ignoring feature '{}'", other),
        }
    }

    attributes
}

/// Loads a listing's detail page and extracts its fields
///
/// Fails with [`HarvestError::MissingElement`] when the title or the price
/// block is absent. Optional fields and values that fail normalization are
/// left unset.
pub async fn fetch_details<B: Browser>(
    browser: &mut B,
    selectors: &SelectorConfig,
    identity: &str,
) -> Result<CarDetails> {
    browser.load(identity).await?;

    let title = required_text(browser, &selectors.title, "title", identity)?;
    let price_text = required_text(browser, &selectors.price, "price", identity)?;
    let subtitle = optional_text(browser, &selectors.subtitle)?;
    let price_fairness = optional_text(browser, &selectors.price_fairness)?;

    let price = match parse_price_eur(&price_text) {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::debug!("{}: {}", identity, e);
            None
        }
    };

    let panel = browser.query_all(&selectors.feature)?;
    let pairs = panel.iter().filter_map(|feature| match feature.text_lines() {
        [label, value, ..] => Some((label.as_str(), value.as_str())),
        _ => None,
    });
    let attributes = apply_features(pairs);

    Ok(CarDetails {
        title: Some(title),
        subtitle,
        price,
        price_fairness,
        attributes,
    })
}

/// Fetches details for every listing pending when the pass starts
///
/// Item-level failures leave the listing pending and the pass moves on. Any
/// other failure aborts the pass.
pub async fn run_details<B: Browser, S: Storage>(
    browser: &mut B,
    storage: &mut S,
    selectors: &SelectorConfig,
) -> Result<DetailReport> {
    let pending = storage.find_pending()?;
    tracing::info!("Details: {} pending listings", pending.len());

    let mut report = DetailReport::default();
    for record in pending {
        report.attempted += 1;
        tracing::info!("Fetching {}", record.identity);

        match fetch_details(browser, selectors, &record.identity).await {
            Ok(details) => {
                storage.complete_record(&record.identity, &details)?;
                report.completed += 1;
            }
            Err(e) if e.is_item_level() => {
                tracing::warn!("Leaving {} pending: {}", record.identity, e);
                report.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Details: {} completed, {} left pending",
        report.completed,
        report.failed
    );
    Ok(report)
}

fn required_text<B: Browser>(
    browser: &B,
    selector: &str,
    field: &'static str,
    identity: &str,
) -> Result<String> {
    optional_text(browser, selector)?.ok_or_else(|| HarvestError::MissingElement {
        url: identity.to_string(),
        field,
        selector: selector.to_string(),
    })
}

fn optional_text<B: Browser>(browser: &B, selector: &str) -> Result<Option<String>> {
    let text = browser
        .query_one(selector)?
        .map(|element| element.text().trim().to_string())
        .filter(|text| !text.is_empty());
    Ok(text)
}
