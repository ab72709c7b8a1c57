//! Unit-suffixed field grammars
//!
//! Number and unit are separated by ordinary spaces or U+00A0 only. The
//! numeric token is captured loosely and validated by [`parse_grouped`].

use super::grouped::parse_grouped;
use super::{FieldKind, NormalizeError, NormalizeResult};
use regex::Regex;
use std::sync::LazyLock;

static PRICE_EUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9.]+)[ \x{a0}]+€\s*$").expect("valid price pattern"));

static DISTANCE_KM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([0-9.]+)[ \x{a0}]+km\s*$").expect("valid km pattern"));

static POWER_KW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9.]+)[ \x{a0}]+kw(?:\s*\([^)]*\))?\s*$").expect("valid kW pattern")
});

static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([0-9.]+)[ \x{a0}]+min\.?\s*$").expect("valid min pattern"));

static COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\s*$").expect("valid count pattern"));

fn parse_with(pattern: &Regex, kind: FieldKind, text: &str) -> NormalizeResult<u64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|number| parse_grouped(number.as_str()))
        .ok_or_else(|| NormalizeError::new(kind, text))
}

/// Parses a whole-euro price such as `49.547 €`
///
/// The euro sign must follow the number after at least one space.
pub fn parse_price_eur(text: &str) -> NormalizeResult<u64> {
    parse_with(&PRICE_EUR, FieldKind::PriceEur, text)
}

/// Parses a distance such as `12.345 km`
pub fn parse_km(text: &str) -> NormalizeResult<u64> {
    parse_with(&DISTANCE_KM, FieldKind::Distance, text)
}

/// Parses a power rating such as `350 kW (476 cv)`
///
/// A single trailing parenthetical is allowed and ignored.
pub fn parse_kw(text: &str) -> NormalizeResult<u64> {
    parse_with(&POWER_KW, FieldKind::Power, text)
}

/// Parses a duration such as `18 Min.`
pub fn parse_minutes(text: &str) -> NormalizeResult<u64> {
    parse_with(&MINUTES, FieldKind::Minutes, text)
}

/// Parses a small bare count such as the number of previous owners
///
/// No grouping separators are accepted, and a leading zero is only valid for
/// the literal value `0`.
pub fn parse_count(text: &str) -> NormalizeResult<u32> {
    let invalid = || NormalizeError::new(FieldKind::Count, text);

    let digits = COUNT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(invalid)?;

    if digits.len() > 1 && digits.starts_with('0') {
        return Err(invalid());
    }

    digits.parse::<u32>().map_err(|_| invalid())
}
