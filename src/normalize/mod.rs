//! Strict normalization of human-readable listing fields
//!
//! Listing pages render numbers the way a Spanish-locale reader expects them:
//! `.` groups thousands, units follow the number after a (possibly
//! non-breaking) space. Each parser here accepts exactly one such grammar over
//! the whole input and rejects anything else.
//!
//! # Example
//!
//! ```
//! use car_harvest::normalize::{parse_kw, parse_price_eur};
//!
//! assert_eq!(parse_price_eur("49.547\u{a0}€").unwrap(), 49_547);
//! assert_eq!(parse_kw("150 kW (204 cv)").unwrap(), 150);
//! assert!(parse_kw("150.5 kW").is_err());
//! ```

mod grouped;
mod units;

pub use grouped::{parse_grouped, MAX_GROUPED};
pub use units::{parse_count, parse_km, parse_kw, parse_minutes, parse_price_eur};

use std::fmt;
use thiserror::Error;

/// The family of text fields the normalizers understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Whole euros, e.g. `49.547 €`
    PriceEur,
    /// Kilometres, e.g. `12.345 km`
    Distance,
    /// Kilowatts with an optional parenthetical, e.g. `350 kW (476 cv)`
    Power,
    /// Minutes with an optional trailing dot, e.g. `18 Min.`
    Minutes,
    /// Small bare counts, e.g. `3`
    Count,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PriceEur => "price",
            Self::Distance => "distance",
            Self::Power => "power",
            Self::Minutes => "duration",
            Self::Count => "count",
        };
        f.write_str(name)
    }
}

/// A value that did not match its grammar or did not fit the target type
///
/// Format and range failures share this error; either way the field is not
/// available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value: {input:?}")]
pub struct NormalizeError {
    pub kind: FieldKind,
    pub input: String,
}

impl NormalizeError {
    pub(crate) fn new(kind: FieldKind, input: &str) -> Self {
        Self {
            kind,
            input: input.to_string(),
        }
    }
}

/// Result type for normalization
pub type NormalizeResult<T> = Result<T, NormalizeError>;
