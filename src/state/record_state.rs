//! Record state definitions for the two-phase crawl

use std::fmt;

/// Represents where a listing record is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// Listing was found on a result page; its details have not been read yet
    Pending,

    /// Listing details were fetched and normalized at least once
    Completed,
}

impl RecordState {
    /// Returns true if the record still needs a detail fetch
    pub fn needs_details(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if moving from `self` to `next` keeps the lifecycle monotonic
    ///
    /// A completed record may be completed again (a later detail fetch
    /// overwrites it), but it may never become pending.
    pub fn can_transition_to(&self, next: RecordState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Completed) => true,
            (Self::Completed, Self::Completed) => true,
            (Self::Pending, Self::Pending) => false,
            (Self::Completed, Self::Pending) => false,
        }
    }

    /// Converts the record state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses a record state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns all possible record states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Pending, Self::Completed]
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
