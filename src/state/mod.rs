//! State module for tracking the record lifecycle
//!
//! Every listing moves through exactly two states: it is discovered as
//! `Pending`, then becomes `Completed` once its detail page has been read.
//! Nothing ever moves a record back to `Pending`.

mod record_state;

pub use record_state::RecordState;
