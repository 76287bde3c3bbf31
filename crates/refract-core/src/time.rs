//! RFC 3339 timestamps.
//!
//! Dates are persisted as the exact RFC 3339 string they were written with.
//! Parsing is only used to validate input and to compare instants.

use std::cmp::Ordering;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{CoreError, Result};

/// Parses an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns `CoreError::InvalidDateTime` if the string is not RFC 3339.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| {
        CoreError::invalid_date_time(format!("Failed to parse DateTime '{s}': {e}"))
    })
}

/// Compares two timestamps by instant.
///
/// Returns `None` if either side is not a valid RFC 3339 timestamp.
pub fn compare_datetimes(a: &str, b: &str) -> Option<Ordering> {
    let a = parse_datetime(a).ok()?;
    let b = parse_datetime(b).ok()?;
    Some(a.cmp(&b))
}
