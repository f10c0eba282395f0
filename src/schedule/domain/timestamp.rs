//! Audit timestamps at storage precision.

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;

/// Digits of sub-second precision kept on audit timestamps.
///
/// `PostgreSQL` `TIMESTAMPTZ` stores microseconds.
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// Reads the clock and truncates the instant to microseconds.
///
/// Aggregates stamp through this so a value built in memory compares equal
/// to the same value read back from storage.
#[must_use]
pub fn stamp(clock: &impl Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS)
}
