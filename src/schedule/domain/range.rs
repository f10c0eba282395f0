//! Calendar date ranges and the milestone boundary check.

use super::{BoundaryViolation, InvalidDateRange, OutOfBoundsError, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive calendar date range with `start <= end`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use keystone::schedule::domain::DateRange;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
/// let end = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;
/// let jan = DateRange::new(start, end)?;
/// assert_eq!(jan.duration_days(), 31);
/// assert!(DateRange::new(end, start).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = InvalidDateRange;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRange`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if start > end {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns `true` when `date` falls inside the range.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns `true` when `other` lies entirely inside this range.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` when the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns a copy with a different start date.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRange`] when the new start is after the end.
    pub fn with_start(self, start: NaiveDate) -> Result<Self, InvalidDateRange> {
        Self::new(start, self.end)
    }

    /// Returns a copy with a different end date.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRange`] when the new end is before the start.
    pub fn with_end(self, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        Self::new(self.start, end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Checks a candidate task range against its milestone's range.
///
/// Pure and total: it reads nothing but its arguments, so it is safe to call
/// speculatively before any write. On success the candidate is returned as a
/// [`DateRange`].
///
/// # Errors
///
/// Returns [`OutOfBoundsError`] when `start > end`, `start` precedes the
/// milestone start, or `end` follows the milestone end. An inverted range is
/// reported first, then a start violation, then an end violation.
pub fn validate_within(
    task_id: TaskId,
    start: NaiveDate,
    end: NaiveDate,
    milestone: DateRange,
) -> Result<DateRange, OutOfBoundsError> {
    let violation = if start > end {
        Some(BoundaryViolation::StartAfterEnd)
    } else if start < milestone.start() {
        Some(BoundaryViolation::StartBeforeMilestone)
    } else if end > milestone.end() {
        Some(BoundaryViolation::EndAfterMilestone)
    } else {
        None
    };

    match violation {
        None => Ok(DateRange { start, end }),
        Some(kind) => Err(OutOfBoundsError {
            task_id,
            start,
            end,
            milestone_start: milestone.start(),
            milestone_end: milestone.end(),
            violation: kind,
        }),
    }
}
