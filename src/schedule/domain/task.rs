//! Scheduled tasks and their milestone-bounded date ranges.

use super::{
    DateRange, Milestone, MilestoneId, ParseTaskStatusError, ScheduleDomainError, TaskId,
    milestone::normalize_title, stamp, validate_within,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress status carried on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task aggregate root.
///
/// A task's range always lies inside the range its milestone had when the
/// task was last written. The task stores only the milestone identifier;
/// callers look the milestone up again before every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    milestone_id: MilestoneId,
    title: String,
    range: DateRange,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning milestone.
    pub milestone_id: MilestoneId,
    /// Persisted title.
    pub title: String,
    /// Persisted date range.
    pub range: DateRange,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task inside a milestone.
    ///
    /// The identifier is assigned before validation so a rejection can name
    /// the task it would have created.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyTitle`] for a blank title and
    /// [`ScheduleDomainError::OutOfBounds`] when the range does not fit the
    /// milestone.
    pub fn new(
        milestone: &Milestone,
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        clock: &impl Clock,
    ) -> Result<Self, ScheduleDomainError> {
        let normalized = normalize_title(title.into())?;
        let id = TaskId::new();
        let range = validate_within(id, start, end, milestone.range())?;
        let timestamp = stamp(clock);

        Ok(Self {
            id,
            milestone_id: milestone.id(),
            title: normalized,
            range,
            status: TaskStatus::NotStarted,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            milestone_id: data.milestone_id,
            title: data.title,
            range: data.range,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning milestone identifier.
    #[must_use]
    pub const fn milestone_id(&self) -> MilestoneId {
        self.milestone_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the current date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Returns the current start date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.range.start()
    }

    /// Returns the current end date.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.range.end()
    }

    /// Returns the progress status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to a new range inside `milestone`.
    ///
    /// `milestone` must be the task's milestone as currently stored. The task
    /// is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::OutOfBounds`] when the range does not
    /// fit the milestone.
    pub fn reschedule(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        milestone: &Milestone,
        clock: &impl Clock,
    ) -> Result<(), ScheduleDomainError> {
        debug_assert_eq!(milestone.id(), self.milestone_id);
        self.range = validate_within(self.id, start, end, milestone.range())?;
        self.updated_at = stamp(clock);
        Ok(())
    }
}
