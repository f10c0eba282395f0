//! Milestones: the date windows that bound their tasks.

use super::{DateRange, MilestoneId, ProjectId, ScheduleDomainError, stamp};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A project phase whose range bounds every task filed under it.
///
/// Milestones are owned by an external collaborator; this crate reads them
/// to validate tasks and only reshapes them on that collaborator's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    project_id: ProjectId,
    name: String,
    range: DateRange,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMilestoneData {
    /// Persisted milestone identifier.
    pub id: MilestoneId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Persisted date range.
    pub range: DateRange,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Creates a milestone for a project.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyTitle`] when the name is blank.
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        range: DateRange,
        clock: &impl Clock,
    ) -> Result<Self, ScheduleDomainError> {
        let normalized = normalize_title(name.into())?;
        let timestamp = stamp(clock);
        Ok(Self {
            id: MilestoneId::new(),
            project_id,
            name: normalized,
            range,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a milestone from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMilestoneData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            range: data.range,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the milestone identifier.
    #[must_use]
    pub const fn id(&self) -> MilestoneId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the milestone's date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
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

    /// Moves the milestone to a new range.
    ///
    /// Existing tasks are not revalidated here; they are checked again the
    /// next time anything tries to change them.
    pub fn reschedule(&mut self, range: DateRange, clock: &impl Clock) {
        self.range = range;
        self.updated_at = stamp(clock);
    }
}

pub(super) fn normalize_title(raw: String) -> Result<String, ScheduleDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScheduleDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
