//! Service-level error taxonomy for scheduling operations.

use crate::schedule::{
    domain::{MilestoneId, OutOfBoundsError, ProposalId, ScheduleDomainError, TaskId},
    ports::ScheduleRepositoryError,
};
use std::fmt;
use thiserror::Error;

/// The entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A milestone.
    Milestone(MilestoneId),
    /// A task.
    Task(TaskId),
    /// A change proposal.
    Proposal(ProposalId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Milestone(id) => write!(f, "milestone {id}"),
            Self::Task(id) => write!(f, "task {id}"),
            Self::Proposal(id) => write!(f, "proposal {id}"),
        }
    }
}

/// Errors surfaced to callers of the scheduling services.
///
/// Every variant except [`SchedulingError::Repository`] describes a problem
/// with the caller's input and is not retried.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// A range does not fit inside its milestone, or starts after it ends.
    #[error(transparent)]
    OutOfBounds(OutOfBoundsError),

    /// The proposal reason is missing or too long.
    #[error(transparent)]
    InvalidReason(ScheduleDomainError),

    /// The proposal is not in a state that allows the operation.
    #[error(transparent)]
    InvalidState(ScheduleDomainError),

    /// Other domain validation failed.
    #[error(transparent)]
    Domain(ScheduleDomainError),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(ScheduleRepositoryError),
}

impl SchedulingError {
    /// Returns `true` for [`SchedulingError::OutOfBounds`].
    #[must_use]
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds(_))
    }

    /// Returns `true` for [`SchedulingError::InvalidReason`].
    #[must_use]
    pub const fn is_invalid_reason(&self) -> bool {
        matches!(self, Self::InvalidReason(_))
    }

    /// Returns `true` for [`SchedulingError::InvalidState`].
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Returns `true` for [`SchedulingError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<OutOfBoundsError> for SchedulingError {
    fn from(err: OutOfBoundsError) -> Self {
        Self::OutOfBounds(err)
    }
}

impl From<ScheduleDomainError> for SchedulingError {
    fn from(err: ScheduleDomainError) -> Self {
        match err {
            ScheduleDomainError::OutOfBounds(violation) => Self::OutOfBounds(violation),
            other if other.is_invalid_reason() => Self::InvalidReason(other),
            other if other.is_invalid_state() => Self::InvalidState(other),
            other => Self::Domain(other),
        }
    }
}

impl From<ScheduleRepositoryError> for SchedulingError {
    fn from(err: ScheduleRepositoryError) -> Self {
        match err {
            ScheduleRepositoryError::MilestoneNotFound(id) => {
                Self::NotFound(EntityRef::Milestone(id))
            }
            ScheduleRepositoryError::TaskNotFound(id) => Self::NotFound(EntityRef::Task(id)),
            ScheduleRepositoryError::ProposalNotFound(id) => {
                Self::NotFound(EntityRef::Proposal(id))
            }
            other => Self::Repository(other),
        }
    }
}

/// Result type for scheduling service operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;
