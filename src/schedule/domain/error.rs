//! Error types for scheduling domain validation and parsing.

use super::{ProposalId, ProposalStatus, TaskId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// A date range whose start falls after its end.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid date range: start {start} is after end {end}")]
pub struct InvalidDateRange {
    /// Requested start date.
    pub start: NaiveDate,
    /// Requested end date.
    pub end: NaiveDate,
}

/// Which boundary a candidate task range crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryViolation {
    /// The candidate start is after the candidate end.
    StartAfterEnd,
    /// The candidate start precedes the milestone start.
    StartBeforeMilestone,
    /// The candidate end follows the milestone end.
    EndAfterMilestone,
}

impl fmt::Display for BoundaryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StartAfterEnd => "start is after end",
            Self::StartBeforeMilestone => "start precedes milestone start",
            Self::EndAfterMilestone => "end follows milestone end",
        })
    }
}

/// A candidate task range that does not fit inside its milestone.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error(
    "task {task_id} range {start}..{end} is outside milestone {milestone_start}..{milestone_end}: {violation}"
)]
pub struct OutOfBoundsError {
    /// Task the candidate range belongs to.
    pub task_id: TaskId,
    /// Candidate start date.
    pub start: NaiveDate,
    /// Candidate end date.
    pub end: NaiveDate,
    /// Milestone start at validation time.
    pub milestone_start: NaiveDate,
    /// Milestone end at validation time.
    pub milestone_end: NaiveDate,
    /// The violated boundary.
    pub violation: BoundaryViolation,
}

/// Errors returned while constructing or mutating scheduling domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleDomainError {
    /// A candidate range does not fit inside its milestone.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),

    /// The proposal reason is empty after trimming.
    #[error("proposal reason must not be empty")]
    EmptyReason,

    /// The proposal reason exceeds the configured limit.
    #[error("proposal reason has {actual} characters, limit is {max}")]
    ReasonTooLong {
        /// Configured maximum.
        max: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The proposal comment exceeds the configured limit.
    #[error("proposal comment has {actual} characters, limit is {max}")]
    CommentTooLong {
        /// Configured maximum.
        max: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// A task or milestone title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The proposal has already left the pending state.
    #[error("proposal {proposal_id} is {from} and can no longer change")]
    InvalidStateTransition {
        /// Proposal identifier.
        proposal_id: ProposalId,
        /// Current terminal status.
        from: ProposalStatus,
    },

    /// Only reviewed proposals may be resubmitted.
    #[error("proposal {0} is still pending and cannot be resubmitted")]
    ResubmitRequiresTerminal(ProposalId),
}

impl ScheduleDomainError {
    /// Returns `true` for the reason-validation family of errors.
    #[must_use]
    pub const fn is_invalid_reason(&self) -> bool {
        matches!(self, Self::EmptyReason | Self::ReasonTooLong { .. })
    }

    /// Returns `true` when the error rejects a proposal state change.
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::InvalidStateTransition { .. } | Self::ResubmitRequiresTerminal(_)
        )
    }
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing proposal statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown proposal status: {0}")]
pub struct ParseProposalStatusError(pub String);
