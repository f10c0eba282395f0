//! Change proposals: reviewed requests to move a task's date range.

use super::{
    Milestone, OutOfBoundsError, ParseProposalStatusError, ProposalId, ScheduleDomainError, Task,
    TaskId, UserId, stamp, validate_within,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a change proposal.
///
/// `Pending` is the only non-terminal state; [`ProposalStatus::apply`] is the
/// only way to leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Awaiting review.
    Pending,
    /// Accepted and applied to the task.
    Approved,
    /// Declined, either by a reviewer or because the range no longer fits.
    Rejected,
}

impl ProposalStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for states with no outgoing transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the state reached by applying `decision`, or `None` from a
    /// terminal state.
    #[must_use]
    pub const fn apply(self, decision: ReviewDecision) -> Option<Self> {
        match (self, decision) {
            (Self::Pending, ReviewDecision::Approve) => Some(Self::Approved),
            (Self::Pending, ReviewDecision::Reject) => Some(Self::Rejected),
            (Self::Approved | Self::Rejected, _) => None,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProposalStatus {
    type Error = ParseProposalStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseProposalStatusError(value.to_owned())),
        }
    }
}

/// A reviewer's verdict on a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Apply the requested range to the task.
    Approve,
    /// Decline the proposal.
    Reject,
}

/// Length limits applied to proposal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalLimits {
    /// Maximum reason length in characters.
    pub max_reason_chars: usize,
    /// Maximum comment length in characters.
    pub max_comment_chars: usize,
}

impl Default for ProposalLimits {
    fn default() -> Self {
        Self {
            max_reason_chars: 2_000,
            max_comment_chars: 4_000,
        }
    }
}

/// Validated input for a new proposal, before it is checked against a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    reason: String,
    comment: Option<String>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
}

impl ProposalDraft {
    /// Validates proposal text.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::EmptyReason`],
    /// [`ScheduleDomainError::ReasonTooLong`] or
    /// [`ScheduleDomainError::CommentTooLong`].
    pub fn new(
        reason: impl Into<String>,
        comment: Option<String>,
        requested_start: Option<NaiveDate>,
        requested_end: Option<NaiveDate>,
        limits: ProposalLimits,
    ) -> Result<Self, ScheduleDomainError> {
        Ok(Self {
            reason: normalize_reason(reason.into(), limits)?,
            comment: normalize_comment(comment, limits)?,
            requested_start,
            requested_end,
        })
    }

    /// Returns the normalized reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the normalized comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the requested start date, if any.
    #[must_use]
    pub const fn requested_start(&self) -> Option<NaiveDate> {
        self.requested_start
    }

    /// Returns the requested end date, if any.
    #[must_use]
    pub const fn requested_end(&self) -> Option<NaiveDate> {
        self.requested_end
    }
}

/// What a review did to the proposal and its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The proposal was approved and the task moved.
    Approved,
    /// The reviewer rejected the proposal.
    Rejected,
    /// Approval was attempted but the range no longer fits the milestone, so
    /// the proposal was rejected instead.
    AutoRejected(OutOfBoundsError),
}

/// Change proposal aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    id: ProposalId,
    task_id: TaskId,
    reason: String,
    comment: Option<String>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
    status: ProposalStatus,
    creator_id: UserId,
    last_modifier_id: UserId,
    supersedes: Option<ProposalId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProposalData {
    /// Persisted proposal identifier.
    pub id: ProposalId,
    /// Target task.
    pub task_id: TaskId,
    /// Persisted reason.
    pub reason: String,
    /// Persisted comment.
    pub comment: Option<String>,
    /// Requested start date.
    pub requested_start: Option<NaiveDate>,
    /// Requested end date.
    pub requested_end: Option<NaiveDate>,
    /// Review status.
    pub status: ProposalStatus,
    /// User who filed the proposal.
    pub creator_id: UserId,
    /// User who last changed the proposal.
    pub last_modifier_id: UserId,
    /// Earlier proposal this one replaces.
    pub supersedes: Option<ProposalId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ChangeProposal {
    /// Files a pending proposal against `task`.
    ///
    /// When both requested dates are present they are checked against
    /// `milestone` straight away. The check is advisory: approval checks
    /// again against whatever the milestone looks like then.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::OutOfBounds`] when both dates are given
    /// and do not fit the milestone.
    pub fn file(
        task: &Task,
        milestone: &Milestone,
        draft: ProposalDraft,
        creator_id: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ScheduleDomainError> {
        if let (Some(start), Some(end)) = (draft.requested_start, draft.requested_end) {
            validate_within(task.id(), start, end, milestone.range())?;
        }

        let timestamp = stamp(clock);
        Ok(Self {
            id: ProposalId::new(),
            task_id: task.id(),
            reason: draft.reason,
            comment: draft.comment,
            requested_start: draft.requested_start,
            requested_end: draft.requested_end,
            status: ProposalStatus::Pending,
            last_modifier_id: creator_id.clone(),
            creator_id,
            supersedes: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Files a new proposal that replaces a reviewed one.
    ///
    /// The previous proposal is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::ResubmitRequiresTerminal`] when
    /// `previous` is still pending, or the errors of [`Self::file`].
    pub fn resubmit(
        previous: &Self,
        task: &Task,
        milestone: &Milestone,
        draft: ProposalDraft,
        creator_id: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ScheduleDomainError> {
        if !previous.status.is_terminal() {
            return Err(ScheduleDomainError::ResubmitRequiresTerminal(previous.id));
        }
        debug_assert_eq!(previous.task_id, task.id());
        let mut proposal = Self::file(task, milestone, draft, creator_id, clock)?;
        proposal.supersedes = Some(previous.id);
        Ok(proposal)
    }

    /// Reconstructs a proposal from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProposalData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            reason: data.reason,
            comment: data.comment,
            requested_start: data.requested_start,
            requested_end: data.requested_end,
            status: data.status,
            creator_id: data.creator_id,
            last_modifier_id: data.last_modifier_id,
            supersedes: data.supersedes,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the proposal identifier.
    #[must_use]
    pub const fn id(&self) -> ProposalId {
        self.id
    }

    /// Returns the target task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the reason for the change.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the optional comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the requested start date, if any.
    #[must_use]
    pub const fn requested_start(&self) -> Option<NaiveDate> {
        self.requested_start
    }

    /// Returns the requested end date, if any.
    #[must_use]
    pub const fn requested_end(&self) -> Option<NaiveDate> {
        self.requested_end
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> ProposalStatus {
        self.status
    }

    /// Returns the user who filed the proposal.
    #[must_use]
    pub const fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    /// Returns the user who last changed the proposal.
    #[must_use]
    pub const fn last_modifier_id(&self) -> &UserId {
        &self.last_modifier_id
    }

    /// Returns the proposal this one replaces, if any.
    #[must_use]
    pub const fn supersedes(&self) -> Option<ProposalId> {
        self.supersedes
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

    /// The range the task would take if this proposal were approved now.
    ///
    /// Missing requested dates keep the task's current value.
    #[must_use]
    pub fn effective_dates(&self, task: &Task) -> (NaiveDate, NaiveDate) {
        (
            self.requested_start.unwrap_or_else(|| task.start()),
            self.requested_end.unwrap_or_else(|| task.end()),
        )
    }

    /// Edits the reason or comment of a pending proposal.
    ///
    /// `Some` replaces a field; an empty comment clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidStateTransition`] once the
    /// proposal is reviewed, or a text validation error.
    pub fn revise(
        &mut self,
        reason: Option<String>,
        comment: Option<String>,
        editor_id: UserId,
        limits: ProposalLimits,
        clock: &impl Clock,
    ) -> Result<(), ScheduleDomainError> {
        self.ensure_pending()?;
        let next_reason = reason
            .map(|value| normalize_reason(value, limits))
            .transpose()?;
        let next_comment = match comment {
            Some(value) => Some(normalize_comment(Some(value), limits)?),
            None => None,
        };

        if let Some(value) = next_reason {
            self.reason = value;
        }
        if let Some(value) = next_comment {
            self.comment = value;
        }
        self.touch(editor_id, clock);
        Ok(())
    }

    /// Applies a review decision.
    ///
    /// Approval moves `task` into the effective range, checked against
    /// `milestone` as it stands now. If the range no longer fits, the proposal
    /// is rejected instead and the task is left as it was; the returned
    /// [`ReviewOutcome::AutoRejected`] carries the violation.
    ///
    /// `task` and `milestone` must be the proposal's task and that task's
    /// milestone as currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidStateTransition`] when the
    /// proposal is already reviewed.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        task: &mut Task,
        milestone: &Milestone,
        reviewer_id: UserId,
        clock: &impl Clock,
    ) -> Result<ReviewOutcome, ScheduleDomainError> {
        debug_assert_eq!(task.id(), self.task_id);
        let next = self.status.apply(decision).ok_or(
            ScheduleDomainError::InvalidStateTransition {
                proposal_id: self.id,
                from: self.status,
            },
        )?;

        let outcome = match decision {
            ReviewDecision::Reject => ReviewOutcome::Rejected,
            ReviewDecision::Approve => {
                let (start, end) = self.effective_dates(task);
                match task.reschedule(start, end, milestone, clock) {
                    Ok(()) => ReviewOutcome::Approved,
                    Err(ScheduleDomainError::OutOfBounds(violation)) => {
                        ReviewOutcome::AutoRejected(violation)
                    }
                    Err(other) => return Err(other),
                }
            }
        };

        self.status = match outcome {
            ReviewOutcome::Approved => next,
            ReviewOutcome::Rejected | ReviewOutcome::AutoRejected(_) => ProposalStatus::Rejected,
        };
        self.touch(reviewer_id, clock);
        Ok(outcome)
    }

    const fn ensure_pending(&self) -> Result<(), ScheduleDomainError> {
        if self.status.is_terminal() {
            return Err(ScheduleDomainError::InvalidStateTransition {
                proposal_id: self.id,
                from: self.status,
            });
        }
        Ok(())
    }

    fn touch(&mut self, modifier_id: UserId, clock: &impl Clock) {
        self.last_modifier_id = modifier_id;
        self.updated_at = stamp(clock);
    }
}

fn normalize_reason(raw: String, limits: ProposalLimits) -> Result<String, ScheduleDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScheduleDomainError::EmptyReason);
    }
    let actual = trimmed.chars().count();
    if actual > limits.max_reason_chars {
        return Err(ScheduleDomainError::ReasonTooLong {
            max: limits.max_reason_chars,
            actual,
        });
    }
    Ok(trimmed.to_owned())
}

fn normalize_comment(
    raw: Option<String>,
    limits: ProposalLimits,
) -> Result<Option<String>, ScheduleDomainError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let actual = trimmed.chars().count();
    if actual > limits.max_comment_chars {
        return Err(ScheduleDomainError::CommentTooLong {
            max: limits.max_comment_chars,
            actual,
        });
    }
    Ok(Some(trimmed.to_owned()))
}
