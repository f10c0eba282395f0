//! Service layer for filing and reviewing change proposals.

use crate::schedule::{
    domain::{
        ChangeProposal, Milestone, ProposalDraft, ProposalId, ProposalLimits, ReviewDecision,
        ReviewOutcome, ScheduleDomainError, Task, TaskId, UserId,
    },
    ports::{ScheduleRepository, ScheduleTransaction},
    services::{EntityRef, SchedulingError, SchedulingResult},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for filing a change proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProposalRequest {
    task_id: TaskId,
    reason: String,
    comment: Option<String>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
    creator_id: String,
}

impl CreateProposalRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(task_id: TaskId, reason: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            task_id,
            reason: reason.into(),
            comment: None,
            requested_start: None,
            requested_end: None,
            creator_id: creator_id.into(),
        }
    }

    /// Sets the reviewer-facing comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the requested start date.
    #[must_use]
    pub const fn with_requested_start(mut self, start: NaiveDate) -> Self {
        self.requested_start = Some(start);
        self
    }

    /// Sets the requested end date.
    #[must_use]
    pub const fn with_requested_end(mut self, end: NaiveDate) -> Self {
        self.requested_end = Some(end);
        self
    }

    /// Sets both requested dates.
    #[must_use]
    pub const fn with_requested_range(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.with_requested_start(start).with_requested_end(end)
    }
}

/// Request payload for replacing a reviewed proposal with a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResubmitProposalRequest {
    previous_id: ProposalId,
    reason: String,
    comment: Option<String>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
    creator_id: String,
}

impl ResubmitProposalRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        previous_id: ProposalId,
        reason: impl Into<String>,
        creator_id: impl Into<String>,
    ) -> Self {
        Self {
            previous_id,
            reason: reason.into(),
            comment: None,
            requested_start: None,
            requested_end: None,
            creator_id: creator_id.into(),
        }
    }

    /// Sets the reviewer-facing comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets both requested dates.
    #[must_use]
    pub const fn with_requested_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.requested_start = Some(start);
        self.requested_end = Some(end);
        self
    }

    /// Sets the requested start date.
    #[must_use]
    pub const fn with_requested_start(mut self, start: NaiveDate) -> Self {
        self.requested_start = Some(start);
        self
    }

    /// Sets the requested end date.
    #[must_use]
    pub const fn with_requested_end(mut self, end: NaiveDate) -> Self {
        self.requested_end = Some(end);
        self
    }
}

/// Request payload for editing a pending proposal's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseProposalRequest {
    proposal_id: ProposalId,
    reason: Option<String>,
    comment: Option<String>,
    editor_id: String,
}

impl ReviseProposalRequest {
    /// Creates a request that changes nothing yet.
    #[must_use]
    pub fn new(proposal_id: ProposalId, editor_id: impl Into<String>) -> Self {
        Self {
            proposal_id,
            reason: None,
            comment: None,
            editor_id: editor_id.into(),
        }
    }

    /// Replaces the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Replaces the comment; an empty comment clears it.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Change proposal workflow service.
#[derive(Clone)]
pub struct ChangeProposalService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    clock: Arc<C>,
    limits: ProposalLimits,
}

impl<R, C> ChangeProposalService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new proposal service with the given text limits.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, limits: ProposalLimits) -> Self {
        Self {
            repository,
            clock,
            limits,
        }
    }

    /// Files a pending proposal.
    ///
    /// The reason is checked first. When both requested dates are given they
    /// are then checked against the task's current milestone; nothing is
    /// stored if either check fails.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidReason`] for a missing or oversized
    /// reason, [`SchedulingError::NotFound`] when the task does not exist, or
    /// [`SchedulingError::OutOfBounds`] when the requested range does not fit.
    pub async fn create(&self, request: CreateProposalRequest) -> SchedulingResult<ChangeProposal> {
        let CreateProposalRequest {
            task_id,
            reason,
            comment,
            requested_start,
            requested_end,
            creator_id,
        } = request;
        let draft = self.draft(reason, comment, requested_start, requested_end)?;
        let creator = UserId::new(creator_id)?;
        let clock = Arc::clone(&self.clock);

        let result = self
            .repository
            .transaction(move |tx| -> SchedulingResult<ChangeProposal> {
                let (task, milestone) = load_task_with_milestone(tx, task_id)?;
                let proposal = ChangeProposal::file(&task, &milestone, draft, creator, &*clock)?;
                tx.insert_proposal(&proposal)?;
                Ok(proposal)
            })
            .await;

        match &result {
            Ok(proposal) => info!(
                proposal_id = %proposal.id(),
                task_id = %task_id,
                creator_id = %proposal.creator_id(),
                "change proposal filed"
            ),
            Err(err) => debug!(task_id = %task_id, error = %err, "change proposal rejected"),
        }
        result
    }

    /// Approves or rejects a pending proposal.
    ///
    /// The status change and, on approval, the task update commit together.
    /// Approval re-checks the requested range against the milestone as it
    /// stands now. If it no longer fits, the proposal is stored as rejected,
    /// the task is left alone, and the caller gets
    /// [`SchedulingError::OutOfBounds`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidState`] when the proposal was already
    /// reviewed, [`SchedulingError::OutOfBounds`] when an approval no longer
    /// fits, or [`SchedulingError::NotFound`] for missing entities.
    pub async fn review(
        &self,
        proposal_id: ProposalId,
        decision: ReviewDecision,
        reviewer_id: impl Into<String>,
    ) -> SchedulingResult<ChangeProposal> {
        let reviewer = UserId::new(reviewer_id)?;
        let clock = Arc::clone(&self.clock);

        let result = self
            .repository
            .transaction(move |tx| -> SchedulingResult<(ChangeProposal, ReviewOutcome)> {
                let mut proposal = load_proposal(tx, proposal_id)?;
                let (mut task, milestone) = load_task_with_milestone(tx, proposal.task_id())?;
                let outcome =
                    proposal.review(decision, &mut task, &milestone, reviewer, &*clock)?;
                if outcome == ReviewOutcome::Approved {
                    tx.update_task(&task)?;
                }
                tx.update_proposal(&proposal)?;
                Ok((proposal, outcome))
            })
            .await;

        match result {
            Ok((proposal, ReviewOutcome::AutoRejected(violation))) => {
                warn!(
                    proposal_id = %proposal.id(),
                    task_id = %proposal.task_id(),
                    violation = %violation.violation,
                    "approval no longer fits milestone; proposal rejected"
                );
                Err(SchedulingError::OutOfBounds(violation))
            }
            Ok((proposal, outcome)) => {
                info!(
                    proposal_id = %proposal.id(),
                    task_id = %proposal.task_id(),
                    status = %proposal.status(),
                    reviewer_id = %proposal.last_modifier_id(),
                    ?outcome,
                    "change proposal reviewed"
                );
                Ok(proposal)
            }
            Err(err) => {
                debug!(proposal_id = %proposal_id, error = %err, "review rejected");
                Err(err)
            }
        }
    }

    /// Edits the reason or comment of a pending proposal.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidState`] once the proposal is
    /// reviewed, [`SchedulingError::InvalidReason`] for an invalid reason, or
    /// [`SchedulingError::NotFound`] when the proposal does not exist.
    pub async fn revise(&self, request: ReviseProposalRequest) -> SchedulingResult<ChangeProposal> {
        let ReviseProposalRequest {
            proposal_id,
            reason,
            comment,
            editor_id,
        } = request;
        let editor = UserId::new(editor_id)?;
        let clock = Arc::clone(&self.clock);
        let limits = self.limits;

        let proposal = self
            .repository
            .transaction(move |tx| -> SchedulingResult<ChangeProposal> {
                let mut proposal = load_proposal(tx, proposal_id)?;
                proposal.revise(reason, comment, editor, limits, &*clock)?;
                tx.update_proposal(&proposal)?;
                Ok(proposal)
            })
            .await?;
        info!(proposal_id = %proposal_id, "change proposal revised");
        Ok(proposal)
    }

    /// Files a new proposal replacing a reviewed one.
    ///
    /// The new proposal targets the same task and records which proposal it
    /// supersedes; the old one is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidState`] when the previous proposal is
    /// still pending, plus every error of [`Self::create`].
    pub async fn resubmit(
        &self,
        request: ResubmitProposalRequest,
    ) -> SchedulingResult<ChangeProposal> {
        let ResubmitProposalRequest {
            previous_id,
            reason,
            comment,
            requested_start,
            requested_end,
            creator_id,
        } = request;
        let draft = self.draft(reason, comment, requested_start, requested_end)?;
        let creator = UserId::new(creator_id)?;
        let clock = Arc::clone(&self.clock);

        let result = self
            .repository
            .transaction(move |tx| -> SchedulingResult<ChangeProposal> {
                let previous = load_proposal(tx, previous_id)?;
                let (task, milestone) = load_task_with_milestone(tx, previous.task_id())?;
                let proposal = ChangeProposal::resubmit(
                    &previous, &task, &milestone, draft, creator, &*clock,
                )?;
                tx.insert_proposal(&proposal)?;
                Ok(proposal)
            })
            .await;

        match &result {
            Ok(proposal) => info!(
                proposal_id = %proposal.id(),
                supersedes = %previous_id,
                task_id = %proposal.task_id(),
                "change proposal resubmitted"
            ),
            Err(err) => debug!(supersedes = %previous_id, error = %err, "resubmission rejected"),
        }
        result
    }

    /// Retrieves a proposal.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the proposal does not exist.
    pub async fn get(&self, proposal_id: ProposalId) -> SchedulingResult<ChangeProposal> {
        self.repository
            .find_proposal(proposal_id)
            .await?
            .ok_or(SchedulingError::NotFound(EntityRef::Proposal(proposal_id)))
    }

    fn draft(
        &self,
        reason: String,
        comment: Option<String>,
        requested_start: Option<NaiveDate>,
        requested_end: Option<NaiveDate>,
    ) -> Result<ProposalDraft, ScheduleDomainError> {
        ProposalDraft::new(reason, comment, requested_start, requested_end, self.limits)
    }
}

fn load_proposal(
    tx: &mut dyn ScheduleTransaction,
    proposal_id: ProposalId,
) -> SchedulingResult<ChangeProposal> {
    tx.proposal(proposal_id)?
        .ok_or(SchedulingError::NotFound(EntityRef::Proposal(proposal_id)))
}

fn load_task_with_milestone(
    tx: &mut dyn ScheduleTransaction,
    task_id: TaskId,
) -> SchedulingResult<(Task, Milestone)> {
    let task = tx
        .task(task_id)?
        .ok_or(SchedulingError::NotFound(EntityRef::Task(task_id)))?;
    let milestone_id = task.milestone_id();
    let milestone = tx
        .milestone(milestone_id)?
        .ok_or(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)))?;
    Ok((task, milestone))
}
