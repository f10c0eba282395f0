//! Filter and paging parameters for listing change proposals.

use super::{ChangeProposal, MilestoneId, ProjectId, ProposalStatus, TaskId};

/// Conjunctive filter over change proposals with optional paging.
///
/// An absent filter leaves that dimension unconstrained. Results are ordered
/// by creation time, ties broken by proposal identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProposalQuery {
    project_id: Option<ProjectId>,
    milestone_id: Option<MilestoneId>,
    task_id: Option<TaskId>,
    status: Option<ProposalStatus>,
    first: Option<usize>,
    max: Option<usize>,
}

impl ProposalQuery {
    /// Creates an unconstrained, unpaged query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to proposals whose task belongs to the project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Restricts results to proposals whose task belongs to the milestone.
    #[must_use]
    pub const fn with_milestone(mut self, milestone_id: MilestoneId) -> Self {
        self.milestone_id = Some(milestone_id);
        self
    }

    /// Restricts results to proposals targeting the task.
    #[must_use]
    pub const fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Restricts results to proposals in the given status.
    #[must_use]
    pub const fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Skips the first `first` matching rows (zero-based offset).
    #[must_use]
    pub const fn with_first(mut self, first: usize) -> Self {
        self.first = Some(first);
        self
    }

    /// Caps the page at `max` rows.
    #[must_use]
    pub const fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Returns the project filter.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the milestone filter.
    #[must_use]
    pub const fn milestone_id(&self) -> Option<MilestoneId> {
        self.milestone_id
    }

    /// Returns the task filter.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the status filter.
    #[must_use]
    pub const fn status(&self) -> Option<ProposalStatus> {
        self.status
    }

    /// Returns the zero-based offset, defaulting to zero.
    #[must_use]
    pub fn first(&self) -> usize {
        self.first.unwrap_or_default()
    }

    /// Returns the row cap; `None` means unlimited.
    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    /// Returns `true` when a proposal in `scope` satisfies every filter.
    #[must_use]
    pub fn matches(&self, proposal: &ChangeProposal, scope: &ProposalScope) -> bool {
        self.task_id.is_none_or(|id| proposal.task_id() == id)
            && self.milestone_id.is_none_or(|id| scope.milestone_id == id)
            && self.project_id.is_none_or(|id| scope.project_id == id)
            && self.status.is_none_or(|status| proposal.status() == status)
    }

    /// Applies offset and cap to rows that are already filtered and ordered.
    #[must_use]
    pub fn paginate<T>(&self, rows: Vec<T>) -> Vec<T> {
        let skipped = rows.into_iter().skip(self.first());
        match self.max {
            Some(max) => skipped.take(max).collect(),
            None => skipped.collect(),
        }
    }
}

/// Where a proposal's task sits in the project hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalScope {
    /// Milestone owning the proposal's task.
    pub milestone_id: MilestoneId,
    /// Project owning that milestone.
    pub project_id: ProjectId,
}

/// One page of proposals with the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalPage {
    /// Proposals on this page, oldest first.
    pub items: Vec<ChangeProposal>,
    /// Number of proposals matching the filters, ignoring paging.
    pub total_count: usize,
}
