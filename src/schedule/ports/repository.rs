//! Repository port for milestones, tasks, and change proposals.

use crate::schedule::domain::{
    ChangeProposal, Milestone, MilestoneId, ProposalId, ProposalPage, ProposalQuery, Task, TaskId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for schedule repository operations.
pub type ScheduleRepositoryResult<T> = Result<T, ScheduleRepositoryError>;

/// Reads and writes available inside one atomic unit of work.
///
/// Everything read through a transaction reflects the state as of the
/// transaction; every write becomes visible to others only when the whole
/// unit commits.
pub trait ScheduleTransaction {
    /// Loads a milestone.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] on storage failure.
    fn milestone(&mut self, id: MilestoneId) -> ScheduleRepositoryResult<Option<Milestone>>;

    /// Loads a task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] on storage failure.
    fn task(&mut self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>>;

    /// Loads a proposal.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] on storage failure.
    fn proposal(&mut self, id: ProposalId) -> ScheduleRepositoryResult<Option<ChangeProposal>>;

    /// Stores a new milestone.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::DuplicateMilestone`] when the
    /// identifier is taken.
    fn insert_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()>;

    /// Persists changes to an existing milestone.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::MilestoneNotFound`] when it does
    /// not exist.
    fn update_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::DuplicateTask`] when the identifier
    /// is taken or [`ScheduleRepositoryError::MilestoneNotFound`] when the
    /// milestone does not exist.
    fn insert_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::TaskNotFound`] when it does not
    /// exist.
    fn update_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()>;

    /// Stores a new proposal.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::DuplicateProposal`] when the
    /// identifier is taken or [`ScheduleRepositoryError::TaskNotFound`] when
    /// the task does not exist.
    fn insert_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()>;

    /// Persists changes to an existing proposal.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::ProposalNotFound`] when it does not
    /// exist.
    fn update_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()>;
}

/// Schedule persistence contract.
///
/// Mutations go through [`ScheduleRepository::transaction`]; the remaining
/// methods are snapshot reads that never observe a partly applied unit.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Runs `work` as one atomic, serialized unit.
    ///
    /// Writes made by `work` commit together when it returns `Ok` and are
    /// discarded when it returns `Err`. Two units touching the same rows never
    /// interleave.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a repository error converted
    /// into `E` when the unit cannot start or commit.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScheduleTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<ScheduleRepositoryError> + Send + 'static;

    /// Finds a milestone by identifier.
    ///
    /// Returns `None` when the milestone does not exist.
    async fn find_milestone(&self, id: MilestoneId)
    -> ScheduleRepositoryResult<Option<Milestone>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>>;

    /// Returns the tasks of a milestone ordered by start date, then creation
    /// time.
    async fn find_tasks_by_milestone(&self, id: MilestoneId)
    -> ScheduleRepositoryResult<Vec<Task>>;

    /// Finds a proposal by identifier.
    ///
    /// Returns `None` when the proposal does not exist.
    async fn find_proposal(&self, id: ProposalId)
    -> ScheduleRepositoryResult<Option<ChangeProposal>>;

    /// Lists proposals matching `query`, oldest first, with the total number
    /// of matches.
    async fn list_proposals(&self, query: &ProposalQuery) -> ScheduleRepositoryResult<ProposalPage>;
}

/// Errors returned by schedule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ScheduleRepositoryError {
    /// A milestone with the same identifier already exists.
    #[error("duplicate milestone identifier: {0}")]
    DuplicateMilestone(MilestoneId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A proposal with the same identifier already exists.
    #[error("duplicate proposal identifier: {0}")]
    DuplicateProposal(ProposalId),

    /// The milestone was not found.
    #[error("milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The proposal was not found.
    #[error("proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ScheduleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
