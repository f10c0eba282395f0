//! In-memory schedule repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::schedule::{
    domain::{
        ChangeProposal, Milestone, MilestoneId, ProposalId, ProposalPage, ProposalQuery,
        ProposalScope, Task, TaskId,
    },
    ports::{
        ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult,
        ScheduleTransaction,
    },
};

/// Thread-safe in-memory schedule repository.
///
/// A single mutex serializes every transaction. Writes are staged in an
/// overlay and only merged into the shared state when the unit of work
/// succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleRepository {
    state: Arc<Mutex<InMemoryScheduleState>>,
}

#[derive(Debug, Default)]
struct InMemoryScheduleState {
    milestones: HashMap<MilestoneId, Milestone>,
    tasks: HashMap<TaskId, Task>,
    proposals: HashMap<ProposalId, ChangeProposal>,
}

#[derive(Debug, Default)]
struct StagedWrites {
    milestones: HashMap<MilestoneId, Milestone>,
    tasks: HashMap<TaskId, Task>,
    proposals: HashMap<ProposalId, ChangeProposal>,
}

impl InMemoryScheduleState {
    fn merge(&mut self, staged: StagedWrites) {
        self.milestones.extend(staged.milestones);
        self.tasks.extend(staged.tasks);
        self.proposals.extend(staged.proposals);
    }

    fn scope_of(&self, proposal: &ChangeProposal) -> Option<ProposalScope> {
        let task = self.tasks.get(&proposal.task_id())?;
        let milestone = self.milestones.get(&task.milestone_id())?;
        Some(ProposalScope {
            milestone_id: milestone.id(),
            project_id: milestone.project_id(),
        })
    }
}

impl InMemoryScheduleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ScheduleRepositoryResult<MutexGuard<'_, InMemoryScheduleState>> {
        self.state.lock().map_err(|err| {
            ScheduleRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Overlay transaction reading through to the locked shared state.
struct InMemoryTransaction<'a> {
    base: &'a InMemoryScheduleState,
    staged: StagedWrites,
}

impl<'a> InMemoryTransaction<'a> {
    fn new(base: &'a InMemoryScheduleState) -> Self {
        Self {
            base,
            staged: StagedWrites::default(),
        }
    }

    fn has_milestone(&self, id: MilestoneId) -> bool {
        self.staged.milestones.contains_key(&id) || self.base.milestones.contains_key(&id)
    }

    fn has_task(&self, id: TaskId) -> bool {
        self.staged.tasks.contains_key(&id) || self.base.tasks.contains_key(&id)
    }

    fn has_proposal(&self, id: ProposalId) -> bool {
        self.staged.proposals.contains_key(&id) || self.base.proposals.contains_key(&id)
    }
}

impl ScheduleTransaction for InMemoryTransaction<'_> {
    fn milestone(&mut self, id: MilestoneId) -> ScheduleRepositoryResult<Option<Milestone>> {
        Ok(self
            .staged
            .milestones
            .get(&id)
            .or_else(|| self.base.milestones.get(&id))
            .cloned())
    }

    fn task(&mut self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>> {
        Ok(self
            .staged
            .tasks
            .get(&id)
            .or_else(|| self.base.tasks.get(&id))
            .cloned())
    }

    fn proposal(&mut self, id: ProposalId) -> ScheduleRepositoryResult<Option<ChangeProposal>> {
        Ok(self
            .staged
            .proposals
            .get(&id)
            .or_else(|| self.base.proposals.get(&id))
            .cloned())
    }

    fn insert_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()> {
        if self.has_milestone(milestone.id()) {
            return Err(ScheduleRepositoryError::DuplicateMilestone(milestone.id()));
        }
        self.staged
            .milestones
            .insert(milestone.id(), milestone.clone());
        Ok(())
    }

    fn update_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()> {
        if !self.has_milestone(milestone.id()) {
            return Err(ScheduleRepositoryError::MilestoneNotFound(milestone.id()));
        }
        self.staged
            .milestones
            .insert(milestone.id(), milestone.clone());
        Ok(())
    }

    fn insert_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()> {
        if self.has_task(task.id()) {
            return Err(ScheduleRepositoryError::DuplicateTask(task.id()));
        }
        if !self.has_milestone(task.milestone_id()) {
            return Err(ScheduleRepositoryError::MilestoneNotFound(
                task.milestone_id(),
            ));
        }
        self.staged.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()> {
        if !self.has_task(task.id()) {
            return Err(ScheduleRepositoryError::TaskNotFound(task.id()));
        }
        self.staged.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn insert_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()> {
        if self.has_proposal(proposal.id()) {
            return Err(ScheduleRepositoryError::DuplicateProposal(proposal.id()));
        }
        if !self.has_task(proposal.task_id()) {
            return Err(ScheduleRepositoryError::TaskNotFound(proposal.task_id()));
        }
        self.staged.proposals.insert(proposal.id(), proposal.clone());
        Ok(())
    }

    fn update_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()> {
        if !self.has_proposal(proposal.id()) {
            return Err(ScheduleRepositoryError::ProposalNotFound(proposal.id()));
        }
        self.staged.proposals.insert(proposal.id(), proposal.clone());
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScheduleTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<ScheduleRepositoryError> + Send + 'static,
    {
        let mut state = self.lock()?;
        let mut transaction = InMemoryTransaction::new(&state);
        let result = work(&mut transaction);
        let staged = transaction.staged;
        if result.is_ok() {
            state.merge(staged);
        }
        result
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> ScheduleRepositoryResult<Option<Milestone>> {
        let state = self.lock()?;
        Ok(state.milestones.get(&id).cloned())
    }

    async fn find_task(&self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>> {
        let state = self.lock()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_tasks_by_milestone(
        &self,
        id: MilestoneId,
    ) -> ScheduleRepositoryResult<Vec<Task>> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.milestone_id() == id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.start(), task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn find_proposal(
        &self,
        id: ProposalId,
    ) -> ScheduleRepositoryResult<Option<ChangeProposal>> {
        let state = self.lock()?;
        Ok(state.proposals.get(&id).cloned())
    }

    async fn list_proposals(&self, query: &ProposalQuery) -> ScheduleRepositoryResult<ProposalPage> {
        let state = self.lock()?;
        let mut matching: Vec<ChangeProposal> = state
            .proposals
            .values()
            .filter(|proposal| {
                state
                    .scope_of(proposal)
                    .is_some_and(|scope| query.matches(proposal, &scope))
            })
            .cloned()
            .collect();
        matching.sort_by_key(|proposal| (proposal.created_at(), proposal.id()));

        let total_count = matching.len();
        Ok(ProposalPage {
            items: query.paginate(matching),
            total_count,
        })
    }
}
