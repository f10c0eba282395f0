//! Service layer for task creation and direct range edits.

use crate::schedule::{
    domain::{MilestoneId, Task, TaskId},
    ports::ScheduleRepository,
    services::{EntityRef, SchedulingError, SchedulingResult},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a task inside a milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    milestone_id: MilestoneId,
    title: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl CreateTaskRequest {
    /// Creates a request with all required fields.
    #[must_use]
    pub fn new(
        milestone_id: MilestoneId,
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            milestone_id,
            title: title.into(),
            start,
            end,
        }
    }
}

/// Request payload for moving a task directly, bypassing proposals.
///
/// An omitted date keeps the task's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTaskRangeRequest {
    task_id: TaskId,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl UpdateTaskRangeRequest {
    /// Creates a request that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            start: None,
            end: None,
        }
    }

    /// Sets the new start date.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the new end date.
    #[must_use]
    pub const fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }
}

/// Task scheduling service.
#[derive(Clone)]
pub struct TaskScheduleService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskScheduleService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task scheduling service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task whose range fits its milestone.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the milestone does not
    /// exist, [`SchedulingError::OutOfBounds`] when the range does not fit, or
    /// [`SchedulingError::Domain`] for a blank title.
    pub async fn create(&self, request: CreateTaskRequest) -> SchedulingResult<Task> {
        let clock = Arc::clone(&self.clock);
        let CreateTaskRequest {
            milestone_id,
            title,
            start,
            end,
        } = request;

        let result = self
            .repository
            .transaction(move |tx| -> SchedulingResult<Task> {
                let milestone = tx
                    .milestone(milestone_id)?
                    .ok_or(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)))?;
                let task = Task::new(&milestone, title, start, end, &*clock)?;
                tx.insert_task(&task)?;
                Ok(task)
            })
            .await;

        match &result {
            Ok(task) => info!(
                task_id = %task.id(),
                milestone_id = %milestone_id,
                range = %task.range(),
                "task created"
            ),
            Err(err) => debug!(milestone_id = %milestone_id, error = %err, "task creation rejected"),
        }
        result
    }

    /// Moves a task to a new range.
    ///
    /// The task's milestone is read again inside the same unit of work, so
    /// the check always uses the milestone as it stands now. On failure
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the task or its milestone
    /// does not exist, or [`SchedulingError::OutOfBounds`] when the new range
    /// does not fit.
    pub async fn update_range(&self, request: UpdateTaskRangeRequest) -> SchedulingResult<Task> {
        let clock = Arc::clone(&self.clock);
        let UpdateTaskRangeRequest {
            task_id,
            start,
            end,
        } = request;

        let result = self
            .repository
            .transaction(move |tx| -> SchedulingResult<Task> {
                let mut task = tx
                    .task(task_id)?
                    .ok_or(SchedulingError::NotFound(EntityRef::Task(task_id)))?;
                let milestone_id = task.milestone_id();
                let milestone = tx
                    .milestone(milestone_id)?
                    .ok_or(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)))?;
                let next_start = start.unwrap_or_else(|| task.start());
                let next_end = end.unwrap_or_else(|| task.end());
                task.reschedule(next_start, next_end, &milestone, &*clock)?;
                tx.update_task(&task)?;
                Ok(task)
            })
            .await;

        match &result {
            Ok(task) => info!(task_id = %task_id, range = %task.range(), "task range updated"),
            Err(err) => debug!(task_id = %task_id, error = %err, "task range update rejected"),
        }
        result
    }

    /// Retrieves a task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the task does not exist.
    pub async fn get(&self, task_id: TaskId) -> SchedulingResult<Task> {
        self.repository
            .find_task(task_id)
            .await?
            .ok_or(SchedulingError::NotFound(EntityRef::Task(task_id)))
    }

    /// Lists a milestone's tasks by start date.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the milestone does not
    /// exist.
    pub async fn list_for_milestone(&self, milestone_id: MilestoneId) -> SchedulingResult<Vec<Task>> {
        if self.repository.find_milestone(milestone_id).await?.is_none() {
            return Err(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)));
        }
        Ok(self.repository.find_tasks_by_milestone(milestone_id).await?)
    }
}
