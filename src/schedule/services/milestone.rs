//! Milestone registration on behalf of the project-management collaborator.

use crate::schedule::{
    domain::{DateRange, Milestone, MilestoneId, ProjectId},
    ports::ScheduleRepository,
    services::{EntityRef, SchedulingError, SchedulingResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Seeds and reshapes milestones.
///
/// Projects and milestones belong to an external collaborator. This service
/// is the hook that collaborator uses to mirror them into schedule storage.
#[derive(Clone)]
pub struct MilestoneService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> MilestoneService<R, C>
where
    R: ScheduleRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new milestone service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers a milestone for a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Domain`] for a blank name or a repository
    /// error when persistence fails.
    pub async fn register(
        &self,
        project_id: ProjectId,
        name: impl Into<String>,
        range: DateRange,
    ) -> SchedulingResult<Milestone> {
        let milestone = Milestone::new(project_id, name, range, &*self.clock)?;
        let stored = milestone.clone();
        self.repository
            .transaction(move |tx| -> SchedulingResult<()> {
                tx.insert_milestone(&stored)?;
                Ok(())
            })
            .await?;
        info!(
            milestone_id = %milestone.id(),
            project_id = %project_id,
            range = %range,
            "milestone registered"
        );
        Ok(milestone)
    }

    /// Moves a milestone to a new range.
    ///
    /// Tasks under the milestone are left as they are, even if they no
    /// longer fit; they are checked again on their next change.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the milestone does not
    /// exist.
    pub async fn reschedule(
        &self,
        milestone_id: MilestoneId,
        range: DateRange,
    ) -> SchedulingResult<Milestone> {
        let clock = Arc::clone(&self.clock);
        let milestone = self
            .repository
            .transaction(move |tx| -> SchedulingResult<Milestone> {
                let mut milestone = tx
                    .milestone(milestone_id)?
                    .ok_or(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)))?;
                milestone.reschedule(range, &*clock);
                tx.update_milestone(&milestone)?;
                Ok(milestone)
            })
            .await?;
        info!(milestone_id = %milestone_id, range = %range, "milestone rescheduled");
        Ok(milestone)
    }

    /// Retrieves a milestone.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the milestone does not
    /// exist.
    pub async fn get(&self, milestone_id: MilestoneId) -> SchedulingResult<Milestone> {
        self.repository
            .find_milestone(milestone_id)
            .await?
            .ok_or(SchedulingError::NotFound(EntityRef::Milestone(milestone_id)))
    }
}
