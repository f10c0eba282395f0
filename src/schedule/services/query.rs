//! Read-only listing of change proposals.

use crate::schedule::{
    domain::{ProposalPage, ProposalQuery},
    ports::ScheduleRepository,
    services::SchedulingResult,
};
use std::sync::Arc;
use tracing::debug;

/// Lists change proposals by project, milestone, task, and status.
#[derive(Clone)]
pub struct ProposalQueryService<R>
where
    R: ScheduleRepository,
{
    repository: Arc<R>,
}

impl<R> ProposalQueryService<R>
where
    R: ScheduleRepository,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns one page of matching proposals, oldest first.
    ///
    /// Filters that do not match anything yield an empty page rather than an
    /// error, including filters naming unknown projects or tasks.
    ///
    /// # Errors
    ///
    /// Returns [`crate::schedule::services::SchedulingError::Repository`] when
    /// storage fails.
    pub async fn list(&self, query: ProposalQuery) -> SchedulingResult<ProposalPage> {
        let page = self.repository.list_proposals(&query).await?;
        debug!(
            ?query,
            returned = page.items.len(),
            total = page.total_count,
            "listed change proposals"
        );
        Ok(page)
    }
}
