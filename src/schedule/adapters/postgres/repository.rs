//! `PostgreSQL` repository implementation for schedule storage.

use super::{
    conversion::{
        milestone_to_row, page_window, proposal_to_row, row_to_milestone, row_to_proposal,
        row_to_task, task_to_row,
    },
    models::{MilestoneRow, ProposalRow, TaskRow},
    schema::{change_proposals, milestones, schedule_tasks},
};
use crate::schedule::{
    domain::{
        ChangeProposal, Milestone, MilestoneId, ProposalId, ProposalPage, ProposalQuery, Task,
        TaskId,
    },
    ports::{
        ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult,
        ScheduleTransaction,
    },
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by schedule adapters.
pub type SchedulePgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedProposalQuery = change_proposals::BoxedQuery<'static, Pg>;

/// `PostgreSQL`-backed schedule repository.
///
/// Every call runs on the blocking thread pool. Transactions lock the rows
/// they read with `SELECT ... FOR UPDATE`, so two units touching the same
/// proposal, task, or milestone run one after the other.
#[derive(Debug, Clone)]
pub struct PostgresScheduleRepository {
    pool: SchedulePgPool,
}

impl PostgresScheduleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulePgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `url` and wraps it in a repository.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::Persistence`] when the pool cannot
    /// open its initial connections.
    pub fn connect(url: &str, max_connections: u32) -> ScheduleRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(ScheduleRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> ScheduleRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ScheduleRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ScheduleRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ScheduleRepositoryError::persistence)?
    }
}

/// Why a Diesel transaction closure bailed out.
enum TransactionAbort<E> {
    Database(DieselError),
    Work(E),
}

impl<E> From<DieselError> for TransactionAbort<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl<E: From<ScheduleRepositoryError>> TransactionAbort<E> {
    fn into_caller_error(self) -> E {
        match self {
            Self::Database(err) => E::from(ScheduleRepositoryError::persistence(err)),
            Self::Work(err) => err,
        }
    }
}

struct PgScheduleTransaction<'a> {
    connection: &'a mut PgConnection,
}

impl ScheduleTransaction for PgScheduleTransaction<'_> {
    fn milestone(&mut self, id: MilestoneId) -> ScheduleRepositoryResult<Option<Milestone>> {
        milestones::table
            .filter(milestones::id.eq(id.into_inner()))
            .select(MilestoneRow::as_select())
            .for_update()
            .first::<MilestoneRow>(&mut *self.connection)
            .optional()
            .map_err(ScheduleRepositoryError::persistence)?
            .map(row_to_milestone)
            .transpose()
    }

    fn task(&mut self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>> {
        schedule_tasks::table
            .filter(schedule_tasks::id.eq(id.into_inner()))
            .select(TaskRow::as_select())
            .for_update()
            .first::<TaskRow>(&mut *self.connection)
            .optional()
            .map_err(ScheduleRepositoryError::persistence)?
            .map(row_to_task)
            .transpose()
    }

    fn proposal(&mut self, id: ProposalId) -> ScheduleRepositoryResult<Option<ChangeProposal>> {
        change_proposals::table
            .filter(change_proposals::id.eq(id.into_inner()))
            .select(ProposalRow::as_select())
            .for_update()
            .first::<ProposalRow>(&mut *self.connection)
            .optional()
            .map_err(ScheduleRepositoryError::persistence)?
            .map(row_to_proposal)
            .transpose()
    }

    fn insert_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()> {
        let milestone_id = milestone.id();
        diesel::insert_into(milestones::table)
            .values(&milestone_to_row(milestone))
            .execute(&mut *self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ScheduleRepositoryError::DuplicateMilestone(milestone_id)
                }
                _ => ScheduleRepositoryError::persistence(err),
            })?;
        Ok(())
    }

    fn update_milestone(&mut self, milestone: &Milestone) -> ScheduleRepositoryResult<()> {
        let affected = diesel::update(milestones::table.find(milestone.id().into_inner()))
            .set(&milestone_to_row(milestone))
            .execute(&mut *self.connection)
            .map_err(ScheduleRepositoryError::persistence)?;
        if affected == 0 {
            return Err(ScheduleRepositoryError::MilestoneNotFound(milestone.id()));
        }
        Ok(())
    }

    fn insert_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()> {
        let task_id = task.id();
        let milestone_id = task.milestone_id();
        diesel::insert_into(schedule_tasks::table)
            .values(&task_to_row(task))
            .execute(&mut *self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ScheduleRepositoryError::DuplicateTask(task_id)
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ScheduleRepositoryError::MilestoneNotFound(milestone_id)
                }
                _ => ScheduleRepositoryError::persistence(err),
            })?;
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> ScheduleRepositoryResult<()> {
        let affected = diesel::update(schedule_tasks::table.find(task.id().into_inner()))
            .set(&task_to_row(task))
            .execute(&mut *self.connection)
            .map_err(ScheduleRepositoryError::persistence)?;
        if affected == 0 {
            return Err(ScheduleRepositoryError::TaskNotFound(task.id()));
        }
        Ok(())
    }

    fn insert_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()> {
        let proposal_id = proposal.id();
        let task_id = proposal.task_id();
        diesel::insert_into(change_proposals::table)
            .values(&proposal_to_row(proposal))
            .execute(&mut *self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ScheduleRepositoryError::DuplicateProposal(proposal_id)
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ScheduleRepositoryError::TaskNotFound(task_id)
                }
                _ => ScheduleRepositoryError::persistence(err),
            })?;
        Ok(())
    }

    fn update_proposal(&mut self, proposal: &ChangeProposal) -> ScheduleRepositoryResult<()> {
        let affected = diesel::update(change_proposals::table.find(proposal.id().into_inner()))
            .set(&proposal_to_row(proposal))
            .execute(&mut *self.connection)
            .map_err(ScheduleRepositoryError::persistence)?;
        if affected == 0 {
            return Err(ScheduleRepositoryError::ProposalNotFound(proposal.id()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScheduleTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<ScheduleRepositoryError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut pooled = pool.get().map_err(ScheduleRepositoryError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionAbort<E>, _>(|tx_connection| {
                    let mut unit = PgScheduleTransaction {
                        connection: tx_connection,
                    };
                    work(&mut unit).map_err(TransactionAbort::Work)
                })
                .map_err(TransactionAbort::into_caller_error)
        })
        .await
        .map_err(|err| E::from(ScheduleRepositoryError::persistence(err)))?
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> ScheduleRepositoryResult<Option<Milestone>> {
        self.run_blocking(move |connection| {
            milestones::table
                .filter(milestones::id.eq(id.into_inner()))
                .select(MilestoneRow::as_select())
                .first::<MilestoneRow>(connection)
                .optional()
                .map_err(ScheduleRepositoryError::persistence)?
                .map(row_to_milestone)
                .transpose()
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> ScheduleRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            schedule_tasks::table
                .filter(schedule_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(ScheduleRepositoryError::persistence)?
                .map(row_to_task)
                .transpose()
        })
        .await
    }

    async fn find_tasks_by_milestone(
        &self,
        id: MilestoneId,
    ) -> ScheduleRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            schedule_tasks::table
                .filter(schedule_tasks::milestone_id.eq(id.into_inner()))
                .order((
                    schedule_tasks::start_date.asc(),
                    schedule_tasks::created_at.asc(),
                    schedule_tasks::id.asc(),
                ))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(ScheduleRepositoryError::persistence)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn find_proposal(
        &self,
        id: ProposalId,
    ) -> ScheduleRepositoryResult<Option<ChangeProposal>> {
        self.run_blocking(move |connection| {
            change_proposals::table
                .filter(change_proposals::id.eq(id.into_inner()))
                .select(ProposalRow::as_select())
                .first::<ProposalRow>(connection)
                .optional()
                .map_err(ScheduleRepositoryError::persistence)?
                .map(row_to_proposal)
                .transpose()
        })
        .await
    }

    async fn list_proposals(&self, query: &ProposalQuery) -> ScheduleRepositoryResult<ProposalPage> {
        let query = *query;
        self.run_blocking(move |connection| {
            let (offset, limit) = page_window(&query);

            // Count and page inside one read-only transaction so both see the
            // same snapshot.
            connection
                .build_transaction()
                .read_only()
                .repeatable_read()
                .run(|tx_connection| {
                    let total: i64 = filtered_proposals(&query)
                        .select(diesel::dsl::count_star())
                        .first(tx_connection)?;

                    let mut page = filtered_proposals(&query)
                        .order((
                            change_proposals::created_at.asc(),
                            change_proposals::id.asc(),
                        ))
                        .offset(offset);
                    if let Some(limit) = limit {
                        page = page.limit(limit);
                    }
                    let rows = page
                        .select(ProposalRow::as_select())
                        .load::<ProposalRow>(tx_connection)?;
                    Ok::<_, DieselError>((total, rows))
                })
                .map_err(ScheduleRepositoryError::persistence)
                .and_then(|(total, rows)| {
                    let total_count =
                        usize::try_from(total).map_err(ScheduleRepositoryError::persistence)?;
                    let items = rows
                        .into_iter()
                        .map(row_to_proposal)
                        .collect::<ScheduleRepositoryResult<Vec<_>>>()?;
                    Ok(ProposalPage { items, total_count })
                })
        })
        .await
    }
}

/// Builds the filtered proposal query; project and milestone filters walk
/// task to milestone to project through sub-selects.
fn filtered_proposals(query: &ProposalQuery) -> BoxedProposalQuery {
    let mut boxed = change_proposals::table.into_boxed();

    if let Some(task_id) = query.task_id() {
        boxed = boxed.filter(change_proposals::task_id.eq(task_id.into_inner()));
    }
    if let Some(status) = query.status() {
        boxed = boxed.filter(change_proposals::status.eq(status.as_str()));
    }
    if let Some(milestone_id) = query.milestone_id() {
        boxed = boxed.filter(
            change_proposals::task_id.eq_any(
                schedule_tasks::table
                    .filter(schedule_tasks::milestone_id.eq(milestone_id.into_inner()))
                    .select(schedule_tasks::id),
            ),
        );
    }
    if let Some(project_id) = query.project_id() {
        boxed = boxed.filter(
            change_proposals::task_id.eq_any(
                schedule_tasks::table
                    .filter(
                        schedule_tasks::milestone_id.eq_any(
                            milestones::table
                                .filter(milestones::project_id.eq(project_id.into_inner()))
                                .select(milestones::id),
                        ),
                    )
                    .select(schedule_tasks::id),
            ),
        );
    }
    boxed
}
