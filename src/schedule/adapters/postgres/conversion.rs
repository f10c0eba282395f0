//! Conversions between Diesel rows and domain aggregates.

use super::models::{MilestoneRow, ProposalRow, TaskRow};
use crate::schedule::{
    domain::{
        ChangeProposal, DateRange, Milestone, MilestoneId, PersistedMilestoneData,
        PersistedProposalData, PersistedTaskData, ProjectId, ProposalId, ProposalQuery,
        ProposalStatus, Task, TaskId, TaskStatus, UserId,
    },
    ports::{ScheduleRepositoryError, ScheduleRepositoryResult},
};

pub(crate) fn milestone_to_row(milestone: &Milestone) -> MilestoneRow {
    MilestoneRow {
        id: milestone.id().into_inner(),
        project_id: milestone.project_id().into_inner(),
        name: milestone.name().to_owned(),
        start_date: milestone.range().start(),
        end_date: milestone.range().end(),
        created_at: milestone.created_at(),
        updated_at: milestone.updated_at(),
    }
}

pub(crate) fn row_to_milestone(row: MilestoneRow) -> ScheduleRepositoryResult<Milestone> {
    let range =
        DateRange::new(row.start_date, row.end_date).map_err(ScheduleRepositoryError::persistence)?;
    Ok(Milestone::from_persisted(PersistedMilestoneData {
        id: MilestoneId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name: row.name,
        range,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(crate) fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        milestone_id: task.milestone_id().into_inner(),
        title: task.title().to_owned(),
        start_date: task.start(),
        end_date: task.end(),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(crate) fn row_to_task(row: TaskRow) -> ScheduleRepositoryResult<Task> {
    let TaskRow {
        id,
        milestone_id,
        title,
        start_date,
        end_date,
        status: persisted_status,
        created_at,
        updated_at,
    } = row;

    let range = DateRange::new(start_date, end_date).map_err(ScheduleRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(ScheduleRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        milestone_id: MilestoneId::from_uuid(milestone_id),
        title,
        range,
        status,
        created_at,
        updated_at,
    }))
}

pub(crate) fn proposal_to_row(proposal: &ChangeProposal) -> ProposalRow {
    ProposalRow {
        id: proposal.id().into_inner(),
        task_id: proposal.task_id().into_inner(),
        reason: proposal.reason().to_owned(),
        comment: proposal.comment().map(str::to_owned),
        requested_start: proposal.requested_start(),
        requested_end: proposal.requested_end(),
        status: proposal.status().as_str().to_owned(),
        creator_id: proposal.creator_id().as_str().to_owned(),
        last_modifier_id: proposal.last_modifier_id().as_str().to_owned(),
        supersedes: proposal.supersedes().map(ProposalId::into_inner),
        created_at: proposal.created_at(),
        updated_at: proposal.updated_at(),
    }
}

pub(crate) fn row_to_proposal(row: ProposalRow) -> ScheduleRepositoryResult<ChangeProposal> {
    let ProposalRow {
        id,
        task_id,
        reason,
        comment,
        requested_start,
        requested_end,
        status: persisted_status,
        creator_id,
        last_modifier_id,
        supersedes,
        created_at,
        updated_at,
    } = row;

    let status = ProposalStatus::try_from(persisted_status.as_str())
        .map_err(ScheduleRepositoryError::persistence)?;
    let creator_id = UserId::new(creator_id).map_err(ScheduleRepositoryError::persistence)?;
    let last_modifier_id =
        UserId::new(last_modifier_id).map_err(ScheduleRepositoryError::persistence)?;

    Ok(ChangeProposal::from_persisted(PersistedProposalData {
        id: ProposalId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        reason,
        comment,
        requested_start,
        requested_end,
        status,
        creator_id,
        last_modifier_id,
        supersedes: supersedes.map(ProposalId::from_uuid),
        created_at,
        updated_at,
    }))
}

/// Maps the query's paging window onto SQL `OFFSET` and `LIMIT` values.
///
/// Values past `i64::MAX` saturate, matching the in-memory adapter, which
/// treats an oversized offset as past the end and an oversized cap as no cap.
pub(crate) fn page_window(query: &ProposalQuery) -> (i64, Option<i64>) {
    let offset = i64::try_from(query.first()).unwrap_or(i64::MAX);
    let limit = query.max().map(|max| i64::try_from(max).unwrap_or(i64::MAX));
    (offset, limit)
}
