//! Diesel row models for schedule persistence.

use super::schema::{change_proposals, milestones, schedule_tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row and insert model for milestones.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = milestones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MilestoneRow {
    /// Milestone identifier.
    pub id: uuid::Uuid,
    /// Owning project identifier.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row and insert model for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = schedule_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning milestone identifier.
    pub milestone_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Status in canonical string form.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row and insert model for change proposals.
///
/// Nullable columns are written as `NULL` on update rather than skipped.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = change_proposals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProposalRow {
    /// Proposal identifier.
    pub id: uuid::Uuid,
    /// Target task identifier.
    pub task_id: uuid::Uuid,
    /// Reason for the change.
    pub reason: String,
    /// Optional comment.
    pub comment: Option<String>,
    /// Requested first day.
    pub requested_start: Option<NaiveDate>,
    /// Requested last day.
    pub requested_end: Option<NaiveDate>,
    /// Status in canonical string form.
    pub status: String,
    /// Creator user identifier.
    pub creator_id: String,
    /// Last modifier user identifier.
    pub last_modifier_id: String,
    /// Proposal replaced by this one.
    pub supersedes: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
