//! `PostgreSQL` adapters for schedule persistence.

pub(crate) mod conversion;
mod models;
mod repository;
mod schema;

pub use models::{MilestoneRow, ProposalRow, TaskRow};
pub use repository::{PostgresScheduleRepository, SchedulePgPool};
