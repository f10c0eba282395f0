//! Port contracts for schedule persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by schedule services.

pub mod repository;

pub use repository::{
    ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult, ScheduleTransaction,
};
