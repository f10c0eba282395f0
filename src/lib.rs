//! Keystone: milestone-bounded task scheduling.
//!
//! This crate keeps every task's date range inside its milestone and runs
//! the review workflow for proposed schedule changes. Proposals are filed,
//! approved or rejected, and on approval applied to the task in the same
//! atomic unit, re-checked against the milestone as it stands at that
//! moment.
//!
//! # Architecture
//!
//! Keystone follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`schedule`]: Ranges, tasks, change proposals, and proposal queries
//! - [`config`]: TOML configuration
//! - [`telemetry`]: `tracing` subscriber setup

pub mod config;
pub mod schedule;
pub mod telemetry;
