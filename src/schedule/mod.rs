//! Milestone-bounded task scheduling and change-proposal review.
//!
//! Every task belongs to one milestone and its date range must stay inside
//! the milestone's range. Ranges move either directly through
//! [`services::TaskScheduleService`] or through a reviewed change proposal
//! handled by [`services::ChangeProposalService`]. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
