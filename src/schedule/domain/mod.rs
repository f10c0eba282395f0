//! Domain model for milestone-bounded task scheduling.
//!
//! Tasks live inside milestones and must keep their date range within the
//! milestone's range. Schedule changes can be proposed, reviewed, and then
//! applied. Everything here is pure: no type holds a lazy reference to
//! storage, and every check works on values the caller already loaded.

mod error;
mod ids;
mod milestone;
mod proposal;
mod query;
mod range;
mod task;
mod timestamp;

pub use error::{
    BoundaryViolation, InvalidDateRange, OutOfBoundsError, ParseProposalStatusError,
    ParseTaskStatusError, ScheduleDomainError,
};
pub use ids::{MilestoneId, ProjectId, ProposalId, TaskId, UserId};
pub use milestone::{Milestone, PersistedMilestoneData};
pub use proposal::{
    ChangeProposal, PersistedProposalData, ProposalDraft, ProposalLimits, ProposalStatus,
    ReviewDecision, ReviewOutcome,
};
pub use query::{ProposalPage, ProposalQuery, ProposalScope};
pub use range::{DateRange, validate_within};
pub use task::{PersistedTaskData, Task, TaskStatus};
pub use timestamp::{TIMESTAMP_SUBSEC_DIGITS, stamp};
