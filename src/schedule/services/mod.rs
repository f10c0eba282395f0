//! Application services for milestone-bounded scheduling.

mod error;
mod milestone;
mod proposal;
mod query;
mod task;

pub use error::{EntityRef, SchedulingError, SchedulingResult};
pub use milestone::MilestoneService;
pub use proposal::{
    ChangeProposalService, CreateProposalRequest, ResubmitProposalRequest, ReviseProposalRequest,
};
pub use query::ProposalQueryService;
pub use task::{CreateTaskRequest, TaskScheduleService, UpdateTaskRangeRequest};
