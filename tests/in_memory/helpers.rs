//! Shared test helpers for in-memory scheduling integration tests.

pub use crate::test_helpers::{StepClock, date, range, runtime};
use keystone::{
    config::SchedulingConfig,
    schedule::{
        adapters::memory::InMemoryScheduleRepository,
        domain::{Milestone, ProjectId, Task},
        services::{
            ChangeProposalService, CreateTaskRequest, MilestoneService, ProposalQueryService,
            TaskScheduleService,
        },
    },
};
use rstest::fixture;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// In-memory repository type used throughout these tests.
pub type Repo = InMemoryScheduleRepository;

/// Every scheduling service sharing one repository and one clock.
pub struct Scheduler {
    /// Milestone registration.
    pub milestones: MilestoneService<Repo, StepClock>,
    /// Task creation and direct range edits.
    pub tasks: TaskScheduleService<Repo, StepClock>,
    /// Proposal workflow.
    pub proposals: ChangeProposalService<Repo, StepClock>,
    /// Proposal listing.
    pub queries: ProposalQueryService<Repo>,
}

impl Scheduler {
    /// Wires the services from configuration defaults.
    #[must_use]
    pub fn new(config: &SchedulingConfig) -> Self {
        let repository = Arc::new(InMemoryScheduleRepository::new());
        let clock = Arc::new(StepClock::default());
        Self {
            milestones: MilestoneService::new(Arc::clone(&repository), Arc::clone(&clock)),
            tasks: TaskScheduleService::new(Arc::clone(&repository), Arc::clone(&clock)),
            proposals: ChangeProposalService::new(
                Arc::clone(&repository),
                clock,
                config.proposals.limits(),
            ),
            queries: ProposalQueryService::new(repository),
        }
    }
}

/// Provides freshly wired services for each test.
#[fixture]
pub fn scheduler() -> Scheduler {
    Scheduler::new(&SchedulingConfig::default())
}

/// Registers the January 2024 milestone and a task from the 10th to the
/// 20th inside it.
pub fn seed_january_task(rt: &Runtime, scheduler: &Scheduler) -> (Milestone, Task) {
    let milestone = rt
        .block_on(scheduler.milestones.register(
            ProjectId::new(),
            "January release",
            range(date(2024, 1, 1), date(2024, 1, 31)),
        ))
        .expect("milestone registration should succeed");
    let task = rt
        .block_on(scheduler.tasks.create(CreateTaskRequest::new(
            milestone.id(),
            "Ship installer",
            date(2024, 1, 10),
            date(2024, 1, 20),
        )))
        .expect("task creation should succeed");
    (milestone, task)
}
