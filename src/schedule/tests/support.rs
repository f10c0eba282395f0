//! Shared fixtures for scheduling unit tests.

use crate::schedule::{
    adapters::memory::InMemoryScheduleRepository,
    domain::{DateRange, Milestone, ProjectId, ProposalLimits},
    services::{
        ChangeProposalService, MilestoneService, ProposalQueryService, TaskScheduleService,
    },
};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

/// Clock that advances one second on every reading.
///
/// Gives each created record a distinct timestamp so ordering by creation
/// time is deterministic.
#[derive(Debug, Default)]
pub struct StepClock {
    ticks: AtomicI64,
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .expect("base instant should be valid")
            + Duration::seconds(tick)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("test date should be valid")
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).expect("test range should be ordered")
}

/// January 2024, the milestone most scenarios run inside.
pub fn january() -> DateRange {
    range(date(2024, 1, 1), date(2024, 1, 31))
}

#[fixture]
pub fn clock() -> StepClock {
    StepClock::default()
}

#[fixture]
pub fn january_milestone(clock: StepClock) -> Milestone {
    Milestone::new(ProjectId::new(), "January release", january(), &clock)
        .expect("milestone should be valid")
}

/// Every service wired to one in-memory repository and one clock.
pub struct Harness {
    pub milestones: MilestoneService<InMemoryScheduleRepository, StepClock>,
    pub tasks: TaskScheduleService<InMemoryScheduleRepository, StepClock>,
    pub proposals: ChangeProposalService<InMemoryScheduleRepository, StepClock>,
    pub queries: ProposalQueryService<InMemoryScheduleRepository>,
}

impl Harness {
    pub fn with_limits(limits: ProposalLimits) -> Self {
        let repository = Arc::new(InMemoryScheduleRepository::new());
        let clock = Arc::new(StepClock::default());
        Self {
            milestones: MilestoneService::new(Arc::clone(&repository), Arc::clone(&clock)),
            tasks: TaskScheduleService::new(Arc::clone(&repository), Arc::clone(&clock)),
            proposals: ChangeProposalService::new(Arc::clone(&repository), clock, limits),
            queries: ProposalQueryService::new(repository),
        }
    }
}

#[fixture]
pub fn harness() -> Harness {
    Harness::with_limits(ProposalLimits::default())
}
