//! End-to-end proposal workflow tests against the in-memory repository.

use crate::in_memory::helpers::{Scheduler, date, range, runtime, scheduler};
use keystone::schedule::{
    domain::{
        BoundaryViolation, Milestone, ProjectId, ProposalQuery, ProposalStatus, ReviewDecision,
        Task,
    },
    services::{CreateProposalRequest, CreateTaskRequest, SchedulingError, UpdateTaskRangeRequest},
};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// Milestone 2024-01-01..2024-01-31 with a task 2024-01-05..2024-01-10.
fn early_january_task(rt: &Runtime, scheduler: &Scheduler) -> (Milestone, Task) {
    let milestone = rt
        .block_on(scheduler.milestones.register(
            ProjectId::new(),
            "M",
            range(date(2024, 1, 1), date(2024, 1, 31)),
        ))
        .expect("milestone registration should succeed");
    let task = rt
        .block_on(scheduler.tasks.create(CreateTaskRequest::new(
            milestone.id(),
            "T",
            date(2024, 1, 5),
            date(2024, 1, 10),
        )))
        .expect("task creation should succeed");
    (milestone, task)
}

/// A proposal ending after the milestone is refused before anything is stored.
#[rstest]
fn proposal_past_milestone_end_is_refused(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = early_january_task(&rt, &scheduler);

    let result = rt.block_on(
        scheduler.proposals.create(
            CreateProposalRequest::new(task.id(), "delay", "pm")
                .with_requested_range(date(2024, 1, 20), date(2024, 2, 5)),
        ),
    );

    assert!(matches!(
        result,
        Err(SchedulingError::OutOfBounds(ref err))
            if err.violation == BoundaryViolation::EndAfterMilestone
    ));
    let page = rt
        .block_on(scheduler.queries.list(ProposalQuery::new().with_task(task.id())))
        .expect("listing should succeed");
    assert_eq!(page.total_count, 0, "no proposal row may be created");
}

/// A proposal inside the milestone is filed, approved, and applied.
#[rstest]
fn approved_proposal_moves_task(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = early_january_task(&rt, &scheduler);

    let proposal = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 15), date(2024, 1, 20)),
            ),
        )
        .expect("proposal creation should succeed");
    assert_eq!(proposal.status(), ProposalStatus::Pending);

    let reviewed = rt
        .block_on(
            scheduler
                .proposals
                .review(proposal.id(), ReviewDecision::Approve, "reviewer"),
        )
        .expect("approval should succeed");
    let moved = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");

    assert_eq!(reviewed.status(), ProposalStatus::Approved);
    assert_eq!(moved.start(), date(2024, 1, 15));
    assert_eq!(moved.end(), date(2024, 1, 20));
}

/// A second review fails whichever decision it attempts.
#[rstest]
#[case(ReviewDecision::Approve, ReviewDecision::Approve)]
#[case(ReviewDecision::Approve, ReviewDecision::Reject)]
#[case(ReviewDecision::Reject, ReviewDecision::Approve)]
#[case(ReviewDecision::Reject, ReviewDecision::Reject)]
fn proposals_leave_pending_exactly_once(
    runtime: io::Result<Runtime>,
    scheduler: Scheduler,
    #[case] first: ReviewDecision,
    #[case] second: ReviewDecision,
) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = early_january_task(&rt, &scheduler);
    let proposal = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 6), date(2024, 1, 12)),
            ),
        )
        .expect("proposal creation should succeed");
    let reviewed = rt
        .block_on(scheduler.proposals.review(proposal.id(), first, "reviewer"))
        .expect("first review should succeed");
    let task_after_first = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");

    let result = rt.block_on(scheduler.proposals.review(proposal.id(), second, "other"));

    assert!(result.is_err_and(|err| err.is_invalid_state()));
    let stored = rt
        .block_on(scheduler.proposals.get(proposal.id()))
        .expect("lookup should succeed");
    assert_eq!(stored, reviewed);
    let task_now = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert_eq!(task_now, task_after_first);
}

/// Approval re-checks against the milestone as it stands at review time.
#[rstest]
fn approval_after_milestone_shrink_rejects_proposal(
    runtime: io::Result<Runtime>,
    scheduler: Scheduler,
) {
    let rt = runtime.expect("runtime creation");
    let (milestone, task) = early_january_task(&rt, &scheduler);
    let proposal = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 15), date(2024, 1, 28)),
            ),
        )
        .expect("proposal was valid when filed");
    rt.block_on(
        scheduler
            .milestones
            .reschedule(milestone.id(), range(date(2024, 1, 1), date(2024, 1, 21))),
    )
    .expect("milestone reschedule should succeed");

    let result = rt.block_on(
        scheduler
            .proposals
            .review(proposal.id(), ReviewDecision::Approve, "reviewer"),
    );

    assert!(result.is_err_and(|err| err.is_out_of_bounds()));
    let stored = rt
        .block_on(scheduler.proposals.get(proposal.id()))
        .expect("lookup should succeed");
    assert_eq!(stored.status(), ProposalStatus::Rejected);
    assert_eq!(stored.last_modifier_id().as_str(), "reviewer");
    let unchanged = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert_eq!(unchanged, task);
}

/// Every successful create or edit leaves the task inside its milestone.
#[rstest]
fn successful_edits_stay_inside_milestone(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (milestone, task) = early_january_task(&rt, &scheduler);
    let attempts = [
        (date(2024, 1, 1), date(2024, 1, 31)),
        (date(2023, 12, 31), date(2024, 1, 2)),
        (date(2024, 1, 30), date(2024, 2, 1)),
        (date(2024, 1, 15), date(2024, 1, 14)),
        (date(2024, 1, 31), date(2024, 1, 31)),
        (date(2024, 1, 3), date(2024, 1, 9)),
    ];

    for (start, end) in attempts {
        let result = rt.block_on(
            scheduler.tasks.update_range(
                UpdateTaskRangeRequest::new(task.id())
                    .with_start(start)
                    .with_end(end),
            ),
        );
        let current = rt
            .block_on(scheduler.tasks.get(task.id()))
            .expect("lookup should succeed");

        assert!(milestone.range().contains(&current.range()));
        if let Ok(updated) = result {
            assert_eq!(updated, current);
            assert_eq!((updated.start(), updated.end()), (start, end));
        }
    }
}
