//! Proposal workflow tests against stored `PostgreSQL` rows.

use crate::postgres::helpers::{
    PgScheduler, date, pg_scheduler, range, runtime, seed_january_task,
};
use keystone::schedule::{
    domain::{BoundaryViolation, ProposalQuery, ProposalStatus, ReviewDecision},
    services::{CreateProposalRequest, ResubmitProposalRequest, SchedulingError},
};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// A proposal ending after the milestone leaves no row behind.
#[rstest]
fn out_of_bounds_proposal_is_not_stored(
    runtime: io::Result<Runtime>,
    pg_scheduler: PgScheduler,
) {
    let rt = runtime.expect("runtime creation");
    let scheduler = pg_scheduler;
    let (_, task) = seed_january_task(&rt, &scheduler);

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
    assert_eq!(page.total_count, 0);
    assert!(page.items.is_empty());
}

/// Approval moves the stored task, and stored rows equal the values returned.
#[rstest]
fn approval_moves_stored_task(runtime: io::Result<Runtime>, pg_scheduler: PgScheduler) {
    let rt = runtime.expect("runtime creation");
    let scheduler = pg_scheduler;
    let (_, task) = seed_january_task(&rt, &scheduler);

    let filed = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "vendor slipped", "pm")
                    .with_comment("needs a week")
                    .with_requested_range(date(2024, 1, 15), date(2024, 1, 25)),
            ),
        )
        .expect("proposal creation should succeed");
    let stored_filed = rt
        .block_on(scheduler.proposals.get(filed.id()))
        .expect("lookup should succeed");
    assert_eq!(stored_filed, filed);

    let approved = rt
        .block_on(
            scheduler
                .proposals
                .review(filed.id(), ReviewDecision::Approve, "lead"),
        )
        .expect("approval should succeed");

    assert_eq!(approved.status(), ProposalStatus::Approved);
    let stored = rt
        .block_on(scheduler.proposals.get(filed.id()))
        .expect("lookup should succeed");
    assert_eq!(stored, approved);
    let moved = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert_eq!((moved.start(), moved.end()), (date(2024, 1, 15), date(2024, 1, 25)));
}

/// Approving after the milestone shrank stores a rejection and keeps the task.
#[rstest]
fn approval_after_milestone_shrink_is_rejected(
    runtime: io::Result<Runtime>,
    pg_scheduler: PgScheduler,
) {
    let rt = runtime.expect("runtime creation");
    let scheduler = pg_scheduler;
    let (milestone, task) = seed_january_task(&rt, &scheduler);
    let filed = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 15), date(2024, 1, 28)),
            ),
        )
        .expect("proposal creation should succeed");
    rt.block_on(
        scheduler
            .milestones
            .reschedule(milestone.id(), range(date(2024, 1, 1), date(2024, 1, 21))),
    )
    .expect("milestone reschedule should succeed");

    let result = rt.block_on(
        scheduler
            .proposals
            .review(filed.id(), ReviewDecision::Approve, "lead"),
    );

    assert!(matches!(result, Err(SchedulingError::OutOfBounds(_))));
    let stored = rt
        .block_on(scheduler.proposals.get(filed.id()))
        .expect("lookup should succeed");
    assert_eq!(stored.status(), ProposalStatus::Rejected);
    let unchanged = rt
        .block_on(scheduler.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert_eq!(unchanged, task);
}

/// Resubmission stores a new pending proposal linked to the rejected one.
#[rstest]
fn resubmission_links_stored_rows(runtime: io::Result<Runtime>, pg_scheduler: PgScheduler) {
    let rt = runtime.expect("runtime creation");
    let scheduler = pg_scheduler;
    let (_, task) = seed_january_task(&rt, &scheduler);
    let first = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 12), date(2024, 1, 22)),
            ),
        )
        .expect("proposal creation should succeed");
    rt.block_on(
        scheduler
            .proposals
            .review(first.id(), ReviewDecision::Reject, "lead"),
    )
    .expect("rejection should succeed");

    let second = rt
        .block_on(
            scheduler.proposals.resubmit(
                ResubmitProposalRequest::new(first.id(), "smaller delay", "pm")
                    .with_requested_range(date(2024, 1, 11), date(2024, 1, 21)),
            ),
        )
        .expect("resubmission should succeed");

    let stored = rt
        .block_on(scheduler.proposals.get(second.id()))
        .expect("lookup should succeed");
    assert_eq!(stored, second);
    assert_eq!(stored.supersedes(), Some(first.id()));
    assert_eq!(stored.status(), ProposalStatus::Pending);
    let previous = rt
        .block_on(scheduler.proposals.get(first.id()))
        .expect("lookup should succeed");
    assert_eq!(previous.status(), ProposalStatus::Rejected);
}
