//! Competing reviews under `PostgreSQL` row locks.

use crate::postgres::helpers::{PgScheduler, date, pg_scheduler, runtime, seed_january_task};
use keystone::schedule::{
    domain::{ProposalStatus, ReviewDecision},
    services::{CreateProposalRequest, SchedulingError},
};
use rstest::rstest;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Two simultaneous reviews of one proposal cannot both succeed.
#[rstest]
#[case(ReviewDecision::Approve, ReviewDecision::Approve)]
#[case(ReviewDecision::Approve, ReviewDecision::Reject)]
#[case(ReviewDecision::Reject, ReviewDecision::Reject)]
fn double_review_has_a_single_winner(
    runtime: io::Result<Runtime>,
    pg_scheduler: PgScheduler,
    #[case] first: ReviewDecision,
    #[case] second: ReviewDecision,
) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = seed_january_task(&rt, &pg_scheduler);
    let proposal_id = rt
        .block_on(
            pg_scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 12), date(2024, 1, 22)),
            ),
        )
        .expect("proposal creation should succeed")
        .id();
    let shared = Arc::new(pg_scheduler);

    let outcomes = rt.block_on(async {
        let handles: Vec<_> = [(first, "lead-a"), (second, "lead-b")]
            .into_iter()
            .map(|(decision, reviewer)| {
                let services = Arc::clone(&shared);
                tokio::spawn(async move {
                    services.proposals.review(proposal_id, decision, reviewer).await
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.expect("review task should not panic"));
        }
        outcomes
    });

    let winners: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one review may succeed");
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(SchedulingError::is_invalid_state)
    );

    let stored = rt
        .block_on(shared.proposals.get(proposal_id))
        .expect("lookup should succeed");
    let winner = winners.first().expect("one winner");
    assert_eq!(&stored, *winner);
    let current = rt
        .block_on(shared.tasks.get(task.id()))
        .expect("lookup should succeed");
    match stored.status() {
        ProposalStatus::Approved => {
            assert_eq!((current.start(), current.end()), (date(2024, 1, 12), date(2024, 1, 22)));
        }
        ProposalStatus::Rejected => assert_eq!(current, task),
        ProposalStatus::Pending => panic!("proposal must not stay pending"),
    }
}

/// Many reviewers racing on one proposal still leave exactly one decision.
#[rstest]
fn many_reviewers_race_on_one_proposal(runtime: io::Result<Runtime>, pg_scheduler: PgScheduler) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = seed_january_task(&rt, &pg_scheduler);
    let proposal_id = rt
        .block_on(
            pg_scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 14), date(2024, 1, 24)),
            ),
        )
        .expect("proposal creation should succeed")
        .id();
    let shared = Arc::new(pg_scheduler);

    let successes = rt.block_on(async {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let services = Arc::clone(&shared);
                tokio::spawn(async move {
                    services
                        .proposals
                        .review(proposal_id, ReviewDecision::Approve, format!("reviewer-{index}"))
                        .await
                })
            })
            .collect();
        let mut successes = 0_usize;
        for handle in handles {
            match handle.await.expect("review task should not panic") {
                Ok(_) => successes += 1,
                Err(err) => assert!(err.is_invalid_state(), "unexpected error: {err}"),
            }
        }
        successes
    });

    assert_eq!(successes, 1);
    let moved = rt
        .block_on(shared.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert_eq!((moved.start(), moved.end()), (date(2024, 1, 14), date(2024, 1, 24)));
}
