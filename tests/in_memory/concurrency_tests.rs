//! Concurrency tests: competing reviews and range edits.

use crate::in_memory::helpers::{Scheduler, date, runtime, scheduler, seed_january_task};
use keystone::schedule::{
    domain::{ProposalStatus, ReviewDecision},
    services::{CreateProposalRequest, SchedulingError, UpdateTaskRangeRequest},
};
use rstest::rstest;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Exactly one of many simultaneous reviews of one proposal wins.
#[rstest]
fn concurrent_reviews_have_a_single_winner(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (_, task) = seed_january_task(&rt, &scheduler);
    let proposal = rt
        .block_on(
            scheduler.proposals.create(
                CreateProposalRequest::new(task.id(), "delay", "pm")
                    .with_requested_range(date(2024, 1, 12), date(2024, 1, 22)),
            ),
        )
        .expect("proposal creation should succeed");
    let proposal_id = proposal.id();
    let shared = Arc::new(scheduler);

    let outcomes = rt.block_on(async {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let services = Arc::clone(&shared);
                let decision = if index % 2 == 0 {
                    ReviewDecision::Approve
                } else {
                    ReviewDecision::Reject
                };
                tokio::spawn(async move {
                    services
                        .proposals
                        .review(proposal_id, decision, format!("reviewer-{index}"))
                        .await
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
    let moved = rt
        .block_on(shared.tasks.get(task.id()))
        .expect("lookup should succeed");
    let winner = winners.first().expect("one winner");
    assert_eq!(&stored, *winner);
    match stored.status() {
        ProposalStatus::Approved => {
            assert_eq!((moved.start(), moved.end()), (date(2024, 1, 12), date(2024, 1, 22)));
        }
        ProposalStatus::Rejected => assert_eq!(moved, task),
        ProposalStatus::Pending => panic!("proposal must not stay pending"),
    }
}

/// Simultaneous direct edits serialize; the survivor is one of the requests.
#[rstest]
fn concurrent_range_updates_serialize(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (milestone, task) = seed_january_task(&rt, &scheduler);
    let shared = Arc::new(scheduler);
    let requested: Vec<_> = (1..=6_u32)
        .map(|offset| (date(2024, 1, offset), date(2024, 1, 20 + offset)))
        .collect();

    let results = rt.block_on(async {
        let handles: Vec<_> = requested
            .iter()
            .map(|&(start, end)| {
                let services = Arc::clone(&shared);
                let task_id = task.id();
                tokio::spawn(async move {
                    services
                        .tasks
                        .update_range(
                            UpdateTaskRangeRequest::new(task_id)
                                .with_start(start)
                                .with_end(end),
                        )
                        .await
                })
            })
            .collect();
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.expect("update task should not panic"));
        }
        results
    });

    assert!(results.iter().all(Result::is_ok));
    let current = rt
        .block_on(shared.tasks.get(task.id()))
        .expect("lookup should succeed");
    assert!(requested.contains(&(current.start(), current.end())));
    assert!(milestone.range().contains(&current.range()));
}
