//! Listing tests for [`ProposalQueryService`] over the in-memory repository.
//!
//! [`ProposalQueryService`]: keystone::schedule::services::ProposalQueryService

use crate::in_memory::helpers::{Scheduler, runtime, scheduler, seed_january_task};
use keystone::schedule::{
    domain::{ChangeProposal, ProposalId, ProposalQuery, TaskId},
    services::{CreateProposalRequest, CreateTaskRequest},
};
use rstest::rstest;
use std::collections::HashSet;
use std::io;
use tokio::runtime::Runtime;

/// Files five proposals: three on the seeded task, two on a sibling task.
fn five_proposals(rt: &Runtime, scheduler: &Scheduler) -> (TaskId, Vec<ChangeProposal>) {
    let (milestone, first_task) = seed_january_task(rt, scheduler);
    let sibling = rt
        .block_on(scheduler.tasks.create(CreateTaskRequest::new(
            milestone.id(),
            "Sibling",
            milestone.range().start(),
            milestone.range().end(),
        )))
        .expect("task creation should succeed");

    let targets = [
        first_task.id(),
        sibling.id(),
        first_task.id(),
        sibling.id(),
        first_task.id(),
    ];
    let proposals = targets
        .into_iter()
        .enumerate()
        .map(|(index, task_id)| {
            rt.block_on(scheduler.proposals.create(CreateProposalRequest::new(
                task_id,
                format!("proposal {index}"),
                "pm",
            )))
            .expect("proposal creation should succeed")
        })
        .collect();
    (first_task.id(), proposals)
}

fn ids(items: &[ChangeProposal]) -> Vec<ProposalId> {
    items.iter().map(ChangeProposal::id).collect()
}

/// Unfiltered listing returns every proposal once, oldest first.
#[rstest]
fn unfiltered_list_returns_everything_in_creation_order(
    runtime: io::Result<Runtime>,
    scheduler: Scheduler,
) {
    let rt = runtime.expect("runtime creation");
    let (_, filed) = five_proposals(&rt, &scheduler);

    let page = rt
        .block_on(scheduler.queries.list(ProposalQuery::new()))
        .expect("listing should succeed");

    assert_eq!(page.total_count, 5);
    assert_eq!(ids(&page.items), ids(&filed));
    assert!(
        page.items
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.created_at() < b.created_at()))
    );
}

/// A task filter equals the unfiltered result intersected with that task.
#[rstest]
fn task_filter_is_a_subset_of_unfiltered_order(
    runtime: io::Result<Runtime>,
    scheduler: Scheduler,
) {
    let rt = runtime.expect("runtime creation");
    let (task_id, _) = five_proposals(&rt, &scheduler);

    let all = rt
        .block_on(scheduler.queries.list(ProposalQuery::new()))
        .expect("listing should succeed");
    let filtered = rt
        .block_on(scheduler.queries.list(ProposalQuery::new().with_task(task_id)))
        .expect("listing should succeed");

    let expected: Vec<ProposalId> = all
        .items
        .iter()
        .filter(|proposal| proposal.task_id() == task_id)
        .map(ChangeProposal::id)
        .collect();
    assert_eq!(ids(&filtered.items), expected);
    assert_eq!(filtered.total_count, 3);
}

/// Consecutive pages cover the dataset without overlap.
#[rstest]
fn consecutive_pages_do_not_overlap(runtime: io::Result<Runtime>, scheduler: Scheduler) {
    let rt = runtime.expect("runtime creation");
    let (_, filed) = five_proposals(&rt, &scheduler);

    let mut seen = Vec::new();
    for first in [0, 2, 4] {
        let page = rt
            .block_on(
                scheduler
                    .queries
                    .list(ProposalQuery::new().with_first(first).with_max(2)),
            )
            .expect("listing should succeed");
        assert_eq!(page.total_count, 5);
        seen.extend(ids(&page.items));
    }

    let distinct: HashSet<ProposalId> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 5);
    assert_eq!(distinct.len(), 5);
    assert_eq!(seen, ids(&filed));
}
