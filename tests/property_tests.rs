//! Property-based tests for featuretrail invariants.
//!
//! These tests verify key ordering, history normalization, and forest
//! construction over randomly generated inputs.

use std::cmp::Ordering;

use proptest::prelude::*;
use proptest::sample::Index;

use featuretrail::core::order::{compare_keys, sort_keys};
use featuretrail::core::tree::FeatureForest;
use featuretrail::core::types::{IssueKey, IssueType, RawIssue};
use featuretrail::engine::{normalize_subjects, FeatureTreeBuilder, GitHistoryIndex, IssueCache, Membership};
use featuretrail::tracker::mock::MockTracker;

// =============================================================================
// Strategies
// =============================================================================

fn issue_key_string() -> impl Strategy<Value = String> {
    "[A-Z]{1,3}-[0-9]{1,5}"
}

/// Shape of one generated ticket: story or task, optional parent among
/// the earlier tickets, optional epic (0 = none).
type Shape = (bool, Option<Index>, u8);

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(
        (any::<bool>(), proptest::option::of(any::<Index>()), 0u8..3),
        1..12,
    )
}

fn key(s: &str) -> IssueKey {
    IssueKey::new(s).unwrap()
}

/// Turn shapes into tickets whose parent links always point backwards,
/// so no generated lineage is cyclic.
fn tickets(shapes: &[Shape]) -> Vec<RawIssue> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, (is_story, parent, epic))| {
            let issue_type = if *is_story { IssueType::Story } else { IssueType::Task };
            let mut issue = RawIssue::new(
                key(&format!("LPS-{}", i + 1)),
                issue_type,
                "Open",
                format!("ticket {}", i + 1),
            );
            if let Some(parent) = parent.filter(|_| i > 0) {
                issue = issue.with_parent(key(&format!("LPS-{}", parent.index(i) + 1)));
            }
            if *epic > 0 {
                issue = issue.with_epic_link(key(&format!("EPIC-{}", epic)));
            }
            issue
        })
        .collect()
}

fn tracker_for(issues: &[RawIssue]) -> MockTracker {
    let mut tracker = MockTracker::new()
        .with_issue(RawIssue::new(key("EPIC-1"), IssueType::Epic, "Open", "First epic"))
        .with_issue(RawIssue::new(key("EPIC-2"), IssueType::Epic, "Open", "Second epic"));
    for issue in issues {
        tracker = tracker.with_issue(issue.clone());
    }
    tracker
}

/// Build a forest by adding `order` one ticket at a time.
fn build(tracker: &MockTracker, order: &[RawIssue]) -> FeatureForest {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(async {
        let mut cache = IssueCache::new();
        let mut builder = FeatureTreeBuilder::new(&mut cache, tracker);
        for issue in order {
            builder.add_issue(issue).await;
        }
        builder.finish().0
    })
}

// =============================================================================
// Key ordering
// =============================================================================

proptest! {
    /// Comparison is antisymmetric and only equal for identical keys.
    #[test]
    fn compare_keys_is_antisymmetric(a in issue_key_string(), b in issue_key_string()) {
        prop_assert_eq!(compare_keys(&a, &b), compare_keys(&b, &a).reverse());
        prop_assert_eq!(compare_keys(&a, &b) == Ordering::Equal, a == b);
    }

    /// Within a project, differing numbers order numerically.
    #[test]
    fn same_project_orders_by_number(
        project in "[A-Z]{1,4}",
        x in 0u64..100_000,
        y in 0u64..100_000,
    ) {
        let a = format!("{}-{}", project, x);
        let b = format!("{}-{}", project, y);
        prop_assert_eq!(compare_keys(&a, &b), x.cmp(&y));
    }

    /// Sorting yields pairwise ordered keys regardless of input order.
    #[test]
    fn sorted_keys_are_pairwise_ordered(
        keys in prop::collection::vec(issue_key_string(), 0..30),
    ) {
        let mut sorted = keys.clone();
        sort_keys(&mut sorted);

        for pair in sorted.windows(2) {
            prop_assert_ne!(compare_keys(&pair[0], &pair[1]), Ordering::Greater);
        }

        let mut reversed = keys;
        reversed.reverse();
        sort_keys(&mut reversed);
        prop_assert_eq!(sorted, reversed);
    }
}

// =============================================================================
// History
// =============================================================================

proptest! {
    /// Normalizing already-normalized subjects changes nothing.
    #[test]
    fn normalization_is_idempotent(
        lines in prop::collection::vec("[ a-zA-Z0-9:-]{0,20}", 0..20),
    ) {
        let ignore = vec!["subrepo:ignore".to_string()];
        let once = normalize_subjects(&lines, &ignore);
        let twice = normalize_subjects(&once, &ignore);
        prop_assert_eq!(once, twice);
    }

    /// A key that leads a subject is always an exact member.
    #[test]
    fn leading_key_is_exact(
        key in issue_key_string(),
        rest in "[a-z ]{0,20}",
        others in prop::collection::vec("[A-Z]{1,3}-[0-9]{1,3} [a-z]{1,8}", 0..10),
    ) {
        let mut subjects = others;
        subjects.push(format!("{} {}", key, rest));
        let index = GitHistoryIndex::from_subjects(normalize_subjects(&subjects, &[]));
        prop_assert_eq!(index.membership(&key), Membership::Exact);
    }
}

// =============================================================================
// Forest construction
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The forest depends on the set of tickets, not the order they arrive in.
    #[test]
    fn forest_is_order_independent(
        (issues, shuffled) in shapes()
            .prop_map(|s| tickets(&s))
            .prop_flat_map(|issues| {
                let shuffled = Just(issues.clone()).prop_shuffle();
                (Just(issues), shuffled)
            }),
    ) {
        let tracker = tracker_for(&issues);
        let forward = build(&tracker, &issues);
        let permuted = build(&tracker, &shuffled);
        prop_assert_eq!(forward, permuted);
    }

    /// Adding every ticket a second time leaves the forest unchanged.
    #[test]
    fn adding_twice_is_idempotent(issues in shapes().prop_map(|s| tickets(&s))) {
        let tracker = tracker_for(&issues);
        let once = build(&tracker, &issues);

        let doubled: Vec<RawIssue> = issues.iter().chain(issues.iter()).cloned().collect();
        let twice = build(&tracker, &doubled);
        prop_assert_eq!(once, twice);
    }

    /// Every added ticket appears exactly once.
    #[test]
    fn every_ticket_placed_once(issues in shapes().prop_map(|s| tickets(&s))) {
        let tracker = tracker_for(&issues);
        let forest = build(&tracker, &issues);

        for issue in &issues {
            prop_assert_eq!(
                forest.locate(&issue.key).len(),
                1,
                "{} placed {} times",
                issue.key,
                forest.locate(&issue.key).len()
            );
        }
    }
}
