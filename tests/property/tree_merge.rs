//! Property-based tests for merge guarantees

use proptest::prelude::*;
use regwatch::tree::{ChangeEvent, Node, Tree};

fn key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 1..4)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

fn event_strategy() -> impl Strategy<Value = ChangeEvent> {
    prop_oneof![
        (key_strategy(), "[a-z0-9]{0,6}", prop::option::of(0u64..1000))
            .prop_map(|(key, value, version)| ChangeEvent::set(key, value, version)),
        (key_strategy(), prop::option::of(0u64..1000))
            .prop_map(|(key, version)| ChangeEvent::delete(key, version)),
        (key_strategy(), prop::option::of(0u64..1000))
            .prop_map(|(key, version)| ChangeEvent::directory(key, version)),
    ]
}

/// The tree version is the maximum version carried by any merged event
#[test]
fn test_version_is_max_of_events() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(event_strategy(), 0..40),
            |events| {
                let mut tree = Tree::new();
                tree.apply_all(&events);

                let expected = events.iter().filter_map(ChangeEvent::version).max();
                prop_assert_eq!(tree.version(), expected);
                Ok(())
            },
        )
        .unwrap();
}

/// Deleting the same key twice leaves the same tree as deleting it once
#[test]
fn test_delete_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(prop::collection::vec(event_strategy(), 0..30), key_strategy()),
            |(events, key)| {
                let mut tree = Tree::new();
                tree.apply_all(&events);

                let delete = ChangeEvent::delete(key.clone(), None);
                tree.apply(&delete);
                let once = tree.clone();
                prop_assert!(!tree.apply(&delete));
                prop_assert_eq!(&tree, &once);
                prop_assert!(tree.get(&key).is_none());
                Ok(())
            },
        )
        .unwrap();
}

/// The last set of a key decides its value
#[test]
fn test_last_set_wins() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(event_strategy(), 0..30),
                key_strategy(),
                "[a-z]{1,8}",
            ),
            |(events, key, value)| {
                let mut tree = Tree::new();
                tree.apply_all(&events);
                tree.apply(&ChangeEvent::set(key.clone(), value.clone(), None));

                prop_assert_eq!(tree.get(&key).and_then(Node::as_value), Some(value.as_str()));
                Ok(())
            },
        )
        .unwrap();
}

/// Directory events and deletes never create entries
#[test]
fn test_only_sets_create_entries() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(
                (key_strategy(), any::<bool>(), prop::option::of(0u64..1000)),
                0..30,
            ),
            |entries| {
                let events: Vec<ChangeEvent> = entries
                    .into_iter()
                    .map(|(key, dir, version)| {
                        if dir {
                            ChangeEvent::directory(key, version)
                        } else {
                            ChangeEvent::delete(key, version)
                        }
                    })
                    .collect();

                let mut tree = Tree::new();
                prop_assert_eq!(tree.apply_all(&events), 0);
                prop_assert!(tree.is_empty());
                Ok(())
            },
        )
        .unwrap();
}

/// Replaying a batch is equivalent to applying it event by event
#[test]
fn test_batch_equals_sequential_merge() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(event_strategy(), 0..40),
            |events| {
                let mut batch = Tree::new();
                batch.apply_all(&events);

                let mut sequential = Tree::new();
                for event in &events {
                    sequential.apply(event);
                }

                prop_assert_eq!(batch, sequential);
                Ok(())
            },
        )
        .unwrap();
}
