//! Multi-producer / multi-consumer stress tests.
//!
//! Every inserted value must be retrieved exactly once, and bounded runs must
//! finish, under each blocking strategy. Which waiting thread gets woken first
//! is not guaranteed, so no test asserts an assignment of values to consumers.

use boundq::{ MonitorPolicy, PolicyKind, QueueConfig, StorageKind, SyncPolicy };
use boundq_test_support::{
    init_tracing,
    MultisetChecker,
    SequenceChecker,
    StressConfig,
    StressError,
    StressRunner,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn build(policy: PolicyKind, storage: StorageKind, capacity: usize) -> Arc<dyn SyncPolicy> {
    QueueConfig::new(capacity)
        .unwrap()
        .with_policy(policy)
        .with_storage(storage)
        .build()
        .unwrap()
        .into()
}

#[test]
fn test_no_lost_or_duplicated_values() {
    init_tracing();

    for policy in PolicyKind::ALL {
        for storage in StorageKind::ALL {
            let config = StressConfig::new(4, 3).with_items_per_producer(2_000);
            let runner = StressRunner::new(config.clone());
            let report = runner.run(build(policy, storage, 8)).unwrap();

            let mut multiset = MultisetChecker::new();
            multiset.expect(config.expected_values());
            multiset.observe(report.all_consumed());
            assert!(
                multiset.is_exact(),
                "{:?}/{:?}: missing {:?}, duplicated {:?}",
                policy,
                storage,
                multiset.missing(),
                multiset.duplicated()
            );

            for values in &report.consumed {
                let mut sequence = SequenceChecker::new(config.items_per_producer);
                sequence.observe_all(values);
                assert!(sequence.is_ordered(), "{:?}: {:?}", policy, sequence.violations());
            }

            assert_eq!(report.metrics.inserts, config.total_items() as u64);
            assert_eq!(report.metrics.retrieves, config.total_items() as u64);
        }
    }
}

/// More producers than consumers over a single slot: every blocking call returns
#[test]
fn test_no_deadlock_with_more_producers() {
    for policy in PolicyKind::ALL {
        let config = StressConfig::new(8, 2)
            .with_items_per_producer(500)
            .with_deadline(Duration::from_secs(60));
        let report = StressRunner::new(config.clone())
            .run(build(policy, StorageKind::Ring, 1))
            .unwrap_or_else(|e| panic!("{:?} did not complete: {}", policy, e));

        assert_eq!(report.total_consumed(), config.total_items());
        assert!(report.metrics.waits > 0, "{:?}: a single slot must force waits", policy);
    }
}

/// Fairness is not guaranteed: we only check that each parked consumer
/// eventually gets exactly one value, not which one.
#[test]
fn test_fairness_not_guaranteed_but_every_waiter_progresses() {
    const WAITERS: usize = 12;

    for policy in PolicyKind::ALL {
        let queue = build(policy, StorageKind::Slots, 2);

        let consumers: Vec<_> = (0..WAITERS)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || q.retrieve().unwrap())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        for v in 0..WAITERS as i32 {
            queue.insert(v).unwrap();
        }

        let mut got: Vec<i32> = consumers.into_iter().map(|h| h.join().unwrap()).collect();
        got.sort_unstable();
        assert_eq!(got, (0..WAITERS as i32).collect::<Vec<_>>());
    }
}

#[test]
fn test_stalled_run_is_interrupted_and_reported() {
    let queue = Arc::new(MonitorPolicy::with_capacity(1).unwrap());
    queue.insert(99).unwrap();

    // Nobody consumes, so the only producer blocks on a full queue.
    let config = StressConfig::new(1, 0)
        .with_items_per_producer(1)
        .with_deadline(Duration::from_millis(100));
    let result = StressRunner::new(config).run(queue.clone());

    assert!(matches!(result, Err(StressError::Stalled { finished: 0, workers: 1, .. })));
    assert_eq!(queue.metrics().interrupts, 1);
    assert_eq!(queue.retrieve().unwrap(), 99);
    assert!(queue.is_empty());
}
