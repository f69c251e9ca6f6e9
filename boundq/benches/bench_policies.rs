//! Blocking policy benchmark with Criterion
//!
//! One producer and one consumer thread move a fixed number of values through
//! each strategy over a small queue, so most operations contend or block.

use criterion::{ criterion_group, criterion_main, BenchmarkId, Criterion, Throughput };
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use boundq::{ PolicyKind, QueueConfig, StorageKind, SyncPolicy };

const CAPACITY: usize = 64;
const TOTAL_EVENTS: u64 = 100_000;

fn bench_spsc_round_trip(queue: Arc<dyn SyncPolicy>, events: u64) -> u64 {
    let q = queue.clone();
    let consumer = thread::spawn(move || {
        let mut sum = 0i64;
        for _ in 0..events {
            sum += q.retrieve().unwrap() as i64;
        }
        black_box(sum)
    });

    for i in 0..events {
        queue.insert(i as i32).unwrap();
    }

    consumer.join().unwrap();
    events
}

fn benchmark_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("SPSC (100K events, capacity 64)");
    group.throughput(Throughput::Elements(TOTAL_EVENTS));
    group.sample_size(20);

    for policy in PolicyKind::ALL {
        for storage in StorageKind::ALL {
            let id = BenchmarkId::new(format!("{:?}", policy), format!("{:?}", storage));
            group.bench_function(id, |b| {
                b.iter(|| {
                    let queue: Arc<dyn SyncPolicy> = QueueConfig::new(CAPACITY)
                        .unwrap()
                        .with_policy(policy)
                        .with_storage(storage)
                        .build()
                        .unwrap()
                        .into();
                    bench_spsc_round_trip(queue, TOTAL_EVENTS)
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_policies);
criterion_main!(benches);
