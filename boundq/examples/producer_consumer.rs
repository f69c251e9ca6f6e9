//! Producer/Consumer demo
//!
//! Starts a pool of threads over one capacity-5 queue. Even threads consume,
//! odd threads produce a random value. Pass a policy name (`monitor`,
//! `semaphore`, `condition-pair`) and optionally an admission limit:
//!
//!     cargo run --example producer_consumer -- semaphore 3

use boundq::{ Interrupt, PolicyKind, QueueConfig, QueueError, SyncPolicy };
use std::sync::Arc;
use std::thread;
use std::time::{ Duration, Instant };

const THREADS: usize = 20;
const CAPACITY: usize = 5;
const PRODUCER_DELAY: Duration = Duration::from_millis(50);
const CONSUMER_DELAY: Duration = Duration::from_millis(100);
const STRAGGLER_TIMEOUT: Duration = Duration::from_secs(2);

fn parse_policy(name: &str) -> Option<PolicyKind> {
    PolicyKind::ALL.into_iter().find(|kind| kind.name() == name)
}

fn main() -> Result<(), QueueError> {
    let mut args = std::env::args().skip(1);
    let policy = match args.next() {
        Some(name) =>
            parse_policy(&name).ok_or_else(|| {
                QueueError::config(format!("unknown policy {name:?}"))
            })?,
        None => PolicyKind::default(),
    };
    let limit = args.next().and_then(|s| s.parse::<usize>().ok());

    let mut config = QueueConfig::new(CAPACITY)?.with_policy(policy);
    if let Some(limit) = limit {
        config = config.with_admission_limit(limit)?;
    }
    let queue: Arc<dyn SyncPolicy> = config.build()?.into();

    println!("\n  Producer/Consumer over '{}' (capacity {CAPACITY})", queue.name());
    if let Some(limit) = limit {
        println!("  Admission limit: {limit}");
    }
    println!();

    let start = Instant::now();
    let interrupt = Interrupt::new();
    let mut handles = Vec::with_capacity(THREADS);
    for index in 0..THREADS {
        let (queue, interrupt) = (queue.clone(), interrupt.clone());
        handles.push(
            thread::spawn(move || {
                if index % 2 == 0 {
                    thread::sleep(CONSUMER_DELAY);
                    match queue.retrieve_interruptible(&interrupt) {
                        Ok(v) => println!("  [{index:>2}] retrieved {v:>3}  (count {})", queue.count()),
                        Err(e) => println!("  [{index:>2}] {e}"),
                    }
                } else {
                    thread::sleep(PRODUCER_DELAY);
                    let value = ((index * 37) % 100) as i32;
                    match queue.insert_interruptible(value, &interrupt) {
                        Ok(()) => println!("  [{index:>2}] inserted  {value:>3}  (count {})", queue.count()),
                        Err(e) => println!("  [{index:>2}] {e}"),
                    }
                }
            })
        );
    }

    // With a limit, a consumer whose producer was rejected may wait forever.
    while !handles.iter().all(|h| h.is_finished()) {
        if start.elapsed() > STRAGGLER_TIMEOUT {
            interrupt.trigger();
        }
        thread::sleep(Duration::from_millis(10));
    }
    for handle in handles {
        let _ = handle.join();
    }

    println!("\n  Elapsed: {:?}", start.elapsed());
    println!("  Metrics: {}", queue.metrics());
    println!("  Left in queue: {}\n", queue.count());
    Ok(())
}
