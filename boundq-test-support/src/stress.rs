//! Stress testing: many producers and consumers on one shared policy.
//!
//! Producer `p` inserts `p * items_per_producer + i` for `i` in
//! `0..items_per_producer`, so every value is distinct and its origin can be
//! read back. Consumers split the total between them. Completion is awaited
//! with a deadline; if it passes, every worker is interrupted and the run is
//! reported as stalled.

use std::sync::Arc;
use std::thread;
use std::time::{ Duration, Instant };

use boundq::{ Interrupt, MetricsSnapshot, QueueError, SyncPolicy, Value };
use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

/// Configuration for stress runs
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of producer threads
    pub producers: usize,
    /// Number of consumer threads
    pub consumers: usize,
    /// Values inserted by each producer
    pub items_per_producer: usize,
    /// How long to wait for every worker to finish
    pub deadline: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            producers: 1,
            consumers: 1,
            items_per_producer: 1_000,
            deadline: Duration::from_secs(30),
        }
    }
}

impl StressConfig {
    pub fn new(producers: usize, consumers: usize) -> Self {
        Self {
            producers,
            consumers,
            ..Default::default()
        }
    }

    pub fn with_items_per_producer(mut self, n: usize) -> Self {
        self.items_per_producer = n;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn total_items(&self) -> usize {
        self.producers * self.items_per_producer
    }

    /// Values consumer `id` retrieves; the remainder goes to the first consumers.
    pub fn consumer_quota(&self, id: usize) -> usize {
        let base = self.total_items() / self.consumers;
        base + usize::from(id < self.total_items() % self.consumers)
    }

    /// Every value the producers will insert.
    pub fn expected_values(&self) -> Vec<Value> {
        (0..self.total_items()).map(|v| v as Value).collect()
    }
}

/// Everything observed during a completed run
#[derive(Debug, Clone)]
pub struct StressReport {
    /// Values per consumer, in retrieval order
    pub consumed: Vec<Vec<Value>>,
    pub elapsed: Duration,
    pub metrics: MetricsSnapshot,
}

impl StressReport {
    pub fn all_consumed(&self) -> Vec<Value> {
        self.consumed.iter().flatten().copied().collect()
    }

    pub fn total_consumed(&self) -> usize {
        self.consumed.iter().map(Vec::len).sum()
    }
}

#[derive(Error, Debug)]
pub enum StressError {
    #[error("Stalled: {finished}/{workers} workers finished within {deadline:?}")]
    Stalled {
        finished: usize,
        workers: usize,
        deadline: Duration,
    },

    #[error("Worker {worker} failed: {source}")]
    Queue {
        worker: String,
        #[source]
        source: QueueError,
    },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

enum Outcome {
    Produced,
    Consumed { id: usize, values: Vec<Value> },
    Failed { worker: String, error: QueueError },
}

/// Runner for producer/consumer stress runs
pub struct StressRunner {
    config: StressConfig,
}

impl StressRunner {
    pub fn new(config: StressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    pub fn run(&self, queue: Arc<dyn SyncPolicy>) -> Result<StressReport, StressError> {
        let config = &self.config;
        let workers = config.producers + config.consumers;
        let interrupt = Interrupt::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let start = Instant::now();

        let mut handles = Vec::with_capacity(workers);

        for id in 0..config.producers {
            let (queue, tx, interrupt) = (queue.clone(), tx.clone(), interrupt.clone());
            let items = config.items_per_producer;
            handles.push(
                thread::spawn(move || {
                    let first = id * items;
                    for v in first..first + items {
                        if let Err(error) = queue.insert_interruptible(v as Value, &interrupt) {
                            let _ = tx.send(Outcome::Failed { worker: format!("producer-{id}"), error });
                            return;
                        }
                    }
                    let _ = tx.send(Outcome::Produced);
                })
            );
        }

        for id in 0..config.consumers {
            let (queue, tx, interrupt) = (queue.clone(), tx.clone(), interrupt.clone());
            let quota = config.consumer_quota(id);
            handles.push(
                thread::spawn(move || {
                    let mut values = Vec::with_capacity(quota);
                    for _ in 0..quota {
                        match queue.retrieve_interruptible(&interrupt) {
                            Ok(v) => values.push(v),
                            Err(error) => {
                                let _ = tx.send(Outcome::Failed { worker: format!("consumer-{id}"), error });
                                return;
                            }
                        }
                    }
                    let _ = tx.send(Outcome::Consumed { id, values });
                })
            );
        }
        drop(tx);

        let deadline = start + config.deadline;
        let mut consumed = vec![Vec::new(); config.consumers];
        let mut failure = None;
        let mut finished = 0;

        while finished < workers {
            match rx.recv_deadline(deadline) {
                Ok(Outcome::Produced) => {}
                Ok(Outcome::Consumed { id, values }) => consumed[id] = values,
                Ok(Outcome::Failed { worker, error }) => {
                    failure.get_or_insert(StressError::Queue { worker, source: error });
                }
                // A worker died without reporting; joining below surfaces it.
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(finished, workers, policy = queue.name(), "stress run stalled");
                    interrupt.trigger();
                    failure = Some(StressError::Stalled {
                        finished,
                        workers,
                        deadline: config.deadline,
                    });
                    break;
                }
            }
            finished += 1;
        }

        let mut panicked = false;
        for handle in handles {
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(StressError::WorkerPanicked);
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let report = StressReport {
            consumed,
            elapsed: start.elapsed(),
            metrics: queue.metrics(),
        };
        tracing::info!(
            policy = queue.name(),
            producers = config.producers,
            consumers = config.consumers,
            consumed = report.total_consumed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            metrics = %report.metrics,
            "stress run complete"
        );
        Ok(report)
    }
}
