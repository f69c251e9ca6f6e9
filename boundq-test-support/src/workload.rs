//! Alternating one-shot workload.
//!
//! A pool of threads is started at once: even indices are consumers, odd
//! indices producers. Each sleeps for its role's delay and then performs a
//! single retrieve or insert of a random value in `0..100`. Threads still
//! blocked when the straggler timeout passes are interrupted, so runs over an
//! admission-limited queue (where a rejected producer may leave a consumer
//! waiting forever) always terminate.

use std::sync::Arc;
use std::thread;
use std::time::{ Duration, Instant };

use boundq::{ Interrupt, QueueError, Role, SyncPolicy, Value };
use rand::Rng;

#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Pool size; half consumers, half producers
    pub threads: usize,
    pub producer_delay: Duration,
    pub consumer_delay: Duration,
    /// Measured from the start of the run
    pub straggler_timeout: Duration,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            threads: 100,
            producer_delay: Duration::from_millis(500),
            consumer_delay: Duration::from_millis(1000),
            straggler_timeout: Duration::from_secs(10),
        }
    }
}

impl WorkloadConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            ..Default::default()
        }
    }

    pub fn with_delays(mut self, producer: Duration, consumer: Duration) -> Self {
        self.producer_delay = producer;
        self.consumer_delay = consumer;
        self
    }

    pub fn with_straggler_timeout(mut self, timeout: Duration) -> Self {
        self.straggler_timeout = timeout;
        self
    }

    pub fn role_of(index: usize) -> Role {
        if index % 2 == 0 { Role::Consumer } else { Role::Producer }
    }
}

/// Tally of how every thread's single operation ended
#[derive(Debug, Clone, Default)]
pub struct WorkloadReport {
    pub inserted: Vec<Value>,
    pub retrieved: Vec<Value>,
    pub rejected: Vec<Role>,
    pub interrupted: Vec<Role>,
}

impl WorkloadReport {
    pub fn outcomes(&self) -> usize {
        self.inserted.len() + self.retrieved.len() + self.rejected.len() + self.interrupted.len()
    }

    pub fn rejected_as(&self, role: Role) -> usize {
        self.rejected.iter().filter(|&&r| r == role).count()
    }

    pub fn interrupted_as(&self, role: Role) -> usize {
        self.interrupted.iter().filter(|&&r| r == role).count()
    }
}

enum Outcome {
    Inserted(Value),
    Retrieved(Value),
    Refused(QueueError),
}

pub struct AlternatingWorkload {
    config: WorkloadConfig,
}

impl AlternatingWorkload {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, queue: Arc<dyn SyncPolicy>) -> WorkloadReport {
        let config = &self.config;
        let interrupt = Interrupt::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let start = Instant::now();

        let handles: Vec<_> = (0..config.threads)
            .map(|index| {
                let (queue, tx, interrupt) = (queue.clone(), tx.clone(), interrupt.clone());
                let role = WorkloadConfig::role_of(index);
                let delay = match role {
                    Role::Producer => config.producer_delay,
                    Role::Consumer => config.consumer_delay,
                };
                thread::spawn(move || {
                    thread::sleep(delay);
                    let outcome = match role {
                        Role::Producer => {
                            let value = rand::thread_rng().gen_range(0..100);
                            queue
                                .insert_interruptible(value, &interrupt)
                                .map(|()| Outcome::Inserted(value))
                        }
                        Role::Consumer => queue.retrieve_interruptible(&interrupt).map(Outcome::Retrieved),
                    };
                    let _ = tx.send(outcome.unwrap_or_else(Outcome::Refused));
                })
            })
            .collect();
        drop(tx);

        let mut report = WorkloadReport::default();
        let deadline = start + config.straggler_timeout;
        let mut timed_out = false;

        loop {
            let received = if timed_out {
                rx.recv().ok()
            } else {
                match rx.recv_deadline(deadline) {
                    Ok(outcome) => Some(outcome),
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                        tracing::warn!(
                            outcomes = report.outcomes(),
                            threads = config.threads,
                            "interrupting stragglers"
                        );
                        interrupt.trigger();
                        timed_out = true;
                        continue;
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => None,
                }
            };

            match received {
                Some(Outcome::Inserted(v)) => report.inserted.push(v),
                Some(Outcome::Retrieved(v)) => report.retrieved.push(v),
                Some(Outcome::Refused(QueueError::AdmissionRejected { role, .. })) => {
                    report.rejected.push(role)
                }
                Some(Outcome::Refused(QueueError::Interrupted { role })) => report.interrupted.push(role),
                Some(Outcome::Refused(other)) => {
                    tracing::error!(error = %other, "unexpected queue error");
                }
                None => break,
            }
        }

        for handle in handles {
            let _ = handle.join();
        }

        tracing::info!(
            policy = queue.name(),
            inserted = report.inserted.len(),
            retrieved = report.retrieved.len(),
            rejected = report.rejected.len(),
            interrupted = report.interrupted.len(),
            "alternating workload complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_alternate_starting_with_consumer() {
        assert_eq!(WorkloadConfig::role_of(0), Role::Consumer);
        assert_eq!(WorkloadConfig::role_of(1), Role::Producer);
        assert_eq!(WorkloadConfig::role_of(98), Role::Consumer);
    }

    #[test]
    fn test_report_tallies() {
        let report = WorkloadReport {
            inserted: vec![1, 2],
            retrieved: vec![1],
            rejected: vec![Role::Producer, Role::Consumer, Role::Producer],
            interrupted: vec![Role::Consumer],
        };
        assert_eq!(report.outcomes(), 7);
        assert_eq!(report.rejected_as(Role::Producer), 2);
        assert_eq!(report.interrupted_as(Role::Consumer), 1);
    }
}
