//! ConditionPairPolicy - `not_full` / `not_empty`, single wake
//!
//! Producers only ever wait on `not_full` and consumers only on `not_empty`,
//! so whoever a signal reaches is of the role whose predicate just became
//! true. One wake per mutation is enough.
//!
//! A woken waiter re-checks its predicate before looking at its interrupt. A
//! waiter that leaves on interrupt therefore never swallows the signal meant
//! for the next thread in line.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{ Condvar, Mutex };

use crate::buffer::{ BoundedBuffer, RingBuffer, Value };
use crate::constants::DEFAULT_INTERRUPT_POLL;
use crate::error::Result;
use crate::interrupt::Interrupt;
use crate::metrics::{ Metrics, MetricsSnapshot };
use crate::policy::{ abandon_wait, park, Role, SyncPolicy };
use crate::insights;

pub struct ConditionPairPolicy<B: BoundedBuffer = RingBuffer> {
    buffer: Mutex<B>,
    not_full: Arc<Condvar>,
    not_empty: Arc<Condvar>,
    poll: Duration,
    metrics: Metrics,
}

impl<B: BoundedBuffer> ConditionPairPolicy<B> {
    pub fn new(buffer: B) -> Self {
        Self::with_poll(buffer, DEFAULT_INTERRUPT_POLL)
    }

    pub fn with_poll(buffer: B, poll: Duration) -> Self {
        Self {
            buffer: Mutex::new(buffer),
            not_full: Arc::new(Condvar::new()),
            not_empty: Arc::new(Condvar::new()),
            poll,
            metrics: Metrics::new(),
        }
    }
}

impl ConditionPairPolicy<RingBuffer> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::new(RingBuffer::new(capacity)?))
    }
}

impl<B: BoundedBuffer> SyncPolicy for ConditionPairPolicy<B> {
    fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()> {
        let mut buffer = self.buffer.lock();
        if buffer.is_full() {
            self.metrics.record_wait();
        }
        while buffer.is_full() {
            if interrupt.is_triggered() {
                return Err(abandon_wait(Role::Producer, &self.metrics));
            }
            park(&self.not_full, &mut buffer, interrupt, self.poll);
        }

        buffer.insert(value);
        self.metrics.record_insert();
        insights::record_transfer(Role::Producer, value, buffer.count());

        self.not_empty.notify_one();
        Ok(())
    }

    fn retrieve_interruptible(&self, interrupt: &Interrupt) -> Result<Value> {
        let mut buffer = self.buffer.lock();
        if buffer.is_empty() {
            self.metrics.record_wait();
        }
        while buffer.is_empty() {
            if interrupt.is_triggered() {
                return Err(abandon_wait(Role::Consumer, &self.metrics));
            }
            park(&self.not_empty, &mut buffer, interrupt, self.poll);
        }

        let value = buffer.retrieve();
        self.metrics.record_retrieve();
        insights::record_transfer(Role::Consumer, value, buffer.count());

        self.not_full.notify_one();
        Ok(value)
    }

    fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    fn is_full(&self) -> bool {
        self.buffer.lock().is_full()
    }

    fn size(&self) -> usize {
        self.buffer.lock().size()
    }

    fn count(&self) -> usize {
        self.buffer.lock().count()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn name(&self) -> &'static str {
        "condition-pair"
    }
}
