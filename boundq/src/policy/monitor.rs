//! MonitorPolicy - single condition variable, broadcast wake
//!
//! Producers waiting for space and consumers waiting for data share one
//! condition variable. A wake-up may therefore reach the wrong role, so every
//! mutation wakes all waiters and each one re-checks its own predicate.

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

pub struct MonitorPolicy<B: BoundedBuffer = RingBuffer> {
    buffer: Mutex<B>,
    changed: Arc<Condvar>,
    poll: Duration,
    metrics: Metrics,
}

impl<B: BoundedBuffer> MonitorPolicy<B> {
    pub fn new(buffer: B) -> Self {
        Self::with_poll(buffer, DEFAULT_INTERRUPT_POLL)
    }

    pub fn with_poll(buffer: B, poll: Duration) -> Self {
        Self {
            buffer: Mutex::new(buffer),
            changed: Arc::new(Condvar::new()),
            poll,
            metrics: Metrics::new(),
        }
    }
}

impl MonitorPolicy<RingBuffer> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::new(RingBuffer::new(capacity)?))
    }
}

impl<B: BoundedBuffer> SyncPolicy for MonitorPolicy<B> {
    fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()> {
        let mut buffer = self.buffer.lock();
        if buffer.is_full() {
            self.metrics.record_wait();
        }
        while buffer.is_full() {
            if interrupt.is_triggered() {
                return Err(abandon_wait(Role::Producer, &self.metrics));
            }
            park(&self.changed, &mut buffer, interrupt, self.poll);
        }

        buffer.insert(value);
        self.metrics.record_insert();
        insights::record_transfer(Role::Producer, value, buffer.count());

        self.changed.notify_all();
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
            park(&self.changed, &mut buffer, interrupt, self.poll);
        }

        let value = buffer.retrieve();
        self.metrics.record_retrieve();
        insights::record_transfer(Role::Consumer, value, buffer.count());

        self.changed.notify_all();
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
        "monitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SlotRingBuffer;
    use crate::error::QueueError;
    use std::sync::atomic::{ AtomicBool, Ordering };
    use std::thread;

    #[test]
    fn test_sequential_fifo() {
        let policy = MonitorPolicy::with_capacity(5).unwrap();
        for v in 1..=5 {
            policy.insert(v).unwrap();
        }
        assert!(policy.is_full());

        let out: Vec<Value> = (0..5).map(|_| policy.retrieve().unwrap()).collect();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
        assert!(policy.is_empty());
    }

    #[test]
    fn test_insert_blocks_while_full() {
        let policy = Arc::new(MonitorPolicy::with_capacity(5).unwrap());
        for v in 1..=5 {
            policy.insert(v).unwrap();
        }

        let done = Arc::new(AtomicBool::new(false));
        let p = policy.clone();
        let d = done.clone();
        let producer = thread::spawn(move || {
            p.insert(6).unwrap();
            d.store(true, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "6th insert must wait for a retrieve");

        assert_eq!(policy.retrieve().unwrap(), 1);
        producer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(policy.count(), 5);
        assert!(policy.metrics().waits >= 1);
    }

    #[test]
    fn test_interrupted_retrieve_leaves_policy_usable() {
        let policy = Arc::new(MonitorPolicy::new(SlotRingBuffer::new(2).unwrap()));
        let interrupt = Interrupt::new();

        let p = policy.clone();
        let i = interrupt.clone();
        let consumer = thread::spawn(move || p.retrieve_interruptible(&i));

        thread::sleep(Duration::from_millis(20));
        interrupt.trigger();
        assert_eq!(
            consumer.join().unwrap(),
            Err(QueueError::Interrupted { role: Role::Consumer })
        );

        policy.insert(11).unwrap();
        assert_eq!(policy.retrieve().unwrap(), 11);
        assert_eq!(policy.metrics().interrupts, 1);
    }

    #[test]
    fn test_interrupt_is_ignored_when_no_wait_needed() {
        let policy = MonitorPolicy::with_capacity(1).unwrap();
        let interrupt = Interrupt::new();
        interrupt.trigger();

        policy.insert_interruptible(3, &interrupt).unwrap();
        assert_eq!(policy.retrieve_interruptible(&interrupt).unwrap(), 3);
    }
}
