//! SemaphorePolicy - free/used slot counting semaphores
//!
//! `free_slots` counts empty slots and `used_slots` counts filled ones, so the
//! decision to wait for capacity is separate from mutual exclusion. Several
//! producers can hold a free-slot permit at once; they still take turns on the
//! buffer lock to do the actual mutation.
//!
//! The permit taken from one semaphore is converted into a unit on the other
//! only after the buffer mutation. If the mutation unwinds, the permit guard
//! hands the unit back to the semaphore it came from, so
//! `free_slots + used_slots == capacity` is kept on every exit path.

use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::{ BoundedBuffer, RingBuffer, Value };
use crate::constants::DEFAULT_INTERRUPT_POLL;
use crate::error::Result;
use crate::interrupt::Interrupt;
use crate::metrics::{ Metrics, MetricsSnapshot };
use crate::policy::{ abandon_wait, Role, SyncPolicy };
use crate::semaphore::Semaphore;
use crate::insights;

pub struct SemaphorePolicy<B: BoundedBuffer = RingBuffer> {
    buffer: Mutex<B>,
    free_slots: Semaphore,
    used_slots: Semaphore,
    capacity: usize,
    metrics: Metrics,
}

impl<B: BoundedBuffer> SemaphorePolicy<B> {
    /// Wrap `buffer`; slots it already holds count as used.
    pub fn new(buffer: B) -> Self {
        Self::with_poll(buffer, DEFAULT_INTERRUPT_POLL)
    }

    pub fn with_poll(buffer: B, poll: Duration) -> Self {
        let capacity = buffer.size();
        let used = buffer.count();
        Self {
            buffer: Mutex::new(buffer),
            free_slots: Semaphore::with_poll(capacity - used, poll),
            used_slots: Semaphore::with_poll(used, poll),
            capacity,
            metrics: Metrics::new(),
        }
    }

    /// Permits currently available as (free, used).
    pub fn permits(&self) -> (usize, usize) {
        (self.free_slots.available(), self.used_slots.available())
    }
}

impl SemaphorePolicy<RingBuffer> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::new(RingBuffer::new(capacity)?))
    }
}

impl<B: BoundedBuffer> SyncPolicy for SemaphorePolicy<B> {
    fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()> {
        let permit = match self.free_slots.try_acquire() {
            Some(permit) => permit,
            None => {
                self.metrics.record_wait();
                self.free_slots
                    .acquire(interrupt)
                    .map_err(|_| abandon_wait(Role::Producer, &self.metrics))?
            }
        };

        {
            let mut buffer = self.buffer.lock();
            buffer.insert(value);
            self.metrics.record_insert();
            insights::record_transfer(Role::Producer, value, buffer.count());
        }

        permit.transfer(&self.used_slots);
        Ok(())
    }

    fn retrieve_interruptible(&self, interrupt: &Interrupt) -> Result<Value> {
        let permit = match self.used_slots.try_acquire() {
            Some(permit) => permit,
            None => {
                self.metrics.record_wait();
                self.used_slots
                    .acquire(interrupt)
                    .map_err(|_| abandon_wait(Role::Consumer, &self.metrics))?
            }
        };

        let value = {
            let mut buffer = self.buffer.lock();
            let value = buffer.retrieve();
            self.metrics.record_retrieve();
            insights::record_transfer(Role::Consumer, value, buffer.count());
            value
        };

        permit.transfer(&self.free_slots);
        Ok(value)
    }

    fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    fn is_full(&self) -> bool {
        self.buffer.lock().is_full()
    }

    fn size(&self) -> usize {
        self.capacity
    }

    fn count(&self) -> usize {
        self.buffer.lock().count()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn name(&self) -> &'static str {
        "semaphore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SlotRingBuffer;
    use crate::error::QueueError;
    use std::panic::{ catch_unwind, AssertUnwindSafe };
    use std::sync::atomic::{ AtomicBool, Ordering };
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_permits_track_slots() {
        let policy = SemaphorePolicy::with_capacity(3).unwrap();
        assert_eq!(policy.permits(), (3, 0));

        policy.insert(1).unwrap();
        policy.insert(2).unwrap();
        assert_eq!(policy.permits(), (1, 2));

        assert_eq!(policy.retrieve().unwrap(), 1);
        assert_eq!(policy.permits(), (2, 1));
    }

    #[test]
    fn test_prefilled_buffer_counts_as_used() {
        let mut buffer = RingBuffer::new(2).unwrap();
        buffer.insert(5);
        let policy = SemaphorePolicy::new(buffer);
        assert_eq!(policy.permits(), (1, 1));
        assert_eq!(policy.retrieve().unwrap(), 5);
    }

    #[test]
    fn test_insert_blocks_while_full() {
        let policy = Arc::new(SemaphorePolicy::with_capacity(5).unwrap());
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
        assert!(!done.load(Ordering::SeqCst));

        assert_eq!(policy.retrieve().unwrap(), 1);
        producer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));

        let rest: Vec<Value> = (0..5).map(|_| policy.retrieve().unwrap()).collect();
        assert_eq!(rest, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_interrupted_insert_loses_no_permit() {
        let policy = Arc::new(SemaphorePolicy::new(SlotRingBuffer::new(1).unwrap()));
        policy.insert(1).unwrap();

        let interrupt = Interrupt::new();
        let p = policy.clone();
        let i = interrupt.clone();
        let producer = thread::spawn(move || p.insert_interruptible(2, &i));

        thread::sleep(Duration::from_millis(20));
        interrupt.trigger();
        assert_eq!(
            producer.join().unwrap(),
            Err(QueueError::Interrupted { role: Role::Producer })
        );
        assert_eq!(policy.permits(), (0, 1));

        assert_eq!(policy.retrieve().unwrap(), 1);
        policy.insert(3).unwrap();
        assert_eq!(policy.retrieve().unwrap(), 3);
        assert_eq!(policy.permits(), (1, 0));
        assert_eq!(policy.metrics().interrupts, 1);
    }

    /// Ring buffer whose next insert or retrieve panics before touching storage.
    struct FaultyBuffer {
        inner: RingBuffer,
        fail_insert: bool,
        fail_retrieve: bool,
    }

    impl BoundedBuffer for FaultyBuffer {
        fn is_empty(&self) -> bool {
            self.inner.is_empty()
        }

        fn is_full(&self) -> bool {
            self.inner.is_full()
        }

        fn size(&self) -> usize {
            self.inner.size()
        }

        fn count(&self) -> usize {
            self.inner.count()
        }

        fn insert(&mut self, value: Value) {
            if std::mem::take(&mut self.fail_insert) {
                panic!("storage fault on insert");
            }
            self.inner.insert(value);
        }

        fn retrieve(&mut self) -> Value {
            if std::mem::take(&mut self.fail_retrieve) {
                panic!("storage fault on retrieve");
            }
            self.inner.retrieve()
        }
    }

    #[test]
    fn test_failed_mutation_returns_permit_to_origin() {
        let policy = SemaphorePolicy::new(FaultyBuffer {
            inner: RingBuffer::new(2).unwrap(),
            fail_insert: true,
            fail_retrieve: true,
        });

        let unwound = catch_unwind(AssertUnwindSafe(|| policy.insert(1)));
        assert!(unwound.is_err());
        assert_eq!(policy.permits(), (2, 0));
        assert_eq!(policy.count(), 0);

        policy.insert(2).unwrap();
        policy.insert(3).unwrap();
        assert_eq!(policy.permits(), (0, 2));

        let unwound = catch_unwind(AssertUnwindSafe(|| policy.retrieve()));
        assert!(unwound.is_err());
        assert_eq!(policy.permits(), (0, 2));
        assert_eq!(policy.count(), 2);

        assert_eq!(policy.retrieve().unwrap(), 2);
        assert_eq!(policy.retrieve().unwrap(), 3);
        assert_eq!(policy.permits(), (2, 0));
        assert_eq!(policy.metrics().inserts, 2);
    }
}
