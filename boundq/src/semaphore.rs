//! Counting semaphore with interruptible acquire.
//!
//! Permits are handed out as scoped [`Permit`] guards. A guard that is
//! dropped returns its unit to the semaphore it came from; [`Permit::transfer`]
//! moves the unit to another semaphore instead (a free slot becoming a used
//! slot). Either way no exit path loses a unit.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{ Condvar, Mutex };

use crate::constants::DEFAULT_INTERRUPT_POLL;
use crate::interrupt::{ Interrupt, Interrupted };
use crate::policy::park;

pub struct Semaphore {
    permits: Mutex<usize>,
    available: Arc<Condvar>,
    poll: Duration,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self::with_poll(permits, DEFAULT_INTERRUPT_POLL)
    }

    pub fn with_poll(permits: usize, poll: Duration) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Arc::new(Condvar::new()),
            poll,
        }
    }

    /// Block until a permit is available or `interrupt` fires.
    ///
    /// Availability is checked before the interrupt, so a waiter woken by
    /// `release` always takes the unit it was woken for.
    pub fn acquire(&self, interrupt: &Interrupt) -> Result<Permit<'_>, Interrupted> {
        let mut permits = self.permits.lock();
        loop {
            if *permits > 0 {
                *permits -= 1;
                return Ok(Permit { origin: self, armed: true });
            }
            if interrupt.is_triggered() {
                return Err(Interrupted);
            }
            park(&self.available, &mut permits, interrupt, self.poll);
        }
    }

    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return None;
        }
        *permits -= 1;
        Some(Permit { origin: self, armed: true })
    }

    /// Add one permit and wake a single waiter. Never blocks.
    pub fn release(&self) {
        *self.permits.lock() += 1;
        self.available.notify_one();
    }

    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}

/// One unit taken from a [`Semaphore`].
#[must_use = "dropping a permit immediately returns it"]
pub struct Permit<'a> {
    origin: &'a Semaphore,
    armed: bool,
}

impl Permit<'_> {
    /// Consume the permit by releasing a unit on `target` rather than the origin.
    pub fn transfer(mut self, target: &Semaphore) {
        self.armed = false;
        target.release();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.origin.release();
        }
    }
}
