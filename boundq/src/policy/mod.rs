//! Synchronization policies.
//!
//! A policy makes a [`BoundedBuffer`](crate::buffer::BoundedBuffer) safe to
//! share between producer and consumer threads. Every policy offers the same
//! blocking insert/retrieve contract, so they are interchangeable behind
//! `dyn SyncPolicy`:
//!
//! - `MonitorPolicy` - one mutex, one condition variable, broadcast wake
//! - `SemaphorePolicy` - free/used slot semaphores plus a buffer mutex
//! - `ConditionPairPolicy` - one mutex, `not_full`/`not_empty`, single wake
//! - `AdmissionLimitPolicy` - caps concurrent callers of another policy and
//!   rejects the excess instead of letting them wait
//!
//! No ordering is promised between threads waiting for the same condition.

pub mod monitor;
pub mod semaphore;
pub mod condition_pair;
pub mod admission;

pub use monitor::MonitorPolicy;
pub use semaphore::SemaphorePolicy;
pub use condition_pair::ConditionPairPolicy;
pub use admission::AdmissionLimitPolicy;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{ Condvar, MutexGuard };

use crate::buffer::Value;
use crate::error::{ QueueError, Result };
use crate::interrupt::Interrupt;
use crate::metrics::{ Metrics, MetricsSnapshot };
use crate::insights;

/// Which side of the queue a call is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Producer,
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Consumer => f.write_str("consumer"),
        }
    }
}

/// Thread-safe blocking queue contract.
///
/// `insert` and `retrieve` block until the operation is legal, perform exactly
/// one buffer mutation, then wake callers waiting on the opposite condition.
/// The inspection methods are passthroughs and may be stale by the time the
/// caller looks at them; only the policy's own wait loop decides when an
/// operation may proceed.
pub trait SyncPolicy: Send + Sync {
    fn insert(&self, value: Value) -> Result<()> {
        self.insert_interruptible(value, &Interrupt::never())
    }

    fn retrieve(&self) -> Result<Value> {
        self.retrieve_interruptible(&Interrupt::never())
    }

    /// Like `insert`, but gives up with `QueueError::Interrupted` once
    /// `interrupt` fires while the call is still waiting.
    fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()>;

    /// Like `retrieve`, but gives up with `QueueError::Interrupted` once
    /// `interrupt` fires while the call is still waiting.
    fn retrieve_interruptible(&self, interrupt: &Interrupt) -> Result<Value>;

    fn is_empty(&self) -> bool;

    fn is_full(&self) -> bool;

    fn size(&self) -> usize;

    fn count(&self) -> usize;

    fn metrics(&self) -> MetricsSnapshot;

    fn name(&self) -> &'static str;
}

macro_rules! forward_sync_policy {
    ($($ptr:ident),*) => {
        $(
            impl<P: SyncPolicy + ?Sized> SyncPolicy for $ptr<P> {
                fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()> {
                    (**self).insert_interruptible(value, interrupt)
                }

                fn retrieve_interruptible(&self, interrupt: &Interrupt) -> Result<Value> {
                    (**self).retrieve_interruptible(interrupt)
                }

                fn is_empty(&self) -> bool {
                    (**self).is_empty()
                }

                fn is_full(&self) -> bool {
                    (**self).is_full()
                }

                fn size(&self) -> usize {
                    (**self).size()
                }

                fn count(&self) -> usize {
                    (**self).count()
                }

                fn metrics(&self) -> MetricsSnapshot {
                    (**self).metrics()
                }

                fn name(&self) -> &'static str {
                    (**self).name()
                }
            }
        )*
    };
}

forward_sync_policy!(Box, Arc);

/// Sleep on `cond` once. With an armed interrupt the condvar is registered on
/// the token for the duration of the sleep, so `Interrupt::trigger` wakes it;
/// `poll` only caps the sleep in case the trigger landed just before it.
#[inline]
pub(crate) fn park<T: ?Sized>(
    cond: &Arc<Condvar>,
    guard: &mut MutexGuard<'_, T>,
    interrupt: &Interrupt,
    poll: Duration
) {
    match interrupt.register(cond) {
        Some(_registration) => {
            if !interrupt.is_triggered() {
                let _ = cond.wait_for(guard, poll);
            }
        }
        None => cond.wait(guard),
    }
}

/// Bookkeeping for a wait abandoned because its interrupt fired.
pub(crate) fn abandon_wait(role: Role, metrics: &Metrics) -> QueueError {
    metrics.record_interrupt();
    insights::record_interrupt(role);
    QueueError::interrupted(role)
}
