//! AdmissionLimitPolicy - bulkhead in front of another policy
//!
//! At most `limit` insert/retrieve calls may be inside the wrapped policy at
//! once. A call arriving when the limit is reached fails immediately with
//! `AdmissionRejected`; it is not queued and does not block. Calls that are
//! admitted may still block inside the wrapped policy.
//!
//! Rejected calls transfer nothing, so under overload some values are never
//! produced or consumed. Callers decide whether to retry, drop, or report.

use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::buffer::Value;
use crate::error::{ QueueError, Result };
use crate::interrupt::Interrupt;
use crate::metrics::{ Metrics, MetricsSnapshot };
use crate::policy::{ Role, SyncPolicy };
use crate::insights;

pub struct AdmissionLimitPolicy<P: SyncPolicy> {
    inner: P,
    limit: usize,
    in_flight: AtomicUsize,
    metrics: Metrics,
}

/// Held for the duration of one admitted call.
struct Ticket<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<P: SyncPolicy> AdmissionLimitPolicy<P> {
    pub fn new(inner: P, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(QueueError::InvalidLimit { limit });
        }

        Ok(Self {
            inner,
            limit,
            in_flight: AtomicUsize::new(0),
            metrics: Metrics::new(),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Calls currently inside the wrapped policy.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The wrapped policy, bypassing admission control.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn admit(&self, role: Role) -> Result<Ticket<'_>> {
        let limit = self.limit;
        match
            self.in_flight.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < limit).then_some(current + 1)
            })
        {
            Ok(previous) => {
                self.metrics.record_in_flight(previous + 1);
                Ok(Ticket { in_flight: &self.in_flight })
            }
            Err(_) => {
                self.metrics.record_rejection();
                insights::record_rejection(role, limit);
                Err(QueueError::rejected(role, limit))
            }
        }
    }
}

impl<P: SyncPolicy> SyncPolicy for AdmissionLimitPolicy<P> {
    fn insert_interruptible(&self, value: Value, interrupt: &Interrupt) -> Result<()> {
        let _ticket = self.admit(Role::Producer)?;
        self.inner.insert_interruptible(value, interrupt)
    }

    fn retrieve_interruptible(&self, interrupt: &Interrupt) -> Result<Value> {
        let _ticket = self.admit(Role::Consumer)?;
        self.inner.retrieve_interruptible(interrupt)
    }

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

    fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics().merge(self.metrics.snapshot())
    }

    fn name(&self) -> &'static str {
        "admission-limit"
    }
}
