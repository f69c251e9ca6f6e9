//! Metrics for boundq policies.
//!
//! Lightweight per-policy counters for observability and tests

use std::sync::atomic::{ AtomicU64, Ordering };

pub struct Metrics {
    pub inserts: AtomicU64,
    pub retrieves: AtomicU64,
    pub waits: AtomicU64,
    pub rejections: AtomicU64,
    pub interrupts: AtomicU64,
    pub peak_in_flight: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            inserts: AtomicU64::new(0),
            retrieves: AtomicU64::new(0),
            waits: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            interrupts: AtomicU64::new(0),
            peak_in_flight: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_retrieve(&self) {
        self.retrieves.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_in_flight(&self, in_flight: usize) {
        self.peak_in_flight.fetch_max(in_flight as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            retrieves: self.retrieves.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            interrupts: self.interrupts.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.retrieves.store(0, Ordering::Relaxed);
        self.waits.store(0, Ordering::Relaxed);
        self.rejections.store(0, Ordering::Relaxed);
        self.interrupts.store(0, Ordering::Relaxed);
        self.peak_in_flight.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub inserts: u64,
    pub retrieves: u64,
    pub waits: u64,
    pub rejections: u64,
    pub interrupts: u64,
    pub peak_in_flight: u64,
}

impl MetricsSnapshot {
    /// Fold an outer wrapper's counters into the snapshot of the policy it wraps.
    pub fn merge(mut self, outer: MetricsSnapshot) -> Self {
        self.inserts += outer.inserts;
        self.retrieves += outer.retrieves;
        self.waits += outer.waits;
        self.rejections += outer.rejections;
        self.interrupts += outer.interrupts;
        self.peak_in_flight = self.peak_in_flight.max(outer.peak_in_flight);
        self
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "in={} out={} waits={} rejected={} interrupted={} peak_in_flight={}",
            self.inserts,
            self.retrieves,
            self.waits,
            self.rejections,
            self.interrupts,
            self.peak_in_flight
        )
    }
}
