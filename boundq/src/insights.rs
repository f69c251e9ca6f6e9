//! Insights - trace events for boundq.
//!
//! Zero-cost when the `tracing` feature is disabled.
//!
//! # Usage
//!
//! ```toml
//! boundq = { version = "0.1", features = ["tracing"] }
//! ```
//! ```rust,ignore
//! tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).init();
//! ```

use crate::buffer::Value;
use crate::policy::Role;

/// Record a completed insert or retrieve
#[cfg(feature = "tracing")]
#[inline]
pub fn record_transfer(role: Role, value: Value, resulting_count: usize) {
    tracing::trace!(target: "boundq", %role, value, resulting_count, "transfer");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_transfer(_role: Role, _value: Value, _resulting_count: usize) {}

/// Record an admission rejection
#[cfg(feature = "tracing")]
#[inline]
pub fn record_rejection(role: Role, limit: usize) {
    tracing::debug!(target: "boundq", %role, limit, reason = "AdmissionRejected", "rejected");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_rejection(_role: Role, _limit: usize) {}

/// Record a wait cancelled through its `Interrupt`
#[cfg(feature = "tracing")]
#[inline]
pub fn record_interrupt(role: Role) {
    tracing::debug!(target: "boundq", %role, reason = "Interrupted", "interrupted");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_interrupt(_role: Role) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_compile() {
        // No-op unless tracing is enabled
        record_transfer(Role::Producer, 42, 1);
        record_rejection(Role::Consumer, 1);
        record_interrupt(Role::Producer);
    }
}
