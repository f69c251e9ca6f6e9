//! Defaults shared by the buffers, policies and configuration.

use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 5;

/// Longest a waiter holding an armed `Interrupt` sleeps before re-checking it.
/// `Interrupt::trigger` wakes registered waiters directly; this only bounds a
/// trigger that races the waiter going to sleep.
pub const DEFAULT_INTERRUPT_POLL: Duration = Duration::from_millis(50);
