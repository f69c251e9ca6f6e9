//! Cancellation for blocked waits.
//!
//! An armed `Interrupt` is shared between the waiting thread and whoever wants
//! to cancel it. A waiter holding an armed token registers the condition
//! variable it sleeps on, and `trigger` notifies every registered condvar, so
//! cancellation does not depend on the waiter polling. The poll interval only
//! bounds the narrow window between a waiter's last check and its sleep.

use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;

use parking_lot::{ Condvar, Mutex };

#[derive(Debug, Default)]
struct Shared {
    triggered: AtomicBool,
    wakers: Mutex<Vec<Arc<Condvar>>>,
}

#[derive(Debug, Clone)]
pub struct Interrupt {
    shared: Option<Arc<Shared>>,
}

/// Same as [`Interrupt::never`]: an unarmed token. Use [`Interrupt::new`] for
/// one that can fire.
impl Default for Interrupt {
    fn default() -> Self {
        Self::never()
    }
}

/// Returned by a primitive whose wait was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Keeps a condvar on the token's wake list until dropped.
pub(crate) struct Registration<'a> {
    shared: &'a Shared,
    cond: Arc<Condvar>,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut wakers = self.shared.wakers.lock();
        if let Some(pos) = wakers.iter().position(|w| Arc::ptr_eq(w, &self.cond)) {
            wakers.swap_remove(pos);
        }
    }
}

impl Interrupt {
    /// Armed token, not yet triggered.
    pub fn new() -> Self {
        Self {
            shared: Some(Arc::new(Shared::default())),
        }
    }

    /// Token that can never fire.
    pub const fn never() -> Self {
        Self { shared: None }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.shared.is_some()
    }

    /// Cancel every wait currently observing this token (or any clone of it).
    pub fn trigger(&self) {
        if let Some(shared) = &self.shared {
            shared.triggered.store(true, Ordering::Release);
            for cond in shared.wakers.lock().iter() {
                cond.notify_all();
            }
        }
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.shared.as_ref().is_some_and(|shared| shared.triggered.load(Ordering::Acquire))
    }

    pub fn reset(&self) {
        if let Some(shared) = &self.shared {
            shared.triggered.store(false, Ordering::Release);
        }
    }

    /// Number of condvars currently registered for wake-up.
    pub fn waiters(&self) -> usize {
        self.shared.as_ref().map_or(0, |shared| shared.wakers.lock().len())
    }

    /// Put `cond` on the wake list for as long as the returned guard lives.
    /// `None` for an unarmed token.
    pub(crate) fn register(&self, cond: &Arc<Condvar>) -> Option<Registration<'_>> {
        let shared = self.shared.as_deref()?;
        shared.wakers.lock().push(cond.clone());
        Some(Registration { shared, cond: cond.clone() })
    }
}
