//! # boundq
//!
//! A fixed-capacity FIFO queue of scalar values shared between producer and
//! consumer threads.
//!
//! The storage ([`buffer`]) does no locking. Thread safety and blocking come
//! from a [`SyncPolicy`] wrapped around it:
//!
//! - [`MonitorPolicy`] - one condition variable, broadcast wake
//! - [`SemaphorePolicy`] - free/used slot semaphores
//! - [`ConditionPairPolicy`] - `not_full`/`not_empty`, single wake
//! - [`AdmissionLimitPolicy`] - fail-fast cap on concurrent callers
//!
//! ```rust
//! use boundq::{ PolicyKind, QueueConfig };
//!
//! let queue = QueueConfig::new(5)?.with_policy(PolicyKind::Semaphore).build()?;
//! queue.insert(1)?;
//! assert_eq!(queue.retrieve()?, 1);
//! # Ok::<(), boundq::QueueError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod insights;
pub mod interrupt;
pub mod metrics;
pub mod policy;
pub mod semaphore;

pub use buffer::{ BoundedBuffer, RingBuffer, SlotRingBuffer, Value };
pub use config::{ PolicyKind, QueueConfig, StorageKind };
pub use error::{ QueueError, Result };
pub use interrupt::{ Interrupt, Interrupted };
pub use metrics::{ Metrics, MetricsSnapshot };
pub use policy::{
    AdmissionLimitPolicy,
    ConditionPairPolicy,
    MonitorPolicy,
    Role,
    SemaphorePolicy,
    SyncPolicy,
};
pub use semaphore::{ Permit, Semaphore };
