//! Unsynchronized bounded FIFO storage.
//!
//! - `RingBuffer` - oldest/newest indices plus an explicit count
//! - `SlotRingBuffer` - per-slot `Empty`/`Occupied` tags, scanned in index order
//!
//! Neither type locks. Callers that share a buffer between threads wrap it in a
//! [`SyncPolicy`](crate::policy::SyncPolicy), which is responsible for never
//! inserting into a full buffer or retrieving from an empty one.

pub mod ring_buffer;
pub mod slot_ring_buffer;

pub use ring_buffer::RingBuffer;
pub use slot_ring_buffer::SlotRingBuffer;

/// Element stored in the queue
pub type Value = i32;

/// Storage contract shared by every buffer representation.
///
/// `insert` on a full buffer and `retrieve` on an empty one are programming
/// errors in the caller and panic.
pub trait BoundedBuffer: Send {
    fn is_empty(&self) -> bool;

    fn is_full(&self) -> bool;

    /// Fixed capacity
    fn size(&self) -> usize;

    /// Live element count
    fn count(&self) -> usize;

    /// Append `value` as the newest element.
    fn insert(&mut self, value: Value);

    /// Remove and return the oldest element.
    fn retrieve(&mut self) -> Value;
}
