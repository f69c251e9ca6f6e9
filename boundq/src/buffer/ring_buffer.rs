//! RingBuffer - fixed-capacity circular FIFO
//!
//! `oldest` points at the next element to retrieve, `newest` at the next free
//! slot. Both advance modulo capacity. Fullness is decided by `count`, so every
//! slot is usable and no sentinel slot is sacrificed.

use crate::buffer::{ BoundedBuffer, Value };
use crate::error::{ QueueError, Result };

pub struct RingBuffer {
    slots: Box<[Value]>,
    oldest: usize,
    newest: usize,
    count: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity });
        }

        Ok(Self {
            slots: vec![0; capacity].into_boxed_slice(),
            oldest: 0,
            newest: 0,
            count: 0,
        })
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }
}

impl BoundedBuffer for RingBuffer {
    #[inline]
    fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    #[inline]
    fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn count(&self) -> usize {
        self.count
    }

    fn insert(&mut self, value: Value) {
        assert!(!self.is_full(), "insert into full ring buffer (capacity {})", self.slots.len());

        self.slots[self.newest] = value;
        self.newest = self.advance(self.newest);
        self.count += 1;
    }

    fn retrieve(&mut self) -> Value {
        assert!(!self.is_empty(), "retrieve from empty ring buffer");

        let value = self.slots[self.oldest];
        self.oldest = self.advance(self.oldest);
        self.count -= 1;
        value
    }
}
