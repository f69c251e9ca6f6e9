//! SlotRingBuffer - per-slot status tags
//!
//! Every slot is either `Empty` or `Occupied`. Insert claims the first `Empty`
//! slot and retrieve drains the first `Occupied` slot, both scanning in
//! increasing index order from their own cursor and wrapping at the end.
//!
//! Scanning from index 0 every time would hand out a recycled low slot ahead of
//! older elements further right. Starting each scan where the previous one of
//! the same direction stopped keeps arrival order, so this buffer is
//! observably identical to [`RingBuffer`](super::RingBuffer).

use crate::buffer::{ BoundedBuffer, Value };
use crate::error::{ QueueError, Result };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Occupied(Value),
}

pub struct SlotRingBuffer {
    slots: Box<[Slot]>,
    insert_cursor: usize,
    retrieve_cursor: usize,
    count: usize,
}

impl SlotRingBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity });
        }

        Ok(Self {
            slots: vec![Slot::Empty; capacity].into_boxed_slice(),
            insert_cursor: 0,
            retrieve_cursor: 0,
            count: 0,
        })
    }

    /// First index at or after `from` (wrapping) whose slot matches `wanted`.
    fn find(&self, from: usize, wanted: impl Fn(&Slot) -> bool) -> Option<usize> {
        let len = self.slots.len();
        (0..len).map(|offset| (from + offset) % len).find(|&idx| wanted(&self.slots[idx]))
    }
}

impl BoundedBuffer for SlotRingBuffer {
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
        assert!(!self.is_full(), "insert into full slot buffer (capacity {})", self.slots.len());

        let idx = self
            .find(self.insert_cursor, |slot| *slot == Slot::Empty)
            .unwrap_or_else(|| unreachable!("count below capacity but no empty slot"));

        self.slots[idx] = Slot::Occupied(value);
        self.insert_cursor = (idx + 1) % self.slots.len();
        self.count += 1;
    }

    fn retrieve(&mut self) -> Value {
        assert!(!self.is_empty(), "retrieve from empty slot buffer");

        let idx = self
            .find(self.retrieve_cursor, |slot| matches!(slot, Slot::Occupied(_)))
            .unwrap_or_else(|| unreachable!("count above zero but no occupied slot"));

        let Slot::Occupied(value) = std::mem::replace(&mut self.slots[idx], Slot::Empty) else {
            unreachable!("slot {idx} was just found occupied");
        };
        self.retrieve_cursor = (idx + 1) % self.slots.len();
        self.count -= 1;
        value
    }
}
