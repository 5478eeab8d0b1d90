//! Out-of-record storage for variable-length data.
//!
//! When a variable-length value is serialized into a tuple slot without
//! inlining, the slot receives a [`VarlenHandle`] and the bytes themselves
//! land in a [`VarlenPool`]. The pool owns raw bytes only; it never owns a
//! [`Value`](crate::datum::Value).
//!
//! ```text
//! tuple slot (8 bytes)          pool block
//! +--------------------+        +-------------+------------------+
//! | handle (u64, LE)   | -----> | len (i32)   | bytes[len]       |
//! +--------------------+        +-------------+------------------+
//! ```
//!
//! A zero handle in a slot encodes NULL and has no block behind it.
//!
//! Allocation takes `&self`, so any number of values can borrow blocks of one
//! pool at the same time (for example every varlen column of a tuple being
//! replayed from a byte stream). Releasing blocks takes `&mut self`, so it can
//! only happen once no value borrows from the pool any more.

mod memory;

use std::num::NonZeroU64;

use crate::datum::ValueError;

pub use memory::MemoryVarlenPool;

/// Reference to a block allocated from a [`VarlenPool`].
///
/// Handles are never zero, so the zero word is free to encode NULL in tuple
/// storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarlenHandle(NonZeroU64);

impl VarlenHandle {
    /// Size of a serialized handle in a tuple slot.
    pub const SIZE: usize = 8;

    /// Creates a handle from its raw representation, or `None` for zero.
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw representation written into tuple slots.
    pub const fn to_raw(self) -> u64 {
        self.0.get()
    }
}

/// Allocator for variable-length bytes that live outside the tuple.
///
/// Blocks are written once at allocation and immutable afterwards.
pub trait VarlenPool {
    /// Allocates a block holding a copy of `data`.
    ///
    /// Returns the handle and the block contents, which stay valid for as
    /// long as the pool is borrowed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::PoolExhausted` if the pool cannot hold the block.
    fn allocate(&self, data: &[u8]) -> Result<(VarlenHandle, &[u8]), ValueError>;

    /// Returns the block behind `handle`, or `None` if it is not allocated.
    fn get(&self, handle: VarlenHandle) -> Option<&[u8]>;

    /// Releases the block behind `handle`.
    ///
    /// Returns false if the handle was not allocated.
    fn free(&mut self, handle: VarlenHandle) -> bool;

    /// Releases every block.
    fn clear(&mut self);
}
