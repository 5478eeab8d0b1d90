//! In-memory varlen pool.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{VarlenHandle, VarlenPool};
use crate::datum::ValueError;

/// Heap-backed [`VarlenPool`].
///
/// Every block is a separate boxed slice keyed by its handle. Handles are
/// never reused within one pool, so a stale handle is always detected as
/// dangling rather than aliasing a newer block.
///
/// NOTE: For production, consider adding:
/// - Size-class free lists to avoid one heap allocation per block
/// - Reference counts so shallow-copied slots can share a block
#[derive(Debug)]
pub struct MemoryVarlenPool {
    inner: Mutex<Blocks>,
    /// Optional bound on live bytes (for testing exhaustion)
    max_bytes: Option<usize>,
}

#[derive(Debug)]
struct Blocks {
    /// handle -> block bytes
    map: FxHashMap<u64, Box<[u8]>>,
    /// Next handle to hand out (never zero)
    next_handle: u64,
    /// Sum of live block sizes
    allocated_bytes: usize,
}

impl MemoryVarlenPool {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Blocks {
                map: FxHashMap::default(),
                next_handle: 1,
                allocated_bytes: 0,
            }),
            max_bytes: None,
        }
    }

    /// Creates a pool that refuses allocations beyond `max_bytes` live bytes.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            ..Self::new()
        }
    }

    /// Returns the number of live bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.lock().allocated_bytes
    }

    /// Returns the number of live blocks.
    pub fn block_count(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Extends a block borrow from the lock guard to `&self`.
    fn detach<'p>(&'p self, block: &[u8]) -> &'p [u8] {
        // SAFETY: the slice points into a boxed block, whose heap storage
        // does not move when the map rehashes. Blocks are never written after
        // allocation and are only dropped by `free`/`clear`, which take
        // `&mut self` and so cannot run while a returned slice borrows `self`.
        unsafe { std::slice::from_raw_parts(block.as_ptr(), block.len()) }
    }
}

impl Default for MemoryVarlenPool {
    fn default() -> Self {
        Self::new()
    }
}

impl VarlenPool for MemoryVarlenPool {
    fn allocate(&self, data: &[u8]) -> Result<(VarlenHandle, &[u8]), ValueError> {
        let size = data.len();
        let mut inner = self.inner.lock();
        if let Some(max) = self.max_bytes
            && inner.allocated_bytes + size > max
        {
            return Err(ValueError::PoolExhausted {
                requested: size,
                available: max - inner.allocated_bytes,
            });
        }

        let raw = inner.next_handle;
        let handle = VarlenHandle::from_raw(raw).ok_or_else(|| {
            ValueError::InvalidFormat("varlen pool handle space exhausted".to_string())
        })?;
        inner.next_handle = raw.wrapping_add(1);
        inner.allocated_bytes += size;
        tracing::trace!(handle = raw, size, "varlen pool allocate");

        let block = inner.map.entry(raw).or_insert_with(|| Box::from(data));
        Ok((handle, self.detach(&block[..])))
    }

    fn get(&self, handle: VarlenHandle) -> Option<&[u8]> {
        let inner = self.inner.lock();
        inner.map.get(&handle.to_raw()).map(|block| self.detach(&block[..]))
    }

    fn free(&mut self, handle: VarlenHandle) -> bool {
        let inner = self.inner.get_mut();
        match inner.map.remove(&handle.to_raw()) {
            Some(block) => {
                inner.allocated_bytes -= block.len();
                tracing::trace!(handle = handle.to_raw(), size = block.len(), "varlen pool free");
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        tracing::trace!(blocks = inner.map.len(), bytes = inner.allocated_bytes, "varlen pool clear");
        inner.map.clear();
        inner.allocated_bytes = 0;
    }
}
