/*!
 * Block Allocator
 *
 * First-fit allocator over a fault-injected backing store.
 *
 * ## Allocation strategy
 *
 * Every request goes through two independent phases:
 * - **Logical**: walk the block metadata list from the head in link order
 *   and take the first free block with room for the payload plus one
 *   header charge (first-fit; cheap bookkeeping over best-fit's extra
 *   scan, at the cost of worse long-run fragmentation).
 * - **Physical**: scan the backing store from offset 0 for the first run
 *   of contiguous bytes that are neither bad nor claimed and long enough
 *   for the payload.
 *
 * Both phases are pure queries; the list and the store are only mutated
 * once both succeed, so every failure leaves state untouched.
 *
 * ## Fragmentation control
 *
 * Freeing a block merges it with free list-neighbors (predecessor first,
 * then successor). There is no compaction pass; coalescing is the only
 * mechanism.
 */

mod allocator;
mod arena;

pub use arena::BLOCK_HEADER_COST;

use super::store::BackingStore;
use super::traits::{Allocator, Introspect};
use super::types::{AllocResult, AllocStats, BlockInfo, Handle};
use crate::core::limits::DEFAULT_ARENA_CAPACITY;
use crate::core::types::{Offset, Size};
use arena::{BlockArena, Resolution};
use log::info;

/// Single-writer allocator owning both the metadata arena and the store
///
/// Taking the store by value enforces the fault-injection contract: bad
/// bytes are marked before construction and nothing can mark more later.
#[derive(Debug)]
pub struct BlockAllocator {
    arena: BlockArena,
    store: BackingStore,
}

impl BlockAllocator {
    /// Create an allocator with the default metadata arena capacity
    pub fn new(store: BackingStore) -> Self {
        Self::with_arena_capacity(store, DEFAULT_ARENA_CAPACITY)
    }

    /// Create an allocator with a custom arena capacity (useful for testing)
    pub fn with_arena_capacity(store: BackingStore, arena_capacity: Size) -> Self {
        info!(
            "Block allocator initialized: {} byte metadata arena over a {} byte store ({} bad bytes)",
            arena_capacity,
            store.capacity(),
            store.bad_bytes()
        );
        Self {
            arena: BlockArena::new(arena_capacity),
            store,
        }
    }

    /// Read-only view of the backing store
    pub fn store(&self) -> &BackingStore {
        &self.store
    }

    /// Whether `handle` refers to a live allocation
    pub fn is_valid(&self, handle: Handle) -> bool {
        matches!(self.arena.resolve(handle), Resolution::Live(_))
    }

    /// Payload size behind a live handle
    pub fn block_size(&self, handle: Handle) -> Option<Size> {
        match self.arena.resolve(handle) {
            Resolution::Live(index) => Some(self.arena.placement(index).0),
            _ => None,
        }
    }

    /// Claimed-run start behind a live handle
    pub fn block_offset(&self, handle: Handle) -> Option<Offset> {
        match self.arena.resolve(handle) {
            Resolution::Live(index) => Some(self.arena.placement(index).1),
            _ => None,
        }
    }

    /// Enumerate metadata blocks in list order
    pub fn dump(&self) -> Vec<BlockInfo> {
        self.arena.dump()
    }

    /// Allocator-wide statistics
    pub fn stats(&self) -> AllocStats {
        let dump = self.arena.dump();
        let block_count = dump.len();
        let free_blocks = dump.iter().filter(|b| b.free).count();
        let free_bytes = self.arena.free_bytes();
        let used_bytes = self.arena.used_bytes();
        let header_overhead = block_count * BLOCK_HEADER_COST;
        AllocStats {
            arena_capacity: self.arena.capacity(),
            free_bytes,
            used_bytes,
            header_overhead,
            block_count,
            free_blocks,
            store_capacity: self.store.capacity(),
            bad_bytes: self.store.bad_bytes(),
            claimed_bytes: self.store.claimed_bytes(),
            usage_percentage: (used_bytes + header_overhead) as f64
                / self.arena.capacity() as f64
                * 100.0,
        }
    }
}

// Implement trait interfaces
impl Allocator for BlockAllocator {
    fn allocate(&mut self, size: Size) -> AllocResult<Handle> {
        BlockAllocator::allocate(self, size)
    }

    fn free(&mut self, handle: Handle) -> AllocResult<()> {
        BlockAllocator::free(self, handle)
    }

    fn is_valid(&self, handle: Handle) -> bool {
        BlockAllocator::is_valid(self, handle)
    }

    fn block_size(&self, handle: Handle) -> Option<Size> {
        BlockAllocator::block_size(self, handle)
    }
}

impl Introspect for BlockAllocator {
    fn dump(&self) -> Vec<BlockInfo> {
        BlockAllocator::dump(self)
    }

    fn stats(&self) -> AllocStats {
        BlockAllocator::stats(self)
    }
}
