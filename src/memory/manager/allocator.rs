/*!
 * Allocation and Release Logic
 * Two-phase search, atomic commit, and coalescing on free
 */

use super::arena::{Resolution, BLOCK_HEADER_COST};
use super::BlockAllocator;
use crate::core::types::Size;
use crate::memory::types::{AllocError, AllocResult, Handle};
use log::{debug, info, warn};

impl BlockAllocator {
    /// Allocate a run of `size` usable bytes
    ///
    /// Fails with `InvalidArgument` for zero-sized requests, `OutOfMetadata`
    /// when no free block can cover the payload plus its header charge, and
    /// `NoUsableRegion` when the store holds no fault-free unclaimed run of
    /// the requested length. Failures mutate nothing.
    pub fn allocate(&mut self, size: Size) -> AllocResult<Handle> {
        if size == 0 {
            warn!("Rejected zero-sized allocation request");
            return Err(AllocError::InvalidArgument(size));
        }

        // Phase 1: first-fit over the block list, head first
        let Some(candidate) = self.arena.first_fit(size) else {
            let largest_free = self.arena.largest_free();
            warn!(
                "Out of metadata: requested {} bytes (+{} header), largest free block covers {} bytes",
                size, BLOCK_HEADER_COST, largest_free
            );
            return Err(AllocError::OutOfMetadata {
                requested: size,
                largest_free,
            });
        };

        // Phase 2: physical scan, independent of the candidate
        let Some(offset) = self.store.find_free_run(size) else {
            warn!(
                "No usable region: no fault-free unclaimed run of {} bytes in {} byte store",
                size,
                self.store.capacity()
            );
            return Err(AllocError::NoUsableRegion { requested: size });
        };

        // Commit both sides together
        self.store.claim(offset..offset + size);
        let handle = self.arena.carve(candidate, size, offset);

        info!(
            "Allocated {} bytes at store offset {} (block {}, generation {})",
            size, offset, handle.index, handle.generation
        );
        Ok(handle)
    }

    /// Release an allocation and merge adjacent free metadata blocks
    ///
    /// The null handle, an already-freed handle, and a handle whose block
    /// was merged away are all benign no-ops. A handle this allocator never
    /// issued is `InvalidHandle`.
    pub fn free(&mut self, handle: Handle) -> AllocResult<()> {
        if handle.is_null() {
            debug!("Free of null handle ignored");
            return Ok(());
        }

        let index = match self.arena.resolve(handle) {
            Resolution::Live(index) => index,
            Resolution::Stale => {
                debug!(
                    "Repeated free of block {} generation {} ignored",
                    handle.index, handle.generation
                );
                return Ok(());
            }
            Resolution::NeverIssued => {
                warn!(
                    "Rejected free of unknown handle (slot {}, generation {})",
                    handle.index, handle.generation
                );
                return Err(AllocError::InvalidHandle {
                    index: handle.index,
                    generation: handle.generation,
                });
            }
        };

        let (size, offset) = self.arena.placement(index);
        self.store.release(offset..offset + size);
        self.arena.mark_free(index);
        self.arena.coalesce(index);

        info!(
            "Freed {} bytes at store offset {} ({} blocks remain on the list)",
            size,
            offset,
            self.arena.block_count()
        );
        Ok(())
    }
}
