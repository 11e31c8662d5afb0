/*!
 * Block Arena
 * Index-linked block metadata list with first-fit search and coalescing
 */

use super::super::types::{BlockInfo, Handle};
use crate::core::types::{BlockIndex, Generation, Offset, Size};
use log::debug;

/// Metadata charge per block record, counted against the arena capacity
/// exactly like payload bytes
pub const BLOCK_HEADER_COST: Size = 24;

/// Block metadata record
///
/// `next` is a slot index rather than a pointer, so links stay valid while
/// slots are recycled and bounds checks are explicit.
#[derive(Debug, Clone)]
pub(super) struct Block {
    pub size: Size,
    pub free: bool,
    pub next: Option<BlockIndex>,
    /// Claimed-run start in the backing store while the block is live
    pub offset: Option<Offset>,
    pub generation: Generation,
}

/// Outcome of mapping a handle back onto the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Resolution {
    /// Handle refers to a live, used block
    Live(BlockIndex),
    /// Handle was issued but its block is already free or merged away
    Stale,
    /// Handle was never issued by this arena
    NeverIssued,
}

/// Fixed-capacity arena of block records forming one linked list
///
/// The list is rooted at a permanent head block that holds the remaining
/// unassigned capacity. Allocations carve used blocks out of a free
/// candidate and link them directly after the head; frees merge adjacent
/// free records back together. Invariant: the sum of all block sizes plus
/// one header charge per block always equals the arena capacity.
#[derive(Debug, Clone)]
pub(super) struct BlockArena {
    blocks: Vec<Block>,
    recycled: Vec<BlockIndex>,
    capacity: Size,
}

/// Head block slot; created once and never merged away
const HEAD: BlockIndex = 0;

impl BlockArena {
    /// Create the arena with a single free head block spanning `capacity`
    ///
    /// Panics when `capacity` cannot cover the head's own header charge;
    /// every derived figure, including the usage percentage, relies on a
    /// non-zero capacity.
    pub fn new(capacity: Size) -> Self {
        assert!(
            capacity >= BLOCK_HEADER_COST,
            "arena capacity {} cannot cover the {} byte head record",
            capacity,
            BLOCK_HEADER_COST
        );
        Self {
            blocks: vec![Block {
                size: capacity - BLOCK_HEADER_COST,
                free: true,
                next: None,
                offset: None,
                generation: 0,
            }],
            recycled: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> Size {
        self.capacity
    }

    /// Walk the list from the head in link order
    fn iter(&self) -> ListIter<'_> {
        ListIter {
            arena: self,
            cursor: Some(HEAD),
        }
    }

    /// First free block able to hold `request` payload bytes plus the
    /// header charge of the record carved out for them
    pub fn first_fit(&self, request: Size) -> Option<BlockIndex> {
        self.iter()
            .find(|(_, block)| block.free && block.size >= request + BLOCK_HEADER_COST)
            .map(|(index, _)| index)
    }

    /// Largest free capacity currently on the list, for error reporting
    pub fn largest_free(&self) -> Size {
        self.iter()
            .filter(|(_, block)| block.free)
            .map(|(_, block)| block.size)
            .max()
            .unwrap_or(0)
    }

    /// Carve a used block for `request` bytes out of `candidate` and link
    /// it directly after the head
    ///
    /// Caller guarantees `candidate` came from `first_fit(request)`. An
    /// exact fit shrinks the candidate to a zero-size free record: it can
    /// satisfy no further request, keeps the conservation invariant, and
    /// is absorbed by the next merge with a free neighbor.
    pub fn carve(&mut self, candidate: BlockIndex, request: Size, offset: Offset) -> Handle {
        self.blocks[candidate].size -= request + BLOCK_HEADER_COST;

        let next = self.blocks[HEAD].next;
        let index = self.new_slot(Block {
            size: request,
            free: false,
            next,
            offset: Some(offset),
            generation: 0, // overwritten by new_slot for recycled slots
        });
        self.blocks[HEAD].next = Some(index);

        debug!(
            "Carved block {} ({} bytes at store offset {}) from candidate {}",
            index, request, offset, candidate
        );
        Handle {
            index,
            generation: self.blocks[index].generation,
        }
    }

    /// Map a handle onto the arena
    pub fn resolve(&self, handle: Handle) -> Resolution {
        let Some(block) = self.blocks.get(handle.index) else {
            return Resolution::NeverIssued;
        };
        if handle.generation > block.generation {
            return Resolution::NeverIssued;
        }
        if handle.generation < block.generation {
            return Resolution::Stale;
        }
        // Retired slots are marked free before release, so a matching
        // generation with a free block is a freed-but-unmerged record
        if block.free {
            Resolution::Stale
        } else {
            Resolution::Live(handle.index)
        }
    }

    /// Payload size and claimed-run offset of a live block
    pub fn placement(&self, index: BlockIndex) -> (Size, Offset) {
        let block = &self.blocks[index];
        debug_assert!(!block.free);
        (
            block.size,
            block.offset.expect("live block always carries its offset"),
        )
    }

    /// Mark a used block free and drop its store placement
    pub fn mark_free(&mut self, index: BlockIndex) {
        let block = &mut self.blocks[index];
        block.free = true;
        block.offset = None;
    }

    /// Merge `target` with free list-neighbors
    ///
    /// The predecessor absorbs the target's size plus the reclaimed header
    /// charge; then, independently, a free successor is absorbed by the
    /// survivor. All three records may collapse into one.
    pub fn coalesce(&mut self, target: BlockIndex) {
        debug_assert!(self.blocks[target].free);
        let mut survivor = target;

        if let Some(pred) = self.predecessor(target) {
            if self.blocks[pred].free {
                self.blocks[pred].size += self.blocks[target].size + BLOCK_HEADER_COST;
                self.blocks[pred].next = self.blocks[target].next;
                self.release_slot(target);
                debug!("Merged block {} into predecessor {}", target, pred);
                survivor = pred;
            }
        }

        if let Some(succ) = self.blocks[survivor].next {
            if self.blocks[succ].free {
                self.blocks[survivor].size += self.blocks[succ].size + BLOCK_HEADER_COST;
                self.blocks[survivor].next = self.blocks[succ].next;
                self.release_slot(succ);
                debug!("Merged successor {} into block {}", succ, survivor);
            }
        }
    }

    /// Enumerate blocks in list order
    pub fn dump(&self) -> Vec<BlockInfo> {
        self.iter()
            .map(|(_, block)| BlockInfo {
                size: block.size,
                free: block.free,
                offset: block.offset,
            })
            .collect()
    }

    /// Number of blocks on the list
    pub fn block_count(&self) -> usize {
        self.iter().count()
    }

    pub fn free_bytes(&self) -> Size {
        self.iter()
            .filter(|(_, block)| block.free)
            .map(|(_, block)| block.size)
            .sum()
    }

    pub fn used_bytes(&self) -> Size {
        self.iter()
            .filter(|(_, block)| !block.free)
            .map(|(_, block)| block.size)
            .sum()
    }

    /// Block directly before `target` in list order
    fn predecessor(&self, target: BlockIndex) -> Option<BlockIndex> {
        self.iter()
            .find(|(_, block)| block.next == Some(target))
            .map(|(index, _)| index)
    }

    /// Install a record, reusing a recycled slot when one exists
    ///
    /// Recycled slots keep their bumped generation so handles into the
    /// previous incarnation resolve as stale.
    fn new_slot(&mut self, block: Block) -> BlockIndex {
        match self.recycled.pop() {
            Some(index) => {
                let generation = self.blocks[index].generation;
                self.blocks[index] = Block {
                    generation,
                    ..block
                };
                index
            }
            None => {
                self.blocks.push(block);
                self.blocks.len() - 1
            }
        }
    }

    /// Retire a merged-away record; its slot becomes reusable
    fn release_slot(&mut self, index: BlockIndex) {
        debug_assert!(index != HEAD);
        self.blocks[index].generation += 1;
        self.recycled.push(index);
    }
}

struct ListIter<'a> {
    arena: &'a BlockArena,
    cursor: Option<BlockIndex>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = (BlockIndex, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let arena = self.arena;
        let block = &arena.blocks[index];
        self.cursor = block.next;
        Some((index, block))
    }
}
