/*!
 * Memory Types
 * Common types for the fault-aware allocator
 */

use crate::core::types::{BlockIndex, Generation, Offset, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allocator operation result
pub type AllocResult<T> = Result<T, AllocError>;

/// Allocator errors
///
/// All variants are recoverable values reported to the caller; the
/// allocator never panics and never leaves a partial mutation behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("invalid allocation request: {0} bytes")]
    InvalidArgument(Size),

    #[error("out of metadata: requested {requested} bytes, largest free block covers {largest_free} bytes")]
    OutOfMetadata { requested: Size, largest_free: Size },

    #[error("no usable region: no fault-free unclaimed run of {requested} contiguous bytes in the backing store")]
    NoUsableRegion { requested: Size },

    #[error("invalid handle: slot {index} generation {generation} was never issued by this allocator")]
    InvalidHandle {
        index: BlockIndex,
        generation: Generation,
    },
}

/// Opaque reference to a live allocation
///
/// A handle maps back to exactly one metadata block and, through it, one
/// claimed byte run in the backing store. The generation detects slots
/// that were merged away and later reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub(crate) index: BlockIndex,
    pub(crate) generation: Generation,
}

impl Handle {
    /// Null handle; freeing it is a no-op
    pub const NULL: Handle = Handle {
        index: BlockIndex::MAX,
        generation: 0,
    };

    pub fn is_null(&self) -> bool {
        self.index == BlockIndex::MAX
    }
}

/// One entry of a block-list dump, in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub size: Size,
    pub free: bool,
    /// Claimed-run start in the backing store; `None` for free blocks
    pub offset: Option<Offset>,
}

/// Allocator statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocStats {
    pub arena_capacity: Size,
    pub free_bytes: Size,
    pub used_bytes: Size,
    pub header_overhead: Size,
    pub block_count: usize,
    pub free_blocks: usize,
    pub store_capacity: Size,
    pub bad_bytes: usize,
    pub claimed_bytes: usize,
    pub usage_percentage: f64,
}
