/*!
 * Faultmem Library
 * User-space simulation of a dynamic allocator over unreliable memory
 */

pub mod core;
pub mod memory;

// Re-exports
pub use memory::{
    AllocError, AllocResult, AllocStats, Allocator, BackingStore, BlockAllocator, BlockInfo,
    ByteState, Handle, Introspect, BLOCK_HEADER_COST,
};
