/*!
 * Memory Traits
 * Allocator and introspection seams
 */

use super::types::*;
use crate::core::types::Size;

/// Allocator interface
pub trait Allocator {
    /// Allocate a run of `size` usable bytes
    fn allocate(&mut self, size: Size) -> AllocResult<Handle>;

    /// Release a previous allocation; null and repeated frees are no-ops
    fn free(&mut self, handle: Handle) -> AllocResult<()>;

    /// Check whether a handle refers to a live allocation
    fn is_valid(&self, handle: Handle) -> bool;

    /// Get the payload size behind a live handle
    fn block_size(&self, handle: Handle) -> Option<Size>;
}

/// Read-only diagnostics provider
pub trait Introspect {
    /// Enumerate metadata blocks in list order
    fn dump(&self) -> Vec<BlockInfo>;

    /// Get allocator-wide statistics
    fn stats(&self) -> AllocStats;
}
