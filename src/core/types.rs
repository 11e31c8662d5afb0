/*!
 * Core Types
 * Common types used across the simulator
 */

/// Byte offset into the backing store
pub type Offset = usize;

/// Size type for memory operations
pub type Size = usize;

/// Slot index into the block metadata arena
pub type BlockIndex = usize;

/// Slot reuse counter, bumped every time a metadata slot is recycled
pub type Generation = u64;
