/*!
 * Memory Module
 * Backing store simulation and fault-aware block allocation
 */

pub mod manager;
pub mod store;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use manager::{BlockAllocator, BLOCK_HEADER_COST};
pub use store::{BackingStore, ByteState};
pub use traits::*;
pub use types::*;
