/*!
 * Core Module
 * Shared types and simulation-wide limits
 */

pub mod limits;
pub mod types;

// Re-export for convenience
pub use types::*;
