/*!
 * Simulation Limits
 * Startup-time defaults for the backing store and metadata arena
 */

use super::types::Size;

/// Default backing store capacity: 1 MiB of simulated physical memory
pub const DEFAULT_STORE_CAPACITY: Size = 1024 * 1024;

/// Default number of fault-injection samples drawn at startup
pub const DEFAULT_FAULT_COUNT: usize = 1000;

/// Default metadata arena capacity in bytes
pub const DEFAULT_ARENA_CAPACITY: Size = 256;
