/*!
 * Backing Store
 * Simulated physical memory with injected byte faults
 */

use crate::core::types::{Offset, Size};
use log::{debug, info, warn};
use rand::Rng;
use std::ops::Range;

/// State of one backing-store byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteState {
    /// Usable and unassigned
    Free,
    /// Fault-injected, never assignable; immutable once set
    Bad,
    /// Currently backing a live allocation
    Claimed,
}

/// Fixed-length byte region standing in for physical memory
///
/// Bad bytes model hardware faults: they are marked once at startup and
/// never change state again. Claimed/free transitions happen only through
/// the block allocator, which owns the store after construction.
#[derive(Debug, Clone)]
pub struct BackingStore {
    bytes: Vec<ByteState>,
}

impl BackingStore {
    pub fn new(capacity: Size) -> Self {
        info!("Backing store initialized with {} bytes", capacity);
        Self {
            bytes: vec![ByteState::Free; capacity],
        }
    }

    pub fn capacity(&self) -> Size {
        self.bytes.len()
    }

    /// Inject `count` faults at positions sampled uniformly with replacement
    ///
    /// Duplicate samples collapse onto the same byte, so the number of
    /// distinct bad bytes may be lower than `count`. This models clustered,
    /// unpredictable hardware faults rather than an exact fault budget.
    pub fn mark_bad<R: Rng>(&mut self, count: usize, rng: &mut R) {
        if self.bytes.is_empty() {
            warn!("Fault injection skipped: backing store is empty");
            return;
        }
        for _ in 0..count {
            let offset = rng.gen_range(0..self.bytes.len());
            self.bytes[offset] = ByteState::Bad;
        }
        info!(
            "Injected {} fault samples ({} distinct bad bytes over {} total)",
            count,
            self.bad_bytes(),
            self.bytes.len()
        );
    }

    /// Inject faults at explicit positions, for deterministic layouts
    pub fn mark_bad_at<I: IntoIterator<Item = Offset>>(&mut self, offsets: I) {
        for offset in offsets {
            match self.bytes.get_mut(offset) {
                Some(state) => *state = ByteState::Bad,
                None => warn!(
                    "Ignored fault injection at offset {} beyond capacity {}",
                    offset,
                    self.bytes.len()
                ),
            }
        }
    }

    /// Whether the byte at `offset` can ever hold data
    ///
    /// Pure query: `false` for bad bytes and for offsets out of bounds,
    /// `true` otherwise (claimed bytes are usable, just not available).
    pub fn is_usable(&self, offset: Offset) -> bool {
        matches!(
            self.bytes.get(offset),
            Some(ByteState::Free) | Some(ByteState::Claimed)
        )
    }

    /// State of the byte at `offset`, if in bounds
    pub fn state(&self, offset: Offset) -> Option<ByteState> {
        self.bytes.get(offset).copied()
    }

    /// Number of distinct bad bytes
    pub fn bad_bytes(&self) -> usize {
        self.bytes.iter().filter(|s| **s == ByteState::Bad).count()
    }

    /// Number of bytes currently backing live allocations
    pub fn claimed_bytes(&self) -> usize {
        self.bytes
            .iter()
            .filter(|s| **s == ByteState::Claimed)
            .count()
    }

    /// Find the first run of `len` consecutive free bytes, scanning from 0
    ///
    /// A single bad or claimed byte resets the run; the scan resumes at the
    /// next offset. Pure query.
    pub fn find_free_run(&self, len: Size) -> Option<Offset> {
        if len == 0 || len > self.bytes.len() {
            return None;
        }
        let mut run_start = 0;
        for (offset, state) in self.bytes.iter().enumerate() {
            if *state != ByteState::Free {
                run_start = offset + 1;
            } else if offset + 1 - run_start == len {
                return Some(run_start);
            }
        }
        None
    }

    /// Mark a contiguous run claimed
    ///
    /// Caller guarantees the range is in bounds and entirely free.
    pub(crate) fn claim(&mut self, range: Range<Offset>) {
        debug_assert!(range.end <= self.bytes.len());
        debug_assert!(self.bytes[range.clone()]
            .iter()
            .all(|s| *s == ByteState::Free));
        debug!("Claiming bytes {}..{}", range.start, range.end);
        for state in &mut self.bytes[range] {
            *state = ByteState::Claimed;
        }
    }

    /// Return a claimed run to the free state
    ///
    /// Only claimed bytes flip back to free; a bad byte inside the range
    /// stays bad for the process lifetime.
    pub(crate) fn release(&mut self, range: Range<Offset>) {
        debug_assert!(range.end <= self.bytes.len());
        debug!("Releasing bytes {}..{}", range.start, range.end);
        for state in &mut self.bytes[range] {
            if *state == ByteState::Claimed {
                *state = ByteState::Free;
            }
        }
    }
}
