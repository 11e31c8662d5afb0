/*!
 * Block Allocator Tests
 * Placement, failure taxonomy, and free semantics
 */

use faultmem::{
    AllocError, BackingStore, BlockAllocator, ByteState, Handle, BLOCK_HEADER_COST,
};
use pretty_assertions::assert_eq;

/// The fixed fault layout used by the placement scenarios
const FAULTS: [usize; 10] = [3, 17, 40, 41, 42, 55, 70, 71, 72, 90];

fn scenario_allocator() -> BlockAllocator {
    let mut store = BackingStore::new(100);
    store.mark_bad_at(FAULTS);
    BlockAllocator::with_arena_capacity(store, 256)
}

#[test]
fn test_zero_size_rejected() {
    let mut allocator = scenario_allocator();
    assert_eq!(allocator.allocate(0), Err(AllocError::InvalidArgument(0)));
}

#[test]
fn test_first_fit_placement_avoids_faults() {
    let mut allocator = scenario_allocator();

    // The run 0..3 is cut short by the fault at 3, so the first five
    // contiguous usable bytes start at 4
    let first = allocator.allocate(5).unwrap();
    assert_eq!(allocator.block_offset(first), Some(4));
    assert_eq!(allocator.block_size(first), Some(5));

    // The next allocation lands directly behind the first claimed run
    let second = allocator.allocate(5).unwrap();
    assert_eq!(allocator.block_offset(second), Some(9));

    // First-fit reuses the earliest released region before extending
    allocator.free(first).unwrap();
    let third = allocator.allocate(5).unwrap();
    assert_eq!(allocator.block_offset(third), Some(4));
}

#[test]
fn test_claimed_range_state() {
    let mut allocator = scenario_allocator();
    let handle = allocator.allocate(5).unwrap();

    let offset = allocator.block_offset(handle).unwrap();
    for byte in offset..offset + 5 {
        assert_eq!(allocator.store().state(byte), Some(ByteState::Claimed));
        assert!(allocator.store().is_usable(byte));
    }
    assert_eq!(allocator.store().claimed_bytes(), 5);
}

#[test]
fn test_out_of_metadata_with_single_header_arena() {
    // Room for the head plus exactly one carved record
    let store = BackingStore::new(100);
    let mut allocator =
        BlockAllocator::with_arena_capacity(store, 2 * BLOCK_HEADER_COST + 1);

    allocator.allocate(1).unwrap();
    let result = allocator.allocate(1);
    assert_eq!(
        result,
        Err(AllocError::OutOfMetadata {
            requested: 1,
            largest_free: 0,
        })
    );
}

#[test]
#[should_panic(expected = "cannot cover")]
fn test_arena_smaller_than_head_record_is_rejected() {
    BlockAllocator::with_arena_capacity(BackingStore::new(100), BLOCK_HEADER_COST - 1);
}

#[test]
fn test_out_of_metadata_for_oversized_request() {
    let mut allocator = scenario_allocator();
    let result = allocator.allocate(10_000);
    assert!(matches!(result, Err(AllocError::OutOfMetadata { .. })));
}

#[test]
fn test_no_usable_region_is_distinct_failure() {
    // Entirely bad store except one byte; the metadata arena has plenty of room
    let mut store = BackingStore::new(10);
    store.mark_bad_at((0..10).filter(|offset| *offset != 7));
    let mut allocator = BlockAllocator::with_arena_capacity(store, 256);

    assert_eq!(
        allocator.allocate(2),
        Err(AllocError::NoUsableRegion { requested: 2 })
    );

    // The lone good byte still satisfies a single-byte request
    let handle = allocator.allocate(1).unwrap();
    assert_eq!(allocator.block_offset(handle), Some(7));
}

#[test]
fn test_failed_allocation_mutates_nothing() {
    let mut allocator = scenario_allocator();
    allocator.allocate(5).unwrap();

    let dump_before = allocator.dump();
    let stats_before = allocator.stats();

    // 100-byte store can never hold this run, but the arena has room
    assert!(allocator.allocate(120).is_err());

    assert_eq!(allocator.dump(), dump_before);
    assert_eq!(allocator.stats(), stats_before);
}

#[test]
fn test_round_trip_restores_state() {
    let mut allocator = scenario_allocator();
    let dump_before = allocator.dump();
    let stats_before = allocator.stats();

    let handle = allocator.allocate(12).unwrap();
    allocator.free(handle).unwrap();

    assert_eq!(allocator.dump(), dump_before);
    assert_eq!(allocator.stats(), stats_before);
    assert_eq!(allocator.store().claimed_bytes(), 0);
}

#[test]
fn test_free_null_handle_is_noop() {
    let mut allocator = scenario_allocator();
    let stats_before = allocator.stats();
    allocator.free(Handle::NULL).unwrap();
    assert_eq!(allocator.stats(), stats_before);
}

#[test]
fn test_double_free_is_idempotent() {
    let mut allocator = scenario_allocator();
    let keep = allocator.allocate(3).unwrap();
    let handle = allocator.allocate(5).unwrap();

    allocator.free(handle).unwrap();
    let dump_after_first = allocator.dump();
    let stats_after_first = allocator.stats();

    allocator.free(handle).unwrap();
    assert_eq!(allocator.dump(), dump_after_first);
    assert_eq!(allocator.stats(), stats_after_first);

    // The surviving allocation is untouched
    assert!(allocator.is_valid(keep));
    assert_eq!(allocator.block_size(keep), Some(3));
}

#[test]
fn test_double_free_after_slot_reuse_spares_new_owner() {
    let mut allocator = scenario_allocator();
    let first = allocator.allocate(5).unwrap();
    allocator.free(first).unwrap();

    // The freed record merged into the head and its slot was recycled here
    let second = allocator.allocate(5).unwrap();
    allocator.free(first).unwrap();

    assert!(allocator.is_valid(second));
    assert_eq!(allocator.block_size(second), Some(5));
}

#[test]
fn test_unknown_handle_is_rejected() {
    let mut allocator = scenario_allocator();
    allocator.allocate(5).unwrap();

    // A handle this allocator never issued, e.g. replayed from a dump of
    // another run; slot 999 does not exist in a fresh arena
    let forged: Handle = serde_json::from_str(r#"{"index":999,"generation":0}"#).unwrap();
    assert_eq!(
        allocator.free(forged),
        Err(AllocError::InvalidHandle {
            index: 999,
            generation: 0,
        })
    );
}

#[test]
fn test_dump_lists_blocks_in_list_order() {
    let mut allocator = scenario_allocator();
    allocator.allocate(5).unwrap();
    allocator.allocate(7).unwrap();

    let dump = allocator.dump();
    assert_eq!(dump.len(), 3);

    // Head first, then used blocks in most-recent-first order
    assert!(dump[0].free);
    assert_eq!(dump[1].size, 7);
    assert!(!dump[1].free);
    assert_eq!(dump[2].size, 5);
    assert!(!dump[2].free);
}

#[test]
fn test_stats_conservation() {
    let mut allocator = scenario_allocator();
    let a = allocator.allocate(5).unwrap();
    let b = allocator.allocate(9).unwrap();

    let stats = allocator.stats();
    assert_eq!(
        stats.free_bytes + stats.used_bytes + stats.header_overhead,
        stats.arena_capacity
    );
    assert_eq!(stats.used_bytes, 14);
    assert_eq!(stats.block_count, 3);
    assert_eq!(stats.bad_bytes, 10);
    assert_eq!(stats.claimed_bytes, 14);

    allocator.free(a).unwrap();
    allocator.free(b).unwrap();
    let stats = allocator.stats();
    assert_eq!(
        stats.free_bytes + stats.used_bytes + stats.header_overhead,
        stats.arena_capacity
    );
    assert_eq!(stats.used_bytes, 0);
    assert_eq!(stats.claimed_bytes, 0);
}
