/*!
 * Backing Store Tests
 * Fault injection, usability queries, and free-run scanning
 */

use faultmem::{BackingStore, ByteState};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_store_initialization() {
    let store = BackingStore::new(100);
    assert_eq!(store.capacity(), 100);
    assert_eq!(store.bad_bytes(), 0);
    assert_eq!(store.claimed_bytes(), 0);
    assert!((0..100).all(|offset| store.is_usable(offset)));
}

#[test]
fn test_mark_bad_sampled_with_replacement() {
    let mut store = BackingStore::new(64);
    let mut rng = StdRng::seed_from_u64(7);
    store.mark_bad(40, &mut rng);

    // Duplicates collapse, so distinct bad bytes never exceed the sample count
    let bad = store.bad_bytes();
    assert!(bad > 0);
    assert!(bad <= 40);

    for offset in 0..store.capacity() {
        match store.state(offset) {
            Some(ByteState::Bad) => assert!(!store.is_usable(offset)),
            _ => assert!(store.is_usable(offset)),
        }
    }
}

#[test]
fn test_mark_bad_at_fixed_positions() {
    let mut store = BackingStore::new(100);
    store.mark_bad_at([3, 17, 90]);

    assert_eq!(store.bad_bytes(), 3);
    assert!(!store.is_usable(3));
    assert!(!store.is_usable(17));
    assert!(!store.is_usable(90));
    assert!(store.is_usable(4));

    // Out-of-range positions are ignored
    store.mark_bad_at([500]);
    assert_eq!(store.bad_bytes(), 3);
}

#[test]
fn test_is_usable_out_of_bounds() {
    let store = BackingStore::new(10);
    assert!(!store.is_usable(10));
    assert!(!store.is_usable(usize::MAX));
}

#[test]
fn test_find_free_run_resets_on_bad_byte() {
    let mut store = BackingStore::new(20);
    store.mark_bad_at([4]);

    // 0..4 is only four bytes; the run restarts after the fault
    assert_eq!(store.find_free_run(5), Some(5));
    assert_eq!(store.find_free_run(4), Some(0));
}

#[test]
fn test_find_free_run_exhaustive_failures() {
    let store = BackingStore::new(10);
    assert_eq!(store.find_free_run(11), None);
    assert_eq!(store.find_free_run(0), None);

    let mut store = BackingStore::new(10);
    store.mark_bad_at(0..10);
    assert_eq!(store.find_free_run(1), None);
}

#[test]
fn test_find_free_run_spans_whole_store() {
    let store = BackingStore::new(10);
    assert_eq!(store.find_free_run(10), Some(0));
}
