/*!
 * Faultmem - Demo Driver
 *
 * Builds a fault-injected backing store, allocates one block of the
 * requested size, prints the allocator state as JSON, and frees it.
 */

use faultmem::core::limits::{DEFAULT_FAULT_COUNT, DEFAULT_STORE_CAPACITY};
use faultmem::{Allocator, BackingStore, BlockAllocator, Introspect};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::process::ExitCode;

/// Drive one allocate/inspect/free cycle through the trait seams
fn demo<A: Allocator + Introspect>(allocator: &mut A, size: usize) -> Result<(), Box<dyn Error>> {
    let handle = allocator.allocate(size)?;
    info!(
        "Demo allocation of {} bytes live (payload size {:?})",
        size,
        allocator.block_size(handle)
    );

    println!("{}", serde_json::to_string_pretty(&allocator.dump())?);
    println!("{}", serde_json::to_string_pretty(&allocator.stats())?);

    allocator.free(handle)?;
    println!("{}", serde_json::to_string_pretty(&allocator.stats())?);
    Ok(())
}

fn run(size: usize, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut store = BackingStore::new(DEFAULT_STORE_CAPACITY);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    store.mark_bad(DEFAULT_FAULT_COUNT, &mut rng);

    let mut allocator = BlockAllocator::new(store);
    demo(&mut allocator, size)
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <size_of_allocation> [seed]", args[0]);
        return ExitCode::FAILURE;
    }

    let size = match args[1].parse::<usize>() {
        Ok(size) => size,
        Err(e) => {
            eprintln!("Invalid allocation size {:?}: {}", args[1], e);
            return ExitCode::FAILURE;
        }
    };
    let seed = match args.get(2).map(|s| s.parse::<u64>()).transpose() {
        Ok(seed) => seed,
        Err(e) => {
            eprintln!("Invalid seed {:?}: {}", args[2], e);
            return ExitCode::FAILURE;
        }
    };

    match run(size, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Allocation demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
