//! Push a workload through an instrumented allocator and report how the
//! vector grew.
//!
//! ```text
//! RUST_LOG=trace cargo run -p tessera-bench --example growth_report
//! ```

use tessera_bench::{filled_vector, workload_values, REFERENCE_LEN};
use tessera_test_utils::{init_tracing, TestAllocator};

fn main() {
    init_tracing();

    let alloc = TestAllocator::new();
    let values = workload_values(REFERENCE_LEN, 42);
    let mut vec = match filled_vector(&values, alloc.clone()) {
        Ok(vec) => vec,
        Err(err) => {
            eprintln!("workload failed: {err}");
            std::process::exit(1);
        }
    };

    let stats = alloc.stats();
    println!("elements:        {}", vec.len());
    println!("capacity:        {}", vec.capacity());
    println!("allocations:     {}", stats.allocations);
    println!("deallocations:   {}", stats.deallocations);
    println!("peak bytes:      {}", stats.peak_bytes);
    println!("live bytes:      {}", stats.live_bytes);

    if let Err(err) = vec.shrink_to_fit() {
        eprintln!("shrink failed: {err}");
        std::process::exit(1);
    }
    println!("after shrink:    {} bytes live", alloc.stats().live_bytes);

    drop(vec);
    alloc.assert_no_leaks();
}
