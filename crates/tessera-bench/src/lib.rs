//! Benchmark workloads for the Tessera containers.
//!
//! Provides deterministic inputs shared by the Criterion benches and the
//! examples:
//!
//! - [`workload_values`]: pseudo-random `u64` values from a seed
//! - [`filled_vector`]: a [`Vector`] pre-populated through `push_back`
//! - [`reallocation_count`]: how many blocks `n` pushes allocate

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_alloc::Allocator;
use tessera_vec::{VecError, Vector};

/// Reference workload size for the micro-benchmarks.
pub const REFERENCE_LEN: usize = 10_000;

/// Generate `n` deterministic pseudo-random values from `seed`.
///
/// A 64-bit LCG: cheap, reproducible, and good enough to defeat
/// constant folding in benches.
pub fn workload_values(n: usize, seed: u64) -> Vec<u64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            state >> 11
        })
        .collect()
}

/// Build a vector of `values` using only tail insertion.
pub fn filled_vector<A: Allocator>(values: &[u64], alloc: A) -> Result<Vector<u64, A>, VecError> {
    let mut vec = Vector::new_in(alloc);
    for &value in values {
        vec.push_back(value)?;
    }
    Ok(vec)
}

/// Number of distinct capacities a vector passes through while `n`
/// elements are pushed one at a time.
pub fn reallocation_count(n: usize) -> Result<usize, VecError> {
    let mut vec: Vector<u64> = Vector::new();
    let mut count = 0;
    let mut capacity = vec.capacity();
    for i in 0..n {
        vec.push_back(i as u64)?;
        if vec.capacity() != capacity {
            capacity = vec.capacity();
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_alloc::Global;

    #[test]
    fn workload_is_deterministic() {
        assert_eq!(workload_values(16, 42), workload_values(16, 42));
        assert_ne!(workload_values(16, 42), workload_values(16, 43));
    }

    #[test]
    fn filled_vector_matches_input() {
        let values = workload_values(100, 7);
        let vec = filled_vector(&values, Global).unwrap();
        assert_eq!(vec, values);
    }

    #[test]
    fn reallocations_grow_logarithmically() {
        // Floor of 4, doubling: 4, 8, ..., 16384.
        assert_eq!(reallocation_count(REFERENCE_LEN).unwrap(), 13);
    }
}
