//! Allocator-aware contiguous vector for Tessera.
//!
//! Provides [`Vector`], a growable sequence whose storage comes from a
//! pluggable [`Allocator`], with explicit copy/move/swap semantics driven by
//! the allocator's propagation predicates and a failure-safety contract
//! that leaves the container untouched when growth or construction fails.
//! This crate is one of two that may contain `unsafe` code (along with
//! `tessera-alloc`).
//!
//! # Architecture
//!
//! ```text
//! Vector<T, A> (len, growth config, generation)
//! ├── RawBuf<T, A> (one block of capacity slots + the allocator)
//! ├── lifecycle (Run guard, destroy_range, relocate/shift)
//! ├── modify (push/pop, insert/erase, assign)
//! ├── propagate (try_clone, take, assign_copy/assign_move, swap)
//! └── cursor (Cursor<'_, T> views, detached Position handles)
//! ```
//!
//! # Failure safety
//!
//! - **Strong:** growth, copy and range construction, insert/emplace,
//!   `resize`, `assign_copy`, reallocating `assign_*`. On `Err` or panic
//!   nothing observable changes.
//! - **Basic:** the relocating fallback of `assign_move`, `assign_*` when
//!   reusing capacity, and removal when an element's destructor panics.
//!   The container stays valid and leaks nothing.
//!
//! # Example
//!
//! ```
//! use tessera_vec::{vector, Vector};
//!
//! let mut v: Vector<i32> = vector![1, 2, 4];
//! let pos = v.insert(v.position(2), 3).unwrap();
//! assert_eq!(v[pos.index()], 3);
//! assert_eq!(v, [1, 2, 3, 4]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod cursor;
pub mod error;
mod impls;
pub mod into_iter;
mod lifecycle;
mod modify;
mod propagate;
mod raw;
mod vector;

// Public re-exports for the primary API surface.
pub use config::GrowthConfig;
pub use cursor::{Cursor, Position};
pub use error::VecError;
pub use into_iter::IntoIter;
pub use tessera_alloc::{AllocError, Allocator, Global, Propagation};
pub use vector::Vector;

/// Create a [`Vector`] on the global heap, like `vec!`.
///
/// Panics (through `handle_alloc_error`) if allocation fails.
///
/// ```
/// use tessera_vec::{vector, Vector};
///
/// let empty: Vector<u8> = vector![];
/// let zeros: Vector<u8> = vector![0; 3];
/// let list: Vector<u8> = vector![1, 2, 3];
/// assert!(empty.is_empty());
/// assert_eq!(zeros, [0, 0, 0]);
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($value:expr; $len:expr) => {
        ::std::iter::repeat($value)
            .take($len)
            .collect::<$crate::Vector<_>>()
    };
    ($($item:expr),+ $(,)?) => {
        <$crate::Vector<_> as ::std::convert::From<_>>::from([$($item),+])
    };
}
