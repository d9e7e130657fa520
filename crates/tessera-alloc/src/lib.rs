//! Allocator capability for Tessera containers.
//!
//! This is the leaf crate of the workspace. It defines the [`Allocator`]
//! trait that every container consumes, the default [`Global`] allocator
//! backed by the platform heap, the [`AllocError`] returned when a request
//! cannot be satisfied, and the [`Propagation`] flag set used by allocators
//! that want to travel with their container's contents.
//!
//! # Capability surface
//!
//! ```text
//! Allocator
//! ├── allocate / deallocate     raw blocks described by a Layout
//! ├── construct / destroy       element lifecycle inside a slot
//! ├── is_equal                  can two instances free each other's blocks?
//! ├── propagate_on_*            copy / move / swap adoption predicates
//! └── select_on_copy            allocator handed to a copy-constructed container
//! ```
//!
//! Equality and propagation are runtime predicates rather than type-level
//! policy, so a single allocator type can describe several pools.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod global;
pub mod propagation;
pub mod traits;

// Public re-exports for the primary API surface.
pub use error::AllocError;
pub use global::Global;
pub use propagation::Propagation;
pub use traits::Allocator;
