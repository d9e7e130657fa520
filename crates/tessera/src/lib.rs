//! Tessera: allocator-aware contiguous containers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessera sub-crates. For most users, adding `tessera` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let mut v: Vector<u32> = Vector::new();
//! for i in 0..10 {
//!     v.push_back(i * i)?;
//! }
//! assert_eq!(v[3], 9);
//!
//! // Checked access reports instead of panicking.
//! assert!(matches!(v.at(10), Err(VecError::IndexOutOfRange { index: 10, len: 10 })));
//!
//! // Cursors walk the live range.
//! let mut it = v.begin();
//! it += 2;
//! assert_eq!(*it, 4);
//! assert_eq!(v.end() - it, 8);
//!
//! // Positions feed insert/erase.
//! let pos = v.erase(v.position(0))?;
//! assert_eq!(v[pos.index()], 1);
//! # Ok::<(), VecError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`alloc`] | `tessera-alloc` | `Allocator` trait, `Global`, `AllocError`, `Propagation` |
//! | [`vec`] | `tessera-vec` | `Vector`, cursors and positions, `GrowthConfig`, `VecError` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocator capability and the global heap allocator (`tessera-alloc`).
///
/// Implement [`alloc::Allocator`] to back containers with custom storage.
pub use tessera_alloc as alloc;

/// The contiguous vector and its cursors (`tessera-vec`).
pub use tessera_vec as vec;

pub use tessera_vec::vector;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Allocation
    pub use tessera_alloc::{AllocError, Allocator, Global, Propagation};

    // Container
    pub use tessera_vec::{Cursor, GrowthConfig, Position, Vector};

    // Errors
    pub use tessera_vec::VecError;
}
