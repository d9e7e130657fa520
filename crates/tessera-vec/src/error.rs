//! Container error types.

use tessera_alloc::AllocError;

/// Errors reported by [`Vector`](crate::Vector) operations.
///
/// Unchecked accessors never produce these; only checked access,
/// position-validated modifiers, and operations that allocate do.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VecError {
    /// An index or position fell outside the live range.
    ///
    /// Raised by [`at`](crate::Vector::at), by `pop_back`/`erase` on an
    /// empty container, and by `insert`/`erase` given a position outside
    /// `[begin, end]`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
    /// The allocator could not satisfy a request.
    #[error(transparent)]
    AllocationFailure(#[from] AllocError),
    /// The requested slot count exceeds what the address space can hold.
    #[error("capacity overflow: requested {requested} slots, maximum {max}")]
    CapacityOverflow {
        /// Number of slots requested.
        requested: usize,
        /// Largest representable slot count for the element type.
        max: usize,
    },
    /// Swap between containers whose allocators differ and do not propagate.
    #[error("cannot swap containers whose allocators differ and do not propagate")]
    AllocatorMismatch,
    /// A [`GrowthConfig`](crate::GrowthConfig) failed validation.
    #[error("invalid growth configuration: {reason}")]
    InvalidGrowth {
        /// Description of the problem.
        reason: String,
    },
}

impl VecError {
    /// Escalate an error from an infallible trait impl (`Clone`, `Extend`,
    /// `FromIterator`) the way `std::vec::Vec` does.
    pub(crate) fn escalate(self) -> ! {
        match self {
            Self::AllocationFailure(err) => std::alloc::handle_alloc_error(err.layout()),
            other => panic!("{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::Layout;

    #[test]
    fn index_error_display() {
        let err = VecError::IndexOutOfRange { index: 5, len: 5 };
        assert_eq!(err.to_string(), "index 5 out of range for length 5");
    }

    #[test]
    fn alloc_error_is_transparent() {
        let layout = Layout::new::<[u64; 8]>();
        let err: VecError = AllocError::new(layout).into();
        assert_eq!(err.to_string(), AllocError::new(layout).to_string());
        assert!(matches!(err, VecError::AllocationFailure(e) if e.layout() == layout));
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn escalate_panics_for_overflow() {
        VecError::CapacityOverflow {
            requested: usize::MAX,
            max: 1,
        }
        .escalate();
    }
}
