//! The platform heap allocator.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::traits::Allocator;

/// Allocator backed by the process-wide global heap (`std::alloc`).
///
/// Every instance is equal to every other and no propagation predicate is
/// set: there is no per-instance state to carry around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

// SAFETY: blocks come straight from `std::alloc::alloc` with the requested
// layout and are released with `std::alloc::dealloc` using that same layout.
// `Global` is stateless, so any instance can free any other's blocks.
unsafe impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // Aligned, non-null and never dereferenced.
            return NonNull::new(ptr::without_provenance_mut(layout.align()))
                .ok_or(AllocError::new(layout));
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }

    fn is_equal(&self, _other: &Self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_returns_aligned_writable_block() {
        let layout = Layout::from_size_align(256, 64).unwrap();
        let block = Global.allocate(layout).unwrap();
        assert_eq!(block.as_ptr() as usize % 64, 0);
        unsafe {
            ptr::write_bytes(block.as_ptr(), 0xAB, 256);
            assert_eq!(*block.as_ptr().add(255), 0xAB);
            Global.deallocate(block, layout);
        }
    }

    #[test]
    fn zero_size_request_is_dangling_and_aligned() {
        let layout = Layout::from_size_align(0, 16).unwrap();
        let block = Global.allocate(layout).unwrap();
        assert_eq!(block.as_ptr() as usize % 16, 0);
        // Deallocating a zero-size block is a no-op.
        unsafe { Global.deallocate(block, layout) };
    }

    #[test]
    fn oversized_request_fails_without_panicking() {
        // Larger than isize::MAX cannot be expressed as a Layout, so ask for
        // something the heap will refuse instead.
        let layout = Layout::from_size_align(isize::MAX as usize - 4095, 4096).unwrap();
        let err = Global.allocate(layout).unwrap_err();
        assert_eq!(err.layout(), layout);
    }

    #[test]
    fn all_instances_are_equal() {
        assert!(Global.is_equal(&Global));
        assert!(Global::default().is_equal(&Global));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn blocks_hold_their_contents(
                size in 1usize..4096,
                align_shift in 0u32..8,
            ) {
                let layout = Layout::from_size_align(size, 1 << align_shift).unwrap();
                let block = Global.allocate(layout).unwrap();
                prop_assert_eq!(block.as_ptr() as usize % layout.align(), 0);
                unsafe {
                    for i in 0..size {
                        block.as_ptr().add(i).write(i as u8);
                    }
                    for i in 0..size {
                        prop_assert_eq!(*block.as_ptr().add(i), i as u8);
                    }
                    Global.deallocate(block, layout);
                }
            }
        }
    }
}
