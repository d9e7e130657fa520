//! The allocator capability consumed by every Tessera container.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// Raw memory supply plus in-place element lifecycle.
///
/// Containers call [`allocate`](Allocator::allocate) for a block of
/// uninitialised slots, [`construct`](Allocator::construct) each element
/// into place, [`destroy`](Allocator::destroy) elements before the block
/// goes away, and finally [`deallocate`](Allocator::deallocate).
/// Zero-sized requests are never forwarded to the allocator.
///
/// Equality and the three propagation predicates decide what happens to
/// the allocator when container contents are copied, moved, or swapped:
///
/// | Predicate | Consulted by | `true` means |
/// |-----------|--------------|--------------|
/// | [`propagate_on_copy_assignment`](Allocator::propagate_on_copy_assignment) | copy-assignment | target adopts the source's allocator |
/// | [`propagate_on_move_assignment`](Allocator::propagate_on_move_assignment) | move-assignment | target adopts the source's allocator and block |
/// | [`propagate_on_swap`](Allocator::propagate_on_swap) | swap | allocators are exchanged along with contents |
///
/// # Safety
///
/// Implementors must guarantee that a block returned by `allocate` is valid
/// for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and remains valid until it is passed to `deallocate`.
/// Any instance for which [`is_equal`](Allocator::is_equal) returns `true`
/// (including every clone) must be able to deallocate that block.
pub unsafe trait Allocator: Clone {
    /// Allocate an uninitialised block described by `layout`.
    ///
    /// `layout.size()` is non-zero when called from a Tessera container.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator (or one
    /// that compares equal) with the same `layout`, and must not have been
    /// deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Construct `value` in the uninitialised slot `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes, properly aligned, and must not hold
    /// a live value (it would be overwritten without being dropped).
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: caller guarantees `slot` is writable, aligned and vacant.
        unsafe { slot.as_ptr().write(value) }
    }

    /// Destroy the live value in `slot`, leaving it uninitialised.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used again afterwards.
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: caller guarantees `slot` holds a live value.
        unsafe { ptr::drop_in_place(slot.as_ptr()) }
    }

    /// Whether `self` and `other` manage interchangeable memory.
    ///
    /// When `true`, a block allocated by one may be freed by the other, so
    /// containers are free to hand whole blocks across.
    fn is_equal(&self, other: &Self) -> bool;

    /// Whether copy-assignment makes the target adopt the source's allocator.
    fn propagate_on_copy_assignment(&self) -> bool {
        false
    }

    /// Whether move-assignment makes the target adopt the source's allocator.
    fn propagate_on_move_assignment(&self) -> bool {
        false
    }

    /// Whether swapping two containers also swaps their allocators.
    fn propagate_on_swap(&self) -> bool {
        false
    }

    /// The allocator a copy-constructed container should use.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Global;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropFlag(Rc<Cell<u32>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn default_construct_then_destroy_runs_drop_once() {
        let drops = Rc::new(Cell::new(0));
        let layout = Layout::new::<DropFlag>();
        let block = Global.allocate(layout).unwrap().cast::<DropFlag>();
        unsafe {
            Global.construct(block, DropFlag(drops.clone()));
            assert_eq!(drops.get(), 0);
            Global.destroy(block);
            Global.deallocate(block.cast(), layout);
        }
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn default_predicates_do_not_propagate() {
        assert!(!Global.propagate_on_copy_assignment());
        assert!(!Global.propagate_on_move_assignment());
        assert!(!Global.propagate_on_swap());
    }

    #[test]
    fn select_on_copy_defaults_to_clone() {
        let chosen = Global.select_on_copy();
        assert!(chosen.is_equal(&Global));
    }
}
