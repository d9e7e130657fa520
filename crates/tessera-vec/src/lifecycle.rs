//! Element construction and destruction inside a [`RawBuf`].
//!
//! Everything that puts values into slots or takes them out goes through
//! here, so that rollback on a panicking constructor or destructor lives in
//! one place:
//!
//! - [`Run`] constructs a contiguous run of elements and, if dropped before
//!   [`Run::commit`], destroys exactly the elements it built.
//! - [`destroy_range`] destroys a run of live elements and keeps going if
//!   one destructor panics.
//! - [`relocate`] and [`shift`] move elements bitwise. Rust moves cannot
//!   fail, so relocation never needs rollback.

use std::mem;
use std::ptr::{self, NonNull};

use tessera_alloc::Allocator;

use crate::raw::RawBuf;

/// A run of elements under construction, starting at a fixed slot.
///
/// Dropping an uncommitted run (for example while a `clone()` panics)
/// destroys every element the run has constructed so far; the block
/// itself stays with its `RawBuf` owner.
pub(crate) struct Run<'a, T, A: Allocator> {
    buf: &'a RawBuf<T, A>,
    start: usize,
    built: usize,
}

impl<'a, T, A: Allocator> Run<'a, T, A> {
    /// Begin a run at slot `start`.
    ///
    /// # Safety
    ///
    /// Every slot from `start` up to the buffer's capacity that this run
    /// will write must be vacant (uninitialised).
    pub(crate) unsafe fn new(buf: &'a RawBuf<T, A>, start: usize) -> Self {
        Self {
            buf,
            start,
            built: 0,
        }
    }

    /// Construct `value` in the next slot.
    ///
    /// # Panics
    ///
    /// Panics if the run would write past the buffer's capacity.
    pub(crate) fn push(&mut self, value: T) {
        let index = self.start + self.built;
        assert!(index < self.buf.capacity(), "run overflows its block");
        // SAFETY: `index` is in bounds and vacant per the `new` contract.
        unsafe { self.buf.allocator().construct(self.buf.slot(index), value) };
        self.built += 1;
    }

    /// Number of elements constructed so far.
    pub(crate) fn built(&self) -> usize {
        self.built
    }

    /// Keep the constructed elements and return how many there are.
    pub(crate) fn commit(self) -> usize {
        let built = self.built;
        mem::forget(self);
        built
    }
}

impl<T, A: Allocator> Drop for Run<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: exactly `built` elements were constructed from `start`.
        unsafe { destroy_range(self.buf, self.start, self.built) };
    }
}

/// Finishes destroying a range if one destructor unwinds.
struct RemainingDestroys<'a, T, A: Allocator> {
    buf: &'a RawBuf<T, A>,
    next: usize,
    end: usize,
}

impl<T, A: Allocator> Drop for RemainingDestroys<'_, T, A> {
    fn drop(&mut self) {
        while self.next < self.end {
            let slot = self.buf.slot(self.next);
            self.next += 1;
            // SAFETY: slots in `[next, end)` are still live.
            unsafe { self.buf.allocator().destroy(slot) };
        }
    }
}

/// Destroy `count` live elements starting at slot `start`.
///
/// If a destructor panics the remaining elements are still destroyed while
/// unwinding (a second panic aborts, as with `drop_in_place` on a slice).
///
/// # Safety
///
/// Slots `[start, start + count)` must hold live elements, and the caller
/// must treat them as vacant afterwards.
pub(crate) unsafe fn destroy_range<T, A: Allocator>(buf: &RawBuf<T, A>, start: usize, count: usize) {
    if !mem::needs_drop::<T>() || count == 0 {
        return;
    }
    let mut rest = RemainingDestroys {
        buf,
        next: start,
        end: start + count,
    };
    while rest.next < rest.end {
        let slot = buf.slot(rest.next);
        rest.next += 1;
        // SAFETY: caller guarantees the slot is live; `rest` has already
        // stepped past it, so it is not destroyed twice on unwind.
        unsafe { buf.allocator().destroy(slot) };
    }
}

/// Move `count` elements from `src` to the non-overlapping `dst`.
///
/// # Safety
///
/// `src` must hold `count` live elements, `dst` must have `count` vacant
/// slots, and the regions must not overlap. Afterwards the source slots are
/// logically vacant.
pub(crate) unsafe fn relocate<T>(src: NonNull<T>, dst: NonNull<T>, count: usize) {
    // SAFETY: forwarded to the caller.
    unsafe { ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), count) }
}

/// Move `count` elements from `src` to a possibly overlapping `dst` in the
/// same block.
///
/// # Safety
///
/// As for [`relocate`], except that the regions may overlap.
pub(crate) unsafe fn shift<T>(src: NonNull<T>, dst: NonNull<T>, count: usize) {
    // SAFETY: forwarded to the caller.
    unsafe { ptr::copy(src.as_ptr(), dst.as_ptr(), count) }
}
