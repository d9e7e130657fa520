//! By-value iteration.

use std::fmt;
use std::iter::FusedIterator;
use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

use tessera_alloc::Allocator;

use crate::lifecycle;
use crate::raw::RawBuf;
use crate::vector::Vector;

/// An iterator that moves elements out of a [`Vector`].
///
/// Owns the block; elements not yet yielded are destroyed and the block is
/// returned to the allocator when the iterator is dropped.
pub struct IntoIter<T, A: Allocator> {
    buf: RawBuf<T, A>,
    start: usize,
    end: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(vec: Vector<T, A>) -> Self {
        let vec = ManuallyDrop::new(vec);
        // SAFETY: `vec` is never dropped, so the buffer is moved out once.
        let buf = unsafe { ptr::read(&vec.buf) };
        Self {
            buf,
            start: 0,
            end: vec.len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` holds live elements.
        unsafe { slice::from_raw_parts(self.buf.slot(self.start).as_ptr(), self.end - self.start) }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let slot = self.buf.slot(self.start);
        self.start += 1;
        // SAFETY: the slot was live and is now outside `[start, end)`.
        Some(unsafe { ptr::read(slot.as_ptr()) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: as for `next`.
        Some(unsafe { ptr::read(self.buf.slot(self.end).as_ptr()) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let (start, count) = (self.start, self.end - self.start);
        self.start = self.end;
        // SAFETY: `[start, start + count)` held the unyielded elements.
        unsafe { lifecycle::destroy_range(&self.buf, start, count) };
    }
}
