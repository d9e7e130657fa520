//! Modifiers: tail insertion and removal, positional insert and erase,
//! bulk assignment.
//!
//! Inserts never leave a half-shifted buffer behind. New values are built
//! in vacant slots (the spare tail, or a fresh block when the vector is
//! full) and only then moved into place. Moving initialised values is a
//! bitwise copy and cannot fail, so the only fallible step is the
//! construction itself, which rolls back through [`Run`].

use std::mem;
use std::ptr;

use tessera_alloc::Allocator;

use crate::cursor::Position;
use crate::error::VecError;
use crate::lifecycle::{self, Run};
use crate::vector::Vector;

/// Closes the hole left by an erased range, even if a destructor unwinds.
struct CloseGap<'a, T, A: Allocator> {
    vec: &'a mut Vector<T, A>,
    start: usize,
    end: usize,
    tail: usize,
}

impl<T, A: Allocator> Drop for CloseGap<'_, T, A> {
    fn drop(&mut self) {
        let buf = &self.vec.buf;
        // SAFETY: `[end, end + tail)` holds the live suffix and
        // `[start, end)` is vacant once the erased elements are gone.
        unsafe { lifecycle::shift(buf.slot(self.end), buf.slot(self.start), self.tail) };
        self.vec.len = self.start + self.tail;
    }
}

impl<T, A: Allocator> Vector<T, A> {
    // ── Tail ────────────────────────────────────────────────────

    /// Append `value`, growing multiplicatively when full.
    ///
    /// On allocation failure `value` is dropped and the vector is
    /// unchanged.
    pub fn push_back(&mut self, value: T) -> Result<(), VecError> {
        self.emplace_back(|| value).map(|_| ())
    }

    /// Append the value produced by `make` and return a reference to it.
    ///
    /// When the vector is full, `make` runs only after the new block has
    /// been obtained, and builds directly into it.
    pub fn emplace_back<F>(&mut self, make: F) -> Result<&mut T, VecError>
    where
        F: FnOnce() -> T,
    {
        if self.len == self.capacity() {
            let required = self.required_len(1)?;
            let new_cap = self.grown_capacity(required)?;
            let at = self.len;
            self.rebuild_with_gap(new_cap, at, 1, |run| run.push(make()))?;
        } else {
            self.construct_next(make());
        }
        let last = self.len - 1;
        Ok(&mut self.as_mut_slice()[last])
    }

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Result<T, VecError> {
        if self.len == 0 {
            return Err(VecError::IndexOutOfRange { index: 0, len: 0 });
        }
        self.len -= 1;
        // SAFETY: the slot held the last live element and is now outside
        // `[0, len)`, so ownership moves to the caller exactly once.
        Ok(unsafe { ptr::read(self.buf.slot(self.len).as_ptr()) })
    }

    /// Append clones of every element of `items`. Strong guarantee.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), VecError>
    where
        T: Clone,
    {
        let at = self.len;
        self.splice_in(at, items.len(), |i| items[i].clone())
    }

    /// Drop every element past `new_len`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let count = self.len - new_len;
        self.len = new_len;
        self.bump_generation();
        // SAFETY: `[new_len, new_len + count)` were live and are now past
        // `len`, so they are destroyed exactly once.
        unsafe { lifecycle::destroy_range(&self.buf, new_len, count) };
    }

    /// Drop every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    // ── Positional ──────────────────────────────────────────────

    /// Insert `value` before `pos` and return the position it now occupies.
    ///
    /// `pos == end_position()` appends. Fails with `IndexOutOfRange` when
    /// `pos` is past the end; the vector is unchanged on any error.
    pub fn insert(&mut self, pos: Position, value: T) -> Result<Position, VecError> {
        self.emplace(pos, || value)
    }

    /// Insert the value produced by `make` before `pos`.
    pub fn emplace<F>(&mut self, pos: Position, make: F) -> Result<Position, VecError>
    where
        F: FnOnce() -> T,
    {
        let at = self.insert_index(pos)?;
        if at == self.len {
            self.emplace_back(make)?;
            return Ok(self.position(at));
        }
        if self.len == self.capacity() {
            let required = self.required_len(1)?;
            let new_cap = self.grown_capacity(required)?;
            self.rebuild_with_gap(new_cap, at, 1, |run| run.push(make()))?;
        } else {
            self.construct_next(make());
            self.as_mut_slice()[at..].rotate_right(1);
            self.bump_generation();
        }
        Ok(self.position(at))
    }

    /// Insert clones of `items` before `pos`; returns the position of the
    /// first inserted element.
    pub fn insert_from_slice(&mut self, pos: Position, items: &[T]) -> Result<Position, VecError>
    where
        T: Clone,
    {
        let at = self.insert_index(pos)?;
        self.splice_in(at, items.len(), |i| items[i].clone())?;
        Ok(self.position(at))
    }

    /// Insert `count` clones of `value` before `pos`.
    pub fn insert_fill(&mut self, pos: Position, count: usize, value: T) -> Result<Position, VecError>
    where
        T: Clone,
    {
        let at = self.insert_index(pos)?;
        self.splice_in(at, count, |_| value.clone())?;
        Ok(self.position(at))
    }

    /// Remove the element at `pos` and return the position that now holds
    /// its successor (the end position if it was the last element).
    pub fn erase(&mut self, pos: Position) -> Result<Position, VecError> {
        self.debug_check_position(pos);
        let at = pos.index();
        if at >= self.len {
            return Err(VecError::IndexOutOfRange {
                index: at,
                len: self.len,
            });
        }
        self.remove_range(at, at + 1);
        Ok(self.position(at))
    }

    /// Remove `[first, last)`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<Position, VecError> {
        self.debug_check_position(first);
        self.debug_check_position(last);
        let (start, end) = (first.index(), last.index());
        if end > self.len {
            return Err(VecError::IndexOutOfRange {
                index: end,
                len: self.len,
            });
        }
        if start > end {
            return Err(VecError::IndexOutOfRange {
                index: start,
                len: self.len,
            });
        }
        self.remove_range(start, end);
        Ok(self.position(start))
    }

    /// Keep only the elements for which `keep` returns true, preserving
    /// their order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut kept = 0;
        for i in 0..self.len {
            if keep(&self.as_slice()[i]) {
                if i != kept {
                    self.as_mut_slice().swap(kept, i);
                }
                kept += 1;
            }
        }
        self.truncate(kept);
    }

    /// Remove consecutive duplicates.
    pub fn dedup(&mut self)
    where
        T: PartialEq,
    {
        if self.len <= 1 {
            return;
        }
        let mut kept = 1;
        for i in 1..self.len {
            let items = self.as_mut_slice();
            if items[i] != items[kept - 1] {
                items.swap(kept, i);
                kept += 1;
            }
        }
        self.truncate(kept);
    }

    // ── Assignment ──────────────────────────────────────────────

    /// Replace the contents with clones of `items`.
    ///
    /// Reuses the current block when it is large enough (basic guarantee:
    /// the old contents are gone before the clones are made). Otherwise the
    /// clones are built in a new block first and the vector is unchanged
    /// on failure.
    pub fn assign_from_slice(&mut self, items: &[T]) -> Result<(), VecError>
    where
        T: Clone,
    {
        if items.len() > self.capacity() {
            let fresh = Self::from_slice_in(items, self.allocator().clone())?;
            self.adopt_contents(fresh);
            return Ok(());
        }
        self.clear();
        self.construct_tail(items.len(), |i| items[i].clone());
        self.bump_generation();
        Ok(())
    }

    /// Replace the contents with `count` clones of `value`.
    pub fn assign_fill(&mut self, count: usize, value: T) -> Result<(), VecError>
    where
        T: Clone,
    {
        if count > self.capacity() {
            let fresh = Self::from_elem_in(value, count, self.allocator().clone())?;
            self.adopt_contents(fresh);
            return Ok(());
        }
        self.clear();
        self.construct_tail(count, |_| value.clone());
        self.bump_generation();
        Ok(())
    }

    /// Replace the contents with the items of `iter`. Basic guarantee.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<(), VecError>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        self.clear();
        self.bump_generation();
        self.reserve(iter.size_hint().0)?;
        for item in iter {
            self.push_back(item)?;
        }
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────

    /// Construct `value` in slot `len`. Capacity must allow it.
    fn construct_next(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        // SAFETY: slot `len` is vacant and inside the block.
        let mut run = unsafe { Run::new(&self.buf, self.len) };
        run.push(value);
        self.len += run.commit();
    }

    fn insert_index(&self, pos: Position) -> Result<usize, VecError> {
        self.debug_check_position(pos);
        if pos.index() > self.len {
            return Err(VecError::IndexOutOfRange {
                index: pos.index(),
                len: self.len,
            });
        }
        Ok(pos.index())
    }

    /// Destroy `[start, end)` and slide the suffix down over it.
    fn remove_range(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let tail = self.len - end;
        self.len = start;
        self.bump_generation();
        let gap = CloseGap {
            vec: self,
            start,
            end,
            tail,
        };
        // SAFETY: `[start, end)` is live and outside `len`; the guard moves
        // the suffix down afterwards, also on unwind.
        unsafe { lifecycle::destroy_range(&gap.vec.buf, start, end - start) };
    }

    /// Drop the current elements and take over `fresh`'s block.
    fn adopt_contents(&mut self, mut fresh: Self) {
        self.clear();
        self.buf.swap_blocks(&mut fresh.buf);
        mem::swap(&mut self.len, &mut fresh.len);
        self.bump_generation();
    }
}
