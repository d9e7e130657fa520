//! Random-access cursors and detached positions.
//!
//! A [`Cursor`] is a positional view into a vector's live range. It
//! borrows the vector, so the borrow checker guarantees the block it points
//! at stays put for as long as the cursor exists. Arithmetic on a cursor is
//! unchecked; only dereferencing validates, by way of slice indexing.
//!
//! A [`Position`] is what `insert` and `erase` accept: an index plus the
//! vector's [`generation`](crate::Vector::generation) at the time it was
//! taken. It holds no borrow, so it can outlive a mutation; using one
//! after the vector was reallocated or reshaped is a contract violation,
//! caught by a debug assertion.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Add, AddAssign, Deref, Sub, SubAssign};

use tessera_alloc::Allocator;

use crate::vector::Vector;

/// A detached position inside a [`Vector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Position {
    index: usize,
    generation: u64,
}

impl Position {
    pub(crate) fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    /// Slot index this position refers to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation of the vector when this position was taken.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of slots from `first` to `last`.
    ///
    /// `last` must not precede `first`.
    pub fn distance(first: Position, last: Position) -> usize {
        last.index - first.index
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then(self.generation.cmp(&other.generation))
    }
}

impl Add<usize> for Position {
    type Output = Position;

    fn add(self, rhs: usize) -> Position {
        Position::new(self.index.wrapping_add(rhs), self.generation)
    }
}

impl Sub<usize> for Position {
    type Output = Position;

    fn sub(self, rhs: usize) -> Position {
        Position::new(self.index.wrapping_sub(rhs), self.generation)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(index={}, gen={})", self.index, self.generation)
    }
}

/// A random-access cursor over a vector's live elements.
///
/// Supports stepping ([`inc`](Cursor::inc), [`dec`](Cursor::dec)), offset
/// arithmetic with `isize`, cursor difference, indexed offset access,
/// total ordering and dereference. Iterating a cursor yields the elements
/// from its position to the end.
pub struct Cursor<'a, T> {
    items: &'a [T],
    index: usize,
    generation: u64,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(items: &'a [T], index: usize, generation: u64) -> Self {
        Self {
            items,
            index,
            generation,
        }
    }

    /// Slot index of the cursor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance by one slot (`++it`).
    pub fn inc(&mut self) -> &mut Self {
        self.index = self.index.wrapping_add(1);
        self
    }

    /// Step back by one slot (`--it`).
    pub fn dec(&mut self) -> &mut Self {
        self.index = self.index.wrapping_sub(1);
        self
    }

    /// The element under the cursor, or `None` at or past the end.
    pub fn get(&self) -> Option<&'a T> {
        self.items.get(self.index)
    }

    /// The element `offset` slots away from the cursor (`it[n]`).
    ///
    /// # Panics
    ///
    /// Panics if the target slot is outside the live range.
    pub fn at_offset(&self, offset: isize) -> &'a T {
        &self.items[self.index.wrapping_add_signed(offset)]
    }

    /// Number of slots from `first` to `last`.
    ///
    /// Both cursors must come from the same vector and `last` must not
    /// precede `first`.
    pub fn distance(first: &Cursor<'a, T>, last: &Cursor<'a, T>) -> usize {
        debug_assert!(first.same_block(last));
        last.index - first.index
    }

    /// Detach into a [`Position`] usable with `insert`/`erase`.
    pub fn position(&self) -> Position {
        Position::new(self.index, self.generation)
    }

    fn same_block(&self, other: &Self) -> bool {
        std::ptr::eq(self.items.as_ptr(), other.items.as_ptr())
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.items.len())
            .finish()
    }
}

impl<T> Deref for Cursor<'_, T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics when the cursor is at or past the end.
    fn deref(&self) -> &T {
        &self.items[self.index]
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_block(other) && self.index == other.index
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Cursor<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert!(self.same_block(other), "cursors from different vectors");
        self.index.cmp(&other.index)
    }
}

impl<'a, T> Add<isize> for Cursor<'a, T> {
    type Output = Cursor<'a, T>;

    fn add(mut self, rhs: isize) -> Cursor<'a, T> {
        self += rhs;
        self
    }
}

impl<'a, T> Sub<isize> for Cursor<'a, T> {
    type Output = Cursor<'a, T>;

    fn sub(mut self, rhs: isize) -> Cursor<'a, T> {
        self -= rhs;
        self
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_add_signed(rhs);
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_add_signed(rhs.wrapping_neg());
    }
}

impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, rhs: Cursor<'a, T>) -> isize {
        debug_assert!(self.same_block(&rhs));
        (self.index as isize).wrapping_sub(rhs.index as isize)
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.items.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Cursor<'_, T> {}

impl<T> FusedIterator for Cursor<'_, T> {}

impl<T, A: Allocator> Vector<T, A> {
    /// Cursor at the first element.
    pub fn begin(&self) -> Cursor<'_, T> {
        self.cursor_at(0)
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor<'_, T> {
        self.cursor_at(self.len)
    }

    /// Cursor at slot `index` (not validated).
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), index, self.generation)
    }

    /// Position of the first element.
    pub fn begin_position(&self) -> Position {
        self.position(0)
    }

    /// Position one past the last element.
    pub fn end_position(&self) -> Position {
        self.position(self.len)
    }

    /// Position of slot `index` (validated when used).
    pub fn position(&self, index: usize) -> Position {
        Position::new(index, self.generation)
    }

    /// Debug-build check that `pos` was taken from the current layout.
    pub(crate) fn debug_check_position(&self, pos: Position) {
        debug_assert_eq!(
            pos.generation(),
            self.generation,
            "stale position {pos}: the vector was reallocated or reshaped after it was taken"
        );
    }
}
