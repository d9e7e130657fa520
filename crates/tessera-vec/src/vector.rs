//! The allocator-aware contiguous container.
//!
//! [`Vector`] owns one [`RawBuf`] at a time. Slots `[0, len)` hold live
//! elements; `[len, capacity)` is uninitialised. Every operation that
//! needs a bigger block builds the result in a fresh block first and
//! adopts it only once all new elements exist, so a failed allocation or
//! a panicking constructor leaves the container exactly as it was.
//!
//! This module holds construction, capacity and access. Modifiers live in
//! [`modify`](crate::modify), copy/move/swap semantics in
//! [`propagate`](crate::propagate).

use std::any::type_name;
use std::mem;
use std::slice;

use tessera_alloc::{Allocator, Global};
use tracing::trace;

use crate::config::GrowthConfig;
use crate::error::VecError;
use crate::lifecycle::{self, Run};
use crate::raw::RawBuf;

/// A contiguous, growable sequence backed by a pluggable [`Allocator`].
///
/// # Guarantees
///
/// - Tail insertion grows capacity multiplicatively (see [`GrowthConfig`]),
///   so `n` pushes perform `O(log n)` reallocations.
/// - Growth, copy construction, range construction and inserts that need
///   a new block give the strong guarantee: on `Err` or panic the
///   container is unchanged.
/// - Every block obtained from the allocator is returned to it exactly
///   once, including when a panic unwinds through the container.
///
/// Plain Rust moves (`let b = a;`) and `std::mem::swap` transfer the whole
/// container, allocator included. The explicit [`take`](Vector::take),
/// [`try_move_in`](Vector::try_move_in), [`assign_move`](Vector::assign_move)
/// and [`swap`](Vector::swap) operations apply the allocator's equality
/// and propagation predicates instead.
pub struct Vector<T, A: Allocator = Global> {
    pub(crate) buf: RawBuf<T, A>,
    pub(crate) len: usize,
    pub(crate) growth: GrowthConfig,
    /// Bumped whenever the element-to-slot mapping changes.
    pub(crate) generation: u64,
}

impl<T> Vector<T> {
    /// Create an empty vector on the global heap. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Create an empty vector with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, VecError> {
        Self::with_capacity_in(capacity, Global)
    }

    /// Create a vector holding `len` clones of `value`.
    pub fn from_elem(value: T, len: usize) -> Result<Self, VecError>
    where
        T: Clone,
    {
        Self::from_elem_in(value, len, Global)
    }

    /// Create a vector holding clones of every element of `items`.
    pub fn from_slice(items: &[T]) -> Result<Self, VecError>
    where
        T: Clone,
    {
        Self::from_slice_in(items, Global)
    }

    /// Create a vector of `len` default-constructed elements.
    pub fn with_len(len: usize) -> Result<Self, VecError>
    where
        T: Default,
    {
        Self::with_len_in(len, Global)
    }
}

impl<T, A: Allocator> Vector<T, A> {
    // ── Construction ────────────────────────────────────────────

    /// Create an empty vector using `alloc`. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self::from_parts(RawBuf::new_in(alloc), GrowthConfig::new())
    }

    /// Create an empty vector with a custom growth configuration.
    pub fn with_growth_in(growth: GrowthConfig, alloc: A) -> Result<Self, VecError> {
        growth.validate()?;
        Ok(Self::from_parts(RawBuf::new_in(alloc), growth))
    }

    /// Create an empty vector with room for exactly `capacity` elements.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, VecError> {
        let buf = RawBuf::with_capacity_in(capacity, alloc)?;
        Ok(Self::from_parts(buf, GrowthConfig::new()))
    }

    /// Create a vector holding `len` clones of `value`.
    ///
    /// If a clone panics, the clones made so far are dropped and the block
    /// is returned to `alloc`.
    pub fn from_elem_in(value: T, len: usize, alloc: A) -> Result<Self, VecError>
    where
        T: Clone,
    {
        let mut vec = Self::with_capacity_in(len, alloc)?;
        vec.construct_tail(len, |_| value.clone());
        Ok(vec)
    }

    /// Create a vector of `len` default-constructed elements.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self, VecError>
    where
        T: Default,
    {
        let mut vec = Self::with_capacity_in(len, alloc)?;
        vec.construct_tail(len, |_| T::default());
        Ok(vec)
    }

    /// Create a vector holding clones of every element of `items`.
    pub fn from_slice_in(items: &[T], alloc: A) -> Result<Self, VecError>
    where
        T: Clone,
    {
        let mut vec = Self::with_capacity_in(items.len(), alloc)?;
        vec.construct_tail(items.len(), |i| items[i].clone());
        Ok(vec)
    }

    /// Create a vector from an arbitrary input range.
    ///
    /// Reserves the iterator's lower size bound up front and grows
    /// amortised past it.
    pub fn from_iter_in<I>(iter: I, alloc: A) -> Result<Self, VecError>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut vec = Self::with_capacity_in(lower, alloc)?;
        for item in iter {
            vec.push_back(item)?;
        }
        Ok(vec)
    }

    pub(crate) fn from_parts(buf: RawBuf<T, A>, growth: GrowthConfig) -> Self {
        Self {
            buf,
            len: 0,
            growth,
            generation: 0,
        }
    }

    // ── Capacity ────────────────────────────────────────────────

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Theoretical maximum element count for `T`.
    ///
    /// `isize::MAX` bytes divided by the element size, or `usize::MAX` for
    /// zero-sized types.
    pub fn max_size(&self) -> usize {
        RawBuf::<T, A>::max_slots()
    }

    /// Ensure room for at least `capacity` elements.
    ///
    /// No-op when `capacity <= self.capacity()`. Otherwise allocates a
    /// block of exactly `capacity` slots and relocates every element into
    /// it. On failure nothing changes.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), VecError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.reallocate(capacity)
    }

    /// Ensure room for at least `additional` more elements.
    pub fn reserve_additional(&mut self, additional: usize) -> Result<(), VecError> {
        let required = self.required_len(additional)?;
        self.reserve(required)
    }

    /// Shrink the block to exactly `len` slots, releasing it if empty.
    pub fn shrink_to_fit(&mut self) -> Result<(), VecError> {
        if self.capacity() == self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Resize to `new_len`, cloning `value` into new trailing slots or
    /// dropping trailing elements.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<(), VecError>
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        let at = self.len;
        self.splice_in(at, new_len - at, |_| value.clone())
    }

    /// Resize to `new_len`, default-constructing new trailing elements.
    pub fn resize_default(&mut self, new_len: usize) -> Result<(), VecError>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Resize to `new_len`, calling `f` for each new trailing element.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), VecError>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        let at = self.len;
        self.splice_in(at, new_len - at, |_| f())
    }

    // ── Access ──────────────────────────────────────────────────

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, VecError> {
        self.as_slice().get(index).ok_or(VecError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, VecError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(VecError::IndexOutOfRange { index, len })
    }

    /// First element, if any.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// First element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Last element, if any.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Raw pointer to the first slot, for interop.
    ///
    /// Dangling (but non-null and aligned) when no block is held.
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr().as_ptr()
    }

    /// Mutable raw pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr().as_ptr()
    }

    /// Whether an allocated block backs this vector.
    pub fn has_buffer(&self) -> bool {
        self.buf.has_block()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live and the pointer is aligned and
        // non-null even when no block is held.
        unsafe { slice::from_raw_parts(self.buf.ptr().as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr().as_ptr(), self.len) }
    }

    /// The allocator backing this vector.
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// The growth configuration in effect.
    pub fn growth(&self) -> GrowthConfig {
        self.growth
    }

    /// Counter that changes whenever existing positions may go stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Internal growth machinery ───────────────────────────────

    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// `len + additional`, or `CapacityOverflow`.
    pub(crate) fn required_len(&self, additional: usize) -> Result<usize, VecError> {
        self.len
            .checked_add(additional)
            .ok_or(VecError::CapacityOverflow {
                requested: usize::MAX,
                max: self.max_size(),
            })
    }

    /// Capacity to grow to so that `required` slots fit.
    pub(crate) fn grown_capacity(&self, required: usize) -> Result<usize, VecError> {
        let max = self.max_size();
        if required > max {
            return Err(VecError::CapacityOverflow {
                requested: required,
                max,
            });
        }
        Ok(self
            .growth
            .next_capacity::<T>(self.capacity(), required)
            .min(max))
    }

    /// Grow amortised so that `additional` more elements fit.
    pub(crate) fn reserve_amortized(&mut self, additional: usize) -> Result<(), VecError> {
        let required = self.required_len(additional)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let new_cap = self.grown_capacity(required)?;
        self.reallocate(new_cap)
    }

    /// Move every element into a fresh block of exactly `new_cap` slots.
    pub(crate) fn reallocate(&mut self, new_cap: usize) -> Result<(), VecError> {
        let at = self.len;
        self.rebuild_with_gap(new_cap, at, 0, |_| {})
    }

    /// Build a fresh block of `new_cap` slots containing the prefix
    /// `[0, at)`, `count` new elements produced by `fill`, then the suffix
    /// `[at, len)`, and adopt it.
    ///
    /// `fill` runs before any existing element moves. If allocation fails
    /// it never runs; if it panics the elements it built are destroyed and
    /// the fresh block is released. Either way `self` is untouched.
    pub(crate) fn rebuild_with_gap<F>(
        &mut self,
        new_cap: usize,
        at: usize,
        count: usize,
        fill: F,
    ) -> Result<(), VecError>
    where
        F: FnOnce(&mut Run<'_, T, A>),
    {
        debug_assert!(at <= self.len);
        debug_assert!(new_cap >= self.len + count);

        let mut fresh = RawBuf::with_capacity_in(new_cap, self.buf.allocator().clone())?;
        {
            // SAFETY: every slot of a fresh block is vacant.
            let mut run = unsafe { Run::new(&fresh, at) };
            fill(&mut run);
            debug_assert_eq!(run.built(), count);
            run.commit();
        }

        let suffix = self.len - at;
        // SAFETY: the old block holds `len` live elements; the fresh block
        // has vacant slots for the prefix and for the suffix past the gap.
        // The blocks are distinct allocations.
        unsafe {
            lifecycle::relocate(self.buf.ptr(), fresh.ptr(), at);
            lifecycle::relocate(self.buf.slot(at), fresh.slot(at + count), suffix);
        }

        trace!(
            old_capacity = self.buf.capacity(),
            new_capacity = new_cap,
            len = self.len + count,
            element = type_name::<T>(),
            "reallocated"
        );

        // Old elements were relocated out, so only the block goes back.
        self.buf.swap_blocks(&mut fresh);
        self.len += count;
        self.bump_generation();
        Ok(())
    }

    /// Construct `count` elements in the spare slots after `len`.
    ///
    /// Capacity must already be sufficient. On panic the new elements are
    /// destroyed and `len` is unchanged.
    pub(crate) fn construct_tail<F>(&mut self, count: usize, mut f: F)
    where
        F: FnMut(usize) -> T,
    {
        assert!(count <= self.capacity() - self.len, "tail exceeds capacity");
        // SAFETY: slots `[len, capacity)` are vacant.
        let mut run = unsafe { Run::new(&self.buf, self.len) };
        for i in 0..count {
            run.push(f(i));
        }
        let built = run.commit();
        self.len += built;
    }

    /// Insert `count` elements produced by `fill` at `at`, growing
    /// amortised if needed. Strong guarantee.
    pub(crate) fn splice_in<F>(&mut self, at: usize, count: usize, mut fill: F) -> Result<(), VecError>
    where
        F: FnMut(usize) -> T,
    {
        let required = self.required_len(count)?;
        if required > self.capacity() {
            let new_cap = self.grown_capacity(required)?;
            return self.rebuild_with_gap(new_cap, at, count, |run| {
                for i in 0..count {
                    run.push(fill(i));
                }
            });
        }
        // Build behind the live range first, then rotate into place: the
        // rotation only moves initialised values and cannot fail.
        let old_len = self.len;
        self.construct_tail(count, fill);
        if at < old_len {
            self.as_mut_slice()[at..].rotate_right(count);
            self.bump_generation();
        }
        Ok(())
    }

    /// Adopt `source`'s block and elements, leaving it empty with no block.
    ///
    /// `self` must be empty and the two allocators must compare equal.
    pub(crate) fn take_block_from(&mut self, source: &mut Self) {
        debug_assert_eq!(self.len, 0);
        self.buf.release();
        self.buf.swap_blocks(&mut source.buf);
        self.len = mem::take(&mut source.len);
        source.bump_generation();
        self.bump_generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_test_utils::{Counters, MoveOnly, TestAllocator};

    #[test]
    fn new_holds_no_block() {
        let vec: Vector<i32> = Vector::new();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert!(!vec.has_buffer());
        assert!(vec.is_empty());
    }

    #[test]
    fn with_capacity_is_exact() {
        let vec: Vector<u64> = Vector::with_capacity(17).unwrap();
        assert_eq!(vec.capacity(), 17);
        assert!(vec.is_empty());
    }

    #[test]
    fn from_elem_clones_value() {
        let vec = Vector::from_elem(String::from("ab"), 3).unwrap();
        assert_eq!(vec.as_slice(), ["ab", "ab", "ab"]);
        assert_eq!(vec.capacity(), 3);
    }

    #[test]
    fn from_elem_zero_len_is_empty() {
        let vec = Vector::from_elem(7u8, 0).unwrap();
        assert!(vec.is_empty());
        assert!(!vec.has_buffer());
    }

    #[test]
    fn with_len_default_constructs() {
        let vec: Vector<u32> = Vector::with_len(4).unwrap();
        assert_eq!(vec.as_slice(), [0, 0, 0, 0]);
    }

    #[test]
    fn from_iter_in_collects_move_only_values() {
        let alloc = TestAllocator::new();
        let vec = Vector::from_iter_in((0..5).map(MoveOnly), alloc.clone()).unwrap();
        assert_eq!(vec.len(), 5);
        assert_eq!(vec[4], MoveOnly(4));
        drop(vec);
        alloc.assert_no_leaks();
    }

    #[test]
    fn reserve_within_capacity_changes_nothing() {
        let mut vec = Vector::from_slice(&[1, 2, 3]).unwrap();
        vec.reserve(10).unwrap();
        let block = vec.as_ptr();
        let generation = vec.generation();

        vec.reserve(4).unwrap();
        vec.reserve(10).unwrap();
        assert_eq!(vec.capacity(), 10);
        assert_eq!(vec.as_ptr(), block);
        assert_eq!(vec.generation(), generation);
        assert_eq!(vec.as_slice(), [1, 2, 3]);
    }

    #[test]
    fn reserve_relocates_without_cloning() {
        let counters = Counters::new();
        let mut vec = Vector::new();
        for i in 0..3 {
            vec.push_back(counters.make(i)).unwrap();
        }
        vec.reserve(100).unwrap();
        assert_eq!(vec.capacity(), 100);
        assert_eq!(counters.clones(), 0);
        assert_eq!(counters.live(), 3);
    }

    #[test]
    fn reserve_additional_overflow() {
        let mut vec = Vector::from_slice(&[1u32]).unwrap();
        let err = vec.reserve_additional(usize::MAX).unwrap_err();
        assert!(matches!(err, VecError::CapacityOverflow { .. }));
        assert_eq!(vec.as_slice(), [1]);
    }

    #[test]
    fn reserve_failure_leaves_vector_untouched() {
        let alloc = TestAllocator::new();
        let mut vec = Vector::from_slice_in(&[1, 2], alloc.clone()).unwrap();
        alloc.fail_next();
        let err = vec.reserve(64).unwrap_err();
        assert!(matches!(err, VecError::AllocationFailure(_)));
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec.as_slice(), [1, 2]);
    }

    #[test]
    fn shrink_to_fit_is_exact() {
        let mut vec: Vector<i32> = Vector::with_capacity(32).unwrap();
        vec.extend_from_slice(&[1, 2, 3]).unwrap();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 3);
        assert_eq!(vec.as_slice(), [1, 2, 3]);
    }

    #[test]
    fn shrink_to_fit_releases_empty_block() {
        let alloc = TestAllocator::new();
        let mut vec: Vector<i32, _> = Vector::with_capacity_in(8, alloc.clone()).unwrap();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 0);
        assert!(!vec.has_buffer());
        alloc.assert_no_leaks();
    }

    #[test]
    fn resize_grows_with_fill_and_shrinks() {
        let mut vec = Vector::from_slice(&[1, 2]).unwrap();
        vec.resize(5, 9).unwrap();
        assert_eq!(vec.as_slice(), [1, 2, 9, 9, 9]);
        vec.resize(1, 0).unwrap();
        assert_eq!(vec.as_slice(), [1]);
    }

    #[test]
    fn resize_shrink_drops_trailing_elements() {
        let counters = Counters::new();
        let mut vec = Vector::new();
        for i in 0..5 {
            vec.push_back(counters.make(i)).unwrap();
        }
        vec.resize_with(2, || unreachable!()).unwrap();
        assert_eq!(counters.live(), 2);
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn resize_default_fills_defaults() {
        let mut vec: Vector<String> = Vector::new();
        vec.resize_default(2).unwrap();
        assert_eq!(vec.as_slice(), ["", ""]);
    }

    #[test]
    fn at_checks_bounds() {
        let vec = Vector::from_slice(&[15, 30, 45, -60, 75]).unwrap();
        assert_eq!(vec.at(0), Ok(&15));
        assert_eq!(vec.at(1), Ok(&30));
        assert_eq!(
            vec.at(5),
            Err(VecError::IndexOutOfRange { index: 5, len: 5 })
        );
    }

    #[test]
    fn at_mut_writes_through() {
        let mut vec = Vector::from_slice(&[1, 2]).unwrap();
        *vec.at_mut(1).unwrap() = 20;
        assert_eq!(vec.as_slice(), [1, 20]);
        assert!(vec.at_mut(2).is_err());
    }

    #[test]
    fn front_and_back() {
        let mut vec = Vector::from_slice(&[17, 34, 51]).unwrap();
        assert_eq!(vec.front(), Some(&17));
        assert_eq!(vec.back(), Some(&51));
        *vec.back_mut().unwrap() = 0;
        *vec.front_mut().unwrap() = 1;
        assert_eq!(vec.as_slice(), [1, 34, 0]);
        assert_eq!(Vector::<u8>::new().front(), None);
    }

    #[test]
    fn as_ptr_reads_elements() {
        let vec = Vector::from_slice(&['w', 'x', 'y', 'z', 'a']).unwrap();
        let ptr = vec.as_ptr();
        for i in 0..vec.len() {
            assert_eq!(unsafe { *ptr.add(i) }, vec[i]);
        }
    }

    #[test]
    fn max_size_tracks_element_size() {
        assert_eq!(Vector::<u8>::new().max_size(), isize::MAX as usize);
        assert_eq!(Vector::<u64>::new().max_size(), isize::MAX as usize / 8);
        assert_eq!(Vector::<()>::new().max_size(), usize::MAX);
    }

    #[test]
    fn custom_growth_is_validated_and_used() {
        let growth = GrowthConfig::try_new(3, Some(2)).unwrap();
        let mut vec = Vector::with_growth_in(growth, Global).unwrap();
        vec.push_back(1u64).unwrap();
        assert_eq!(vec.capacity(), 2);
        vec.push_back(2).unwrap();
        vec.push_back(3).unwrap();
        assert_eq!(vec.capacity(), 6);

        let bad = GrowthConfig {
            factor: 1,
            min_capacity: None,
        };
        assert!(Vector::<u8>::with_growth_in(bad, Global).is_err());
    }

    #[test]
    fn zero_sized_elements_never_allocate() {
        let alloc = TestAllocator::new();
        let mut vec = Vector::new_in(alloc.clone());
        for _ in 0..100 {
            vec.push_back(()).unwrap();
        }
        assert_eq!(vec.len(), 100);
        assert!(!vec.has_buffer());
        assert_eq!(alloc.stats().allocations, 0);
    }
}
