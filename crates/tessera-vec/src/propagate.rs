//! Copy, move and swap between vectors, honouring the allocator's
//! equality and propagation predicates.
//!
//! | operation        | allocators equal      | differ, predicate set | differ, predicate unset    |
//! |------------------|-----------------------|-----------------------|----------------------------|
//! | `assign_copy`    | copy under own        | copy under source's   | copy under own             |
//! | `assign_move`    | steal block           | adopt alloc + block   | relocate elements (basic)  |
//! | `swap`           | exchange blocks       | exchange everything   | `AllocatorMismatch`        |
//!
//! The predicates consulted are always those of the receiving vector's
//! allocator.

use std::mem;

use tessera_alloc::Allocator;
use tracing::debug;

use crate::error::VecError;
use crate::lifecycle;
use crate::raw::RawBuf;
use crate::vector::Vector;

impl<T, A: Allocator> Vector<T, A> {
    /// Copy into a new vector using the allocator's
    /// [`select_on_copy`](Allocator::select_on_copy). Strong guarantee.
    pub fn try_clone(&self) -> Result<Self, VecError>
    where
        T: Clone,
    {
        let mut copy = Self::from_slice_in(self.as_slice(), self.allocator().select_on_copy())?;
        copy.growth = self.growth;
        Ok(copy)
    }

    /// Copy into a new vector backed by `alloc`.
    pub fn try_clone_in<B: Allocator>(&self, alloc: B) -> Result<Vector<T, B>, VecError>
    where
        T: Clone,
    {
        let mut copy = Vector::from_slice_in(self.as_slice(), alloc)?;
        copy.growth = self.growth;
        Ok(copy)
    }

    /// Move the contents out, leaving `self` empty with no block.
    ///
    /// No element is cloned or relocated; the block changes hands.
    pub fn take(&mut self) -> Self {
        let mut moved = Self::from_parts(RawBuf::new_in(self.allocator().clone()), self.growth);
        moved.take_block_from(self);
        moved
    }

    /// Move `source`'s contents into a vector backed by `alloc`.
    ///
    /// Steals the block when `alloc` equals `source`'s allocator.
    /// Otherwise relocates the elements into a block obtained from `alloc`;
    /// `source` is emptied only once that succeeded.
    pub fn try_move_in(source: &mut Self, alloc: A) -> Result<Self, VecError> {
        let mut target = Self::from_parts(RawBuf::new_in(alloc), source.growth);
        if target.allocator().is_equal(source.allocator()) {
            target.take_block_from(source);
        } else {
            target.relocate_from(source)?;
        }
        Ok(target)
    }

    /// Replace the contents with a copy of `source`.
    ///
    /// The copy is built completely before the old contents are released,
    /// so on failure `self` is unchanged. `self` keeps its growth
    /// configuration.
    pub fn assign_copy(&mut self, source: &Self) -> Result<(), VecError>
    where
        T: Clone,
    {
        let adopt = self.allocator().propagate_on_copy_assignment()
            && !self.allocator().is_equal(source.allocator());
        let alloc = if adopt {
            debug!(len = source.len, "copy assignment adopts the source allocator");
            source.allocator().clone()
        } else {
            self.allocator().clone()
        };

        let mut copy = Self::from_slice_in(source.as_slice(), alloc)?;
        copy.growth = self.growth;
        copy.generation = self.generation.wrapping_add(1);
        // The old contents leave with `copy`.
        mem::swap(self, &mut copy);
        Ok(())
    }

    /// Replace the contents with `source`'s, leaving `source` empty.
    ///
    /// When the allocators are equal, or the receiving allocator propagates
    /// on move, the block changes hands and nothing is relocated. Otherwise
    /// the elements are relocated into a block from `self`'s allocator.
    /// That path has only the basic guarantee: `self` is cleared first, and
    /// if the allocation fails it stays empty while `source` keeps its
    /// elements.
    pub fn assign_move(&mut self, source: &mut Self) -> Result<(), VecError> {
        let propagate = self.allocator().propagate_on_move_assignment();
        if propagate || self.allocator().is_equal(source.allocator()) {
            self.clear();
            self.buf.release();
            if propagate && !self.allocator().is_equal(source.allocator()) {
                debug!(len = source.len, "move assignment adopts the source allocator");
                self.buf.replace_allocator(source.allocator().clone());
            }
            self.growth = source.growth;
            self.take_block_from(source);
            return Ok(());
        }

        debug!(
            len = source.len,
            "move assignment between unequal allocators relocates elements"
        );
        self.clear();
        self.growth = source.growth;
        self.relocate_from(source)
    }

    /// Exchange contents with `other` in O(1) without touching elements.
    ///
    /// This hides the slice method `swap(i, j)` reached through `Deref`;
    /// to exchange two elements use `as_mut_slice().swap(i, j)`.
    ///
    /// Allocators are exchanged only when this vector's allocator
    /// propagates on swap; otherwise they must compare equal, or the call
    /// fails with [`VecError::AllocatorMismatch`] and nothing changes.
    ///
    /// ```
    /// use tessera_vec::Vector;
    ///
    /// let mut a: Vector<i32> = Vector::from([1, 2, 3]);
    /// let mut b: Vector<i32> = Vector::from([9]);
    /// a.swap(&mut b).unwrap();
    /// assert_eq!((a.as_slice(), b.as_slice()), (&[9][..], &[1, 2, 3][..]));
    ///
    /// b.as_mut_slice().swap(0, 2);
    /// assert_eq!(b, [3, 2, 1]);
    /// ```
    pub fn swap(&mut self, other: &mut Self) -> Result<(), VecError> {
        if self.allocator().propagate_on_swap() {
            mem::swap(self, other);
        } else if self.allocator().is_equal(other.allocator()) {
            self.buf.swap_blocks(&mut other.buf);
            mem::swap(&mut self.len, &mut other.len);
            mem::swap(&mut self.growth, &mut other.growth);
        } else {
            return Err(VecError::AllocatorMismatch);
        }
        self.bump_generation();
        other.bump_generation();
        Ok(())
    }

    /// Relocate every element of `source` into `self`'s allocator.
    ///
    /// `self` must be empty. `source` ends up empty with no block on
    /// success and untouched on failure.
    fn relocate_from(&mut self, source: &mut Self) -> Result<(), VecError> {
        debug_assert_eq!(self.len, 0);
        self.reserve(source.len)?;
        // SAFETY: `source` holds `len` live elements, `self` has at least as
        // many vacant slots, and the blocks are distinct.
        unsafe { lifecycle::relocate(source.buf.ptr(), self.buf.ptr(), source.len) };
        self.len = mem::take(&mut source.len);
        source.buf.release();
        source.bump_generation();
        self.bump_generation();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_alloc::Propagation;
    use tessera_test_utils::{Counted, Counters, TestAllocator};

    fn counted(
        counters: &Counters,
        values: &[i32],
        alloc: &TestAllocator,
    ) -> Vector<Counted, TestAllocator> {
        let mut vec = Vector::new_in(alloc.clone());
        for &v in values {
            vec.push_back(counters.make(v)).unwrap();
        }
        vec
    }

    fn values<A: Allocator>(vec: &Vector<Counted, A>) -> Vec<i32> {
        vec.iter().map(|c| c.value()).collect()
    }

    #[test]
    fn try_clone_is_equal_and_independent() {
        let alloc = TestAllocator::new();
        let mut original = Vector::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();
        let copy = original.try_clone().unwrap();
        assert_eq!(copy.as_slice(), original.as_slice());
        assert_ne!(copy.as_ptr(), original.as_ptr());
        assert!(copy.allocator().is_equal(&alloc));

        original[0] = 100;
        assert_eq!(copy.as_slice(), [1, 2, 3]);
    }

    #[test]
    fn copies_use_the_selected_allocator() {
        let alloc = TestAllocator::with_copy_selection(true);
        let original = Vector::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();

        let copy = original.try_clone().unwrap();
        assert_eq!(copy.as_slice(), [1, 2, 3]);
        assert_ne!(copy.allocator().pool_id(), alloc.pool_id());
        assert_eq!(copy.allocator().live_blocks(), 1);

        let cloned = original.clone();
        assert_ne!(cloned.allocator().pool_id(), alloc.pool_id());
        assert_ne!(cloned.allocator().pool_id(), copy.allocator().pool_id());
        assert_eq!(alloc.live_blocks(), 1);
    }

    #[test]
    fn try_clone_in_ignores_copy_selection() {
        let alloc = TestAllocator::with_copy_selection(true);
        let original = Vector::from_slice_in(&[1, 2], alloc.clone()).unwrap();
        let copy = original.try_clone_in(alloc.clone()).unwrap();
        assert_eq!(copy.allocator().pool_id(), alloc.pool_id());
        assert_eq!(alloc.live_blocks(), 2);
    }

    #[test]
    fn try_clone_keeps_growth() {
        let growth = crate::GrowthConfig::try_new(3, Some(5)).unwrap();
        let mut vec = Vector::with_growth_in(growth, TestAllocator::new()).unwrap();
        vec.push_back(1).unwrap();
        assert_eq!(vec.try_clone().unwrap().growth(), growth);
    }

    #[test]
    fn try_clone_failure_reports_and_leaks_nothing() {
        let alloc = TestAllocator::new();
        let vec = Vector::from_slice_in(&[1u8, 2], alloc.clone()).unwrap();
        alloc.fail_next();
        assert!(matches!(vec.try_clone(), Err(VecError::AllocationFailure(_))));
        assert_eq!(alloc.live_blocks(), 1);
    }

    #[test]
    fn try_clone_in_uses_target_allocator() {
        let source_pool = TestAllocator::new();
        let target_pool = TestAllocator::new();
        let vec = Vector::from_slice_in(&[4, 5], source_pool.clone()).unwrap();
        let copy = vec.try_clone_in(target_pool.clone()).unwrap();
        assert_eq!(copy.as_slice(), [4, 5]);
        assert_eq!(target_pool.live_blocks(), 1);
        assert_eq!(source_pool.live_blocks(), 1);
    }

    #[test]
    fn take_moves_block_without_clones() {
        let counters = Counters::new();
        let alloc = TestAllocator::new();
        let mut source = counted(&counters, &[1, 2, 3], &alloc);
        let block = source.as_ptr();

        let moved = source.take();
        assert_eq!(values(&moved), [1, 2, 3]);
        assert_eq!(moved.as_ptr(), block);
        assert!(source.is_empty());
        assert!(!source.has_buffer());
        assert_eq!(counters.clones(), 0);
        assert_eq!(alloc.live_blocks(), 1);
    }

    #[test]
    fn try_move_in_equal_allocator_steals() {
        let counters = Counters::new();
        let alloc = TestAllocator::new();
        let mut source = counted(&counters, &[7, 8], &alloc);
        let block = source.as_ptr();
        let target = Vector::try_move_in(&mut source, alloc.clone()).unwrap();
        assert_eq!(target.as_ptr(), block);
        assert!(!source.has_buffer());
        assert_eq!(counters.clones(), 0);
    }

    #[test]
    fn try_move_in_other_allocator_relocates() {
        let counters = Counters::new();
        let source_pool = TestAllocator::new();
        let target_pool = TestAllocator::new();
        let mut source = counted(&counters, &[7, 8, 9], &source_pool);

        let target = Vector::try_move_in(&mut source, target_pool.clone()).unwrap();
        assert_eq!(values(&target), [7, 8, 9]);
        assert!(source.is_empty());
        assert!(!source.has_buffer());
        assert_eq!(counters.clones(), 0);
        assert_eq!(counters.live(), 3);
        source_pool.assert_no_leaks();
        assert_eq!(target_pool.live_blocks(), 1);
    }

    #[test]
    fn try_move_in_failure_keeps_source() {
        let counters = Counters::new();
        let source_pool = TestAllocator::new();
        let mut source = counted(&counters, &[1, 2], &source_pool);
        let result = Vector::try_move_in(&mut source, TestAllocator::failing_at(1));
        assert!(result.is_err());
        assert_eq!(values(&source), [1, 2]);
    }

    #[test]
    fn assign_copy_without_propagation_keeps_own_allocator() {
        let target_pool = TestAllocator::new();
        let source_pool = TestAllocator::new();
        let mut target = Vector::from_slice_in(&[1], target_pool.clone()).unwrap();
        let source = Vector::from_slice_in(&[2, 3, 4], source_pool.clone()).unwrap();

        target.assign_copy(&source).unwrap();
        assert_eq!(target.as_slice(), [2, 3, 4]);
        assert_eq!(target.allocator().pool_id(), target_pool.pool_id());
        assert_eq!(target_pool.live_blocks(), 1);
    }

    #[test]
    fn assign_copy_with_propagation_adopts_source_allocator() {
        let target_pool = TestAllocator::with_propagation(Propagation::NONE.with_copy(true));
        let source_pool = TestAllocator::new();
        let mut target = Vector::from_slice_in(&[1], target_pool.clone()).unwrap();
        let source = Vector::from_slice_in(&[2, 3], source_pool.clone()).unwrap();

        target.assign_copy(&source).unwrap();
        assert_eq!(target.as_slice(), [2, 3]);
        assert_eq!(target.allocator().pool_id(), source_pool.pool_id());
        target_pool.assert_no_leaks();
        assert_eq!(source_pool.live_blocks(), 2);
    }

    #[test]
    fn assign_copy_failure_leaves_target() {
        let alloc = TestAllocator::new();
        let mut target = Vector::from_slice_in(&[1, 2], alloc.clone()).unwrap();
        let source = Vector::from_slice_in(&[3, 4, 5], alloc.clone()).unwrap();
        alloc.fail_next();
        assert!(target.assign_copy(&source).is_err());
        assert_eq!(target.as_slice(), [1, 2]);
    }

    #[test]
    fn assign_move_equal_allocators_steals() {
        let counters = Counters::new();
        let alloc = TestAllocator::new();
        let mut target = counted(&counters, &[0], &alloc);
        let mut source = counted(&counters, &[5, 6], &alloc);
        let block = source.as_ptr();

        target.assign_move(&mut source).unwrap();
        assert_eq!(values(&target), [5, 6]);
        assert_eq!(target.as_ptr(), block);
        assert!(!source.has_buffer());
        assert_eq!(counters.live(), 2);
        assert_eq!(counters.clones(), 0);
        assert_eq!(alloc.live_blocks(), 1);
    }

    #[test]
    fn assign_move_with_propagation_adopts_allocator() {
        let counters = Counters::new();
        let target_pool = TestAllocator::with_propagation(Propagation::NONE.with_move(true));
        let source_pool = TestAllocator::new();
        let mut target = counted(&counters, &[0, 0], &target_pool);
        let mut source = counted(&counters, &[1, 2, 3], &source_pool);
        let block = source.as_ptr();

        target.assign_move(&mut source).unwrap();
        assert_eq!(target.as_ptr(), block);
        assert_eq!(target.allocator().pool_id(), source_pool.pool_id());
        assert_eq!(counters.clones(), 0);
        target_pool.assert_no_leaks();
        drop(target);
        drop(source);
        source_pool.assert_no_leaks();
    }

    #[test]
    fn assign_move_fallback_relocates_into_own_allocator() {
        let counters = Counters::new();
        let target_pool = TestAllocator::new();
        let source_pool = TestAllocator::new();
        let mut target = counted(&counters, &[0], &target_pool);
        let mut source = counted(&counters, &[1, 2, 3, 4, 5], &source_pool);

        target.assign_move(&mut source).unwrap();
        assert_eq!(values(&target), [1, 2, 3, 4, 5]);
        assert_eq!(target.allocator().pool_id(), target_pool.pool_id());
        assert!(source.is_empty());
        assert!(!source.has_buffer());
        assert_eq!(counters.clones(), 0);
        assert_eq!(counters.live(), 5);
        source_pool.assert_no_leaks();
    }

    #[test]
    fn assign_move_fallback_failure_empties_target_only() {
        let target_pool = TestAllocator::new();
        let source_pool = TestAllocator::new();
        let mut target = Vector::from_slice_in(&[9], target_pool.clone()).unwrap();
        let mut source = Vector::from_slice_in(&[1, 2, 3], source_pool.clone()).unwrap();
        target_pool.fail_next();

        assert!(target.assign_move(&mut source).is_err());
        assert!(target.is_empty());
        assert_eq!(source.as_slice(), [1, 2, 3]);
    }

    #[test]
    fn swap_exchanges_without_clones() {
        let counters = Counters::new();
        let alloc = TestAllocator::new();
        let mut a = counted(&counters, &[1, 2, 3], &alloc);
        let mut b = counted(&counters, &[4], &alloc);
        let (cap_a, cap_b) = (a.capacity(), b.capacity());
        let (block_a, block_b) = (a.as_ptr(), b.as_ptr());

        a.swap(&mut b).unwrap();
        assert_eq!((a.as_ptr(), b.as_ptr()), (block_b, block_a));
        assert_eq!(values(&a), [4]);
        assert_eq!(values(&b), [1, 2, 3]);
        assert_eq!(a.capacity(), cap_b);
        assert_eq!(b.capacity(), cap_a);
        assert_eq!(counters.clones(), 0);
    }

    #[test]
    fn swap_with_propagation_exchanges_allocators() {
        let left_pool = TestAllocator::with_propagation(Propagation::NONE.with_swap(true));
        let right_pool = TestAllocator::new();
        let mut a = Vector::from_slice_in(&[1], left_pool.clone()).unwrap();
        let mut b = Vector::from_slice_in(&[2, 3], right_pool.clone()).unwrap();

        a.swap(&mut b).unwrap();
        assert_eq!(a.as_slice(), [2, 3]);
        assert_eq!(a.allocator().pool_id(), right_pool.pool_id());
        assert_eq!(b.allocator().pool_id(), left_pool.pool_id());
    }

    #[test]
    fn swap_between_unequal_allocators_is_refused() {
        let mut a = Vector::from_slice_in(&[1], TestAllocator::new()).unwrap();
        let mut b = Vector::from_slice_in(&[2], TestAllocator::new()).unwrap();
        assert_eq!(a.swap(&mut b), Err(VecError::AllocatorMismatch));
        assert_eq!(a.as_slice(), [1]);
        assert_eq!(b.as_slice(), [2]);
    }
}
