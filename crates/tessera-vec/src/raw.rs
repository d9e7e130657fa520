//! Owned storage blocks.
//!
//! A [`RawBuf`] is the arena behind every container: a contiguous block of
//! `capacity` uninitialised slots together with the allocator that owns it.
//! It knows nothing about which slots are live; that bookkeeping belongs to
//! the container. Dropping a `RawBuf` returns the block to its allocator
//! without running any element destructor.
//!
//! Zero-sized element types never reach the allocator: their blocks are a
//! dangling, well-aligned pointer and the capacity is purely logical.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use tessera_alloc::Allocator;
use tracing::debug;

use crate::error::VecError;

pub(crate) struct RawBuf<T, A: Allocator> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: a RawBuf owns its block exclusively, like a Box<[T]>.
unsafe impl<T: Send, A: Allocator + Send> Send for RawBuf<T, A> {}
// SAFETY: shared access only hands out shared pointers to T.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawBuf<T, A> {}

impl<T, A: Allocator> RawBuf<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// An empty buffer that holds no block.
    pub(crate) fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    /// Allocate a block of exactly `cap` slots.
    ///
    /// Fails with `CapacityOverflow` if `cap` slots cannot be described by
    /// a `Layout`, or `AllocationFailure` if the allocator refuses.
    pub(crate) fn with_capacity_in(cap: usize, alloc: A) -> Result<Self, VecError> {
        if cap == 0 || Self::IS_ZST {
            let mut buf = Self::new_in(alloc);
            buf.cap = cap;
            return Ok(buf);
        }
        let layout = Self::layout_for(cap)?;
        let ptr = alloc.allocate(layout).map_err(|err| {
            debug!(
                slots = cap,
                bytes = layout.size(),
                element = std::any::type_name::<T>(),
                "block allocation failed"
            );
            VecError::from(err)
        })?;
        Ok(Self {
            ptr: ptr.cast(),
            cap,
            alloc,
            _owns: PhantomData,
        })
    }

    /// Largest slot count a block of `T` can have.
    pub(crate) fn max_slots() -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            isize::MAX as usize / mem::size_of::<T>()
        }
    }

    fn layout_for(cap: usize) -> Result<Layout, VecError> {
        Layout::array::<T>(cap).map_err(|_| {
            debug!(
                requested = cap,
                element = std::any::type_name::<T>(),
                "capacity overflow"
            );
            VecError::CapacityOverflow {
                requested: cap,
                max: Self::max_slots(),
            }
        })
    }

    /// Start of the block (dangling when no block is held).
    pub(crate) fn ptr(&self) -> NonNull<T> {
        self.ptr
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Whether a real block is currently held.
    pub(crate) fn has_block(&self) -> bool {
        self.cap != 0 && !Self::IS_ZST
    }

    /// Pointer to slot `index`.
    ///
    /// `index` may equal the capacity (one-past-the-end) but not exceed it.
    pub(crate) fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.cap || Self::IS_ZST);
        // SAFETY: `index <= cap`, so the offset stays inside (or one past)
        // the allocated block. For ZSTs the offset is zero bytes.
        unsafe { self.ptr.add(index) }
    }

    /// Exchange blocks with `other`, keeping each side's allocator.
    ///
    /// Only sound when the two allocators compare equal (or both sides hold
    /// no block), since each block will later be freed by the other side.
    pub(crate) fn swap_blocks(&mut self, other: &mut Self) {
        debug_assert!(
            self.alloc.is_equal(&other.alloc) || (!self.has_block() && !other.has_block())
        );
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }

    /// Replace the allocator. The buffer must not hold a block.
    pub(crate) fn replace_allocator(&mut self, alloc: A) -> A {
        debug_assert!(!self.has_block());
        mem::replace(&mut self.alloc, alloc)
    }

    /// Return the block to the allocator and become empty.
    pub(crate) fn release(&mut self) {
        if self.has_block() {
            // SAFETY: `layout_for(self.cap)` validated this layout when the
            // block was allocated.
            let layout = unsafe {
                Layout::from_size_align_unchecked(
                    mem::size_of::<T>() * self.cap,
                    mem::align_of::<T>(),
                )
            };
            // SAFETY: the block came from `self.alloc.allocate(layout)` (or an
            // allocator equal to it, via `swap_blocks`) and is released once.
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T, A: Allocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}
