//! Test utilities and instrumented types for Tessera development.
//!
//! Provides [`TestAllocator`], an [`Allocator`] that keeps a ledger of
//! every live block, counts allocator traffic, can be told to fail, and
//! carries configurable propagation predicates. Element fixtures that count
//! clones and drops live in [`fixtures`].

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CloneBudget, Counted, Counters, MoveOnly, PanicOnClone};

use std::alloc::Layout;
use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use tessera_alloc::{AllocError, Allocator, Global, Propagation};

static NEXT_POOL: AtomicUsize = AtomicUsize::new(1);

/// Snapshot of a pool's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Calls to `allocate`, including refused ones.
    pub attempts: usize,
    /// Blocks handed out.
    pub allocations: usize,
    /// Blocks returned.
    pub deallocations: usize,
    /// Blocks currently outstanding.
    pub live_blocks: usize,
    /// Bytes currently outstanding.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
    /// Elements constructed through the allocator.
    pub constructs: usize,
    /// Elements destroyed through the allocator.
    pub destroys: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    /// Live blocks by address, in allocation order.
    ledger: IndexMap<usize, Layout>,
    stats: AllocStats,
    /// 1-based attempt number that will be refused.
    fail_at: Option<usize>,
}

#[derive(Debug)]
struct Pool {
    id: usize,
    propagation: Propagation,
    /// `select_on_copy` hands out a new pool instead of a clone.
    fresh_on_copy: bool,
    state: RefCell<PoolState>,
}

/// Instrumented allocator for tests.
///
/// Clones share one pool and compare equal; allocators created separately
/// never do. Blocks come from [`Global`]; the pool only records them.
/// Returning a block the pool does not know about (a double free or a
/// foreign pointer) panics.
///
/// Not `Send`: a pool belongs to one test thread.
#[derive(Clone, Debug)]
pub struct TestAllocator {
    pool: Rc<Pool>,
}

impl TestAllocator {
    /// A fresh pool with no propagation predicates set.
    pub fn new() -> Self {
        Self::build(Propagation::NONE, None, false)
    }

    /// A fresh pool whose `select_on_copy` returns a new, unequal pool
    /// (with the same settings) when `fresh_pool` is set, and a clone of
    /// itself otherwise.
    pub fn with_copy_selection(fresh_pool: bool) -> Self {
        Self::build(Propagation::NONE, None, fresh_pool)
    }

    /// A fresh pool with the given propagation predicates.
    pub fn with_propagation(propagation: Propagation) -> Self {
        Self::build(propagation, None, false)
    }

    /// A fresh pool that refuses its `n`th allocation attempt (1-based).
    pub fn failing_at(n: usize) -> Self {
        Self::build(Propagation::NONE, Some(n), false)
    }

    fn build(propagation: Propagation, fail_at: Option<usize>, fresh_on_copy: bool) -> Self {
        Self {
            pool: Rc::new(Pool {
                id: NEXT_POOL.fetch_add(1, Ordering::Relaxed),
                propagation,
                fresh_on_copy,
                state: RefCell::new(PoolState {
                    fail_at,
                    ..PoolState::default()
                }),
            }),
        }
    }

    /// Refuse the next allocation attempt.
    pub fn fail_next(&self) {
        let mut state = self.pool.state.borrow_mut();
        state.fail_at = Some(state.stats.attempts + 1);
    }

    /// Identity of the shared pool.
    pub fn pool_id(&self) -> usize {
        self.pool.id
    }

    pub fn stats(&self) -> AllocStats {
        let state = self.pool.state.borrow();
        AllocStats {
            live_blocks: state.ledger.len(),
            live_bytes: state.ledger.values().map(Layout::size).sum(),
            ..state.stats
        }
    }

    pub fn live_blocks(&self) -> usize {
        self.pool.state.borrow().ledger.len()
    }

    /// Panic if any block is still outstanding.
    pub fn assert_no_leaks(&self) {
        let state = self.pool.state.borrow();
        assert!(
            state.ledger.is_empty(),
            "pool {} leaked {} block(s): {:?}",
            self.pool.id,
            state.ledger.len(),
            state.ledger.values().collect::<Vec<_>>()
        );
    }
}

impl Default for TestAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every block is obtained from `Global` with the caller's layout and
// released to `Global` with the recorded layout. Clones share one pool, so
// any clone may free a block another clone allocated, matching `is_equal`.
unsafe impl Allocator for TestAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let mut state = self.pool.state.borrow_mut();
        state.stats.attempts += 1;
        if state.fail_at == Some(state.stats.attempts) {
            state.fail_at = None;
            return Err(AllocError::new(layout));
        }
        let ptr = Global.allocate(layout)?;
        if layout.size() != 0 {
            state.ledger.insert(ptr.as_ptr() as usize, layout);
            state.stats.allocations += 1;
            let live: usize = state.ledger.values().map(Layout::size).sum();
            state.stats.peak_bytes = state.stats.peak_bytes.max(live);
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            let mut state = self.pool.state.borrow_mut();
            let addr = ptr.as_ptr() as usize;
            match state.ledger.shift_remove(&addr) {
                Some(recorded) => assert_eq!(
                    recorded, layout,
                    "block {addr:#x} returned with a different layout"
                ),
                None => panic!(
                    "pool {} does not own block {addr:#x} (double free or foreign block)",
                    self.pool.id
                ),
            }
            state.stats.deallocations += 1;
        }
        // SAFETY: the ledger confirmed this block came from `Global` with
        // `layout` and has not been returned before.
        unsafe { Global.deallocate(ptr, layout) }
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        self.pool.state.borrow_mut().stats.constructs += 1;
        // SAFETY: forwarded to the caller.
        unsafe { slot.as_ptr().write(value) }
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // Not borrowed across the drop: the element may own blocks from
        // this pool.
        self.pool.state.borrow_mut().stats.destroys += 1;
        // SAFETY: forwarded to the caller.
        unsafe { std::ptr::drop_in_place(slot.as_ptr()) }
    }

    fn is_equal(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pool, &other.pool)
    }

    fn propagate_on_copy_assignment(&self) -> bool {
        self.pool.propagation.on_copy
    }

    fn propagate_on_move_assignment(&self) -> bool {
        self.pool.propagation.on_move
    }

    fn propagate_on_swap(&self) -> bool {
        self.pool.propagation.on_swap
    }

    fn select_on_copy(&self) -> Self {
        if self.pool.fresh_on_copy {
            Self::build(self.pool.propagation, None, true)
        } else {
            self.clone()
        }
    }
}

/// Install a `tracing` subscriber for test output, filtered by `RUST_LOG`
/// (default `debug`). Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact().with_test_writer())
        .try_init();
}
