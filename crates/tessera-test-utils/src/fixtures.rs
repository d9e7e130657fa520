//! Instrumented element types.
//!
//! - [`Counted`] records every creation, clone and drop in a shared
//!   [`Counters`] tally.
//! - [`PanicOnClone`] panics once its shared [`CloneBudget`] runs out.
//! - [`MoveOnly`] cannot be cloned at all.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Tallies {
    created: Cell<usize>,
    clones: Cell<usize>,
    drops: Cell<usize>,
}

/// Shared tally for [`Counted`] values. Clones share the tally.
#[derive(Clone, Debug, Default)]
pub struct Counters {
    tallies: Rc<Tallies>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counted value.
    pub fn make(&self, value: i32) -> Counted {
        bump(&self.tallies.created);
        Counted {
            value,
            counters: self.clone(),
        }
    }

    pub fn clones(&self) -> usize {
        self.tallies.clones.get()
    }

    pub fn drops(&self) -> usize {
        self.tallies.drops.get()
    }

    /// Values created (directly or by cloning) and not yet dropped.
    pub fn live(&self) -> usize {
        self.tallies.created.get() - self.tallies.drops.get()
    }
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

/// An element whose clones and drops are counted.
pub struct Counted {
    value: i32,
    counters: Counters,
}

impl Counted {
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        bump(&self.counters.tallies.clones);
        self.counters.make(self.value)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        bump(&self.counters.tallies.drops);
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Counted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counted({})", self.value)
    }
}

/// Number of clones [`PanicOnClone`] values may still perform.
#[derive(Clone, Debug)]
pub struct CloneBudget(Rc<Cell<usize>>);

impl CloneBudget {
    pub fn remaining(&self) -> usize {
        self.0.get()
    }

    pub fn set(&self, remaining: usize) {
        self.0.set(remaining);
    }
}

/// An element whose `clone` panics once the shared budget is spent.
#[derive(Debug)]
pub struct PanicOnClone {
    value: i32,
    budget: CloneBudget,
}

impl PanicOnClone {
    /// A budget allowing `clones` successful clones.
    pub fn budget(clones: usize) -> CloneBudget {
        CloneBudget(Rc::new(Cell::new(clones)))
    }

    pub fn new(value: i32, budget: &CloneBudget) -> Self {
        Self {
            value,
            budget: budget.clone(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        let left = self.budget.remaining();
        if left == 0 {
            panic!("clone budget exhausted");
        }
        self.budget.set(left - 1);
        Self::new(self.value, &self.budget)
    }
}

impl PartialEq for PanicOnClone {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// A value that can only be moved.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveOnly(pub i32);
