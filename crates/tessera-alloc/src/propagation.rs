//! Allocator propagation flags.

/// Which container operations make the receiving side adopt the other
/// side's allocator.
///
/// Allocators whose propagation behaviour is decided at runtime store one
/// of these and forward the `propagate_on_*` predicates of
/// [`Allocator`](crate::Allocator) to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Propagation {
    /// Copy-assignment adopts the source's allocator.
    pub on_copy: bool,
    /// Move-assignment adopts the source's allocator.
    pub on_move: bool,
    /// Swap exchanges allocators.
    pub on_swap: bool,
}

impl Propagation {
    /// Never propagate: each container keeps the allocator it was built with.
    pub const NONE: Self = Self {
        on_copy: false,
        on_move: false,
        on_swap: false,
    };

    /// Always propagate.
    pub const ALL: Self = Self {
        on_copy: true,
        on_move: true,
        on_swap: true,
    };

    /// Set the copy-assignment flag.
    pub const fn with_copy(mut self, on: bool) -> Self {
        self.on_copy = on;
        self
    }

    /// Set the move-assignment flag.
    pub const fn with_move(mut self, on: bool) -> Self {
        self.on_move = on;
        self
    }

    /// Set the swap flag.
    pub const fn with_swap(mut self, on: bool) -> Self {
        self.on_swap = on;
        self
    }
}
