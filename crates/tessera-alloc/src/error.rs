//! Allocation error type.

use std::alloc::Layout;

/// An allocator could not satisfy a request.
///
/// Carries the [`Layout`] that was asked for so callers can decide whether
/// a smaller request is worth retrying. Containers never retry internally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("memory allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// Create an error for the given failed request.
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout that could not be allocated.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_size_and_align() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let err = AllocError::new(layout);
        assert_eq!(
            err.to_string(),
            "memory allocation of 64 bytes (align 8) failed"
        );
    }

    #[test]
    fn layout_preserved() {
        let layout = Layout::new::<[u32; 4]>();
        assert_eq!(AllocError::new(layout).layout(), layout);
    }
}
