//! Growth configuration.

use crate::error::VecError;

/// Capacity growth parameters for a [`Vector`](crate::Vector).
///
/// Controls how much a full container grows on a tail insertion. Growth
/// is always multiplicative so that `n` sequential pushes cost `O(n)`
/// relocations in total. Validated by [`GrowthConfig::try_new`] and by
/// every constructor that accepts one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrowthConfig {
    /// Multiplier applied to the current capacity when a full container
    /// needs one more slot.
    ///
    /// Default: 2. Must be at least 2.
    pub factor: usize,

    /// Capacity of the first allocation made by a tail insertion.
    ///
    /// `None` (the default) derives the floor from the element size:
    /// 8 slots for 1-byte elements, 4 for elements up to 1 KiB, 1 above.
    pub min_capacity: Option<usize>,
}

impl GrowthConfig {
    /// Default growth multiplier.
    pub const DEFAULT_FACTOR: usize = 2;

    /// Element size above which the derived floor drops to a single slot.
    pub const LARGE_ELEMENT_BYTES: usize = 1024;

    /// Create the default configuration (doubling, size-derived floor).
    pub const fn new() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            min_capacity: None,
        }
    }

    /// Create a validated configuration.
    pub fn try_new(factor: usize, min_capacity: Option<usize>) -> Result<Self, VecError> {
        let config = Self {
            factor,
            min_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration's invariants.
    pub fn validate(&self) -> Result<(), VecError> {
        if self.factor < 2 {
            return Err(VecError::InvalidGrowth {
                reason: format!("factor must be at least 2, got {}", self.factor),
            });
        }
        Ok(())
    }

    /// First-allocation floor for elements of type `T`.
    pub fn floor_for<T>(&self) -> usize {
        if let Some(min) = self.min_capacity {
            return min;
        }
        match std::mem::size_of::<T>() {
            1 => 8,
            n if n <= Self::LARGE_ELEMENT_BYTES => 4,
            _ => 1,
        }
    }

    /// Capacity to grow to when `required` slots are needed and the
    /// container currently holds `current`.
    ///
    /// Never less than `required`. Saturates instead of overflowing; the
    /// caller clamps the result against the element type's maximum.
    pub fn next_capacity<T>(&self, current: usize, required: usize) -> usize {
        current
            .saturating_mul(self.factor)
            .max(required)
            .max(self.floor_for::<T>())
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self::new()
    }
}
