//! Set under test.
//!
//! The measurement loops only need three operations from a set: create it
//! with a capacity, insert a value, and empty it while keeping the
//! allocation. Any set implementation can be benchmarked by implementing
//! [`InsertSet`].

use std::collections::HashSet;

/// Minimal set capability exercised by the add benchmarks.
pub trait InsertSet {
    /// Empty set with room for at least `capacity` values.
    fn with_capacity(capacity: u32) -> Self
    where
        Self: Sized;

    /// Insert `value`; inserting a present value is a no-op.
    fn add(&mut self, value: u64);

    /// Remove all values, keeping the allocation.
    fn clear(&mut self);
}

/// Reference set backed by the standard library's [`HashSet`].
#[derive(Debug, Clone, Default)]
pub struct NativeSet {
    inner: HashSet<u64>,
}

impl NativeSet {
    /// Whether `value` is present.
    pub fn contains(&self, value: u64) -> bool {
        self.inner.contains(&value)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set holds no value.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Allocated capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

impl InsertSet for NativeSet {
    fn with_capacity(capacity: u32) -> Self {
        Self {
            inner: HashSet::with_capacity(capacity as usize),
        }
    }

    #[inline]
    fn add(&mut self, value: u64) {
        self.inner.insert(value);
    }

    #[inline]
    fn clear(&mut self) {
        self.inner.clear();
    }
}
