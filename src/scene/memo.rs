//! # Memoized Builder Output
//!
//! Holds one builder result together with the input it was built from.
//! Rebuilds only when a new input is not the same as the cached one.

use std::fmt;

/// Decides whether two inputs would build the same value
pub type SameFn<K> = fn(&K, &K) -> bool;

#[derive(Clone)]
pub struct Memo<K, V> {
    key: K,
    value: V,
    same: SameFn<K>,
    builds: u64,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Memo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("builds", &self.builds)
            .finish_non_exhaustive()
    }
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    /// Memo comparing inputs with `==`
    pub fn new(key: K, build: impl FnOnce(&K) -> V) -> Self {
        Self::with_same(key, build, |a, b| a == b)
    }
}

impl<K: Clone, V> Memo<K, V> {
    /// Memo comparing inputs with `same`, for keys whose `==` is not reflexive
    /// (floats that may hold NaN)
    pub fn with_same(key: K, build: impl FnOnce(&K) -> V, same: SameFn<K>) -> Self {
        let value = build(&key);
        Self { key, value, same, builds: 1 }
    }

    /// Rebuilds when `key` differs from the cached input; returns whether it did
    pub fn refresh(&mut self, key: &K, build: impl FnOnce(&K) -> V) -> bool {
        if (self.same)(&self.key, key) {
            return false;
        }
        self.value = build(key);
        self.key = key.clone();
        self.builds += 1;
        true
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Number of times the builder has run
    pub fn builds(&self) -> u64 {
        self.builds
    }
}
