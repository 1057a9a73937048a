//! # Derivation Cache
//!
//! Memoization keyed by upstream identity.
//!
//! - [`Memo`] holds one derived value together with the upstream inputs it
//!   was computed from. It recomputes only when an input changes.
//! - [`KeyedMemo`] is the two-level form: the outer key is the upstream
//!   identity, the inner map is keyed by a query argument (a node id). When
//!   the upstream changes the whole inner map is dropped. Empty results are
//!   never stored, so the inner map only holds arguments that own data in
//!   the current input.
//!
//! Each slot is guarded by a `parking_lot::Mutex`; the guard is held while
//! the derivation runs so concurrent callers on the same input compute once
//! and share the result.

use crate::Shared;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::Hash;

// =============================================================================
// UPSTREAM IDENTITY
// =============================================================================

/// An upstream input a derivation depends on.
pub trait Upstream: Clone {
    /// True if `self` is the same input as `previous`.
    fn unchanged(&self, previous: &Self) -> bool;
}

impl<T: PartialEq> Upstream for Shared<T> {
    fn unchanged(&self, previous: &Self) -> bool {
        self.same_as(previous)
    }
}

impl<A: Upstream, B: Upstream> Upstream for (A, B) {
    fn unchanged(&self, previous: &Self) -> bool {
        self.0.unchanged(&previous.0) && self.1.unchanged(&previous.1)
    }
}

/// A derived value with a notion of emptiness.
pub trait View: Hash + Default {
    /// True if the value carries no entries.
    fn is_empty_view(&self) -> bool;
}

impl<K: Hash, V: Hash> View for BTreeMap<K, V> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Hash> View for Vec<T> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counters for one cached view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the derivation.
    pub misses: u64,
    /// Times a changed upstream discarded cached results.
    pub invalidations: u64,
}

// =============================================================================
// SINGLE-SLOT MEMO
// =============================================================================

struct MemoState<U, V> {
    entry: Option<(U, Shared<V>)>,
    stats: CacheStats,
}

/// A single cached view of an upstream input.
pub struct Memo<U, V> {
    name: &'static str,
    state: Mutex<MemoState<U, V>>,
}

impl<U: Upstream, V: Hash> Memo<U, V> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(MemoState {
                entry: None,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Return the cached value for `upstream`, deriving it if needed.
    pub fn get_or_compute(&self, upstream: &U, derive: impl FnOnce(&U) -> V) -> Shared<V> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut invalidated = false;
        if let Some((previous, value)) = state.entry.as_mut() {
            if upstream.unchanged(previous) {
                // Adopt the newer handle so later checks hit the pointer fast path.
                *previous = upstream.clone();
                let value = value.clone();
                state.stats.hits = state.stats.hits.saturating_add(1);
                tracing::trace!(view = self.name, "cache hit");
                return value;
            }
            invalidated = true;
        }

        let value = Shared::new(derive(upstream));
        if invalidated {
            state.stats.invalidations = state.stats.invalidations.saturating_add(1);
        }
        state.stats.misses = state.stats.misses.saturating_add(1);
        state.entry = Some((upstream.clone(), value.clone()));
        tracing::debug!(view = self.name, "derived view");
        value
    }

    /// The view name used in logs and statistics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Drop the cached value; statistics are kept.
    pub fn clear(&self) {
        self.state.lock().entry = None;
    }
}

// =============================================================================
// KEYED (TWO-LEVEL) MEMO
// =============================================================================

struct KeyedState<U, K, V> {
    upstream: Option<U>,
    entries: BTreeMap<K, Shared<V>>,
    /// Shared empty result for the current upstream.
    empty: Option<Shared<V>>,
    stats: CacheStats,
}

/// A cached view parameterized by a key, e.g. "ports of node N".
pub struct KeyedMemo<U, K, V> {
    name: &'static str,
    state: Mutex<KeyedState<U, K, V>>,
}

impl<U: Upstream, K: Ord + Clone, V: View> KeyedMemo<U, K, V> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(KeyedState {
                upstream: None,
                entries: BTreeMap::new(),
                empty: None,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Return the cached value for (`upstream`, `key`), deriving it if needed.
    ///
    /// A changed upstream discards every entry derived from the previous one.
    /// Keys whose result is empty are not stored; they all share one empty
    /// value per upstream.
    pub fn get_or_compute(
        &self,
        upstream: &U,
        key: &K,
        derive: impl FnOnce(&U, &K) -> V,
    ) -> Shared<V> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let unchanged = state
            .upstream
            .as_ref()
            .map(|previous| upstream.unchanged(previous));
        if unchanged == Some(false) {
            let dropped = state.entries.len();
            state.entries.clear();
            state.empty = None;
            state.stats.invalidations = state.stats.invalidations.saturating_add(1);
            tracing::debug!(view = self.name, dropped, "upstream changed, per-key cache cleared");
        }
        // Adopt the newer handle so later checks hit the pointer fast path.
        state.upstream = Some(upstream.clone());

        if let Some(value) = state.entries.get(key) {
            state.stats.hits = state.stats.hits.saturating_add(1);
            tracing::trace!(view = self.name, "cache hit");
            return value.clone();
        }

        let derived = derive(upstream, key);
        state.stats.misses = state.stats.misses.saturating_add(1);
        if derived.is_empty_view() {
            tracing::trace!(view = self.name, "empty keyed view, not stored");
            return state
                .empty
                .get_or_insert_with(|| Shared::new(V::default()))
                .clone();
        }

        let value = Shared::new(derived);
        state.entries.insert(key.clone(), value.clone());
        tracing::debug!(view = self.name, cached_keys = state.entries.len(), "derived keyed view");
        value
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Number of keys currently cached for the current upstream.
    #[must_use]
    pub fn cached_keys(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Drop every cached entry; statistics are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.upstream = None;
        state.entries.clear();
        state.empty = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn memo_reuses_value_for_same_upstream() {
        let memo: Memo<Shared<Vec<u32>>, usize> = Memo::new("len");
        let input = Shared::new(vec![1, 2, 3]);
        let runs = Cell::new(0);

        let a = memo.get_or_compute(&input, |v| {
            runs.set(runs.get() + 1);
            v.len()
        });
        let b = memo.get_or_compute(&input, |v| {
            runs.set(runs.get() + 1);
            v.len()
        });

        assert_eq!(runs.get(), 1);
        assert!(a.ptr_eq(&b));
        assert_eq!(memo.stats(), CacheStats { hits: 1, misses: 1, invalidations: 0 });
    }

    #[test]
    fn memo_treats_equal_content_as_unchanged() {
        let memo: Memo<Shared<Vec<u32>>, usize> = Memo::new("len");
        let first = memo.get_or_compute(&Shared::new(vec![1, 2]), |v| v.len());
        let second = memo.get_or_compute(&Shared::new(vec![1, 2]), |v| v.len());

        assert!(first.ptr_eq(&second));
        assert_eq!(memo.stats().misses, 1);
    }

    #[test]
    fn memo_recomputes_on_change() {
        let memo: Memo<Shared<Vec<u32>>, usize> = Memo::new("len");
        let _ = memo.get_or_compute(&Shared::new(vec![1]), |v| v.len());
        let value = memo.get_or_compute(&Shared::new(vec![1, 2]), |v| v.len());

        assert_eq!(*value, 2);
        assert_eq!(memo.stats(), CacheStats { hits: 0, misses: 2, invalidations: 1 });
    }

    #[test]
    fn memo_pair_upstream_tracks_both_inputs() {
        let memo: Memo<(Shared<u32>, Shared<u32>), u32> = Memo::new("sum");
        let a = Shared::new(1);
        let b = Shared::new(2);

        assert_eq!(*memo.get_or_compute(&(a.clone(), b.clone()), |(x, y)| **x + **y), 3);
        assert_eq!(*memo.get_or_compute(&(a, Shared::new(5)), |(x, y)| **x + **y), 6);
        assert_eq!(memo.stats().misses, 2);
    }

    fn matching(v: &Shared<Vec<u32>>, k: &u32) -> Vec<u32> {
        v.iter().copied().filter(|x| x == k).collect()
    }

    #[test]
    fn keyed_memo_caches_per_key() {
        let memo: KeyedMemo<Shared<Vec<u32>>, u32, Vec<u32>> = KeyedMemo::new("matching");
        let input = Shared::new(vec![1, 1, 2]);

        assert_eq!(memo.get_or_compute(&input, &1, matching).len(), 2);
        assert_eq!(memo.get_or_compute(&input, &2, matching).len(), 1);
        assert_eq!(memo.get_or_compute(&input, &1, matching).len(), 2);

        assert_eq!(memo.cached_keys(), 2);
        assert_eq!(memo.stats(), CacheStats { hits: 1, misses: 2, invalidations: 0 });
    }

    #[test]
    fn keyed_memo_drops_stale_keys_on_upstream_change() {
        let memo: KeyedMemo<Shared<Vec<u32>>, u32, Vec<u32>> = KeyedMemo::new("matching");

        let _ = memo.get_or_compute(&Shared::new(vec![1, 2]), &1, matching);
        let _ = memo.get_or_compute(&Shared::new(vec![1, 2]), &2, matching);
        assert_eq!(memo.cached_keys(), 2);

        let value = memo.get_or_compute(&Shared::new(vec![1, 1]), &1, matching);
        assert_eq!(value.len(), 2);
        assert_eq!(memo.cached_keys(), 1);
        assert_eq!(memo.stats().invalidations, 1);
    }

    #[test]
    fn keyed_memo_does_not_store_empty_results() {
        let memo: KeyedMemo<Shared<Vec<u32>>, u32, Vec<u32>> = KeyedMemo::new("matching");
        let input = Shared::new(vec![1]);

        let first = memo.get_or_compute(&input, &100, matching);
        for key in 101..1_000 {
            assert!(memo.get_or_compute(&input, &key, matching).is_empty());
        }
        let last = memo.get_or_compute(&input, &100, matching);

        assert_eq!(memo.cached_keys(), 0);
        assert!(first.ptr_eq(&last));

        let _ = memo.get_or_compute(&input, &1, matching);
        assert_eq!(memo.cached_keys(), 1);
    }

    #[test]
    fn clear_forces_recomputation() {
        let memo: Memo<Shared<u32>, u32> = Memo::new("id");
        let input = Shared::new(4);
        let _ = memo.get_or_compute(&input, |v| **v);
        memo.clear();
        let _ = memo.get_or_compute(&input, |v| **v);
        assert_eq!(memo.stats().misses, 2);
    }
}
