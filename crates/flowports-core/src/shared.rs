//! # Shared Collections
//!
//! `Shared<T>` is the unit of cache identity. It pairs an `Arc<T>` with a
//! content fingerprint computed once, at construction.
//!
//! Change detection (`same_as`) is:
//! 1. pointer identity: the same allocation is unchanged, O(1)
//! 2. fingerprint mismatch: the content differs, O(1)
//! 3. otherwise full equality, which only runs when the fingerprints agree
//!
//! So a collection rebuilt with identical content compares as unchanged,
//! and an edited collection is detected without a deep comparison.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, reference-counted value with a content fingerprint.
pub struct Shared<T> {
    value: Arc<T>,
    fingerprint: u64,
}

impl<T: Hash> Shared<T> {
    /// Wrap a value, computing its fingerprint.
    #[must_use]
    pub fn new(value: T) -> Self {
        let fingerprint = fingerprint_of(&value);
        Self {
            value: Arc::new(value),
            fingerprint,
        }
    }
}

impl<T> Shared<T> {
    /// The content fingerprint computed at construction.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// True if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T: PartialEq> Shared<T> {
    /// True if `other` holds the same content, by identity or by value.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.fingerprint != other.fingerprint {
            return false;
        }
        *self.value == *other.value
    }
}

fn fingerprint_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fingerprint: self.fingerprint,
        }
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> AsRef<T> for Shared<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: Hash + Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Hash> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl<T: Eq> Eq for Shared<T> {}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: Serialize> Serialize for Shared<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

// =============================================================================
// TESTS
// =============================================================================
