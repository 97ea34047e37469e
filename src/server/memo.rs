//! Resolve-once caches for server metadata.
//!
//! A [`Memo`] holds one lazily fetched value; a [`KeyedMemo`] holds one per key.
//! The first caller runs the fetch, concurrent callers wait for it, and later
//! callers get the stored value. A failed fetch stores nothing, so the next
//! caller fetches again.

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A value fetched at most once (on success).
#[derive(Debug)]
pub struct Memo<T> {
    cell: OnceCell<T>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Returns the stored value, running `fetch` if nothing is stored yet.
    pub async fn get_or_fetch<E, F, Fut>(&self, fetch: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(fetch).await
    }

    /// The stored value, if a fetch has succeeded.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

/// One [`Memo`] per key.
#[derive(Debug)]
pub struct KeyedMemo<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Arc<Memo<V>>>,
}

impl<K: Eq + Hash, V> Default for KeyedMemo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> KeyedMemo<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of keys that have been requested so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> KeyedMemo<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Returns a clone of the value stored for `key`, fetching it on first use.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // The map guard must be released before awaiting.
        let memo = Arc::clone(self.entries.entry(key).or_default().value());
        memo.get_or_fetch(fetch).await.cloned()
    }
}
