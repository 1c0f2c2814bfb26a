//! String-keyed concurrent map
//!
//! [`ConcurrentMap`] keeps a plain `HashMap<String, V>` behind the
//! reader-writer gate of an [`ExecutionContext`]. Reads take the gate in
//! shared mode and overlap with each other; writes take it in exclusive mode
//! and run as barriers.
//!
//! Every operation blocks the caller until it has actually run under the
//! gate. A write that reports a result, such as [`ConcurrentMap::remove`],
//! reports the outcome of the mutation it performed, and any read issued
//! after it returns observes that mutation.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use synchronized_map::ConcurrentMap;
//!
//! let map = Arc::new(ConcurrentMap::new());
//!
//! let writers: Vec<_> = (0..4)
//!     .map(|t| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || {
//!             for i in 0..250 {
//!                 map.put_or_update(format!("{t}-{i}"), i);
//!             }
//!         })
//!     })
//!     .collect();
//! for writer in writers {
//!     writer.join().unwrap();
//! }
//!
//! assert_eq!(map.count(), 1000);
//! assert_eq!(map.remove("3-7"), Some(7));
//! assert_eq!(map.get("3-7"), None);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::SyncMap;
use crate::cell::GuardedCell;
use crate::context::ExecutionContext;

/// A string-keyed map that is safe to share between threads.
///
/// Any number of reads may run at once; a write excludes all reads and all
/// other writes for its duration. The synchronization context is chosen at
/// construction and never changes. Several maps may share one context, in
/// which case a write to any of them excludes access to all of them.
pub struct ConcurrentMap<V> {
    context: Arc<ExecutionContext>,
    entries: GuardedCell<HashMap<String, V>>,
}

impl<V> ConcurrentMap<V> {
    /// Create an empty map with its own default context.
    pub fn new() -> Self {
        Self::with_context_and_map(Arc::new(ExecutionContext::default()), HashMap::new())
    }

    /// Create an empty map synchronized through `context`.
    pub fn with_context(context: Arc<ExecutionContext>) -> Self {
        Self::with_context_and_map(context, HashMap::new())
    }

    /// Create a map pre-populated with `initial`, using its own default context.
    pub fn from_map(initial: HashMap<String, V>) -> Self {
        Self::with_context_and_map(Arc::new(ExecutionContext::default()), initial)
    }

    /// Create a map pre-populated with `initial` and synchronized through `context`.
    pub fn with_context_and_map(context: Arc<ExecutionContext>, initial: HashMap<String, V>) -> Self {
        debug!(label = %context.label(), entries = initial.len(), "created concurrent map");
        Self {
            context,
            entries: GuardedCell::new(initial),
        }
    }

    /// The context arbitrating access to this map
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    /// Diagnostic label of the context in use
    pub fn queue_label(&self) -> &str {
        self.context.label()
    }

    /// Consume the map and return its entries.
    pub fn into_map(self) -> HashMap<String, V> {
        self.entries.into_inner()
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&HashMap<String, V>) -> R) -> R {
        // SAFETY: the gate is held in shared mode while `f` runs, and `R`
        // cannot borrow from the entries.
        self.context.shared(|| f(unsafe { self.entries.get() }))
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut HashMap<String, V>) -> R) -> R {
        // SAFETY: the gate is held in exclusive mode while `f` runs, and `R`
        // cannot borrow from the entries.
        self.context.exclusive(|| f(unsafe { self.entries.get_mut() }))
    }

    // Reads

    /// Number of entries at the time of the call
    pub fn count(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(HashMap::is_empty)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read(|entries| entries.contains_key(key))
    }

    /// Snapshot of the current keys
    pub fn keys(&self) -> HashSet<String> {
        self.read(|entries| entries.keys().cloned().collect())
    }

    // Writes

    /// Insert `value` under `key`, overwriting any previous value.
    ///
    /// Returns the value that was replaced.
    pub fn put_or_update(&self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        trace!(label = %self.context.label(), key = %key, "put_or_update");
        self.write(|entries| entries.insert(key, value))
    }

    /// Insert `value` under `key` only if the key is missing.
    ///
    /// The presence check and the insert run as one exclusive step. Returns
    /// `true` if the value was inserted.
    pub fn put_if_absent(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let inserted = self.write(|entries| {
            if entries.contains_key(&key) {
                return false;
            }
            entries.insert(key.clone(), value);
            true
        });
        trace!(label = %self.context.label(), key = %key, inserted, "put_if_absent");
        inserted
    }

    /// Remove `key`, returning the value it held once the removal has run.
    pub fn remove(&self, key: &str) -> Option<V> {
        let removed = self.write(|entries| entries.remove(key));
        trace!(label = %self.context.label(), key, removed = removed.is_some(), "remove");
        removed
    }

    /// Insert every pair of `other`, overwriting existing keys, as a single
    /// exclusive batch.
    ///
    /// Readers observe either none or all of the merged pairs.
    pub fn merge<K, I>(&self, other: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        // Drain the caller's iterator before taking the gate; it may call back into this map.
        let pairs: Vec<(String, V)> = other.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let merged = pairs.len();
        self.write(|entries| entries.extend(pairs));
        trace!(label = %self.context.label(), merged, "merge");
    }

    /// Remove every entry.
    pub fn remove_all(&self) {
        self.write(HashMap::clear);
        trace!(label = %self.context.label(), "remove_all");
    }
}

impl<V: Clone> ConcurrentMap<V> {
    /// Snapshot of the current values, in no particular order
    pub fn values(&self) -> Vec<V> {
        self.read(|entries| entries.values().cloned().collect())
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.read(|entries| entries.get(key).cloned())
    }

    /// Copy of the whole mapping at the time of the call
    pub fn get_all(&self) -> HashMap<String, V> {
        self.read(|entries| entries.clone())
    }

    /// The value stored under `key`, or `default` if there is none
    pub fn get_or_default(&self, key: &str, default: V) -> V {
        self.read(|entries| entries.get(key).cloned()).unwrap_or(default)
    }
}

impl<V: PartialEq> ConcurrentMap<V> {
    /// Whether any stored value equals `value`
    pub fn contains_value(&self, value: &V) -> bool {
        self.read(|entries| entries.values().any(|v| v == value))
    }
}

impl<V> Default for ConcurrentMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<HashMap<String, V>> for ConcurrentMap<V> {
    fn from(initial: HashMap<String, V>) -> Self {
        Self::from_map(initial)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ConcurrentMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<V> fmt::Debug for ConcurrentMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("label", &self.queue_label())
            .field("count", &self.count())
            .finish()
    }
}

impl<V: Clone> SyncMap<V> for ConcurrentMap<V> {
    fn insert(&self, k: String, v: V) -> Option<V> {
        self.put_or_update(k, v)
    }

    fn get(&self, k: &str) -> Option<V> {
        ConcurrentMap::get(self, k)
    }

    fn remove(&self, k: &str) -> Option<V> {
        ConcurrentMap::remove(self, k)
    }

    fn contains_key(&self, k: &str) -> bool {
        ConcurrentMap::contains_key(self, k)
    }

    fn len(&self) -> usize {
        self.count()
    }

    fn is_empty(&self) -> bool {
        ConcurrentMap::is_empty(self)
    }
}
