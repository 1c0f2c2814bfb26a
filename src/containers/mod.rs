//! Synchronized containers
//!
//! - [`ConcurrentMap`]: a string-keyed map guarded by an [`ExecutionContext`](crate::ExecutionContext)

pub mod concurrent_map;

#[cfg(test)]
mod proptests;

pub use self::concurrent_map::ConcurrentMap;

/// Minimal map interface usable through a shared reference.
///
/// Every implementor handles its own synchronization, so callers can share
/// one instance between threads without wrapping it in a lock.
pub trait SyncMap<V> {
    /// Insert or overwrite, returning the replaced value
    fn insert(&self, k: String, v: V) -> Option<V>;

    /// Owned copy of the value stored under `k`
    fn get(&self, k: &str) -> Option<V>;

    /// Remove `k`, returning the value it held
    fn remove(&self, k: &str) -> Option<V>;

    fn contains_key(&self, k: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
