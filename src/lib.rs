//! # synchronized_map
//!
//! A string-keyed map that many threads can use at once, with
//! multiple-reader / single-writer semantics and no lock exposed to callers.
//!
//! - [`ConcurrentMap`]: the map itself
//! - [`ExecutionContext`]: the labelled reader-writer gate and worker pool a
//!   map synchronizes through. A default one is created per map; pass your
//!   own to share it between maps or to make tests deterministic.
//!
//! ## Quick Start
//!
//! ```rust
//! use synchronized_map::ConcurrentMap;
//!
//! let map = ConcurrentMap::new();
//! map.put_or_update("answer", 42);
//! assert_eq!(map.get("answer"), Some(42));
//! assert_eq!(map.get_or_default("question", 0), 0);
//! assert_eq!(map.remove("answer"), Some(42));
//! assert!(map.is_empty());
//! ```

mod cell;
pub mod containers;
pub mod context;
pub mod error;

pub use crate::containers::{ConcurrentMap, SyncMap};
pub use crate::context::{ContextBuilder, ExecutionContext, DEFAULT_LABEL};
pub use crate::error::{Error, Result};
