//! Execution contexts
//!
//! An [`ExecutionContext`] is the synchronization arbiter for one or more
//! [`ConcurrentMap`](crate::ConcurrentMap)s. It pairs a reader-writer gate
//! with a pool of worker threads:
//!
//! - reads hold the gate in *shared* mode and may overlap freely
//! - writes hold it in *exclusive* mode and run as barriers, excluding every
//!   read and every other write
//!
//! All gated work runs on the calling thread, which stays blocked until the
//! result is available. The worker pool drives [`ExecutionContext::concurrent_perform`].
//!
//! ```rust
//! use std::sync::Arc;
//! use synchronized_map::{ConcurrentMap, ExecutionContext};
//!
//! let context = Arc::new(ExecutionContext::inline("com.example.settings"));
//! let map: ConcurrentMap<u32> = ConcurrentMap::with_context(context);
//! assert_eq!(map.queue_label(), "com.example.settings");
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{Error, Result};

/// Label used by contexts that were not given one
pub const DEFAULT_LABEL: &str = "io.synchronized_map";

#[derive(Clone)]
enum Dispatch {
    /// Everything runs on the calling thread
    Inline,
    /// Rayon's process-wide pool
    Global,
    /// A dedicated pool
    Pool(Arc<ThreadPool>),
}

impl Dispatch {
    fn kind(&self) -> &'static str {
        match self {
            Dispatch::Inline => "inline",
            Dispatch::Global => "global",
            Dispatch::Pool(_) => "pool",
        }
    }
}

/// A labelled reader-writer gate backed by a pool of worker threads.
pub struct ExecutionContext {
    label: String,
    gate: RwLock<()>,
    dispatch: Dispatch,
}

impl ExecutionContext {
    /// Create a context that runs concurrent work on rayon's global pool.
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_parts(label.into(), Dispatch::Global)
    }

    /// Create a context that never leaves the calling thread.
    ///
    /// `concurrent_perform` runs its iterations in order, which makes this
    /// the context of choice for deterministic tests.
    pub fn inline(label: impl Into<String>) -> Self {
        Self::from_parts(label.into(), Dispatch::Inline)
    }

    /// Create a context backed by a caller-owned pool.
    pub fn with_pool(label: impl Into<String>, pool: Arc<ThreadPool>) -> Self {
        Self::from_parts(label.into(), Dispatch::Pool(pool))
    }

    /// Start configuring a context.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    fn from_parts(label: String, dispatch: Dispatch) -> Self {
        debug!(label = %label, dispatch = dispatch.kind(), "created execution context");
        Self {
            label,
            gate: RwLock::new(()),
            dispatch,
        }
    }

    /// Diagnostic label of this context
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether concurrent work stays on the calling thread
    pub fn is_inline(&self) -> bool {
        matches!(self.dispatch, Dispatch::Inline)
    }

    /// Number of worker threads available to `concurrent_perform`
    pub fn current_num_threads(&self) -> usize {
        match &self.dispatch {
            Dispatch::Inline => 1,
            Dispatch::Global => rayon::current_num_threads(),
            Dispatch::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Run `f` holding the gate in shared mode.
    ///
    /// Blocks only behind a writer that holds, or is queued for, the gate.
    #[inline]
    pub(crate) fn shared<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.gate.read();
        f()
    }

    /// Run `f` as a barrier: no other shared or exclusive holder overlaps it.
    #[inline]
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.gate.write();
        f()
    }

    /// Run `f(i)` for every `i` in `0..iterations` across this context's
    /// workers, returning once every iteration has finished.
    ///
    /// Iterations may call into maps guarded by this context; they must not
    /// assume any particular order unless the context is inline.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use synchronized_map::{ConcurrentMap, ExecutionContext};
    ///
    /// let context = Arc::new(ExecutionContext::new("perform"));
    /// let map = ConcurrentMap::with_context(Arc::clone(&context));
    /// context.concurrent_perform(100, |i| {
    ///     map.put_or_update(i.to_string(), i);
    /// });
    /// assert_eq!(map.count(), 100);
    /// ```
    pub fn concurrent_perform<F>(&self, iterations: usize, f: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        match &self.dispatch {
            Dispatch::Inline => (0..iterations).for_each(f),
            Dispatch::Global => (0..iterations).into_par_iter().for_each(f),
            Dispatch::Pool(pool) => pool.install(|| (0..iterations).into_par_iter().for_each(f)),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("label", &self.label)
            .field("dispatch", &self.dispatch.kind())
            .field("threads", &self.current_num_threads())
            .finish()
    }
}

/// Builder for [`ExecutionContext`], modelled on rayon's `ThreadPoolBuilder`.
///
/// Without a thread count or name prefix the built context shares rayon's
/// global pool; with either, it gets a dedicated pool.
#[derive(Debug, Default, Clone)]
pub struct ContextBuilder {
    label: Option<String>,
    num_threads: Option<usize>,
    thread_name_prefix: Option<String>,
    inline: bool,
}

impl ContextBuilder {
    /// Diagnostic label, defaults to [`DEFAULT_LABEL`]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Size of a dedicated worker pool
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Name dedicated workers `{prefix}-{index}`
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    /// Keep all work on the calling thread. Overrides the pool settings.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Build the context, starting a dedicated pool if one was requested.
    pub fn build(self) -> Result<ExecutionContext> {
        let label = self.label.unwrap_or_else(|| DEFAULT_LABEL.to_owned());
        if self.inline {
            return Ok(ExecutionContext::inline(label));
        }
        if self.num_threads.is_none() && self.thread_name_prefix.is_none() {
            return Ok(ExecutionContext::new(label));
        }

        let mut builder = ThreadPoolBuilder::new();
        if let Some(num_threads) = self.num_threads {
            if num_threads == 0 {
                return Err(Error::InvalidThreadCount(num_threads));
            }
            builder = builder.num_threads(num_threads);
        }
        if let Some(prefix) = self.thread_name_prefix {
            builder = builder.thread_name(move |index| format!("{prefix}-{index}"));
        }
        let pool = builder.build()?;
        Ok(ExecutionContext::with_pool(label, Arc::new(pool)))
    }
}
