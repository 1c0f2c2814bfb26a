use thiserror::Error;

/// Errors raised while configuring an execution context.
///
/// Map operations themselves never fail; absence is reported as `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// The dedicated worker pool could not be started
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    /// A dedicated pool was requested with an unusable thread count
    #[error("invalid worker thread count: {0}")]
    InvalidThreadCount(usize),
}

/// Result type for context configuration
pub type Result<T> = std::result::Result<T, Error>;
