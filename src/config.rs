// src/config.rs

//! Run configuration.
//!
//! Loaded once at startup and threaded explicitly through the pipeline;
//! never re-read during a run.

/// Default ceiling for simultaneous artifact downloads
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Process-wide configuration for one prefetch run
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of simultaneous downloads within one fetch batch
    pub concurrency_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl Config {
    /// Configuration with an explicit concurrency limit (zero is clamped to one)
    pub fn with_concurrency_limit(limit: usize) -> Self {
        Self {
            concurrency_limit: limit.max(1),
        }
    }
}
