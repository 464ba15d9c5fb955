//! Error types for pool planning and submission

use thiserror::Error;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur while planning or submitting a pool
#[derive(Debug, Error)]
pub enum PoolError {
    /// The node status report was missing, empty, or malformed
    #[error("node discovery failed: {0}")]
    Discovery(String),

    /// Every discovered node was eliminated by the configured filters
    #[error("no nodes qualify after filtering")]
    NoQualifyingNodes,

    /// The caller asked for more per-node parallelism than any node provides
    #[error("max_jobs_per_node should not be larger than {available}, requested {requested}")]
    Capacity {
        /// Requested jobs per node
        requested: u32,
        /// Largest per-node capacity among qualifying nodes
        available: u32,
    },

    /// The caller asked for a larger pool than the qualifying nodes can hold
    #[error("pool_size should not be larger than {available}, requested {requested}")]
    PoolSize {
        /// Requested pool size
        requested: u32,
        /// Maximum pool size the qualifying nodes support
        available: u32,
    },

    /// The caller-supplied configuration is unusable
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A single external submission call failed
    #[error("submission failed: {0}")]
    Submission(String),
}

impl PoolError {
    /// Create a discovery error from a message
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery(message.into())
    }

    /// Create a submission error from a message
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    /// Check if this error is fatal to plan construction
    ///
    /// Planning errors abort the run before any job is submitted;
    /// submission errors are scoped to a single slot.
    pub fn is_planning_error(&self) -> bool {
        !matches!(self, Self::Submission(_))
    }
}
