//! Pool configuration
//!
//! Caller-supplied scheduling parameters, validated before any planning
//! step runs.

use std::time::Duration;

use crate::error::{PoolError, Result};

/// Default ceiling on the total pool size
pub const DEFAULT_MAX_POOL_SIZE: u32 = 1000;

/// Default delay between consecutive submissions
pub const DEFAULT_SLEEP: Duration = Duration::from_millis(500);

/// Scheduling parameters for one distribution run
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// CPUs each job consumes
    pub cpus_per_job: u32,

    /// Explicit pool size; resolved from node capacity if absent
    pub pool_size: Option<u32>,

    /// Explicit per-node job cap; resolved from node capacity if absent
    pub max_jobs_per_node: Option<u32>,

    /// Hard ceiling on the resolved pool size
    pub max_pool_size: u32,

    /// Restrict scheduling to these nodes
    pub node_list: Option<Vec<String>>,

    /// Restrict scheduling to this partition
    pub partition: Option<String>,

    /// Shuffle commands before partitioning, trading determinism for
    /// load diversity
    pub shuffle: bool,

    /// Delay between consecutive submissions
    pub sleep: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            cpus_per_job: 2,
            pool_size: None,
            max_jobs_per_node: None,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            node_list: None,
            partition: None,
            shuffle: false,
            sleep: DEFAULT_SLEEP,
        }
    }
}

impl PoolConfig {
    /// Validate the configuration
    ///
    /// Caller errors here are fatal at construction, before any node is
    /// contacted.
    pub fn validate(&self) -> Result<()> {
        if self.cpus_per_job == 0 {
            return Err(PoolError::InvalidConfig(
                "cpus_per_job must be at least 1".to_string(),
            ));
        }
        if self.max_pool_size == 0 {
            return Err(PoolError::InvalidConfig(
                "max_pool_size must be at least 1".to_string(),
            ));
        }
        if self.pool_size == Some(0) {
            return Err(PoolError::InvalidConfig(
                "pool_size must be at least 1 when given".to_string(),
            ));
        }
        if self.max_jobs_per_node == Some(0) {
            return Err(PoolError::InvalidConfig(
                "max_jobs_per_node must be at least 1 when given".to_string(),
            ));
        }
        Ok(())
    }
}
