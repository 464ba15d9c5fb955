//! High-level pool facade
//!
//! Runs the whole pipeline: one discovery call, planning in the core,
//! partitioning, and the sequential submission loop, ending with the
//! persisted ledger.

use anyhow::Result;
use slurmpool_core::config::PoolConfig;
use slurmpool_core::driver::{RunContext, SubmissionDriver, SubmissionLedger};
use slurmpool_core::partition::{assign, partition};
use slurmpool_core::plan::{self, ResolvedPlan};
use tracing::info;

use crate::SlurmClient;
use crate::ledger;

/// A planned pool of submission slots over the qualifying nodes
///
/// Construction performs discovery and full planning; any planning error
/// aborts before a single job is submitted. The pool is immutable once
/// built — to change parameters, build a new one.
pub struct SlurmPool {
    client: SlurmClient,
    config: PoolConfig,
    plan: ResolvedPlan,
    context: RunContext,
}

impl SlurmPool {
    /// Discover nodes and resolve a plan for the given configuration
    pub fn new(config: PoolConfig) -> Result<Self> {
        let client = SlurmClient::new();
        let report = client.node_report()?;
        let plan = plan::plan(&report, &config, &client)?;

        Ok(Self {
            client,
            config,
            plan,
            context: RunContext::new(),
        })
    }

    /// The resolved plan
    pub fn plan(&self) -> &ResolvedPlan {
        &self.plan
    }

    /// The run context scoping this pool's scripts and logs
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Distribute commands over the pool and submit every slot
    ///
    /// The pool size is clamped to the command count, so short command
    /// lists never produce empty tasks. Returns the completed ledger,
    /// which is also persisted under the run root.
    pub fn multi_submit(
        &self,
        commands: Vec<String>,
        job_name: &str,
    ) -> Result<SubmissionLedger> {
        let job_count = commands.len();
        let chunks = partition(commands, self.plan.pool_size, self.config.shuffle);
        let assignments = assign(&self.plan.contributions, chunks.len() as u32);

        info!(
            "{} jobs to execute, allocated to {} tasks",
            job_count,
            chunks.len()
        );
        info!("each task will use {} cpus", self.plan.cpus_per_job);
        info!("used {} nodes", assignments.len());

        let driver = SubmissionDriver::new(
            &self.context,
            &self.client,
            self.plan.cpus_per_job,
            self.config.sleep,
        );
        let ledger = driver.submit_all(&assignments, &chunks, job_name);

        ledger::persist_ledger(&self.context, &ledger)?;
        Ok(ledger)
    }

    /// Build one command per parameter and submit the lot
    ///
    /// Convenience wrapper over [`SlurmPool::multi_submit`] for callers
    /// that derive their command lines from structured inputs.
    pub fn map<T, F>(&self, f: F, params: &[T], job_name: &str) -> Result<SubmissionLedger>
    where
        F: Fn(&T) -> String,
    {
        let commands = params.iter().map(|p| f(p)).collect();
        self.multi_submit(commands, job_name)
    }
}
