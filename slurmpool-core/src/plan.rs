//! Full planning pass
//!
//! Ties discovery, filtering, ordering, capacity, and pool-size
//! resolution together into one fallible construction step. Partial plans
//! are never acted upon: any error here aborts the run before a single
//! job is submitted.

use tracing::info;

use crate::capacity::{self, NodeContribution, SmtProbe};
use crate::catalog::{self, NodeFilter};
use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::node::NodeRecord;

/// A fully resolved scheduling plan
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    /// Qualifying nodes in canonical load order, annotated with capacity
    pub nodes: Vec<NodeRecord>,

    /// Per-node slot contributions in canonical order
    pub contributions: Vec<NodeContribution>,

    /// CPUs per job after the multithreading adjustment
    pub cpus_per_job: u32,

    /// Resolved per-node job cap
    pub max_jobs_per_node: u32,

    /// Resolved pool size
    pub pool_size: u32,
}

/// Build a plan from a raw status report and a validated configuration
///
/// The report is plain text injected by the caller, so planning runs
/// without any external process call.
pub fn plan(report: &str, config: &PoolConfig, probe: &dyn SmtProbe) -> Result<ResolvedPlan> {
    config.validate()?;

    let records = catalog::parse_report(report)?;

    let filter = NodeFilter {
        node_list: config.node_list.clone(),
        partition: config.partition.clone(),
        min_free_cpus: config.cpus_per_job,
        ..Default::default()
    };
    let mut nodes = filter.apply(records);
    if nodes.is_empty() {
        return Err(PoolError::NoQualifyingNodes);
    }
    info!("found {} available nodes", nodes.len());

    catalog::sort_by_load(&mut nodes);

    let capacity = capacity::plan_capacity(
        &mut nodes,
        config.cpus_per_job,
        config.max_jobs_per_node,
        probe,
    )?;
    let pool_size = capacity::resolve_pool_size(
        &capacity.contributions,
        config.pool_size,
        config.max_pool_size,
    )?;

    Ok(ResolvedPlan {
        nodes,
        contributions: capacity.contributions,
        cpus_per_job: capacity.cpus_per_job,
        max_jobs_per_node: capacity.max_jobs_per_node,
        pool_size,
    })
}
