//! Capacity planning
//!
//! Computes per-node job capacity, the global per-node cap, and the
//! resolved pool size. All planning errors are fatal to plan construction;
//! there is no partial-success mode.

use tracing::{debug, warn};

use crate::error::{PoolError, Result};
use crate::node::NodeRecord;

/// Probe for simultaneous multithreading on a node
///
/// Only consulted when the configured CPUs per job is odd. Backed by an
/// external `scontrol` query in production and by a test double in tests.
pub trait SmtProbe {
    /// Whether the node schedules two threads per core
    fn smt_enabled(&self, node: &str) -> Result<bool>;
}

/// Slots one node contributes to the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContribution {
    /// Node hostname
    pub node: String,

    /// Partition the node belongs to, needed at submission time
    pub partition: String,

    /// Number of slots the node contributes
    pub slots: u32,
}

/// Result of capacity planning over the qualifying nodes
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityPlan {
    /// CPUs per job after the multithreading adjustment
    pub cpus_per_job: u32,

    /// Resolved per-node job cap
    pub max_jobs_per_node: u32,

    /// Per-node slot contributions in canonical node order
    pub contributions: Vec<NodeContribution>,
}

/// Compute per-node capacity and the resolved per-node cap
///
/// When `cpus_per_job` is odd, nodes are probed in canonical order for
/// simultaneous multithreading; the first hit bumps `cpus_per_job` by one
/// and stops the probe. Every per-node capacity is computed after that
/// adjustment, so all nodes use the final value.
///
/// A node whose idle CPUs cannot fit a single job is retained with a zero
/// contribution. An explicit cap larger than any node can provide fails
/// with [`PoolError::Capacity`] rather than being clamped.
pub fn plan_capacity(
    nodes: &mut [NodeRecord],
    cpus_per_job: u32,
    max_jobs_per_node: Option<u32>,
    probe: &dyn SmtProbe,
) -> Result<CapacityPlan> {
    if nodes.is_empty() {
        return Err(PoolError::NoQualifyingNodes);
    }

    let mut cpus_per_job = cpus_per_job;
    if cpus_per_job % 2 == 1 {
        for node in nodes.iter() {
            if probe.smt_enabled(&node.name)? {
                cpus_per_job += 1;
                warn!(
                    "hyperthreading is enabled on {}, cpus_per_job is set to {}",
                    node.name, cpus_per_job
                );
                break;
            }
        }
    }

    for node in nodes.iter_mut() {
        node.max_jobs = Some(node.free_cpus / cpus_per_job);
    }

    let available = nodes
        .iter()
        .filter_map(|n| n.max_jobs)
        .max()
        .unwrap_or(0);

    let max_jobs_per_node = match max_jobs_per_node {
        Some(requested) if requested > available => {
            return Err(PoolError::Capacity {
                requested,
                available,
            });
        }
        Some(requested) => requested,
        None => available,
    };

    let contributions = nodes
        .iter()
        .map(|n| NodeContribution {
            node: n.name.clone(),
            partition: n.partition.clone(),
            slots: n.max_jobs.unwrap_or(0).min(max_jobs_per_node),
        })
        .collect();

    debug!(
        "capacity plan: cpus_per_job={}, max_jobs_per_node={}",
        cpus_per_job, max_jobs_per_node
    );

    Ok(CapacityPlan {
        cpus_per_job,
        max_jobs_per_node,
        contributions,
    })
}

/// Resolve the pool size against what the nodes can hold
///
/// The available pool is the total contribution, capped by
/// `max_pool_size`. An explicit pool size larger than that fails with
/// [`PoolError::PoolSize`]; otherwise the explicit value wins, falling
/// back to the available pool.
pub fn resolve_pool_size(
    contributions: &[NodeContribution],
    pool_size: Option<u32>,
    max_pool_size: u32,
) -> Result<u32> {
    let total: u32 = contributions.iter().map(|c| c.slots).sum();
    let available = total.min(max_pool_size);

    match pool_size {
        Some(requested) if requested > available => Err(PoolError::PoolSize {
            requested,
            available,
        }),
        Some(requested) => Ok(requested),
        None => Ok(available),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::node::NodeState;

    /// Probe double that reports SMT for a chosen set of nodes and
    /// records every probe it receives.
    struct FakeProbe {
        smt_nodes: Vec<&'static str>,
        probed: RefCell<Vec<String>>,
    }

    impl FakeProbe {
        fn new(smt_nodes: Vec<&'static str>) -> Self {
            Self {
                smt_nodes,
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl SmtProbe for FakeProbe {
        fn smt_enabled(&self, node: &str) -> Result<bool> {
            self.probed.borrow_mut().push(node.to_string());
            Ok(self.smt_nodes.contains(&node))
        }
    }

    fn node(name: &str, free_cpus: u32, load: f64) -> NodeRecord {
        NodeRecord {
            name: name.to_string(),
            free_mem: 64000,
            used_mem: 0,
            total_mem: 64000,
            avail: "up".to_string(),
            total_cpus: free_cpus,
            used_cpus: 0,
            free_cpus,
            load,
            partition: "cpuPartition".to_string(),
            state: NodeState::Idle,
            max_jobs: None,
        }
    }

    #[test]
    fn test_plan_capacity() {
        let mut nodes = vec![node("a", 8, 0.1), node("b", 4, 0.5)];
        let probe = FakeProbe::new(vec![]);

        let plan = plan_capacity(&mut nodes, 2, None, &probe).unwrap();
        assert_eq!(plan.cpus_per_job, 2);
        assert_eq!(plan.max_jobs_per_node, 4);
        assert_eq!(plan.contributions[0].slots, 4);
        assert_eq!(plan.contributions[1].slots, 2);
        assert_eq!(nodes[0].max_jobs, Some(4));
        assert_eq!(nodes[1].max_jobs, Some(2));
        // Even cpus_per_job never probes.
        assert!(probe.probed.borrow().is_empty());
    }

    #[test]
    fn test_plan_capacity_explicit_cap() {
        let mut nodes = vec![node("a", 8, 0.1), node("b", 4, 0.5)];
        let plan = plan_capacity(&mut nodes, 2, Some(3), &FakeProbe::new(vec![])).unwrap();
        assert_eq!(plan.max_jobs_per_node, 3);
        assert_eq!(plan.contributions[0].slots, 3);
        assert_eq!(plan.contributions[1].slots, 2);
    }

    #[test]
    fn test_plan_capacity_cap_above_available_fails() {
        let mut nodes = vec![node("a", 8, 0.1), node("b", 4, 0.5)];
        let err = plan_capacity(&mut nodes, 2, Some(5), &FakeProbe::new(vec![])).unwrap_err();
        match err {
            PoolError::Capacity {
                requested,
                available,
            } => {
                assert_eq!(requested, 5);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_capacity_no_nodes() {
        let err = plan_capacity(&mut [], 2, None, &FakeProbe::new(vec![])).unwrap_err();
        assert!(matches!(err, PoolError::NoQualifyingNodes));
    }

    #[test]
    fn test_smt_adjustment_stops_at_first_hit() {
        let mut nodes = vec![node("a", 8, 0.1), node("b", 4, 0.5)];
        let probe = FakeProbe::new(vec!["a"]);

        let plan = plan_capacity(&mut nodes, 3, None, &probe).unwrap();
        assert_eq!(plan.cpus_per_job, 4);
        // All capacities use the adjusted value.
        assert_eq!(nodes[0].max_jobs, Some(2));
        assert_eq!(nodes[1].max_jobs, Some(1));
        assert_eq!(*probe.probed.borrow(), vec!["a".to_string()]);
    }

    #[test]
    fn test_smt_adjustment_probes_every_node_without_hit() {
        let mut nodes = vec![node("a", 9, 0.1), node("b", 3, 0.5)];
        let probe = FakeProbe::new(vec![]);

        let plan = plan_capacity(&mut nodes, 3, None, &probe).unwrap();
        assert_eq!(plan.cpus_per_job, 3);
        assert_eq!(nodes[0].max_jobs, Some(3));
        assert_eq!(nodes[1].max_jobs, Some(1));
        assert_eq!(
            *probe.probed.borrow(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_zero_capacity_node_is_retained() {
        let mut nodes = vec![node("a", 8, 0.1), node("b", 1, 0.5)];
        let plan = plan_capacity(&mut nodes, 2, None, &FakeProbe::new(vec![])).unwrap();
        assert_eq!(plan.contributions.len(), 2);
        assert_eq!(plan.contributions[1].slots, 0);
    }

    fn contributions(slots: &[u32]) -> Vec<NodeContribution> {
        slots
            .iter()
            .enumerate()
            .map(|(i, s)| NodeContribution {
                node: format!("n{i}"),
                partition: "p".to_string(),
                slots: *s,
            })
            .collect()
    }

    #[test]
    fn test_resolve_pool_size_defaults_to_available() {
        assert_eq!(resolve_pool_size(&contributions(&[4, 2]), None, 1000).unwrap(), 6);
    }

    #[test]
    fn test_resolve_pool_size_capped_by_max() {
        assert_eq!(resolve_pool_size(&contributions(&[4, 2]), None, 5).unwrap(), 5);
    }

    #[test]
    fn test_resolve_pool_size_explicit() {
        assert_eq!(resolve_pool_size(&contributions(&[4, 2]), Some(4), 1000).unwrap(), 4);
    }

    #[test]
    fn test_resolve_pool_size_explicit_above_available_fails() {
        let err = resolve_pool_size(&contributions(&[4, 2]), Some(10), 1000).unwrap_err();
        match err {
            PoolError::PoolSize {
                requested,
                available,
            } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
