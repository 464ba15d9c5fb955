//! Node domain model
//!
//! Represents one compute node's observed state at discovery time.

/// One compute node as reported by the cluster status query
///
/// Records are created once per discovery pass and stay immutable except for
/// the `max_jobs` annotation attached during capacity planning.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node hostname (unique key)
    pub name: String,

    /// Free memory in MB
    pub free_mem: u64,

    /// Used memory in MB (total - free)
    pub used_mem: u64,

    /// Total memory in MB
    pub total_mem: u64,

    /// Availability flag from the status report (e.g. "up")
    pub avail: String,

    /// Total CPUs on the node
    pub total_cpus: u32,

    /// CPUs currently allocated
    pub used_cpus: u32,

    /// CPUs currently idle
    pub free_cpus: u32,

    /// Reported CPU load
    pub load: f64,

    /// Partition the node belongs to
    pub partition: String,

    /// Current scheduling state
    pub state: NodeState,

    /// Jobs this node can hold, attached by the capacity planner
    pub max_jobs: Option<u32>,
}

/// Scheduling state of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// No jobs running
    Idle,

    /// Partially allocated
    Mix,

    /// Fully allocated
    Alloc,

    /// Node is down
    Down,

    /// Node is draining
    Drain,

    /// Any other state string reported by the scheduler
    Other(String),
}

impl NodeState {
    /// Parse a state column value from the status report
    pub fn parse(value: &str) -> Self {
        match value {
            "idle" => NodeState::Idle,
            "mix" => NodeState::Mix,
            "alloc" => NodeState::Alloc,
            "down" => NodeState::Down,
            "drain" => NodeState::Drain,
            other => NodeState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Idle => write!(f, "idle"),
            NodeState::Mix => write!(f, "mix"),
            NodeState::Alloc => write!(f, "alloc"),
            NodeState::Down => write!(f, "down"),
            NodeState::Drain => write!(f, "drain"),
            NodeState::Other(s) => write!(f, "{}", s),
        }
    }
}
