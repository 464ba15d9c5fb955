//! Node catalog
//!
//! Parses the raw tabular node status report into [`NodeRecord`]s and
//! provides the filtering and canonical ordering used by the planner.
//!
//! The report is injected as text so everything here stays unit-testable
//! without any external process call.

use tracing::debug;

use crate::error::{PoolError, Result};
use crate::node::{NodeRecord, NodeState};

/// Expected column count of the status report
///
/// Columns: name, free mem, total mem, avail, cpus, A/I/O/T cpu quad,
/// load, partition, state.
const REPORT_FIELDS: usize = 9;

/// Parse a raw node status report into node records
///
/// Lines may be double-quoted and the header line (starting with
/// `HOSTNAMES`) is skipped. A row with the wrong field count or an
/// unparsable numeric column is a discovery error, as is a report with no
/// node rows at all.
pub fn parse_report(raw: &str) -> Result<Vec<NodeRecord>> {
    let mut records = Vec::new();

    for line in raw.lines() {
        let line = line.trim().trim_matches('"');
        if line.is_empty() || line.starts_with("HOSTNAMES") {
            continue;
        }
        records.push(parse_line(line)?);
    }

    if records.is_empty() {
        return Err(PoolError::discovery("status report contained no nodes"));
    }

    debug!("parsed {} node records from status report", records.len());
    Ok(records)
}

/// Parse a single report row
fn parse_line(line: &str) -> Result<NodeRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != REPORT_FIELDS {
        return Err(PoolError::discovery(format!(
            "expected {} fields, found {} in line '{}'",
            REPORT_FIELDS,
            fields.len(),
            line
        )));
    }

    let free_mem = parse_u64(fields[1], line)?;
    let total_mem = parse_u64(fields[2], line)?;
    let total_cpus = fields[4]
        .parse::<u32>()
        .map_err(|_| malformed("cpu count", fields[4], line))?;

    // The cpu column is an allocated/idle/other/total quad; only the
    // allocated and idle components are used.
    let mut quad = fields[5].split('/');
    let used_cpus = quad
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| malformed("allocated cpus", fields[5], line))?;
    let free_cpus = quad
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| malformed("idle cpus", fields[5], line))?;

    let load = if fields[6] == "N/A" {
        0.0
    } else {
        fields[6]
            .parse::<f64>()
            .map_err(|_| malformed("load", fields[6], line))?
    };

    Ok(NodeRecord {
        name: fields[0].to_string(),
        free_mem,
        used_mem: total_mem.saturating_sub(free_mem),
        total_mem,
        avail: fields[3].to_string(),
        total_cpus,
        used_cpus,
        free_cpus,
        load,
        partition: fields[7].to_string(),
        state: NodeState::parse(fields[8]),
        max_jobs: None,
    })
}

/// Parse a numeric memory column, treating `N/A` as zero
fn parse_u64(value: &str, line: &str) -> Result<u64> {
    if value == "N/A" {
        return Ok(0);
    }
    value
        .parse::<u64>()
        .map_err(|_| malformed("memory", value, line))
}

fn malformed(what: &str, value: &str, line: &str) -> PoolError {
    PoolError::discovery(format!("unparsable {} '{}' in line '{}'", what, value, line))
}

/// Node restriction applied before capacity planning
///
/// Each restriction is independently skippable; restrictions compose by
/// intersection. An empty result is legitimate at this layer — the planner
/// turns it into [`PoolError::NoQualifyingNodes`].
#[derive(Debug, Clone)]
pub struct NodeFilter {
    /// Restrict to these node names, if given
    pub node_list: Option<Vec<String>>,

    /// Restrict to this partition, if given
    pub partition: Option<String>,

    /// Accepted scheduling states
    pub states: Vec<NodeState>,

    /// Minimum idle CPUs a node must have to be retained
    pub min_free_cpus: u32,
}

impl Default for NodeFilter {
    fn default() -> Self {
        Self {
            node_list: None,
            partition: None,
            states: vec![NodeState::Idle, NodeState::Mix],
            min_free_cpus: 0,
        }
    }
}

impl NodeFilter {
    /// Apply the filter, keeping the input order of retained records
    pub fn apply(&self, records: Vec<NodeRecord>) -> Vec<NodeRecord> {
        let mut records = records;

        if let Some(names) = &self.node_list {
            records.retain(|r| names.iter().any(|n| n == &r.name));
        }
        if let Some(partition) = &self.partition {
            records.retain(|r| &r.partition == partition);
        }
        records.retain(|r| self.states.contains(&r.state));
        records.retain(|r| r.free_cpus >= self.min_free_cpus);

        records
    }
}

/// Sort records ascending by (load, used memory, used CPUs)
///
/// This is the canonical node order used everywhere downstream: least
/// loaded first, then least memory pressure, then least CPU pressure.
/// The sort is stable, so two runs against the same report produce the
/// same order.
pub fn sort_by_load(records: &mut [NodeRecord]) {
    records.sort_by(|a, b| {
        a.load
            .total_cmp(&b.load)
            .then_with(|| a.used_mem.cmp(&b.used_mem))
            .then_with(|| a.used_cpus.cmp(&b.used_cpus))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = r#"HOSTNAMES FREE_MEM MEMORY AVAIL CPUS CPUS(A/I/O/T) CPU_LOAD PARTITION STATE
"cpu01 51200 64000 up 32 4/28/0/32 0.50 cpuPartition mix"
"cpu02 64000 64000 up 32 0/32/0/32 0.10 cpuPartition idle"
"cpu03 1024 64000 up 32 32/0/0/32 31.90 cpuPartition alloc"
"gpu01 N/A N/A up 64 0/64/0/64 N/A gpuPartition idle"
"#;

    fn sample_nodes() -> Vec<NodeRecord> {
        parse_report(SAMPLE_REPORT).unwrap()
    }

    #[test]
    fn test_parse_report() {
        let nodes = sample_nodes();
        assert_eq!(nodes.len(), 4);

        let cpu01 = &nodes[0];
        assert_eq!(cpu01.name, "cpu01");
        assert_eq!(cpu01.free_mem, 51200);
        assert_eq!(cpu01.used_mem, 12800);
        assert_eq!(cpu01.total_mem, 64000);
        assert_eq!(cpu01.avail, "up");
        assert_eq!(cpu01.total_cpus, 32);
        assert_eq!(cpu01.used_cpus, 4);
        assert_eq!(cpu01.free_cpus, 28);
        assert_eq!(cpu01.load, 0.5);
        assert_eq!(cpu01.partition, "cpuPartition");
        assert_eq!(cpu01.state, NodeState::Mix);
        assert_eq!(cpu01.max_jobs, None);
    }

    #[test]
    fn test_parse_report_not_available_columns_are_zero() {
        let nodes = sample_nodes();
        let gpu01 = nodes.iter().find(|n| n.name == "gpu01").unwrap();
        assert_eq!(gpu01.free_mem, 0);
        assert_eq!(gpu01.total_mem, 0);
        assert_eq!(gpu01.load, 0.0);
    }

    #[test]
    fn test_parse_report_wrong_field_count() {
        let err = parse_report("cpu01 51200 64000 up 32\n").unwrap_err();
        assert!(matches!(err, PoolError::Discovery(_)));
        assert!(err.to_string().contains("expected 9 fields"));
    }

    #[test]
    fn test_parse_report_bad_cpu_quad() {
        let err = parse_report("cpu01 51200 64000 up 32 whole 0.50 cpuPartition mix\n").unwrap_err();
        assert!(matches!(err, PoolError::Discovery(_)));
    }

    #[test]
    fn test_parse_report_empty() {
        let err = parse_report("HOSTNAMES FREE_MEM MEMORY AVAIL CPUS CPUS(A/I/O/T) CPU_LOAD PARTITION STATE\n")
            .unwrap_err();
        assert!(matches!(err, PoolError::Discovery(_)));
    }

    #[test]
    fn test_filter_default_keeps_idle_and_mix() {
        let kept = NodeFilter::default().apply(sample_nodes());
        let names: Vec<&str> = kept.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cpu01", "cpu02", "gpu01"]);
    }

    #[test]
    fn test_filter_node_list_preserves_record_order() {
        let filter = NodeFilter {
            node_list: Some(vec!["cpu02".to_string(), "cpu01".to_string()]),
            ..Default::default()
        };
        let kept = filter.apply(sample_nodes());
        let names: Vec<&str> = kept.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cpu01", "cpu02"]);
    }

    #[test]
    fn test_filter_partition() {
        let filter = NodeFilter {
            partition: Some("gpuPartition".to_string()),
            ..Default::default()
        };
        let kept = filter.apply(sample_nodes());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "gpu01");
    }

    #[test]
    fn test_filter_min_free_cpus() {
        let filter = NodeFilter {
            min_free_cpus: 32,
            ..Default::default()
        };
        let kept = filter.apply(sample_nodes());
        let names: Vec<&str> = kept.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cpu02", "gpu01"]);
    }

    #[test]
    fn test_filter_states_compose_by_intersection() {
        let filter = NodeFilter {
            node_list: Some(vec!["cpu01".to_string()]),
            states: vec![NodeState::Idle],
            ..Default::default()
        };
        // cpu01 is in the node list but its state is mix, so nothing survives.
        assert!(filter.apply(sample_nodes()).is_empty());
    }

    #[test]
    fn test_sort_by_load() {
        let mut nodes = sample_nodes();
        sort_by_load(&mut nodes);
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["gpu01", "cpu02", "cpu01", "cpu03"]);
    }

    #[test]
    fn test_sort_by_load_is_idempotent() {
        let mut once = sample_nodes();
        sort_by_load(&mut once);
        let mut twice = once.clone();
        sort_by_load(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_by_load_tie_breaks() {
        let mut nodes = sample_nodes();
        for node in nodes.iter_mut() {
            node.load = 1.0;
        }
        sort_by_load(&mut nodes);
        // Same load everywhere, so used memory decides; cpu02 and gpu01
        // tie at zero and keep their input order.
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cpu02", "gpu01", "cpu01", "cpu03"]);
    }
}
