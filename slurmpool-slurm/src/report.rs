//! Cluster status queries
//!
//! One `sinfo` call per discovery pass and one `scontrol` call per
//! multithreading probe. A failed status query is fatal and never
//! retried.

use std::process::Command;

use slurmpool_core::capacity::SmtProbe;
use slurmpool_core::error::{PoolError, Result};
use tracing::debug;

use crate::SlurmClient;

/// Column layout the catalog parser expects
const SINFO_FORMAT: &str = "\"%n %e %m %a %c %C %O %R %t\"";

impl SlurmClient {
    /// Query the raw node status report
    ///
    /// Returns `sinfo` stdout untouched; parsing happens in the core so
    /// it stays testable with injected text.
    pub fn node_report(&self) -> Result<String> {
        let output = Command::new("sinfo")
            .args(["-o", SINFO_FORMAT])
            .output()
            .map_err(|e| PoolError::discovery(format!("failed to execute sinfo: {e}")))?;

        if !output.status.success() {
            return Err(PoolError::discovery(format!(
                "sinfo exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl SmtProbe for SlurmClient {
    fn smt_enabled(&self, node: &str) -> Result<bool> {
        let output = Command::new("scontrol")
            .args(["show", "node", node])
            .output()
            .map_err(|e| PoolError::discovery(format!("failed to execute scontrol: {e}")))?;

        let enabled = String::from_utf8_lossy(&output.stdout).contains("ThreadsPerCore=2");
        debug!("probed {} for multithreading: {}", node, enabled);
        Ok(enabled)
    }
}
