//! Script submission
//!
//! Writes the rendered script into the run's scripts directory, makes it
//! executable, and hands it to `sbatch`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use slurmpool_core::driver::{ChunkSubmitter, RunContext, SubmissionRequest};
use slurmpool_core::error::{PoolError, Result};
use tracing::{debug, info};

use crate::SlurmClient;
use crate::script::render_script;

impl SlurmClient {
    /// Submit a single task to its assigned node
    ///
    /// Usable on its own for one-off jobs and called once per slot by the
    /// submission driver.
    pub fn submit_single(
        &self,
        context: &RunContext,
        request: &SubmissionRequest<'_>,
    ) -> Result<String> {
        fs::create_dir_all(&context.scripts_dir)
            .map_err(|e| PoolError::submission(format!("failed to create scripts dir: {e}")))?;
        fs::create_dir_all(&context.log_dir)
            .map_err(|e| PoolError::submission(format!("failed to create log dir: {e}")))?;

        let script_path = context.scripts_dir.join(format!("{}.sh", request.task_name));
        fs::write(&script_path, render_script(request, &context.log_dir)).map_err(|e| {
            PoolError::submission(format!(
                "failed to write {}: {e}",
                script_path.display()
            ))
        })?;
        make_executable(&script_path)?;

        let output = Command::new("sbatch")
            .arg(&script_path)
            .output()
            .map_err(|e| PoolError::submission(format!("failed to execute sbatch: {e}")))?;

        if !output.status.success() {
            return Err(PoolError::submission(format!(
                "sbatch exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // sbatch reports "Submitted batch job <id>"; the id is the last token.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let slurm_id = stdout
            .split_whitespace()
            .last()
            .ok_or_else(|| PoolError::submission("sbatch produced no output"))?
            .to_string();

        info!(
            "submitted task {} to {}, containing {} jobs, slurm id {}",
            request.task_name,
            request.node,
            request.commands.len(),
            slurm_id
        );
        debug!("commands: {:?}", request.commands);

        Ok(slurm_id)
    }
}

impl ChunkSubmitter for SlurmClient {
    fn submit_chunk(
        &self,
        context: &RunContext,
        request: &SubmissionRequest<'_>,
    ) -> Result<String> {
        self.submit_single(context, request)
    }
}

/// Mark the generated script executable (mode 755)
fn make_executable(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| PoolError::submission(format!("failed to stat {}: {e}", path.display())))?
        .permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .map_err(|e| PoolError::submission(format!("failed to chmod {}: {e}", path.display())))
}
