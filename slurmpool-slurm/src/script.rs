//! Submission script rendering

use std::path::Path;

use indoc::formatdoc;
use slurmpool_core::driver::SubmissionRequest;

/// Render the batch script for one slot
///
/// The script pins the task to its assigned node, reserves the planned
/// CPU count, and routes stdout/stderr into the run's log directory
/// under the task name.
pub fn render_script(request: &SubmissionRequest<'_>, log_dir: &Path) -> String {
    let task_name = request.task_name;
    let cmds = request.commands.join("\n");

    formatdoc! {r#"
        #!/bin/bash
        #SBATCH --job-name={task_name}
        #SBATCH --partition={partition}
        #SBATCH --nodelist={node}
        #SBATCH --ntasks=1
        #SBATCH --cpus-per-task={cpus}
        #SBATCH --output={log_dir}/{task_name}.out.log
        #SBATCH --error={log_dir}/{task_name}.err.log

        {cmds}
    "#,
        partition = request.partition,
        node = request.node,
        cpus = request.cpus_per_task,
        log_dir = log_dir.display(),
    }
}
