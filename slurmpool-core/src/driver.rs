//! Submission driver
//!
//! Sequentially dispatches one job per assigned slot, rate-limited,
//! recording a submission ledger. The external scheduler call is the
//! bottleneck, and submission order must match the deterministic
//! node/slot assignment for the ledger to be reproducible, so the loop
//! never runs submissions concurrently.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::partition::{Chunk, NodeAssignment};

/// Root directory for generated scripts and logs
pub const RUN_DIR: &str = ".slurmpool";

/// Per-run paths and identifier
///
/// Constructed once per driver instance and threaded explicitly; nothing
/// here is process-wide. Concurrent runs get distinct timestamp-based
/// run ids and therefore distinct directories.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Timestamp-based run identifier
    pub run_id: String,

    /// Run root, `.slurmpool/<run_id>`
    pub root: PathBuf,

    /// Directory for generated submission scripts
    pub scripts_dir: PathBuf,

    /// Directory for job stdout/stderr logs
    pub log_dir: PathBuf,
}

impl RunContext {
    /// Create a context with a fresh timestamp run id
    pub fn new() -> Self {
        Self::with_run_id(chrono::Local::now().format("%m%d%H%M%S").to_string())
    }

    /// Create a context for a known run id
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        let run_id = run_id.into();
        let root = PathBuf::from(RUN_DIR).join(&run_id);
        Self {
            scripts_dir: root.join("scripts"),
            log_dir: root.join("log"),
            root,
            run_id,
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the collaborator needs to submit one slot
#[derive(Debug, Clone)]
pub struct SubmissionRequest<'a> {
    /// Target node hostname
    pub node: &'a str,

    /// Partition to submit to
    pub partition: &'a str,

    /// CPUs the task reserves
    pub cpus_per_task: u32,

    /// Slot-scoped task name
    pub task_name: &'a str,

    /// Commands this slot runs
    pub commands: &'a [String],
}

/// External submission collaborator
///
/// Renders a submission script for the request, hands it to the external
/// scheduler, and returns the scheduler-assigned job id. The call is
/// synchronous and returns either an identifier or a reportable failure.
pub trait ChunkSubmitter {
    /// Submit one chunk, returning the scheduler job id
    fn submit_chunk(
        &self,
        context: &RunContext,
        request: &SubmissionRequest<'_>,
    ) -> Result<String>;
}

/// One row of the submission ledger
///
/// Never mutated after creation except to attach the scheduler job id or
/// the per-slot error marker.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    /// Slot-scoped task name, the ledger key
    #[serde(skip_serializing)]
    pub task: String,

    /// Node the slot was assigned to
    pub node: String,

    /// Generated script file name
    pub script: String,

    /// Expected stdout log file name
    pub stdout: String,

    /// Expected stderr log file name
    pub stderr: String,

    /// Commands the slot carries
    pub cmd: Vec<String>,

    /// Scheduler-assigned job id, absent when the submission failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slurm_id: Option<String>,

    /// Error marker for a failed submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only record of every submitted slot
#[derive(Debug, Default)]
pub struct SubmissionLedger {
    records: Vec<SubmissionRecord>,
}

impl SubmissionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: SubmissionRecord) {
        self.records.push(record);
    }

    /// All records in submission order
    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    /// Number of recorded slots
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of slots whose submission failed
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.error.is_some()).count()
    }
}

/// Drives the sequential submission loop
pub struct SubmissionDriver<'a, S: ChunkSubmitter> {
    context: &'a RunContext,
    submitter: &'a S,
    cpus_per_job: u32,
    sleep: Duration,
}

impl<'a, S: ChunkSubmitter> SubmissionDriver<'a, S> {
    /// Create a driver for one run
    pub fn new(context: &'a RunContext, submitter: &'a S, cpus_per_job: u32, sleep: Duration) -> Self {
        Self {
            context,
            submitter,
            cpus_per_job,
            sleep,
        }
    }

    /// Submit every assigned slot, pairing chunk *i* with the *i*-th slot
    /// of the flattened assignment sequence
    ///
    /// A failed slot is recorded in the ledger with an error marker and
    /// the loop continues; the aggregate failure count is reported at the
    /// end. The fixed delay before each submission is a self-imposed rate
    /// limit on the external scheduler's submission endpoint.
    pub fn submit_all(
        &self,
        assignments: &[NodeAssignment],
        chunks: &[Chunk],
        job_name: &str,
    ) -> SubmissionLedger {
        let total: u32 = assignments.iter().map(|a| a.slots).sum();
        debug_assert_eq!(total as usize, chunks.len());

        let mut ledger = SubmissionLedger::new();
        let mut ith = 0usize;

        for assignment in assignments {
            info!("{}: {} tasks", assignment.node, assignment.slots);
            for _ in 0..assignment.slots {
                std::thread::sleep(self.sleep);

                let chunk = &chunks[ith];
                let task_name = format!("{}_{:03}", job_name, ith);
                let request = SubmissionRequest {
                    node: &assignment.node,
                    partition: &assignment.partition,
                    cpus_per_task: self.cpus_per_job,
                    task_name: &task_name,
                    commands: &chunk.commands,
                };

                let mut record = SubmissionRecord {
                    task: task_name.clone(),
                    node: assignment.node.clone(),
                    script: format!("{task_name}.sh"),
                    stdout: format!("{task_name}.out.log"),
                    stderr: format!("{task_name}.err.log"),
                    cmd: chunk.commands.clone(),
                    slurm_id: None,
                    error: None,
                };

                match self.submitter.submit_chunk(self.context, &request) {
                    Ok(id) => {
                        info!(
                            "submitted task {} to {}, containing {} jobs, slurm id {}",
                            task_name,
                            assignment.node,
                            chunk.commands.len(),
                            id
                        );
                        record.slurm_id = Some(id);
                    }
                    Err(e) => {
                        error!("task {} failed on {}: {}", task_name, assignment.node, e);
                        record.error = Some(e.to_string());
                    }
                }

                ledger.push(record);
                ith += 1;
            }
        }

        let failures = ledger.failure_count();
        if failures > 0 {
            error!("{} of {} submissions failed", failures, ledger.len());
        } else {
            info!("all {} submissions succeeded", ledger.len());
        }

        ledger
    }
}
