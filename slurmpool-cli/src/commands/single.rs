//! Single-job command handler
//!
//! Submits one task to one node, bypassing pool planning.

use anyhow::Result;
use clap::Args;
use colored::*;
use slurmpool_core::driver::{RunContext, SubmissionRequest};
use slurmpool_slurm::SlurmClient;

/// Arguments for the single-job command
#[derive(Args)]
pub struct SingleJobArgs {
    /// Node to submit to
    #[arg(short = 'N', long)]
    pub node: String,

    /// Partition to submit to
    #[arg(long)]
    pub partition: String,

    /// CPUs the task reserves
    #[arg(short = 'n', long, default_value_t = 2)]
    pub cpus_per_task: u32,

    /// Task name
    #[arg(short = 'j', long, default_value = "job")]
    pub job_name: String,

    /// Commands to run, one per argument
    #[arg(required = true)]
    pub commands: Vec<String>,
}

/// Run the single-job command
pub fn run(args: SingleJobArgs) -> Result<()> {
    let client = SlurmClient::new();
    let context = RunContext::new();

    let request = SubmissionRequest {
        node: &args.node,
        partition: &args.partition,
        cpus_per_task: args.cpus_per_task,
        task_name: &args.job_name,
        commands: &args.commands,
    };
    let slurm_id = client.submit_single(&context, &request)?;

    println!(
        "{}",
        format!(
            "Submitted task {} to {} (slurm id {}).",
            args.job_name, args.node, slurm_id
        )
        .green()
    );
    Ok(())
}
