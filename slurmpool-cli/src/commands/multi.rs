//! Multi-job command handler
//!
//! Reads a command file, plans the pool, and runs the full distribution
//! pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Args;
use colored::*;
use slurmpool_core::config::PoolConfig;
use slurmpool_slurm::SlurmPool;

/// Arguments for the multi-job command
#[derive(Args)]
pub struct MultiJobArgs {
    /// File with one shell command per line
    pub cmdfile: PathBuf,

    /// How many jobs to run in parallel; uses all resources if absent
    #[arg(short, long)]
    pub pool_size: Option<u32>,

    /// CPUs each job uses
    #[arg(short = 'n', long, default_value_t = 2)]
    pub cpus_per_job: u32,

    /// Most jobs a single node may run in parallel
    #[arg(short = 'M', long)]
    pub max_jobs_per_node: Option<u32>,

    /// Nodes to use, comma separated (e.g. 'cpu01,cpu02,cpu03')
    #[arg(short = 'N', long, value_delimiter = ',')]
    pub node_list: Option<Vec<String>>,

    /// Partition to submit to
    #[arg(long)]
    pub partition: Option<String>,

    /// Job name prefix
    #[arg(short = 'j', long, default_value = "task")]
    pub job_name: String,

    /// Shuffle commands before partitioning
    #[arg(long)]
    pub shuffle: bool,

    /// Seconds to wait between submissions
    #[arg(long, default_value_t = 0.5)]
    pub sleep: f64,
}

/// Run the multi-job command
pub fn run(args: MultiJobArgs) -> Result<()> {
    let commands = read_commands(&args.cmdfile)?;
    ensure!(
        !commands.is_empty(),
        "no commands found in {}",
        args.cmdfile.display()
    );

    let config = PoolConfig {
        cpus_per_job: args.cpus_per_job,
        pool_size: args.pool_size,
        max_jobs_per_node: args.max_jobs_per_node,
        node_list: args.node_list,
        partition: args.partition,
        shuffle: args.shuffle,
        sleep: Duration::from_secs_f64(args.sleep),
        ..Default::default()
    };

    let pool = SlurmPool::new(config)?;
    let plan = pool.plan();

    println!("N jobs: {}", commands.len());
    println!("Pool size: {}", plan.pool_size.min(commands.len() as u32));
    println!("N cpus per job: {}", plan.cpus_per_job);
    println!("Max jobs per node: {}", plan.max_jobs_per_node);

    let ledger = pool.multi_submit(commands, &args.job_name)?;

    let failures = ledger.failure_count();
    if failures > 0 {
        println!(
            "{}",
            format!("{} of {} task(s) failed to submit.", failures, ledger.len()).red()
        );
    } else {
        println!(
            "{}",
            format!("Submitted {} task(s).", ledger.len()).green()
        );
    }
    ensure!(failures == 0, "{failures} submission(s) failed");
    Ok(())
}

/// Read commands from the file, skipping blank lines
fn read_commands(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
