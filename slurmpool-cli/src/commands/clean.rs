//! Clean command handler

use anyhow::Result;
use colored::*;
use slurmpool_core::driver::RUN_DIR;
use slurmpool_slurm::ledger;

/// Remove every generated script and log from previous runs
pub fn run() -> Result<()> {
    ledger::clean(RUN_DIR)?;
    println!("{}", "Removed generated scripts and logs.".green());
    Ok(())
}
