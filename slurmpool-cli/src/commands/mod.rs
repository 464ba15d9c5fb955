//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod clean;
mod multi;
mod single;

pub use multi::MultiJobArgs;
pub use single::SingleJobArgs;

use anyhow::Result;
use clap::Subcommand;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Distribute a file of commands across the cluster
    MultiJob(MultiJobArgs),
    /// Submit one task to one node
    SingleJob(SingleJobArgs),
    /// Remove generated scripts and logs from previous runs
    Clean,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::MultiJob(args) => multi::run(args),
        Commands::SingleJob(args) => single::run(args),
        Commands::Clean => clean::run(),
    }
}
