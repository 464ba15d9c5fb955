//! Slurmpool SLURM collaborator
//!
//! Everything that touches the outside world lives here: invoking
//! `sinfo`, `scontrol`, and `sbatch`, rendering submission scripts,
//! and persisting the run ledger. The planning logic itself stays in
//! `slurmpool-core` and only sees this crate through its traits.
//!
//! # Example
//!
//! ```no_run
//! use slurmpool_core::PoolConfig;
//! use slurmpool_slurm::SlurmPool;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pool = SlurmPool::new(PoolConfig::default())?;
//!     let commands = vec!["echo hello".to_string(), "echo world".to_string()];
//!     let ledger = pool.multi_submit(commands, "test")?;
//!
//!     println!("submitted {} tasks", ledger.len());
//!     Ok(())
//! }
//! ```

pub mod ledger;
mod pool;
mod report;
mod script;
mod submit;

pub use pool::SlurmPool;
pub use script::render_script;

/// Handle to the local SLURM command-line tools
///
/// Implements the core's probe and submitter traits by shelling out to
/// `sinfo`, `scontrol`, and `sbatch` synchronously. One instance serves a
/// whole run; it holds no state of its own.
#[derive(Debug, Clone, Default)]
pub struct SlurmClient;

impl SlurmClient {
    /// Create a new client
    pub fn new() -> Self {
        Self
    }
}
