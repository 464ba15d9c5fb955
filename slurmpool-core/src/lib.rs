//! Slurmpool Core
//!
//! Resource-aware partitioning and node assignment for batch submission.
//!
//! This crate contains:
//! - Node catalog: status-report parsing, filtering, canonical ordering
//! - Capacity planning: per-node capacity, per-node cap, pool size
//! - Work partitioning: balanced chunking and greedy slot assignment
//! - Submission driver: the sequential, rate-limited submission loop
//!
//! Everything here is pure: the status report is injected as text and all
//! external effects go through the [`capacity::SmtProbe`] and
//! [`driver::ChunkSubmitter`] traits.

pub mod capacity;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod node;
pub mod partition;
pub mod plan;

pub use capacity::{CapacityPlan, NodeContribution, SmtProbe};
pub use config::PoolConfig;
pub use driver::{
    ChunkSubmitter, RunContext, SubmissionDriver, SubmissionLedger, SubmissionRecord,
    SubmissionRequest,
};
pub use error::{PoolError, Result};
pub use node::{NodeRecord, NodeState};
pub use partition::{Chunk, NodeAssignment};
pub use plan::ResolvedPlan;
