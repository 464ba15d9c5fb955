//! Ledger persistence and run-tree maintenance

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use slurmpool_core::driver::{RunContext, SubmissionLedger};
use tracing::info;

/// Persist the submission ledger as one JSON object keyed by task name
///
/// Written once at the end of a full distribution run, to
/// `<run_root>/<run_id>.json`. An aborted run leaves the file absent;
/// records already submitted are still visible in the scheduler itself.
pub fn persist_ledger(context: &RunContext, ledger: &SubmissionLedger) -> Result<()> {
    let mut entries = serde_json::Map::new();
    for record in ledger.records() {
        let value = serde_json::to_value(record)
            .with_context(|| format!("failed to serialize record for {}", record.task))?;
        entries.insert(record.task.clone(), value);
    }

    fs::create_dir_all(&context.root)
        .with_context(|| format!("failed to create {}", context.root.display()))?;

    let path = context.root.join(format!("{}.json", context.run_id));
    let text = serde_json::to_string_pretty(&entries).context("failed to serialize ledger")?;
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;

    info!("wrote task ledger to {}", path.display());
    Ok(())
}

/// Remove a prior run root with all generated scripts and logs
///
/// A missing root is not an error.
pub fn clean(root: impl AsRef<Path>) -> Result<()> {
    let root = root.as_ref();
    match fs::remove_dir_all(root) {
        Ok(()) => {
            info!("removed {}", root.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", root.display())),
    }
}
