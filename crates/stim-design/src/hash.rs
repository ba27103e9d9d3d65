use serde::Serialize;
use sha2::{Digest, Sha256};
use stim_core::errors::{DesignError, ErrorInfo};

use crate::task::{BlockTrace, SectionTask, VariableTask};

#[derive(Serialize)]
struct HashedDesign<'a> {
    id: &'a str,
    number_of_trials: usize,
    variable_tasks: &'a [VariableTask],
    blocks: &'a [BlockTrace],
}

/// Hex encoded SHA-256 of the generated design.
///
/// Covers the per-trial sequences and the block trace, not the playback
/// counters, so a replay with the same seeds hashes identically.
pub fn design_hash(task: &SectionTask) -> Result<String, DesignError> {
    let design = HashedDesign {
        id: &task.id,
        number_of_trials: task.number_of_trials,
        variable_tasks: &task.variable_tasks,
        blocks: &task.blocks,
    };
    let bytes = serde_json::to_vec(&design)
        .map_err(|err| DesignError::Serde(ErrorInfo::new("hash-serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
