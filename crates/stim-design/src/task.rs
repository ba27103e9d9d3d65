use serde::{Deserialize, Serialize};
use stim_core::model::{CorrectStart, StimulusProperty, Value};
use stim_core::seeds::SeedRecord;

use crate::flow::Condition;
use crate::scoring::ScoringReference;

/// Name given to the trial-value shadow task.
pub const TRIAL_VALUE_NAME: &str = "trialValue";

/// Resolved per-trial sequence of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTask {
    /// Variable name (or [`TRIAL_VALUE_NAME`] for the shadow task).
    pub name: String,
    /// Variable id.
    pub id: String,
    /// Bound stimulus object id.
    pub object: String,
    /// Bound stimulus property.
    pub property: StimulusProperty,
    /// Id of the list the numbers index into.
    pub list_id: String,
    /// Dimensionality of that list.
    pub list_dimensions: u8,
    /// Per-trial value index.
    pub numbers: Vec<usize>,
    /// Per-trial resolved value.
    pub values: Vec<Value>,
    /// Unit name of the bound property.
    pub unit: String,
    /// Whether jitter was applied.
    pub jittering: bool,
    /// Jitter amplitude.
    pub jitter_amplitude: f64,
    /// Set for response-dependent variables; values resolve at playback.
    pub response_dependency: Option<CorrectStart>,
    /// Initial value index of a response-dependent variable.
    pub initial_value: usize,
    /// Index of the linked trial-value shadow task in the section.
    pub trial_value: Option<usize>,
    /// On the shadow task, index of the task it mirrors.
    pub shadow_of: Option<usize>,
}

/// Block, population and list a block-defining trial was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTrace {
    /// Zero-based block index.
    pub block: usize,
    /// Population governing the block.
    pub population: usize,
    /// Candidate list within the population.
    pub list: usize,
}

impl BlockTrace {
    /// One-based `block/population/list` label.
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.block + 1, self.population + 1, self.list + 1)
    }
}

/// Accounting filled in by the playback engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackCounters {
    /// Current trial.
    pub current_trial: usize,
    /// Correct responses so far.
    pub correct: usize,
    /// Incorrect responses so far.
    pub incorrect: usize,
    /// Responses given in time.
    pub responded_in_time: usize,
    /// Trials without an in-time response.
    pub not_responded_in_time: usize,
    /// Last outcome, 1 when correct.
    pub last: i32,
    /// Current level of response-dependent variables.
    pub dependent_value: i64,
    /// Running sum used to step response-dependent variables.
    pub previous_dependent_sum: i64,
    /// Whether no trial has been scored yet.
    pub starting: bool,
}

impl Default for PlaybackCounters {
    fn default() -> Self {
        Self {
            current_trial: 0,
            correct: 0,
            incorrect: 0,
            responded_in_time: 0,
            not_responded_in_time: 0,
            last: 1,
            dependent_value: 0,
            previous_dependent_sum: 0,
            starting: true,
        }
    }
}

/// Fully generated design of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTask {
    /// Section id.
    pub id: String,
    /// Section name.
    pub name: String,
    /// Block-defining task first, then grouped variables, then the trial-value shadow.
    pub variable_tasks: Vec<VariableTask>,
    /// Number of trials.
    pub number_of_trials: usize,
    /// Branching conditions; the last entry is the unconditional fallback.
    pub conditions: Vec<Condition>,
    /// Per-trial block trace when a block-defining variable exists.
    #[serde(default)]
    pub blocks: Vec<BlockTrace>,
    /// Reference values responses are scored against.
    #[serde(default)]
    pub scoring: Option<ScoringReference>,
    /// Base seeds used, to be stored for replay.
    pub seeds_used: Vec<SeedRecord>,
    /// Playback accounting.
    #[serde(default)]
    pub counters: PlaybackCounters,
}

impl SectionTask {
    /// Returns the trial-value shadow task, if any.
    pub fn trial_value_task(&self) -> Option<&VariableTask> {
        self.variable_tasks
            .iter()
            .find(|task| task.shadow_of.is_some())
    }

    /// Returns the task generated for the variable `id`.
    pub fn task(&self, id: &str) -> Option<&VariableTask> {
        self.variable_tasks
            .iter()
            .find(|task| task.id == id && task.shadow_of.is_none())
    }

    /// Column titles of [`SectionTask::trial_rows`].
    pub fn trial_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .variable_tasks
            .iter()
            .map(|task| task.name.clone())
            .collect();
        if !self.blocks.is_empty() {
            columns.push("block".to_string());
        }
        columns
    }

    /// One row per trial. Response-dependent values are only known during
    /// playback and render as `x`.
    pub fn trial_rows(&self) -> Vec<Vec<String>> {
        (0..self.number_of_trials)
            .map(|trial| {
                let mut row: Vec<String> = self
                    .variable_tasks
                    .iter()
                    .map(|task| {
                        if task.response_dependency.is_some() {
                            return "x".to_string();
                        }
                        task.values
                            .get(trial)
                            .map(|value| value.display(task.list_dimensions))
                            .unwrap_or_default()
                    })
                    .collect();
                if let Some(trace) = self.blocks.get(trial) {
                    row.push(trace.label());
                }
                row
            })
            .collect()
    }
}
