//! Final pass over generated tasks: units, jitter and the trial-value shadow.

use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::model::{Section, TrialValueMode};
use stim_core::rng::random_float;
use tracing::debug;

use crate::counterbalance::reorder;
use crate::determinism::SectionSeeds;
use crate::task::{VariableTask, TRIAL_VALUE_NAME};
use crate::validate::{check_dimensions, response_dimensions, trial_dimensions};

/// Media lists carry this dimensionality.
pub const MEDIA_DIMENSIONS: u8 = 8;

/// Stamps the property unit onto every value and jitters jittering tasks.
///
/// Jitter of trial `j` of the task at `i` draws three components in
/// `[-a, a)` seeded with `s`, `s + 1` and `s + 2`, `s` being
/// [`SectionSeeds::jitter`].
pub fn finalize_values(tasks: &mut [VariableTask], seeds: &SectionSeeds) {
    for (index, task) in tasks.iter_mut().enumerate() {
        let amplitude = task.jitter_amplitude.abs();
        let jittering = task.jittering;
        let unit = task.property.unit.clone();
        for (trial, value) in task.values.iter_mut().enumerate() {
            if jittering {
                let seed = seeds.jitter(index, trial);
                for (offset, component) in value.components.iter_mut().enumerate() {
                    let draw = seed.wrapping_add(offset as u64);
                    *component += random_float(draw, -amplitude, amplitude);
                }
            }
            value.unit = Some(unit.clone());
        }
    }
}

fn unresolved(code: &str, message: String) -> DesignError {
    DesignError::MissingData(ErrorInfo::new(code, message))
}

/// Appends the trial-value shadow task and links it to its source.
///
/// Returns the shadow's index, or `None` when the section has no trial value.
/// Fails when trial and response dimensions disagree.
pub fn link_trial_value(
    section: &Section,
    tasks: &mut Vec<VariableTask>,
) -> Result<Option<usize>, DesignError> {
    let Some(trial_value) = section.trial_value.as_ref() else {
        return Ok(None);
    };
    let variable = section.variable(&trial_value.variable).ok_or_else(|| {
        unresolved(
            "trial-value-variable",
            format!("the trial value of {} refers to a missing variable", section.name),
        )
    })?;
    let source_index = tasks
        .iter()
        .position(|task| task.id == variable.id)
        .ok_or_else(|| {
            unresolved(
                "trial-value-task",
                format!("no sequence was generated for {}", variable.name),
            )
        })?;
    let source = &tasks[source_index];

    let table_error = || {
        unresolved(
            "trial-value-table",
            format!(
                "the trial values of {} do not cover every value of {}",
                section.name, variable.name
            ),
        )
    };
    let (values, dimensions) = match trial_value.mode {
        TrialValueMode::Same => (source.values.clone(), source.list_dimensions),
        TrialValueMode::Different if source.list_dimensions == MEDIA_DIMENSIONS => {
            let values = reorder(&trial_value.values, &source.numbers).ok_or_else(table_error)?;
            (values, MEDIA_DIMENSIONS)
        }
        TrialValueMode::Different => {
            let reordering = variable
                .list
                .as_ref()
                .map(|list| list.reordering.as_slice())
                .unwrap_or_default();
            let authored = reorder(&trial_value.values, reordering).ok_or_else(table_error)?;
            let values = reorder(&authored, &source.numbers).ok_or_else(table_error)?;
            (values, trial_value.dimensions)
        }
    };

    let trial = trial_dimensions(dimensions);
    check_dimensions(trial, response_dimensions(section.response_value.as_ref(), trial))?;

    let shadow = VariableTask {
        name: TRIAL_VALUE_NAME.to_string(),
        id: format!("{}:trial-value", source.id),
        object: source.object.clone(),
        property: source.property.clone(),
        list_id: format!("{}:trial-value", source.list_id),
        list_dimensions: dimensions,
        numbers: source.numbers.clone(),
        values,
        unit: String::new(),
        jittering: false,
        jitter_amplitude: 0.0,
        response_dependency: source.response_dependency,
        initial_value: source.initial_value,
        trial_value: None,
        shadow_of: Some(source_index),
    };
    tasks.push(shadow);
    let shadow_index = tasks.len() - 1;
    tasks[source_index].trial_value = Some(shadow_index);
    debug!(source = %variable.name, mode = ?trial_value.mode, "trial value linked");
    Ok(Some(shadow_index))
}
