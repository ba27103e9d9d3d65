//! Checks aborting a generation pass with an author-facing message.

use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::model::{ListOfValues, ResponseValue, Section, Variable, VariableGroup};

use crate::config::GenerationConfig;

/// The section must present at least one scene.
pub fn check_scenes(section: &Section) -> Result<(), DesignError> {
    if section.scenes.is_empty() {
        return Err(DesignError::EmptyScenes(
            ErrorInfo::new(
                "empty-scenes",
                format!("there are no scenes in the section: {}", section.name),
            )
            .with_context("section", section.id.clone()),
        ));
    }
    Ok(())
}

/// At most one variable may define the section's blocks.
pub fn check_block_variables(section: &Section) -> Result<(), DesignError> {
    let defining: Vec<&str> = section
        .variables
        .iter()
        .filter(|variable| variable.group == VariableGroup::Blocks)
        .map(|variable| variable.name.as_str())
        .collect();
    if defining.len() > 1 {
        return Err(DesignError::TrialCount(
            ErrorInfo::new(
                "block-variable-count",
                format!(
                    "only one variable can set the trials of a section with blocks: {}",
                    defining.join(", ")
                ),
            )
            .with_context("section", section.id.clone()),
        ));
    }
    Ok(())
}

/// The trial count must be positive and below the configured maximum.
pub fn check_trial_count(total: usize, config: &GenerationConfig) -> Result<(), DesignError> {
    if total == 0 {
        return Err(DesignError::TrialCount(ErrorInfo::new(
            "trial-count-zero",
            "the section has no trials",
        )));
    }
    if total >= config.max_trials {
        return Err(DesignError::TrialCount(
            ErrorInfo::new(
                "trial-count-max",
                format!(
                    "the maximum number of trials allowed is {}",
                    config.max_trials
                ),
            )
            .with_context("trials", total.to_string()),
        ));
    }
    Ok(())
}

/// Every non-block list must be non-empty and divide the trial count.
pub fn check_divisibility(section: &Section, total: usize) -> Result<(), DesignError> {
    let block_variable = section.block_variable();
    for variable in &section.variables {
        if variable.group == VariableGroup::Blocks {
            continue;
        }
        let Some(list) = variable.list.as_ref() else {
            continue;
        };
        let count = list.values.len();
        if count == 0 {
            return Err(DesignError::MissingData(
                ErrorInfo::new(
                    "empty-list",
                    format!("the list {} has no values", list.name),
                )
                .with_context("variable", variable.name.clone()),
            ));
        }
        if total % count != 0 {
            let origin = match block_variable {
                Some(block) => format!(
                    " that is given by the variable: {} which values are controlled by blocks",
                    block.name
                ),
                None => String::new(),
            };
            return Err(DesignError::Divisibility(
                ErrorInfo::new(
                    "list-divisibility",
                    format!(
                        "the variable {} has associated the list {} which has {} values. The total number of trials in the section is {}{}. {} is NOT divisible by {}.",
                        variable.name, list.name, count, total, origin, total, count
                    ),
                )
                .with_context("variable", variable.name.clone())
                .with_context("values", count.to_string())
                .with_context("trials", total.to_string()),
            ));
        }
    }
    Ok(())
}

/// Block-controlled lists may not jitter and must match the variable's dimensions.
///
/// Variables with more than three dimensions also accept scalar lists.
pub fn check_block_list(list: &ListOfValues, variable: &Variable) -> Result<(), DesignError> {
    if list.jitter.active {
        return Err(DesignError::JitteringConflict(
            ErrorInfo::new(
                "block-jitter",
                format!(
                    "the list: {} has jittering. It is not possible to use jittering in lists that are controlled by blocks",
                    list.name
                ),
            )
            .with_context("variable", variable.name.clone())
            .with_hint("go to the list and turn the jittering off"),
        ));
    }
    let composite = variable.dimensions > 3 && list.dimensions == 1;
    if list.dimensions != variable.dimensions && !composite {
        let required = match variable.dimensions {
            2 => "requires 2d vector values",
            3 => "requires 3d vector values",
            _ => "requires single values",
        };
        let contained = match list.dimensions {
            2 => "contains 2d vector values",
            3 => "contains 3d vector values",
            _ => "contains single values",
        };
        return Err(DesignError::DimensionMismatch(
            ErrorInfo::new(
                "block-list-dimensions",
                format!(
                    "the list: {} {}. The variable that uses this list: {} {}",
                    list.name, contained, variable.name, required
                ),
            )
            .with_context("list_dimensions", list.dimensions.to_string())
            .with_context("variable_dimensions", variable.dimensions.to_string()),
        ));
    }
    Ok(())
}

/// Random-different siblings cannot outnumber the shared list's values.
pub fn check_group_size(
    variable: &Variable,
    siblings: usize,
    values: usize,
) -> Result<(), DesignError> {
    if siblings > values {
        return Err(DesignError::GroupSize(
            ErrorInfo::new(
                "different-group-size",
                format!(
                    "variable: {} is in a group with other variables set to take different values. The number of variables in the group is bigger than the number of possible values that the group can take",
                    variable.name
                ),
            )
            .with_context("variables", siblings.to_string())
            .with_context("values", values.to_string()),
        ));
    }
    Ok(())
}

/// Collapses the trial value's dimensions: composite values compare as scalars.
pub fn trial_dimensions(list_dimensions: u8) -> u8 {
    if list_dimensions > 3 {
        1
    } else {
        list_dimensions
    }
}

/// Dimensions implied by the response descriptor; 0 when nothing is scored.
pub fn response_dimensions(response: Option<&ResponseValue>, trial_dimensions: u8) -> u8 {
    match response {
        Some(response) if trial_dimensions != 0 => response.kind.dimensions(),
        _ => 0,
    }
}

fn describe_dimensions(dimensions: u8) -> &'static str {
    match dimensions {
        1 => "is a numeric value",
        2 => "is a 2d vector",
        3 => "is a color (3d vector)",
        _ => "does not exist",
    }
}

/// Trial and response dimensions must agree unless no response is scored.
pub fn check_dimensions(trial: u8, response: u8) -> Result<(), DesignError> {
    if trial == response || response == 0 {
        return Ok(());
    }
    Err(DesignError::DimensionMismatch(
        ErrorInfo::new(
            "trial-response-dimensions",
            format!(
                "trialValue {} and responseValue {}",
                describe_dimensions(trial),
                describe_dimensions(response)
            ),
        )
        .with_context("trial", trial.to_string())
        .with_context("response", response.to_string()),
    ))
}
