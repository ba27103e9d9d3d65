//! Per-variable index sequences for every grouped (non block-defining) variable.

use std::collections::BTreeSet;

use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::model::{Priority, Section, Selection, Variable, VariableGroup};
use stim_core::rng::{random_int, shuffled_range};
use tracing::debug;

use crate::counterbalance::{arrange, reorder, CounterbalanceList, ListKey, Style};
use crate::determinism::{trial_seed, SectionSeeds};
use crate::task::VariableTask;

/// Key of the list shared by `variable` and its group siblings.
pub fn list_key(variable: &Variable) -> ListKey {
    match variable.group {
        VariableGroup::Group(group) => ListKey::Group(group),
        _ => ListKey::Variable(variable.id.clone()),
    }
}

/// Variables that create a list: every ungrouped variable and the first of each group.
fn list_leaders(section: &Section) -> Vec<(usize, &Variable)> {
    let mut groups = BTreeSet::new();
    section
        .variables
        .iter()
        .enumerate()
        .filter(|(_, variable)| match variable.group {
            VariableGroup::Blocks => false,
            VariableGroup::Ungrouped => true,
            VariableGroup::Group(group) => groups.insert(group),
        })
        .collect()
}

/// Section trial count.
///
/// The precomputed count when present, otherwise the block design's trial
/// count, otherwise the product of the value counts of every counterbalanced
/// list (1 when there is none).
pub fn derive_total_trials(section: &Section) -> usize {
    if let Some(total) = section.total_possibilities {
        return total;
    }
    if let Some(design) = section
        .block_variable()
        .and_then(|variable| variable.list.as_ref())
        .and_then(|list| list.blocks.as_ref())
    {
        return design.trial_count();
    }
    list_leaders(section)
        .into_iter()
        .filter(|(_, variable)| variable.selection.is_counterbalanced())
        .filter_map(|(_, variable)| variable.list.as_ref())
        .fold(1usize, |acc, list| acc.saturating_mul(list.values.len()))
}

fn style_for(selection: &Selection, alternate: bool) -> Style {
    match selection {
        Selection::InOrder { .. } if alternate => Style::OrderedAlternate,
        Selection::InOrder { priority } => match priority {
            Priority::High => Style::OrderedHigh,
            Priority::Medium => Style::OrderedMedium,
            Priority::Low => Style::OrderedLow,
        },
        Selection::Shuffled if alternate => Style::ShuffledAlternate,
        Selection::Shuffled => Style::Shuffled,
        _ => Style::Independent,
    }
}

fn check_group_selection(section: &Section, leader: &Variable) -> Result<(), DesignError> {
    for sibling in section.same_group(leader) {
        if sibling.selection.kind_name() != leader.selection.kind_name() {
            return Err(DesignError::MissingData(
                ErrorInfo::new(
                    "group-selection",
                    format!(
                        "all the variables of a group must use the same selection: {} uses {} and {} uses {}",
                        leader.name,
                        leader.selection.kind_name(),
                        sibling.name,
                        sibling.selection.kind_name()
                    ),
                )
                .with_context("variable", sibling.name.clone()),
            ));
        }
    }
    Ok(())
}

/// Creates one [`CounterbalanceList`] per list leader and arranges them.
pub fn build_lists(
    section: &Section,
    total: usize,
    seeds: &SectionSeeds,
) -> Result<Vec<CounterbalanceList>, DesignError> {
    let mut lists = Vec::new();
    for (index, variable) in list_leaders(section) {
        let list = variable.require_list()?;
        let number_of_values = list.values.len();
        if number_of_values == 0 {
            return Err(DesignError::missing(
                "empty-list",
                format!("the list {} has no values", list.name),
            ));
        }
        check_group_selection(section, variable)?;

        let siblings = section.same_group(variable);
        let alternate = section
            .alternate
            .as_deref()
            .is_some_and(|alternate| siblings.iter().any(|sibling| sibling.id == alternate));
        let style = style_for(&variable.selection, alternate);
        let mut cb = CounterbalanceList::new(number_of_values, total, style, list_key(variable));

        match &variable.selection {
            Selection::RandomEqual => {
                let seed = seeds.variable_equal(index);
                let positions = (0..total)
                    .map(|trial| random_int(trial_seed(seed, trial), 0, number_of_values - 1))
                    .collect();
                cb.positions = vec![positions];
            }
            Selection::RandomDifferent => {
                crate::validate::check_group_size(variable, siblings.len(), number_of_values)?;
                let seed = seeds.variable_different(index);
                cb.positions = (0..total)
                    .map(|trial| shuffled_range(0..number_of_values, trial_seed(seed, trial)))
                    .collect();
            }
            Selection::Fixed { .. } | Selection::Correct { .. } => {
                cb.positions = vec![(0..number_of_values).collect()];
            }
            Selection::InOrder { .. } | Selection::Shuffled => {}
        }
        lists.push(cb);
    }
    arrange(lists, total, seeds)
}

fn fixed_number(
    variable: &Variable,
    list: &CounterbalanceList,
    index: usize,
) -> Result<usize, DesignError> {
    list.positions
        .first()
        .and_then(|positions| positions.get(index))
        .copied()
        .ok_or_else(|| {
            DesignError::MissingData(
                ErrorInfo::new(
                    "selection-index",
                    format!(
                        "the value chosen for {} is outside its list of {} values",
                        variable.name, list.number_of_values
                    ),
                )
                .with_context("index", index.to_string()),
            )
        })
}

/// Builds the [`VariableTask`] of every grouped variable, in section order.
pub fn build_sequences(
    section: &Section,
    total: usize,
    seeds: &SectionSeeds,
) -> Result<Vec<VariableTask>, DesignError> {
    let lists = build_lists(section, total, seeds)?;
    let mut tasks = Vec::new();

    for variable in &section.variables {
        if variable.group == VariableGroup::Blocks {
            continue;
        }
        let list_of_values = variable.require_list()?;
        let object = variable.require_object()?;
        let property = variable.require_property()?;
        let key = list_key(variable);
        let list = lists.iter().find(|list| list.key == key).ok_or_else(|| {
            DesignError::missing(
                "counterbalance-list",
                format!("no counterbalance list was built for {}", variable.name),
            )
        })?;

        let mut response_dependency = None;
        let mut initial_value = 0;
        let numbers: Vec<usize> = match &variable.selection {
            Selection::InOrder { .. } | Selection::Shuffled | Selection::RandomEqual => {
                list.positions.first().cloned().unwrap_or_default()
            }
            Selection::RandomDifferent => {
                let slot = section
                    .same_group(variable)
                    .iter()
                    .position(|sibling| sibling.id == variable.id)
                    .unwrap_or(0);
                list.positions
                    .iter()
                    .map(|permutation| permutation.get(slot).copied())
                    .collect::<Option<Vec<usize>>>()
                    .ok_or_else(|| {
                        DesignError::missing(
                            "different-slot",
                            format!("{} has no distinct value slot", variable.name),
                        )
                    })?
            }
            Selection::Fixed { index } => vec![fixed_number(variable, list, *index)?; total],
            Selection::Correct { start } => {
                let number = fixed_number(variable, list, start.index())?;
                response_dependency = Some(*start);
                initial_value = start.index();
                vec![number; total]
            }
        };

        let values = reorder(&list_of_values.values, &numbers).ok_or_else(|| {
            DesignError::MissingData(
                ErrorInfo::new(
                    "value-index",
                    format!(
                        "the list {} has fewer values than the group of {} requires",
                        list_of_values.name, variable.name
                    ),
                )
                .with_context("values", list_of_values.values.len().to_string()),
            )
        })?;
        debug!(
            variable = %variable.name,
            selection = variable.selection.kind_name(),
            "sequence built"
        );

        tasks.push(VariableTask {
            name: variable.name.clone(),
            id: variable.id.clone(),
            object: object.to_string(),
            property: property.clone(),
            list_id: list_of_values.id.clone(),
            list_dimensions: list_of_values.dimensions,
            numbers,
            values,
            unit: property.unit.name.clone(),
            jittering: list_of_values.jitter.active,
            jitter_amplitude: list_of_values.jitter.amplitude,
            response_dependency,
            initial_value,
            trial_value: None,
            shadow_of: None,
        });
    }
    Ok(tasks)
}
