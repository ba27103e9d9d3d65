//! Two-level Markov randomization of block-defining variables.
//!
//! A block design has one or two populations of candidate lists. A chain
//! over populations picks the population of each block, and a chain over
//! lists picks the list of each trial within a block. Each trial then draws
//! a value from its list.

use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::model::{BlockDesign, StartChoice, Value, Variable};
use stim_core::rng::{random_float, random_int};
use tracing::debug;

use crate::determinism::BlockSeeds;
use crate::task::{BlockTrace, VariableTask};
use crate::validate::check_block_list;

/// Resolves a starting state: a seeded coin flip for [`StartChoice::Random`].
pub fn calculate_first_from(choice: StartChoice, seed: u64) -> usize {
    match choice {
        StartChoice::Random => random_int(seed, 0, 1),
        StartChoice::First => 0,
        StartChoice::Second => 1,
    }
}

/// Two-state chain of `length` steps starting at `first`.
///
/// Step `i >= 1` flips the state when a draw seeded with `seed + i` falls
/// below `prob_change`.
pub fn calculate_order(first: usize, length: usize, prob_change: f64, seed: u64) -> Vec<usize> {
    let mut order = Vec::with_capacity(length);
    let mut state = first;
    for i in 0..length {
        if i > 0 && random_float(seed.wrapping_add(i as u64), 0.0, 1.0) < prob_change {
            state = 1 - state;
        }
        order.push(state);
    }
    order
}

/// Block-defining sequence and its per-trial trace.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    /// Generated task, indices into [`BlockDesign::value_pool`].
    pub task: VariableTask,
    /// Block, population and list of every trial.
    pub trace: Vec<BlockTrace>,
}

fn incomplete_design(variable: &Variable) -> DesignError {
    DesignError::MissingData(
        ErrorInfo::new(
            "block-lists",
            "you need to assign values to all the lists inside the list of blocks",
        )
        .with_context("variable", variable.name.clone()),
    )
}

fn check_design(
    variable: &Variable,
    design: &BlockDesign,
    total: usize,
) -> Result<(), DesignError> {
    if design.populations.is_empty() || design.populations.len() > 2 {
        return Err(DesignError::MissingData(
            ErrorInfo::new(
                "block-populations",
                format!(
                    "a list of blocks needs one or two types of blocks, {} has {}",
                    variable.name,
                    design.populations.len()
                ),
            )
            .with_context("variable", variable.name.clone()),
        ));
    }
    if design.trial_count() != total {
        return Err(DesignError::TrialCount(
            ErrorInfo::new(
                "block-trial-count",
                format!(
                    "the blocks of {} produce {} trials but the section has {}",
                    variable.name,
                    design.trial_count(),
                    total
                ),
            )
            .with_context("blocks", design.number_of_blocks.to_string())
            .with_context("length", design.length_of_blocks.to_string()),
        ));
    }
    for (index, population) in design.populations.iter().enumerate() {
        // The list chain has two states, one per list.
        if population.lists.len() != 2 {
            return Err(DesignError::MissingData(
                ErrorInfo::new(
                    "block-list-count",
                    format!(
                        "the type of blocks {} of {} needs two lists, it has {}",
                        index + 1,
                        variable.name,
                        population.lists.len()
                    ),
                )
                .with_context("variable", variable.name.clone())
                .with_context("lists", population.lists.len().to_string()),
            ));
        }
        for list in &population.lists {
            if list.values.is_empty() {
                return Err(incomplete_design(variable));
            }
            check_block_list(list, variable)?;
        }
    }
    Ok(())
}

/// Generates the sequence of a block-defining variable.
///
/// `base_seed` is the base seed of the variable's list. `total` must equal
/// `number_of_blocks * length_of_blocks`.
pub fn randomize_blocks(
    variable: &Variable,
    base_seed: u64,
    total: usize,
) -> Result<BlockOutcome, DesignError> {
    let object = variable.require_object()?;
    let property = variable.require_property()?;
    let list = variable.require_list()?;
    let design = list.blocks.as_ref().ok_or_else(|| incomplete_design(variable))?;
    check_design(variable, design, total)?;

    let seeds = BlockSeeds::new(base_seed);
    let populations = &design.populations;

    let blocks_in_order = if populations.len() == 1 {
        vec![0; design.number_of_blocks]
    } else {
        let starting_block = calculate_first_from(design.starting_block, seeds.starting_block);
        calculate_order(
            starting_block,
            design.number_of_blocks,
            design.prob_change_block,
            seeds.block_order,
        )
    };
    let first_lists: Vec<usize> = populations
        .iter()
        .zip([seeds.first_starting_list, seeds.second_starting_list])
        .map(|(population, seed)| calculate_first_from(population.starting_list, seed))
        .collect();

    let pool = design.value_pool();
    let length = design.length_of_blocks;
    let mut numbers = Vec::with_capacity(total);
    let mut values: Vec<Value> = Vec::with_capacity(total);
    let mut trace = Vec::with_capacity(total);

    for (block, &population_index) in blocks_in_order.iter().enumerate() {
        let population = &populations[population_index];
        // Only the first block honours the authored starting list.
        let starting_list = if block == 0 {
            first_lists[population_index]
        } else {
            calculate_first_from(
                StartChoice::Random,
                seeds.starting_list.wrapping_add(block as u64),
            )
        };
        let list_order = calculate_order(
            starting_list,
            length,
            population.prob_change_list,
            seeds.list_order.wrapping_add(block as u64),
        );
        debug!(block, population = population_index, starting_list, "block ordered");

        for (position, &list_index) in list_order.iter().enumerate() {
            let candidate = population
                .lists
                .get(list_index)
                .ok_or_else(|| incomplete_design(variable))?;
            let trial = block * length + position;
            let draw = random_int(
                seeds.value_draw.wrapping_add(trial as u64),
                0,
                candidate.values.len() - 1,
            );
            let value = &candidate.values[draw];
            let number = pool
                .iter()
                .position(|seen| seen.id == value.id)
                .ok_or_else(|| incomplete_design(variable))?;
            numbers.push(number);
            values.push(value.clone());
            trace.push(BlockTrace {
                block,
                population: population_index,
                list: list_index,
            });
        }
    }

    Ok(BlockOutcome {
        task: VariableTask {
            name: variable.name.clone(),
            id: variable.id.clone(),
            object: object.to_string(),
            property: property.clone(),
            list_id: list.id.clone(),
            list_dimensions: list.dimensions,
            numbers,
            values,
            unit: property.unit.name.clone(),
            jittering: list.jitter.active,
            jitter_amplitude: list.jitter.amplitude,
            response_dependency: None,
            initial_value: 0,
            trial_value: None,
            shadow_of: None,
        },
        trace,
    })
}
