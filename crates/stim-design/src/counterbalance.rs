//! Nested big-block / small-block counterbalancing.
//!
//! Every counterbalanced list cycles through its values in runs of
//! `small_block_size` trials, one full cycle per big block. Lists are
//! processed widest block first: the first claims the whole section as its
//! big block, each following list nests inside one small block of the
//! previous one. Reordering all lists by one shared merge order keeps the
//! joint combinations intact.

use serde::{Deserialize, Serialize};
use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::rng::shuffled_range;
use tracing::debug;

use crate::determinism::{trial_seed, SectionSeeds};

/// Identifies the variable or group a list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKey {
    /// Shared by every variable of a counterbalancing group.
    Group(u32),
    /// Owned by a single ungrouped variable.
    Variable(String),
}

/// Block/merge algorithm of a list, ordered by processing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Style {
    /// Cycles against the alternate axis in authoring order (code 0).
    OrderedAlternate,
    /// Cycles against the alternate axis, shuffled within each cycle (code 1).
    ShuffledAlternate,
    /// Round robin, processed first (code 2).
    OrderedHigh,
    /// Round robin (code 3).
    OrderedMedium,
    /// Round robin, processed last (code 4).
    OrderedLow,
    /// Round robin permuted within each big block (code 5).
    Shuffled,
    /// Independent per-trial draws outside the nested ordering (code 10000).
    Independent,
}

impl Style {
    /// Numeric style code.
    pub fn code(&self) -> u32 {
        match self {
            Style::OrderedAlternate => 0,
            Style::ShuffledAlternate => 1,
            Style::OrderedHigh => 2,
            Style::OrderedMedium => 3,
            Style::OrderedLow => 4,
            Style::Shuffled => 5,
            Style::Independent => 10_000,
        }
    }

    /// Whether the list takes part in the nested block ordering.
    pub fn is_nested(&self) -> bool {
        *self != Style::Independent
    }
}

/// Combinatorial block structure of one variable or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterbalanceList {
    /// Number of values cycled through.
    pub number_of_values: usize,
    /// Trials holding one full cycle; assigned by [`arrange`].
    pub big_block_size: usize,
    /// Total number of trials.
    pub total_size: usize,
    /// Algorithm governing the list.
    pub style: Style,
    /// Owner of the list.
    pub key: ListKey,
    /// One position sequence, or one permutation per trial for random-different.
    pub positions: Vec<Vec<usize>>,
}

impl CounterbalanceList {
    /// Creates a list whose positions are filled later.
    pub fn new(number_of_values: usize, total_size: usize, style: Style, key: ListKey) -> Self {
        Self {
            number_of_values,
            big_block_size: 0,
            total_size,
            style,
            key,
            positions: Vec::new(),
        }
    }

    /// Number of big blocks in the section.
    pub fn big_block_number(&self) -> usize {
        self.total_size / self.big_block_size
    }

    /// Run length of one value within a cycle.
    pub fn small_block_size(&self) -> usize {
        self.big_block_size / self.number_of_values
    }

    /// Small blocks in the section.
    pub fn small_block_number(&self) -> usize {
        self.total_size / self.small_block_size()
    }

    /// Builds the canonical cycling sequence, reordered by `shuffle` when non-empty.
    pub fn create_positions(&mut self, shuffle: &[usize]) -> Result<(), DesignError> {
        let small = self.small_block_size();
        let mut values = Vec::with_capacity(self.total_size);
        for block in 0..self.small_block_number() {
            let value = block % self.number_of_values;
            values.extend(std::iter::repeat(value).take(small));
        }
        let positions = reorder(&values, shuffle).ok_or_else(|| order_error(&self.key))?;
        self.positions = vec![positions];
        Ok(())
    }

    /// One seeded permutation of `[0, big_block_size)` per big block, concatenated.
    pub fn create_shuffle_numbers(&self, seed: u64) -> Vec<usize> {
        let mut values = Vec::with_capacity(self.total_size);
        for block in 0..self.big_block_number() {
            values.extend(shuffled_range(0..self.big_block_size, trial_seed(seed, block)));
        }
        values
    }

    /// One seeded permutation per small-block stride: for each `i` below
    /// `small_block_size`, a permutation of
    /// `[i * small_block_number, (i + 1) * small_block_number)`.
    pub fn create_shuffle_numbers_alternate(&self, seed: u64) -> Vec<usize> {
        let stride = self.small_block_number();
        let mut values = Vec::with_capacity(self.total_size);
        for i in 0..self.small_block_size() {
            values.extend(shuffled_range(
                i * stride..(i + 1) * stride,
                trial_seed(seed, i),
            ));
        }
        values
    }

    /// Transposed enumeration `j * small_block_size + i`, putting the
    /// alternate axis on the fastest changing position.
    pub fn alternate_order(&self) -> Vec<usize> {
        let small = self.small_block_size();
        let mut order = Vec::with_capacity(self.total_size);
        for i in 0..small {
            for j in 0..self.small_block_number() {
                order.push(j * small + i);
            }
        }
        order
    }
}

/// Picks `values[order[k]]` for every `k`. An empty order is the identity.
///
/// Returns `None` when an index is out of range.
pub fn reorder<T: Clone>(values: &[T], order: &[usize]) -> Option<Vec<T>> {
    if order.is_empty() {
        return Some(values.to_vec());
    }
    order.iter().map(|&idx| values.get(idx).cloned()).collect()
}

fn order_error(key: &ListKey) -> DesignError {
    DesignError::MissingData(
        ErrorInfo::new("counterbalance-order", "a reordering index is out of range")
            .with_context("list", format!("{key:?}")),
    )
}

/// Assigns nested block sizes, builds positions and applies the shared merge order.
///
/// Lists are stable-sorted by style. At most one list can carry an alternate
/// style, since the alternate axis is a single variable.
pub fn arrange(
    mut lists: Vec<CounterbalanceList>,
    total: usize,
    seeds: &SectionSeeds,
) -> Result<Vec<CounterbalanceList>, DesignError> {
    lists.sort_by_key(|list| list.style);

    let mut big_block_size = total;
    let mut shuffle_numbers: Vec<usize> = Vec::new();
    let mut alternate_shuffle: Vec<usize> = Vec::new();

    for (rank, list) in lists.iter_mut().enumerate() {
        list.big_block_size = big_block_size;
        if !list.style.is_nested() {
            continue;
        }
        if big_block_size == 0 || big_block_size % list.number_of_values != 0 {
            return Err(DesignError::Divisibility(
                ErrorInfo::new(
                    "block-divisibility",
                    format!(
                        "the variables cannot be counterbalanced: a block of {} trials cannot hold every one of {} values the same number of times",
                        big_block_size, list.number_of_values
                    ),
                )
                .with_context("list", format!("{:?}", list.key))
                .with_context("big_block_size", big_block_size.to_string())
                .with_hint("make the number of trials a multiple of the product of the list sizes"),
            ));
        }
        big_block_size /= list.number_of_values;

        if shuffle_numbers.is_empty() && list.style == Style::Shuffled {
            shuffle_numbers = list.create_shuffle_numbers(seeds.list_shuffled(rank));
        }
        if alternate_shuffle.is_empty() && list.style == Style::ShuffledAlternate {
            alternate_shuffle = list.create_shuffle_numbers_alternate(seeds.list_alternate(rank));
        }
        list.create_positions(&shuffle_numbers)?;
        debug!(
            list = ?list.key,
            style = list.style.code(),
            big_block_size = list.big_block_size,
            small_block_size = list.small_block_size(),
            "counterbalance list positioned"
        );
    }

    let mut merge_order: Vec<usize> = Vec::new();
    for list in lists.iter_mut() {
        match list.style {
            Style::OrderedAlternate => {
                merge_order = list.alternate_order();
            }
            Style::ShuffledAlternate => {
                merge_order = reorder(&list.alternate_order(), &alternate_shuffle)
                    .ok_or_else(|| order_error(&list.key))?;
            }
            Style::Independent => continue,
            _ => {}
        }
        let merged =
            reorder(&list.positions[0], &merge_order).ok_or_else(|| order_error(&list.key))?;
        list.positions[0] = merged;
    }

    Ok(lists)
}
