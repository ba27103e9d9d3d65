use rand::RngCore;
use stim_core::errors::DesignError;
use stim_core::model::Section;
use stim_core::seeds::{resolve_seed, ResolvedSeed, SeedLookup, SeedRecord};
use tracing::{debug, info, warn};

use crate::assemble;
use crate::blocks;
use crate::config::GenerationConfig;
use crate::determinism::SectionSeeds;
use crate::flow;
use crate::hash::design_hash;
use crate::scoring::ScoringReference;
use crate::sequence;
use crate::task::{PlaybackCounters, SectionTask};
use crate::validate;

/// Read-only inputs shared by every section of a study.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Limits of the pass.
    pub config: &'a GenerationConfig,
    /// Stored base seeds keyed by section or list id.
    pub seeds: &'a dyn SeedLookup,
    /// Section ids in study order, used to resolve branching targets.
    pub section_order: &'a [String],
}

impl<'a> GenerationContext<'a> {
    /// Creates a context.
    pub fn new(
        config: &'a GenerationConfig,
        seeds: &'a dyn SeedLookup,
        section_order: &'a [String],
    ) -> Self {
        Self {
            config,
            seeds,
            section_order,
        }
    }
}

/// Generates the design of `section`, drawing missing base seeds from the
/// thread RNG.
pub fn generate_section(
    section: &Section,
    ctx: &GenerationContext<'_>,
) -> Result<SectionTask, DesignError> {
    let mut rng = rand::thread_rng();
    generate_section_with_rng(section, ctx, &mut rng)
}

fn resolve(
    ctx: &GenerationContext<'_>,
    id: &str,
    rng: &mut dyn RngCore,
    used: &mut Vec<SeedRecord>,
) -> ResolvedSeed {
    let seed = resolve_seed(ctx.seeds, id, ctx.config.fallback_seed_max, rng);
    if !seed.stored {
        warn!(id, seed = seed.value, "no stored seed, drew a fresh one");
    }
    used.push(SeedRecord {
        id: id.to_string(),
        value: seed.value,
    });
    seed
}

/// Generates the design of `section`; `rng` only draws missing base seeds.
///
/// With every base seed stored in the context the result is a pure function
/// of the section.
pub fn generate_section_with_rng(
    section: &Section,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<SectionTask, DesignError> {
    validate::check_scenes(section)?;
    validate::check_block_variables(section)?;
    let total = sequence::derive_total_trials(section);
    validate::check_trial_count(total, ctx.config)?;
    validate::check_divisibility(section, total)?;
    debug!(section = %section.name, trials = total, "section validated");

    let mut seeds_used = Vec::new();
    let section_seed = resolve(ctx, &section.id, rng, &mut seeds_used);
    let seeds = SectionSeeds::new(section_seed.value);

    let mut variable_tasks = sequence::build_sequences(section, total, &seeds)?;
    let mut trace = Vec::new();
    if let Some(variable) = section.block_variable() {
        let list = variable.require_list()?;
        let block_seed = resolve(ctx, &list.id, rng, &mut seeds_used);
        let outcome = blocks::randomize_blocks(variable, block_seed.value, total)?;
        variable_tasks.insert(0, outcome.task);
        trace = outcome.trace;
    }

    assemble::finalize_values(&mut variable_tasks, &seeds);
    let trial_value = assemble::link_trial_value(section, &mut variable_tasks)?;
    let scoring = ScoringReference::build(
        section,
        trial_value.and_then(|index| variable_tasks.get(index)),
    );

    let task = SectionTask {
        id: section.id.clone(),
        name: section.name.clone(),
        variable_tasks,
        number_of_trials: total,
        conditions: flow::build_conditions(&section.next, ctx.section_order),
        blocks: trace,
        scoring,
        seeds_used,
        counters: PlaybackCounters::default(),
    };

    let hash = design_hash(&task)?;
    info!(
        section = %task.name,
        trials = task.number_of_trials,
        tasks = task.variable_tasks.len(),
        hash = &hash[..12],
        "section generated"
    );
    Ok(task)
}
