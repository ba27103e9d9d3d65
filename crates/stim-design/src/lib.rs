#![deny(missing_docs)]

//! Seeded per-trial design generation for experiment sections.
//!
//! A section's variables are expanded into one value sequence each:
//! counterbalanced lists follow nested block orders, independent selections
//! draw per trial from derived seed streams and a block-defining variable is
//! driven by a two-level Markov chain. Identical inputs and stored seeds
//! always produce an identical [`SectionTask`].

/// Final pass: units, jitter and the trial-value shadow task.
pub mod assemble;
/// Markov randomization of block-defining variables.
pub mod blocks;
/// YAML configuration schema and defaults.
pub mod config;
/// Nested block counterbalancing and the shared merge order.
pub mod counterbalance;
/// Seed stream derivation.
pub mod determinism;
/// Branching conditions between sections.
pub mod flow;
/// Public `generate_section` entry points.
pub mod generate;
/// Canonical design hashing.
pub mod hash;
/// JSON and YAML encoding of sections and generated tasks.
pub mod io;
/// Scoring references derived from the trial value.
pub mod scoring;
/// Per-variable sequences of grouped variables.
pub mod sequence;
/// Generated task types.
pub mod task;
/// Checks rejecting unusable sections.
pub mod validate;

pub use config::GenerationConfig;
pub use counterbalance::{reorder, CounterbalanceList, ListKey, Style};
pub use determinism::{BlockSeeds, SectionSeeds};
pub use flow::Condition;
pub use generate::{generate_section, generate_section_with_rng, GenerationContext};
pub use hash::design_hash;
pub use scoring::ScoringReference;
pub use task::{BlockTrace, PlaybackCounters, SectionTask, VariableTask};
