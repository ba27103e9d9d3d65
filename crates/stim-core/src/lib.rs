#![deny(missing_docs)]
#![doc = "Core data model, seeded randomness and error types for section design generation."]

pub mod errors;
pub mod model;
pub mod rng;
pub mod seeds;

pub use errors::{DesignError, ErrorInfo};
pub use model::{
    BlockDesign, ConditionKind, CorrectStart, FlowRule, Jitter, ListOfValues, Population,
    Priority, ResponseKind, ResponseValue, SceneRef, Section, SectionFlow, Selection,
    StartChoice, StimulusProperty, TrialValue, TrialValueMode, UnitInfo, Value, Variable,
    VariableGroup,
};
pub use rng::{random_float, random_int, shuffle, RngHandle};
pub use seeds::{resolve_seed, ResolvedSeed, SeedEntry, SeedLookup, SeedRecord, SeedRegistry};
