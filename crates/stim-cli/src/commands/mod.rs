pub mod generate;
pub mod hash;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use stim_core::model::Section;
use stim_core::seeds::SeedRegistry;
use stim_design::io::load_section;
use stim_design::{generate_section, GenerationConfig, GenerationContext, SectionTask};

/// Inputs shared by every subcommand.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Section definition (JSON, or YAML with a `.yaml`/`.yml` extension).
    #[arg(long)]
    pub section: PathBuf,
    /// Seed registry, a JSON list of `{id, value}` records.
    #[arg(long)]
    pub seeds: Option<PathBuf>,
    /// YAML generation limits.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Section ids in study order, used to resolve branching targets.
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,
}

pub struct Inputs {
    pub section: Section,
    pub registry: SeedRegistry,
    pub config: GenerationConfig,
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let yaml = fs::read_to_string(path)?;
    GenerationConfig::from_yaml_str(&yaml).map_err(|err| Box::new(err) as Box<dyn Error>)
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs, Box<dyn Error>> {
        let section = load_section(&self.section).map_err(|err| Box::new(err) as Box<dyn Error>)?;
        let registry = match &self.seeds {
            Some(path) => SeedRegistry::load(path).map_err(|err| Box::new(err) as Box<dyn Error>)?,
            None => SeedRegistry::new(),
        };
        let config = load_config(self.config.as_deref())?;
        Ok(Inputs {
            section,
            registry,
            config,
        })
    }

    pub fn generate(&self, inputs: &Inputs) -> Result<SectionTask, Box<dyn Error>> {
        let ctx = GenerationContext::new(&inputs.config, &inputs.registry, &self.order);
        generate_section(&inputs.section, &ctx).map_err(|err| Box::new(err) as Box<dyn Error>)
    }
}
