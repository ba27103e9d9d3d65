use serde::{Deserialize, Serialize};
use stim_core::errors::{DesignError, ErrorInfo};

/// YAML-configurable limits governing a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Exclusive upper bound on the number of trials in a section.
    #[serde(default = "default_max_trials")]
    pub max_trials: usize,
    /// Inclusive upper bound for freshly drawn base seeds.
    #[serde(default = "default_fallback_seed_max")]
    pub fallback_seed_max: u64,
}

fn default_max_trials() -> usize {
    100_000
}

fn default_fallback_seed_max() -> u64 {
    10_000_000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_trials: default_max_trials(),
            fallback_seed_max: default_fallback_seed_max(),
        }
    }
}

impl GenerationConfig {
    /// Parses a YAML document; absent fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DesignError> {
        serde_yaml::from_str(yaml)
            .map_err(|err| {
                DesignError::Serde(ErrorInfo::new("config-deserialize", err.to_string()))
            })
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml_string(&self) -> Result<String, DesignError> {
        serde_yaml::to_string(self)
            .map_err(|err| {
                DesignError::Serde(ErrorInfo::new("config-serialize", err.to_string()))
            })
    }
}
