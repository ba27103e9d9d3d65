use std::path::Path;

use stim_core::errors::{DesignError, ErrorInfo};
use stim_core::model::Section;

use crate::task::SectionTask;

fn map_json_err(err: serde_json::Error, code: &str) -> DesignError {
    DesignError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn map_yaml_err(err: serde_yaml::Error, code: &str) -> DesignError {
    DesignError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Decodes a section definition from JSON.
pub fn section_from_json(json: &str) -> Result<Section, DesignError> {
    serde_json::from_str(json).map_err(|err| map_json_err(err, "section-json-deserialize"))
}

/// Decodes a section definition from YAML.
pub fn section_from_yaml(yaml: &str) -> Result<Section, DesignError> {
    serde_yaml::from_str(yaml).map_err(|err| map_yaml_err(err, "section-yaml-deserialize"))
}

/// Reads a section definition, as YAML for `.yaml`/`.yml` files and JSON otherwise.
pub fn load_section(path: &Path) -> Result<Section, DesignError> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        DesignError::Serde(
            ErrorInfo::new("section-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => section_from_yaml(&text),
        _ => section_from_json(&text),
    }
}

/// Serialises a generated section to pretty JSON.
pub fn task_to_json(task: &SectionTask) -> Result<String, DesignError> {
    serde_json::to_string_pretty(task).map_err(|err| map_json_err(err, "section-task-serialize"))
}

/// Restores a generated section from JSON.
pub fn task_from_json(json: &str) -> Result<SectionTask, DesignError> {
    serde_json::from_str(json).map_err(|err| map_json_err(err, "section-task-deserialize"))
}
