//! Structured error types shared across the stim crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`DesignError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Message shown to the author of the experiment.
    pub message: String,
    /// Contextual key value pairs (variable names, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the author resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for section generation.
///
/// Every variant is caused by bad authoring data. None of them is transient,
/// so callers should surface the message and block the section until the
/// definition is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DesignError {
    /// The section has no scenes.
    #[error("empty scenes: {0}")]
    EmptyScenes(ErrorInfo),
    /// The trial count is zero or exceeds the configured maximum.
    #[error("trial count error: {0}")]
    TrialCount(ErrorInfo),
    /// A list size does not divide the trial count or block size.
    #[error("divisibility error: {0}")]
    Divisibility(ErrorInfo),
    /// More "different" siblings than values in their shared list.
    #[error("group size error: {0}")]
    GroupSize(ErrorInfo),
    /// List vs variable or trial vs response dimensionality disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(ErrorInfo),
    /// Jitter requested on a block-controlled list.
    #[error("jittering conflict: {0}")]
    JitteringConflict(ErrorInfo),
    /// Unassigned block lists or unresolved bindings.
    #[error("missing data: {0}")]
    MissingData(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl DesignError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DesignError::EmptyScenes(info)
            | DesignError::TrialCount(info)
            | DesignError::Divisibility(info)
            | DesignError::GroupSize(info)
            | DesignError::DimensionMismatch(info)
            | DesignError::JitteringConflict(info)
            | DesignError::MissingData(info)
            | DesignError::Serde(info) => info,
        }
    }

    /// Returns the author-facing message without code or context.
    pub fn message(&self) -> &str {
        &self.info().message
    }

    /// Shorthand for a [`DesignError::MissingData`] with the given code.
    pub fn missing(code: &str, message: impl Into<String>) -> Self {
        DesignError::MissingData(ErrorInfo::new(code, message))
    }
}
