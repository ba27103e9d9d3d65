use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use stim_core::model::{ResponseKind, Section, TrialValueMode, Value};

use crate::task::VariableTask;

/// Per-trial reference values a response is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReference {
    /// Response kind, when the section scores responses.
    pub kind: Option<ResponseKind>,
    /// Trial-value mode the references were derived with.
    pub mode: TrialValueMode,
    /// Tolerance when comparing responses with references.
    pub difference: f64,
    /// Value recorded when no response is given.
    pub no_response_default: Option<f64>,
    /// First reference coordinate per trial (scalar, x or radius).
    pub values: Vec<f64>,
    /// Second reference coordinate per trial (y or angle), 2d only.
    pub values1: Vec<f64>,
}

/// Polar coordinates of `(x, y)` with the angle in `[0, 2π)`.
pub fn cartesian_to_polar(x: f64, y: f64) -> (f64, f64) {
    let radius = x.hypot(y);
    let angle = y.atan2(x).rem_euclid(TAU);
    (radius, angle)
}

impl ScoringReference {
    /// Derives references from the section's response descriptor and the
    /// trial-value shadow task. `None` when the section scores nothing.
    pub fn build(section: &Section, trial_value: Option<&VariableTask>) -> Option<Self> {
        if section.response_value.is_none() && trial_value.is_none() {
            return None;
        }
        let mode = section
            .trial_value
            .as_ref()
            .map(|trial_value| trial_value.mode)
            .unwrap_or_default();
        let mut reference = Self {
            kind: section.response_value.as_ref().map(|response| response.kind),
            mode,
            difference: section
                .response_value
                .as_ref()
                .map(|response| response.difference)
                .unwrap_or(0.001),
            no_response_default: section
                .response_value
                .as_ref()
                .and_then(|response| response.no_response_default),
            values: Vec::new(),
            values1: Vec::new(),
        };
        if let Some(task) = trial_value {
            reference.values = vec![0.0; task.values.len()];
            for trial in 0..task.values.len() {
                reference.refresh_trial(trial, task);
            }
        }
        Some(reference)
    }

    /// Recomputes the references of one trial, once a response-dependent
    /// value has been resolved during playback.
    pub fn refresh_trial(&mut self, trial: usize, task: &VariableTask) {
        let Some(value) = task.values.get(trial) else {
            return;
        };
        if trial >= self.values.len() {
            self.values.resize(trial + 1, 0.0);
        }
        let (x, y) = scaled(value);
        if self.mode == TrialValueMode::Different {
            self.values[trial] = x;
            return;
        }
        match task.list_dimensions {
            2 => {
                let pair = match self.kind {
                    Some(kind) if kind.is_polar() => Some(cartesian_to_polar(x, y)),
                    Some(ResponseKind::Value) | None => None,
                    Some(_) => Some((x, y)),
                };
                if let Some((first, second)) = pair {
                    if trial >= self.values1.len() {
                        self.values1.resize(trial + 1, 0.0);
                    }
                    self.values[trial] = first;
                    self.values1[trial] = second;
                }
            }
            3 => {}
            _ => self.values[trial] = x,
        }
    }
}

fn scaled(value: &Value) -> (f64, f64) {
    let factor = value.unit_factor();
    (value.components[0] / factor, value.components[1] / factor)
}
