//! Branching between sections once a section ends.

use serde::{Deserialize, Serialize};
use stim_core::model::{ConditionKind, SectionFlow};

use crate::task::{PlaybackCounters, SectionTask};

/// Resolved branching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition kind; `None` for the unconditional fallback.
    pub kind: Option<ConditionKind>,
    /// Rounded threshold.
    pub n: i64,
    /// Index of the target section in the study order, `None` when it ends
    /// the study or cannot be resolved.
    pub section_index: Option<usize>,
}

impl Condition {
    /// Whether the playback counters satisfy the condition.
    pub fn is_met(&self, counters: &PlaybackCounters) -> bool {
        let count = match self.kind {
            None => return true,
            Some(ConditionKind::CorrectAtLeast) => counters.correct,
            Some(ConditionKind::IncorrectAtLeast) => counters.incorrect,
            Some(ConditionKind::RespondedInTimeAtLeast) => counters.responded_in_time,
            Some(ConditionKind::NotRespondedInTimeAtLeast) => counters.not_responded_in_time,
        };
        i64::try_from(count).unwrap_or(i64::MAX) >= self.n
    }
}

fn resolve_target(target: Option<&str>, section_order: &[String]) -> Option<usize> {
    let target = target.filter(|target| !target.is_empty())?;
    section_order.iter().position(|id| id == target)
}

/// Translates authored rules into conditions, followed by the unconditional
/// fallback to the default target.
pub fn build_conditions(flow: &SectionFlow, section_order: &[String]) -> Vec<Condition> {
    let mut conditions: Vec<Condition> = flow
        .rules
        .iter()
        .map(|rule| Condition {
            kind: Some(rule.kind),
            n: rule.n.round() as i64,
            section_index: resolve_target(rule.target.as_deref(), section_order),
        })
        .collect();
    conditions.push(Condition {
        kind: None,
        n: 0,
        section_index: resolve_target(flow.default_target.as_deref(), section_order),
    });
    conditions
}

impl SectionTask {
    /// Target of the first condition met by the task's counters.
    pub fn next_section(&self) -> Option<usize> {
        self.conditions
            .iter()
            .find(|condition| condition.is_met(&self.counters))
            .and_then(|condition| condition.section_index)
    }
}
