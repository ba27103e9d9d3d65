//! Authoring data model consumed read-only by the generation pass.
//!
//! Definitions are decoded once (serde) into closed types; nothing downstream
//! re-parses strings to decide behaviour. Membership is always by id.

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, ErrorInfo};

/// Scene reference. Scene contents belong to the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRef {
    /// Scene identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One section of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier, also the seed registry key for the section streams.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Scenes presented on each trial.
    #[serde(default)]
    pub scenes: Vec<SceneRef>,
    /// Independent variables in authoring order.
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Variable id of the alternate axis, if any.
    #[serde(default)]
    pub alternate: Option<String>,
    /// Precomputed trial count. Derived from the variables when absent.
    #[serde(default)]
    pub total_possibilities: Option<usize>,
    /// Presented value the responses are scored against.
    #[serde(default)]
    pub trial_value: Option<TrialValue>,
    /// How responses are scored.
    #[serde(default)]
    pub response_value: Option<ResponseValue>,
    /// Branching rules evaluated after the section.
    #[serde(default)]
    pub next: SectionFlow,
}

impl Section {
    /// Returns the variable with the given id.
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.id == id)
    }

    /// Returns the block-defining variable (`group == -1`), if any.
    pub fn block_variable(&self) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.group == VariableGroup::Blocks)
    }

    /// Variables sharing a counterbalancing unit with `variable`, in section order.
    ///
    /// Ungrouped variables form a unit of their own.
    pub fn same_group<'a>(&'a self, variable: &'a Variable) -> Vec<&'a Variable> {
        match variable.group {
            VariableGroup::Group(group) => self
                .variables
                .iter()
                .filter(|other| other.group == VariableGroup::Group(group))
                .collect(),
            _ => vec![variable],
        }
    }
}

/// Group membership of a variable, serialized as the authoring integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VariableGroup {
    /// `-1`: the variable defines the trial count through blocks.
    Blocks,
    /// `0`: not grouped.
    Ungrouped,
    /// `>0`: counterbalancing group id.
    Group(u32),
}

impl TryFrom<i64> for VariableGroup {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(VariableGroup::Blocks),
            0 => Ok(VariableGroup::Ungrouped),
            n if n > 0 && n <= i64::from(u32::MAX) => Ok(VariableGroup::Group(n as u32)),
            other => Err(format!("invalid variable group {other}")),
        }
    }
}

impl From<VariableGroup> for i64 {
    fn from(group: VariableGroup) -> Self {
        match group {
            VariableGroup::Blocks => -1,
            VariableGroup::Ungrouped => 0,
            VariableGroup::Group(n) => i64::from(n),
        }
    }
}

/// Independent variable of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Group membership.
    #[serde(default = "default_group")]
    pub group: VariableGroup,
    /// Selection strategy.
    pub selection: Selection,
    /// Bound list of values.
    #[serde(default)]
    pub list: Option<ListOfValues>,
    /// Bound stimulus object id.
    #[serde(default)]
    pub object: Option<String>,
    /// Bound stimulus property.
    #[serde(default)]
    pub property: Option<StimulusProperty>,
    /// 1 scalar, 2 vector, 3 color, >3 composite/media.
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
}

fn default_group() -> VariableGroup {
    VariableGroup::Ungrouped
}

fn default_dimensions() -> u8 {
    1
}

impl Variable {
    /// Returns the bound list or a [`DesignError::MissingData`].
    pub fn require_list(&self) -> Result<&ListOfValues, DesignError> {
        self.list.as_ref().ok_or_else(|| {
            DesignError::MissingData(
                ErrorInfo::new("variable-list", "the variable has no list of values assigned")
                    .with_context("variable", self.name.clone()),
            )
        })
    }

    /// Returns the bound object id or a [`DesignError::MissingData`].
    pub fn require_object(&self) -> Result<&str, DesignError> {
        self.object.as_deref().ok_or_else(|| {
            DesignError::MissingData(
                ErrorInfo::new("variable-object", "the variable is not bound to an object")
                    .with_context("variable", self.name.clone()),
            )
        })
    }

    /// Returns the bound property or a [`DesignError::MissingData`].
    pub fn require_property(&self) -> Result<&StimulusProperty, DesignError> {
        self.property.as_ref().ok_or_else(|| {
            DesignError::MissingData(
                ErrorInfo::new("variable-property", "the variable is not bound to a property")
                    .with_context("variable", self.name.clone()),
            )
        })
    }
}

/// Priority of an in-order variable relative to other counterbalanced ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Changes slowest.
    High,
    /// Default priority.
    #[default]
    Medium,
    /// Changes fastest.
    Low,
}

/// Starting point of a response-dependent variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum CorrectStart {
    /// Start at the first value.
    Zero,
    /// Start at the given (zero-based) value index.
    Value(usize),
}

impl CorrectStart {
    /// Zero-based starting index.
    pub fn index(&self) -> usize {
        match self {
            CorrectStart::Zero => 0,
            CorrectStart::Value(index) => *index,
        }
    }
}

/// Closed set of selection strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Selection {
    /// Deterministic counterbalanced cycling.
    InOrder {
        /// Processing priority.
        #[serde(default)]
        priority: Priority,
    },
    /// Counterbalanced cycling shuffled within big blocks.
    Shuffled,
    /// Independent uniform draw per trial; group siblings share the draw.
    RandomEqual,
    /// Independent draw per trial; group siblings never share a value.
    RandomDifferent,
    /// Same user-chosen value on every trial.
    Fixed {
        /// Zero-based value index.
        index: usize,
    },
    /// Value resolved at playback from previous response correctness.
    Correct {
        /// Initial value.
        start: CorrectStart,
    },
}

impl Selection {
    /// Stable name of the strategy, used in messages and comparisons.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Selection::InOrder { .. } => "in-order",
            Selection::Shuffled => "shuffled",
            Selection::RandomEqual => "random-equal",
            Selection::RandomDifferent => "random-different",
            Selection::Fixed { .. } => "fixed",
            Selection::Correct { .. } => "correct",
        }
    }

    /// Whether the strategy takes part in combinatorial counterbalancing.
    pub fn is_counterbalanced(&self) -> bool {
        matches!(self, Selection::InOrder { .. } | Selection::Shuffled)
    }
}

/// Unit metadata stamped onto values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Unit name.
    pub name: String,
    /// Conversion factor from unit to internal value.
    #[serde(default = "default_factor")]
    pub factor: f64,
    /// Optional time unit for rates.
    #[serde(default)]
    pub time_unit: Option<String>,
    /// Exponent applied to the time unit.
    #[serde(default)]
    pub time_exponent: i32,
    /// Unit family (size, angle, time, ...).
    #[serde(default)]
    pub unit_type: String,
}

fn default_factor() -> f64 {
    1.0
}

impl Default for UnitInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            factor: default_factor(),
            time_unit: None,
            time_exponent: 0,
            unit_type: String::new(),
        }
    }
}

/// Stimulus property a variable drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusProperty {
    /// Property name.
    pub name: String,
    /// Unit of the property.
    #[serde(default)]
    pub unit: UnitInfo,
}

/// Concrete value of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    /// Stable identifier, used to locate values in block pools.
    pub id: String,
    /// Up to three numeric components (scalar, vector, color).
    #[serde(default)]
    pub components: [f64; 3],
    /// Text or media reference for composite values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Unit stamped by the assembler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitInfo>,
}

impl Value {
    /// Creates a scalar value.
    pub fn scalar(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            components: [value, 0.0, 0.0],
            text: None,
            unit: None,
        }
    }

    /// Creates a value with explicit components.
    pub fn vector(id: impl Into<String>, components: [f64; 3]) -> Self {
        Self {
            id: id.into(),
            components,
            text: None,
            unit: None,
        }
    }

    /// Unit factor, 1 when no unit has been stamped.
    pub fn unit_factor(&self) -> f64 {
        self.unit.as_ref().map(|unit| unit.factor).unwrap_or(1.0)
    }

    /// Renders the value without unit for the given dimensionality.
    pub fn display(&self, dimensions: u8) -> String {
        let [a, b, c] = self.components;
        match dimensions {
            2 => format!("{a};{b}"),
            3 => format!("{a};{b};{c}"),
            d if d > 3 => self.text.clone().unwrap_or_else(|| format!("{a}")),
            _ => format!("{a}"),
        }
    }
}

/// Jitter settings of a list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Jitter {
    /// Whether jitter is applied.
    #[serde(default)]
    pub active: bool,
    /// Maximum absolute perturbation per component.
    #[serde(default)]
    pub amplitude: f64,
}

/// Ordered list of values bound to a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOfValues {
    /// Stable identifier, also the seed registry key for block streams.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Dimensionality of the values.
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
    /// Values in presentation order.
    #[serde(default)]
    pub values: Vec<Value>,
    /// Jitter settings.
    #[serde(default)]
    pub jitter: Jitter,
    /// Authoring-order permutation; empty means identity.
    #[serde(default)]
    pub reordering: Vec<usize>,
    /// Block structure, only for block-defining variables.
    #[serde(default)]
    pub blocks: Option<BlockDesign>,
}

/// Starting choice of a two-state chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartChoice {
    /// Seeded coin flip.
    #[default]
    Random,
    /// Always state 0.
    First,
    /// Always state 1.
    Second,
}

/// Candidate lists and chain parameters of one block population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Candidate lists, indexed by the list chain state.
    #[serde(default)]
    pub lists: Vec<ListOfValues>,
    /// Starting list choice, used for the first block only.
    #[serde(default)]
    pub starting_list: StartChoice,
    /// Probability of switching list between consecutive trials.
    #[serde(default)]
    pub prob_change_list: f64,
}

/// Nested block structure of a block-defining variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDesign {
    /// One population (`typesOfBlocks == 1`) or two.
    #[serde(default)]
    pub populations: Vec<Population>,
    /// Number of blocks.
    pub number_of_blocks: usize,
    /// Trials per block.
    pub length_of_blocks: usize,
    /// Population of the first block (two-population designs).
    #[serde(default)]
    pub starting_block: StartChoice,
    /// Probability of switching population between consecutive blocks.
    #[serde(default)]
    pub prob_change_block: f64,
}

impl BlockDesign {
    /// Number of trials the design produces, saturating at `usize::MAX`.
    pub fn trial_count(&self) -> usize {
        self.number_of_blocks.saturating_mul(self.length_of_blocks)
    }

    /// Every value of every candidate list, de-duplicated by id in first-seen order.
    pub fn value_pool(&self) -> Vec<&Value> {
        let mut pool: Vec<&Value> = Vec::new();
        for population in &self.populations {
            for list in &population.lists {
                for value in &list.values {
                    if !pool.iter().any(|seen| seen.id == value.id) {
                        pool.push(value);
                    }
                }
            }
        }
        pool
    }
}

/// How the trial value relates to its source variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialValueMode {
    /// Echo the variable's values.
    #[default]
    Same,
    /// Remap through a separate value table.
    Different,
}

/// Trial value descriptor of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialValue {
    /// Source variable id.
    pub variable: String,
    /// Echo or remap.
    #[serde(default)]
    pub mode: TrialValueMode,
    /// Replacement table for `different` mode and media lists.
    #[serde(default)]
    pub values: Vec<Value>,
    /// Dimensionality of the replacement table.
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
}

/// Kind of response scored against the trial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseKind {
    /// Horizontal coordinate.
    PositionX,
    /// Vertical coordinate.
    PositionY,
    /// Polar radius.
    PositionRadius,
    /// Polar angle.
    PositionAngle,
    /// Scalar value.
    Value,
    /// Full 2d position.
    PositionVector,
}

impl ResponseKind {
    /// Dimensionality implied by the response kind.
    pub fn dimensions(&self) -> u8 {
        match self {
            ResponseKind::PositionVector => 2,
            _ => 1,
        }
    }

    /// Whether the kind is expressed in polar coordinates.
    pub fn is_polar(&self) -> bool {
        matches!(
            self,
            ResponseKind::PositionRadius | ResponseKind::PositionAngle
        )
    }
}

/// Response scoring descriptor of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseValue {
    /// Response kind.
    pub kind: ResponseKind,
    /// Tolerance when comparing responses with trial values.
    #[serde(default = "default_difference")]
    pub difference: f64,
    /// Value recorded when no response is given.
    #[serde(default)]
    pub no_response_default: Option<f64>,
}

fn default_difference() -> f64 {
    0.001
}

/// Branching condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    /// At least `n` correct responses.
    CorrectAtLeast,
    /// At least `n` incorrect responses.
    IncorrectAtLeast,
    /// At least `n` responses given in time.
    RespondedInTimeAtLeast,
    /// At least `n` trials without an in-time response.
    NotRespondedInTimeAtLeast,
}

/// Authored branching rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRule {
    /// Condition kind.
    pub kind: ConditionKind,
    /// Threshold, rounded to the nearest integer.
    pub n: f64,
    /// Target section id.
    #[serde(default)]
    pub target: Option<String>,
}

/// Branching rules evaluated after the section ends.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionFlow {
    /// Conditional rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<FlowRule>,
    /// Target when no rule matches.
    #[serde(default)]
    pub default_target: Option<String>,
}
