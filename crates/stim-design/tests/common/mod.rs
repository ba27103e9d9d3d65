#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use stim_core::errors::DesignError;
use stim_core::model::{
    BlockDesign, Jitter, ListOfValues, Population, Priority, SceneRef, Section, SectionFlow,
    Selection, StartChoice, StimulusProperty, UnitInfo, Value, Variable, VariableGroup,
};
use stim_core::seeds::SeedRegistry;
use stim_design::{generate_section_with_rng, GenerationConfig, GenerationContext, SectionTask};

pub fn scalar_list(id: &str, count: usize) -> ListOfValues {
    ListOfValues {
        id: id.to_string(),
        name: format!("{id}-list"),
        dimensions: 1,
        values: (0..count)
            .map(|k| Value::scalar(format!("{id}-{k}"), k as f64))
            .collect(),
        jitter: Jitter::default(),
        reordering: Vec::new(),
        blocks: None,
    }
}

pub fn vector_list(id: &str, points: &[(f64, f64)]) -> ListOfValues {
    ListOfValues {
        dimensions: 2,
        values: points
            .iter()
            .enumerate()
            .map(|(k, (x, y))| Value::vector(format!("{id}-{k}"), [*x, *y, 0.0]))
            .collect(),
        ..scalar_list(id, 0)
    }
}

pub fn property(name: &str) -> StimulusProperty {
    StimulusProperty {
        name: name.to_string(),
        unit: UnitInfo {
            name: "deg".to_string(),
            ..UnitInfo::default()
        },
    }
}

pub fn variable(
    id: &str,
    group: VariableGroup,
    selection: Selection,
    list: ListOfValues,
) -> Variable {
    Variable {
        id: id.to_string(),
        name: id.to_string(),
        group,
        selection,
        list: Some(list),
        object: Some(format!("object-{id}")),
        property: Some(property(&format!("property-{id}"))),
        dimensions: 1,
    }
}

/// Ungrouped variable selecting its values in order.
pub fn ordered(id: &str, list: ListOfValues) -> Variable {
    variable(id, VariableGroup::Ungrouped, in_order(), list)
}

pub fn in_order() -> Selection {
    Selection::InOrder {
        priority: Priority::Medium,
    }
}

pub fn section(id: &str, variables: Vec<Variable>) -> Section {
    Section {
        id: id.to_string(),
        name: format!("{id}-name"),
        scenes: vec![SceneRef {
            id: "scene".to_string(),
            name: "stimulus".to_string(),
        }],
        variables,
        alternate: None,
        total_possibilities: None,
        trial_value: None,
        response_value: None,
        next: SectionFlow::default(),
    }
}

pub fn population(
    lists: Vec<ListOfValues>,
    starting_list: StartChoice,
    prob_change_list: f64,
) -> Population {
    Population {
        lists,
        starting_list,
        prob_change_list,
    }
}

/// Block-defining variable over `populations`.
pub fn block_variable(
    id: &str,
    populations: Vec<Population>,
    number_of_blocks: usize,
    length_of_blocks: usize,
    starting_block: StartChoice,
    prob_change_block: f64,
) -> Variable {
    let mut list = scalar_list(id, 0);
    list.blocks = Some(BlockDesign {
        populations,
        number_of_blocks,
        length_of_blocks,
        starting_block,
        prob_change_block,
    });
    variable(id, VariableGroup::Blocks, in_order(), list)
}

pub fn registry(entries: &[(&str, u64)]) -> SeedRegistry {
    let mut registry = SeedRegistry::new();
    for (id, value) in entries {
        registry.insert(*id, *value);
    }
    registry
}

pub fn generate(section: &Section, registry: &SeedRegistry) -> Result<SectionTask, DesignError> {
    let config = GenerationConfig::default();
    let order: Vec<String> = Vec::new();
    let ctx = GenerationContext::new(&config, registry, &order);
    let mut rng = StdRng::seed_from_u64(0);
    generate_section_with_rng(section, &ctx, &mut rng)
}

pub fn numbers<'a>(task: &'a SectionTask, id: &str) -> &'a [usize] {
    &task.task(id).expect("task generated").numbers
}
