mod common;

use common::{block_variable, generate, population, registry, scalar_list, section, variable};
use stim_core::errors::DesignError;
use stim_core::model::{StartChoice, VariableGroup};
use stim_design::blocks::{calculate_first_from, calculate_order, randomize_blocks};

#[test]
fn order_without_switching_stays_put() {
    assert_eq!(calculate_order(0, 5, 0.0, 77), vec![0, 0, 0, 0, 0]);
    assert_eq!(calculate_order(1, 3, 0.0, 77), vec![1, 1, 1]);
}

#[test]
fn order_with_certain_switching_alternates() {
    assert_eq!(calculate_order(0, 5, 1.0, 77), vec![0, 1, 0, 1, 0]);
}

#[test]
fn empty_order_is_empty() {
    assert!(calculate_order(0, 0, 0.5, 1).is_empty());
}

#[test]
fn explicit_start_ignores_the_seed() {
    for seed in 0..20 {
        assert_eq!(calculate_first_from(StartChoice::First, seed), 0);
        assert_eq!(calculate_first_from(StartChoice::Second, seed), 1);
        assert!(calculate_first_from(StartChoice::Random, seed) <= 1);
    }
}

fn two_population_variable() -> stim_core::model::Variable {
    block_variable(
        "blocks",
        vec![
            population(
                vec![scalar_list("low", 2), scalar_list("mid", 2)],
                StartChoice::First,
                0.0,
            ),
            population(
                vec![scalar_list("high", 3), scalar_list("top", 1)],
                StartChoice::Second,
                0.0,
            ),
        ],
        4,
        3,
        StartChoice::First,
        1.0,
    )
}

#[test]
fn populations_alternate_and_numbers_index_the_pool() {
    let variable = two_population_variable();
    let outcome = randomize_blocks(&variable, 1234, 12).unwrap();
    let design = variable.list.as_ref().unwrap().blocks.as_ref().unwrap();
    let pool = design.value_pool();

    let populations: Vec<usize> = outcome.trace.iter().map(|t| t.population).collect();
    assert_eq!(populations, vec![0, 0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1]);
    assert_eq!(outcome.task.numbers.len(), 12);
    for (number, value) in outcome.task.numbers.iter().zip(&outcome.task.values) {
        assert_eq!(pool[*number].id, value.id);
    }
}

#[test]
fn only_the_first_block_uses_the_authored_start() {
    let variable = two_population_variable();
    let outcome = randomize_blocks(&variable, 99, 12).unwrap();

    assert!(outcome.trace[..3].iter().all(|t| t.list == 0));
    for block in outcome.trace.chunks(3) {
        assert!(block.iter().all(|t| t.list == block[0].list));
    }
}

#[test]
fn single_population_keeps_every_block_in_population_one() {
    let variable = block_variable(
        "blocks",
        vec![population(
            vec![scalar_list("low", 2), scalar_list("mid", 2)],
            StartChoice::Random,
            0.5,
        )],
        3,
        4,
        StartChoice::Second,
        1.0,
    );
    let outcome = randomize_blocks(&variable, 5, 12).unwrap();
    assert!(outcome.trace.iter().all(|t| t.population == 0));
}

#[test]
fn block_lists_may_not_jitter() {
    let mut jittered = scalar_list("low", 2);
    jittered.jitter.active = true;
    jittered.jitter.amplitude = 0.2;
    let variable = block_variable(
        "blocks",
        vec![population(vec![jittered, scalar_list("mid", 2)], StartChoice::First, 0.0)],
        2,
        2,
        StartChoice::First,
        0.0,
    );
    let err = randomize_blocks(&variable, 5, 4).unwrap_err();
    assert!(matches!(err, DesignError::JitteringConflict(_)));
}

#[test]
fn block_lists_must_match_variable_dimensions() {
    let mut variable = block_variable(
        "blocks",
        vec![population(
            vec![scalar_list("low", 2), scalar_list("mid", 2)],
            StartChoice::First,
            0.0,
        )],
        2,
        2,
        StartChoice::First,
        0.0,
    );
    variable.dimensions = 2;
    let err = randomize_blocks(&variable, 5, 4).unwrap_err();
    assert!(matches!(err, DesignError::DimensionMismatch(_)));

    variable.dimensions = 8;
    assert!(randomize_blocks(&variable, 5, 4).is_ok());
}

#[test]
fn empty_block_list_is_missing_data() {
    let variable = block_variable(
        "blocks",
        vec![population(
            vec![scalar_list("low", 0), scalar_list("mid", 2)],
            StartChoice::First,
            0.0,
        )],
        2,
        2,
        StartChoice::First,
        0.0,
    );
    let err = randomize_blocks(&variable, 5, 4).unwrap_err();
    assert!(matches!(err, DesignError::MissingData(_)));
}

fn single_population(lists: usize) -> stim_core::model::Variable {
    let lists = (0..lists).map(|k| scalar_list(&format!("l{k}"), 2)).collect();
    block_variable(
        "blocks",
        vec![population(lists, StartChoice::First, 0.0)],
        4,
        3,
        StartChoice::First,
        0.0,
    )
}

#[test]
fn populations_need_exactly_two_lists_under_every_seed() {
    for lists in [0, 1, 3] {
        let variable = single_population(lists);
        for seed in 0..20 {
            let err = randomize_blocks(&variable, seed, 12).unwrap_err();
            assert!(matches!(err, DesignError::MissingData(_)));
            assert_eq!(err.info().code, "block-list-count");
        }
    }
    let variable = single_population(2);
    for seed in 0..20 {
        assert!(randomize_blocks(&variable, seed, 12).is_ok());
    }
}

#[test]
fn oversized_block_design_is_a_trial_count_error() {
    let mut variable = two_population_variable();
    if let Some(design) = variable.list.as_mut().and_then(|list| list.blocks.as_mut()) {
        design.number_of_blocks = 1 << 40;
        design.length_of_blocks = 1 << 40;
        assert_eq!(design.trial_count(), usize::MAX);
    }
    let section = section("s1", vec![variable]);
    let err = generate(&section, &registry(&[("s1", 1), ("blocks", 2)])).unwrap_err();
    assert!(matches!(err, DesignError::TrialCount(_)));
    assert_eq!(err.info().code, "trial-count-max");
}

#[test]
fn a_second_block_variable_is_rejected() {
    let mut second = two_population_variable();
    second.id = "more-blocks".to_string();
    second.name = "more-blocks".to_string();
    let section = section("s1", vec![two_population_variable(), second]);
    let err = generate(&section, &registry(&[("s1", 1), ("blocks", 2)])).unwrap_err();
    assert!(matches!(err, DesignError::TrialCount(_)));
    assert_eq!(err.info().code, "block-variable-count");
}

#[test]
fn block_variable_defines_the_section_and_comes_first() {
    let section = section(
        "s1",
        vec![
            variable("a", VariableGroup::Ungrouped, common::in_order(), scalar_list("a", 3)),
            two_population_variable(),
        ],
    );
    let task = generate(&section, &registry(&[("s1", 1), ("blocks", 2)])).unwrap();

    assert_eq!(task.number_of_trials, 12);
    assert_eq!(task.variable_tasks[0].id, "blocks");
    assert_eq!(task.blocks.len(), 12);
    assert_eq!(task.trial_columns().last().map(String::as_str), Some("block"));
    assert_eq!(task.trial_rows()[0].last().map(String::as_str), Some("1/1/1"));
    assert_eq!(
        task.seeds_used.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec!["s1", "blocks"]
    );
}

#[test]
fn block_trial_count_must_match_the_section() {
    let mut section = section("s1", vec![two_population_variable()]);
    section.total_possibilities = Some(6);
    let err = generate(&section, &registry(&[("s1", 1), ("blocks", 2)])).unwrap_err();
    assert!(matches!(err, DesignError::TrialCount(_)));
}
