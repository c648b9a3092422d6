// ABOUTME: Integration tests for the meal plan search
// ABOUTME: Greedy fill, local-search refinement, preconditions, slot omission
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! Tests for the planner including:
//! - Greedy slot fill against per-slot target shares
//! - Zero-mutation refinement at a local optimum
//! - Domain precondition failures
//! - Slot omission, serving bounds, quarter quantization, determinism

use chrono::NaiveDate;
use nutricore::config::PlannerConfig;
use nutricore::errors::EngineError;
use nutricore::models::MacroTotals;
use nutricore::planner::{generate_day_plan, score_delta, CatalogRecipe, DailyTargets, MealType};
use uuid::Uuid;

fn cfg() -> PlannerConfig {
    PlannerConfig::default()
}

fn plan_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn targets() -> DailyTargets {
    DailyTargets {
        kcal: 2000.0,
        protein_g: 150.0,
        carbs_g: 200.0,
        fat_g: 70.0,
    }
}

fn recipe(name: &str, per_serving: MacroTotals, tags: &[MealType]) -> CatalogRecipe {
    CatalogRecipe {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        per_serving,
        meal_tags: tags.to_vec(),
        servings: 2.0,
        ingredient_count: 4,
    }
}

/// One recipe per slot, each hitting its slot's target share exactly at a
/// quarter-step serving count.
fn exact_fit_catalog() -> Vec<CatalogRecipe> {
    vec![
        recipe(
            "Oatmeal Bowl",
            MacroTotals::new(500.0, 37.5, 50.0, 17.5),
            &[MealType::Breakfast],
        ),
        recipe(
            "Chicken Rice",
            MacroTotals::new(300.0, 22.5, 30.0, 10.5),
            &[MealType::Lunch],
        ),
        recipe(
            "Salmon Dinner",
            MacroTotals::new(700.0, 52.5, 70.0, 24.5),
            &[MealType::Dinner],
        ),
        recipe(
            "Greek Yogurt",
            MacroTotals::new(200.0, 15.0, 20.0, 7.0),
            &[MealType::Snack],
        ),
    ]
}

// ============================================================================
// Greedy Fill and Local Optimum
// ============================================================================

#[test]
fn test_exact_fit_catalog_fills_all_slots_on_target() {
    let plan = generate_day_plan(plan_date(), &targets(), &exact_fit_catalog(), &cfg()).unwrap();

    assert_eq!(plan.filled_slots, 4);
    assert_eq!(plan.slots.len(), 4);
    assert_eq!(plan.date, plan_date());

    // Breakfast 1.0, Lunch 2.0, Dinner 1.0, Snack 1.0 servings.
    let servings: Vec<f64> = plan.slots.iter().map(|s| s.servings).collect();
    assert_eq!(servings, vec![1.0, 2.0, 1.0, 1.0]);

    assert!((plan.totals.kcal - 2000.0).abs() < 1e-9);
    assert!((plan.totals.protein_g - 150.0).abs() < 1e-9);
    assert!((plan.totals.carbs_g - 200.0).abs() < 1e-9);
    assert!((plan.totals.fat_g - 70.0).abs() < 1e-9);
}

#[test]
fn test_refinement_makes_zero_mutations_at_local_optimum() {
    // An exact fit is a local optimum: every ±0.25/±0.5 move strictly
    // worsens the day score, so phase 2 must leave servings untouched.
    let plan = generate_day_plan(plan_date(), &targets(), &exact_fit_catalog(), &cfg()).unwrap();
    let day_target = MacroTotals::new(2000.0, 150.0, 200.0, 70.0);
    assert!(
        score_delta(&plan.totals, &day_target, &cfg()) < 1e-12,
        "exact fit scores zero"
    );
    assert_eq!(
        plan.slots.iter().map(|s| s.servings).collect::<Vec<_>>(),
        vec![1.0, 2.0, 1.0, 1.0]
    );
}

#[test]
fn test_refinement_never_worsens_the_greedy_day_score() {
    // A single untagged recipe fills every slot. Greedy picks
    // 2.0 / 2.5 / 2.75 / 0.75 servings; refinement may only improve on that.
    let bar = recipe("Meal Bar", MacroTotals::new(250.0, 20.0, 25.0, 9.0), &[]);
    let catalog = vec![bar.clone()];

    let plan = generate_day_plan(plan_date(), &targets(), &catalog, &cfg()).unwrap();
    assert_eq!(plan.filled_slots, 4);

    let day_target = MacroTotals::new(2000.0, 150.0, 200.0, 70.0);
    let greedy_servings = [2.0, 2.5, 2.75, 0.75];
    let mut greedy_totals = MacroTotals::default();
    for s in greedy_servings {
        greedy_totals.add(&bar.per_serving.scaled(s));
    }
    let greedy_score = score_delta(&greedy_totals, &day_target, &cfg());
    let final_score = score_delta(&plan.totals, &day_target, &cfg());

    assert!(
        final_score <= greedy_score + 1e-9,
        "refinement must not worsen the day score: {final_score} vs {greedy_score}"
    );
}

// ============================================================================
// Eligibility and Omission
// ============================================================================

#[test]
fn test_untagged_catalog_fills_every_slot() {
    let catalog = vec![
        recipe("Anything A", MacroTotals::new(400.0, 30.0, 40.0, 14.0), &[]),
        recipe("Anything B", MacroTotals::new(350.0, 25.0, 35.0, 12.0), &[]),
    ];
    let plan = generate_day_plan(plan_date(), &targets(), &catalog, &cfg()).unwrap();
    assert_eq!(plan.filled_slots, 4, "untagged recipes serve every slot");
}

#[test]
fn test_slot_with_only_unplannable_tagged_recipes_is_omitted() {
    let mut snack_only = recipe(
        "Empty Snack",
        MacroTotals::new(200.0, 15.0, 20.0, 7.0),
        &[MealType::Snack],
    );
    snack_only.ingredient_count = 0; // not plannable

    let breakfast = recipe(
        "Oatmeal Bowl",
        MacroTotals::new(500.0, 37.5, 50.0, 17.5),
        &[MealType::Breakfast],
    );

    let plan =
        generate_day_plan(plan_date(), &targets(), &[snack_only, breakfast], &cfg()).unwrap();

    assert_eq!(plan.filled_slots, 3, "snack slot omitted, not an error");
    assert!(
        plan.slots.iter().all(|s| s.meal_type != MealType::Snack),
        "no snack slot in the output"
    );
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_zero_target_component_is_a_domain_error() {
    let mut bad = targets();
    bad.protein_g = 0.0;
    let err = generate_day_plan(plan_date(), &bad, &exact_fit_catalog(), &cfg()).unwrap_err();
    assert!(matches!(err, EngineError::Domain(_)), "got {err:?}");
}

#[test]
fn test_non_finite_target_is_a_domain_error() {
    let mut bad = targets();
    bad.kcal = f64::NAN;
    assert!(matches!(
        generate_day_plan(plan_date(), &bad, &exact_fit_catalog(), &cfg()),
        Err(EngineError::Domain(_))
    ));
}

#[test]
fn test_catalog_without_plannable_recipe_is_a_domain_error() {
    let mut no_ingredients = recipe("Ghost", MacroTotals::new(400.0, 30.0, 40.0, 14.0), &[]);
    no_ingredients.ingredient_count = 0;
    let mut no_servings = recipe("Phantom", MacroTotals::new(400.0, 30.0, 40.0, 14.0), &[]);
    no_servings.servings = 0.0;

    let err = generate_day_plan(
        plan_date(),
        &targets(),
        &[no_ingredients, no_servings],
        &cfg(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Domain(_)));

    assert!(matches!(
        generate_day_plan(plan_date(), &targets(), &[], &cfg()),
        Err(EngineError::Domain(_))
    ));
}

// ============================================================================
// Bounds and Quantization
// ============================================================================

#[test]
fn test_servings_stay_quarter_stepped_and_bounded() {
    // A tiny snack recipe forces heavy clamping: greedy caps at 3.0 and
    // refinement may push to at most 4.0.
    let catalog = vec![recipe(
        "Tiny Bite",
        MacroTotals::new(50.0, 4.0, 5.0, 1.5),
        &[],
    )];
    let plan = generate_day_plan(plan_date(), &targets(), &catalog, &cfg()).unwrap();

    for slot in &plan.slots {
        assert!(
            (0.5..=4.0).contains(&slot.servings),
            "servings out of bounds: {}",
            slot.servings
        );
        let quarters = slot.servings * 4.0;
        assert!(
            (quarters - quarters.round()).abs() < 1e-9,
            "servings not quarter-stepped: {}",
            slot.servings
        );
    }
}

#[test]
fn test_identical_inputs_produce_identical_plans() {
    let catalog = exact_fit_catalog();
    let a = generate_day_plan(plan_date(), &targets(), &catalog, &cfg()).unwrap();
    let b = generate_day_plan(plan_date(), &targets(), &catalog, &cfg()).unwrap();

    let a_rows: Vec<(Uuid, f64)> = a.slots.iter().map(|s| (s.recipe_id, s.servings)).collect();
    let b_rows: Vec<(Uuid, f64)> = b.slots.iter().map(|s| (s.recipe_id, s.servings)).collect();
    assert_eq!(a_rows, b_rows, "planning is deterministic");
}
