// ABOUTME: Integration tests for the part graph aggregator
// ABOUTME: Usage-link ratios, double-count prevention, defensive fallbacks
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! Tests for the aggregator including:
//! - Prepared/consumed separation and the recipe total
//! - Usage-link ratio math with part scales
//! - Fallback to literal counting when a link fails to resolve
//! - Implicit-part handling and dangling references

use nutricore::aggregator::{compute_part_macros, per_serving};
use nutricore::models::{MacroBasis, MacroTotals, NormalizedLine, PartLine, RecipePart};
use uuid::Uuid;

fn mass_line(name: &str, amount: f64, per_100: MacroTotals) -> NormalizedLine {
    NormalizedLine {
        name: name.to_owned(),
        amount,
        unit: "g".to_owned(),
        basis: MacroBasis::Per100G(per_100),
    }
}

/// Main part with 100 g of beef; sauce part preparing a 200 g batch at
/// 680 kcal per 100 g; the main part draws `used_amount` `used_unit` from it.
fn beef_and_sauce(used_amount: f64, used_unit: &str) -> (Vec<RecipePart>, Vec<PartLine>) {
    let main_id = Uuid::new_v4();
    let sauce_id = Uuid::new_v4();

    let parts = vec![
        RecipePart::new(main_id, "Main", 1.0),
        RecipePart::new(sauce_id, "Sauce", 1.0).with_yield(200.0, "g"),
    ];
    let lines = vec![
        PartLine::new(
            Some(main_id),
            mass_line("beef", 100.0, MacroTotals::new(250.0, 26.0, 0.0, 15.0)),
        ),
        PartLine::new(
            Some(sauce_id),
            mass_line("sauce base", 200.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        ),
        PartLine::new(
            Some(main_id),
            mass_line("sauce", 15.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        )
        .drawing_from(sauce_id, used_amount, used_unit),
    ];
    (parts, lines)
}

// ============================================================================
// Usage Links
// ============================================================================

#[test]
fn test_usage_link_counts_only_the_drawn_portion() {
    let (parts, lines) = beef_and_sauce(15.0, "g");
    let result = compute_part_macros(&parts, &lines);

    // 100 g beef at 2.5 kcal/g plus 15/200 of the 1360 kcal batch.
    assert!(
        (result.total.kcal - 352.0).abs() < 1e-9,
        "expected 250 + 102 = 352, got {}",
        result.total.kcal
    );

    let sauce_id = parts[1].id;
    let prepared_sauce = result.prepared_by_part[&sauce_id];
    assert!((prepared_sauce.kcal - 1360.0).abs() < 1e-9, "whole batch prepared");
    let consumed_sauce = result.consumed_by_part[&sauce_id];
    assert!(
        consumed_sauce.kcal.abs() < 1e-9,
        "referenced source contributes nothing directly"
    );
}

#[test]
fn test_consuming_part_scale_multiplies_the_drawn_amount() {
    let main_id = Uuid::new_v4();
    let sauce_id = Uuid::new_v4();
    let parts = vec![
        RecipePart::new(main_id, "Main", 2.0),
        RecipePart::new(sauce_id, "Sauce", 1.0).with_yield(200.0, "g"),
    ];
    let lines = vec![
        PartLine::new(
            Some(main_id),
            mass_line("beef", 100.0, MacroTotals::new(250.0, 26.0, 0.0, 15.0)),
        ),
        PartLine::new(
            Some(sauce_id),
            mass_line("sauce base", 200.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        ),
        PartLine::new(
            Some(main_id),
            mass_line("sauce", 15.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        )
        .drawing_from(sauce_id, 15.0, "g"),
    ];

    let result = compute_part_macros(&parts, &lines);
    // Beef doubles to 500; the drawn fraction doubles to 30/200 of 1360.
    assert!(
        (result.total.kcal - 704.0).abs() < 1e-9,
        "expected 500 + 204 = 704, got {}",
        result.total.kcal
    );
}

#[test]
fn test_yield_unit_comparison_is_canonical() {
    // Yield declared in "Grams", drawn in "g": spelling differences resolve.
    let main_id = Uuid::new_v4();
    let sauce_id = Uuid::new_v4();
    let parts = vec![
        RecipePart::new(main_id, "Main", 1.0),
        RecipePart::new(sauce_id, "Sauce", 1.0).with_yield(200.0, "Grams"),
    ];
    let lines = vec![
        PartLine::new(
            Some(sauce_id),
            mass_line("sauce base", 200.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        ),
        PartLine::new(
            Some(main_id),
            mass_line("sauce", 15.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        )
        .drawing_from(sauce_id, 15.0, "g"),
    ];

    let result = compute_part_macros(&parts, &lines);
    assert!((result.total.kcal - 102.0).abs() < 1e-9, "link resolves");
}

// ============================================================================
// Fallback: Macros Are Never Silently Lost
// ============================================================================

#[test]
fn test_mismatched_unit_falls_back_to_literal_counting() {
    let (parts, lines) = beef_and_sauce(15.0, "ml");
    let result = compute_part_macros(&parts, &lines);

    // The link does not resolve: the sauce line counts literally
    // (15 g x 6.8 kcal/g = 102) and the un-referenced sauce batch counts
    // in full (1360). 250 + 102 + 1360.
    assert!(
        (result.total.kcal - 1712.0).abs() < 1e-9,
        "expected literal fallback total 1712, got {}",
        result.total.kcal
    );

    // Strictly more than the incorrect silently-skipped alternative
    // (250 + 1360 = 1610).
    assert!(result.total.kcal > 1610.0);
}

#[test]
fn test_missing_yield_falls_back_to_literal_counting() {
    let main_id = Uuid::new_v4();
    let sauce_id = Uuid::new_v4();
    let parts = vec![
        RecipePart::new(main_id, "Main", 1.0),
        RecipePart::new(sauce_id, "Sauce", 1.0), // no yield declared
    ];
    let lines = vec![
        PartLine::new(
            Some(sauce_id),
            mass_line("sauce base", 200.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        ),
        PartLine::new(
            Some(main_id),
            mass_line("sauce", 15.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
        )
        .drawing_from(sauce_id, 15.0, "g"),
    ];

    let result = compute_part_macros(&parts, &lines);
    assert!((result.total.kcal - 1462.0).abs() < 1e-9, "102 + 1360");
}

#[test]
fn test_dangling_source_reference_is_dropped_not_raised() {
    let lines = vec![PartLine::new(
        None,
        mass_line("sauce", 15.0, MacroTotals::new(680.0, 10.0, 20.0, 60.0)),
    )
    .drawing_from(Uuid::new_v4(), 15.0, "g")];

    let result = compute_part_macros(&[], &lines);
    assert!((result.total.kcal - 102.0).abs() < 1e-9, "literal fallback");
}

// ============================================================================
// Implicit Part
// ============================================================================

#[test]
fn test_recipe_without_parts_is_one_implicit_part() {
    let lines = vec![
        PartLine::new(
            None,
            mass_line("chicken", 200.0, MacroTotals::new(165.0, 31.0, 0.0, 3.6)),
        ),
        PartLine::new(
            None,
            mass_line("rice", 150.0, MacroTotals::new(360.0, 7.0, 79.0, 0.6)),
        ),
    ];
    let result = compute_part_macros(&[], &lines);

    // 330 + 540
    assert!((result.total.kcal - 870.0).abs() < 1e-9);
    assert!((result.total.protein_g - (62.0 + 10.5)).abs() < 1e-9);
    let implicit = result.consumed_by_part[&Uuid::nil()];
    assert!((implicit.kcal - result.total.kcal).abs() < 1e-9);
}

#[test]
fn test_per_unit_lines_aggregate_by_count() {
    let lines = vec![PartLine::new(
        None,
        NormalizedLine {
            name: "egg".to_owned(),
            amount: 3.0,
            unit: "piece".to_owned(),
            basis: MacroBasis::PerUnit(MacroTotals::new(72.0, 6.3, 0.4, 4.8)),
        },
    )];
    let result = compute_part_macros(&[], &lines);
    assert!((result.total.kcal - 216.0).abs() < 1e-9);
}

// ============================================================================
// Per-Serving Division
// ============================================================================

#[test]
fn test_per_serving_division() {
    let total = MacroTotals::new(870.0, 72.5, 80.0, 4.2);
    let per = per_serving(&total, 2.0);
    assert!((per.kcal - 435.0).abs() < 1e-9);
    assert!((per.protein_g - 36.25).abs() < 1e-9);

    // Guarded against a zero divisor.
    let unguarded = per_serving(&total, 0.0);
    assert!((unguarded.kcal - 870.0).abs() < 1e-9);
}
