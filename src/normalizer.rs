// ABOUTME: Macro normalizer: shape validation, order-of-magnitude correction, kcal repair
// ABOUTME: Heuristic plausibility layer over generative ingredient data, not a nutrition authority
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Macro Normalizer
//!
//! Generative text sources routinely misplace a decimal order of magnitude
//! (pasta at 3.64 kcal per 100 g) or miscompute calories from the macros they
//! themselves state. This module is the defensive repair layer: it validates
//! the macro-set shape against the unit class, searches {1, 10, 100} for the
//! most plausible scale, and replaces implausibly low calorie values with the
//! Atwater-derived figure.
//!
//! Corrections are heuristic plausibility checks only; nothing here consults
//! a ground-truth nutrition database.

use tracing::{debug, warn};

use crate::config::NormalizerConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::{CorrectionResult, IngredientMacroLine, MacroBasis, MacroTotals, NormalizedLine};
use crate::units::{canonical_unit, UnitClass};

/// Candidate order-of-magnitude factors, searched in order
const CANDIDATE_FACTORS: [u32; 3] = [1, 10, 100];

/// Ingredients that legitimately carry (almost) no calories.
///
/// A match skips the correction search and the kcal repair entirely: zero is
/// not a reporting error for these.
const ZERO_CALORIE_KEYWORDS: &[&str] = &[
    "water",
    "salt",
    "black coffee",
    "unsweetened tea",
    "vinegar",
];

/// Produce that plausibly never exceeds a few grams of protein or fat per
/// 100 g; scaling one past those limits is rejected outright.
const PRODUCE_KEYWORDS: &[&str] = &[
    "lettuce",
    "spinach",
    "kale",
    "cucumber",
    "celery",
    "zucchini",
    "tomato",
    "broccoli",
    "cauliflower",
    "cabbage",
    "mushroom",
    "onion",
    "carrot",
    "radish",
    "apple",
    "berry",
    "berries",
    "melon",
    "orange",
    "grape",
];

/// Dry, energy-dense staples. A sizeable amount of one of these reported
/// with almost no macro mass per 100 g is the classic misplaced-decimal
/// signature, so such factors are heavily penalized.
const DENSE_KEYWORDS: &[&str] = &[
    "pasta",
    "spaghetti",
    "noodle",
    "rice",
    "oat",
    "flour",
    "bread",
    "couscous",
    "quinoa",
    "granola",
    "cereal",
];

fn name_matches(name: &str, keywords: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

// ============================================================================
// Shape Validation
// ============================================================================

/// Validate a raw line's macro-set shape against its unit class and produce a
/// [`NormalizedLine`] with a canonical unit and tagged basis.
///
/// # Errors
///
/// Returns [`EngineError::Shape`] when the macro-set presence or kind
/// disagrees with the unit class (both sets, neither set, or the wrong set for
/// the unit), and [`EngineError::Validation`] when the amount or any macro
/// field is non-finite or negative.
pub fn validate_shape(line: &IngredientMacroLine) -> EngineResult<NormalizedLine> {
    if !line.amount.is_finite() || line.amount < 0.0 {
        return Err(EngineError::validation(format!(
            "ingredient '{}': amount must be finite and non-negative",
            line.name
        )));
    }

    let unit = canonical_unit(&line.unit);
    let basis = match (UnitClass::of(&unit), &line.per_100g, &line.per_unit) {
        (_, Some(_), Some(_)) => {
            return Err(EngineError::shape(format!(
                "ingredient '{}': both per-100 and per-unit macro sets present",
                line.name
            )))
        }
        (_, None, None) => {
            return Err(EngineError::shape(format!(
                "ingredient '{}': no macro set present",
                line.name
            )))
        }
        (UnitClass::MassBasis, Some(values), None) => MacroBasis::Per100G(*values),
        (UnitClass::Discrete, None, Some(values)) => MacroBasis::PerUnit(*values),
        (UnitClass::MassBasis, None, Some(_)) => {
            return Err(EngineError::shape(format!(
                "ingredient '{}': unit '{unit}' requires a per-100 macro set",
                line.name
            )))
        }
        (UnitClass::Discrete, Some(_), None) => {
            return Err(EngineError::shape(format!(
                "ingredient '{}': unit '{unit}' requires a per-unit macro set",
                line.name
            )))
        }
    };

    if !basis.values().is_plausible_shape() {
        return Err(EngineError::validation(format!(
            "ingredient '{}': macro fields must be finite and non-negative",
            line.name
        )));
    }

    Ok(NormalizedLine {
        name: line.name.clone(),
        amount: line.amount,
        unit,
        basis,
    })
}

// ============================================================================
// Correction Factor Search
// ============================================================================

/// Relative disagreement between the stated kcal and the Atwater-derived kcal
fn relative_kcal_error(values: &MacroTotals, derived_floor: f64) -> f64 {
    let derived = values.derived_kcal();
    (values.kcal - derived).abs() / derived.max(derived_floor)
}

/// Enumerate-and-score search over {1, 10, 100} for a mass-basis line.
///
/// Every candidate scales all four per-100 values together, so the
/// kcal-vs-macros error is factor-invariant; the bounds and the two penalties
/// are what separate candidates. Returns 1 when no candidate survives the
/// plausibility bounds.
#[must_use]
pub fn choose_correction_factor(
    name: &str,
    amount: f64,
    per_100: &MacroTotals,
    config: &NormalizerConfig,
) -> u32 {
    let is_produce = name_matches(name, PRODUCE_KEYWORDS);
    let is_dense = name_matches(name, DENSE_KEYWORDS);

    let mut best_factor = 1;
    let mut best_score = f64::INFINITY;

    for factor in CANDIDATE_FACTORS {
        let scaled = per_100.scaled(f64::from(factor));
        let mass = scaled.macro_mass_g();

        if mass <= 0.0 || mass > config.max_macro_mass_per_100 {
            continue;
        }
        if scaled.kcal > config.max_kcal_per_100 {
            continue;
        }
        if is_produce
            && (scaled.protein_g > config.produce_protein_limit
                || scaled.fat_g > config.produce_fat_limit)
        {
            continue;
        }

        let mut score = relative_kcal_error(&scaled, config.derived_kcal_floor);
        if factor != 1 {
            score += config.off_factor_penalty;
        }
        if is_dense && amount >= config.dense_amount_threshold && mass < config.dense_mass_floor {
            score += config.dense_penalty;
        }

        if score < best_score {
            best_score = score;
            best_factor = factor;
        }
    }

    best_factor
}

// ============================================================================
// Kcal Repair
// ============================================================================

/// Replace an implausibly low stated kcal with the Atwater-derived value.
///
/// A stated value is never lowered, and rounding-level disagreement (relative
/// error ≤ tolerance) is left alone. Returns the (possibly repaired) values
/// and whether a repair happened.
fn repair_kcal(values: MacroTotals, config: &NormalizerConfig) -> (MacroTotals, bool) {
    let derived = values.derived_kcal();
    if derived <= config.min_derived_for_repair || values.kcal >= derived {
        return (values, false);
    }
    if relative_kcal_error(&values, config.derived_kcal_floor) > config.repair_tolerance {
        let repaired = MacroTotals {
            kcal: derived,
            ..values
        };
        return (repaired, true);
    }
    (values, false)
}

/// Practically-zero lines (trace kcal and trace macro mass) are exempt from
/// correction and repair: garlic at 0.0042 kcal per 100 g stays untouched.
fn is_practically_zero(values: &MacroTotals, config: &NormalizerConfig) -> bool {
    values.kcal <= config.negligible_kcal && values.macro_mass_g() <= config.negligible_macro_mass
}

// ============================================================================
// Entry Point
// ============================================================================

/// Normalize one generated ingredient line: validate its shape, search for an
/// order-of-magnitude correction (mass-basis only), and repair an implausible
/// kcal value.
///
/// Discrete (per-unit) lines are never factor-corrected (a clove is a clove
/// at any magnitude), but their kcal is repaired under the same rule.
///
/// # Errors
///
/// Propagates [`EngineError::Shape`] / [`EngineError::Validation`] from
/// [`validate_shape`]; the correction search itself cannot fail.
pub fn normalize_and_scale(
    input: &IngredientMacroLine,
    config: &NormalizerConfig,
) -> EngineResult<CorrectionResult> {
    let line = validate_shape(input)?;

    let exempt = is_practically_zero(line.basis.values(), config)
        || name_matches(&line.name, ZERO_CALORIE_KEYWORDS);
    if exempt {
        return Ok(CorrectionResult {
            correction_factor: 1,
            kcal_was_repaired: false,
            line,
        });
    }

    match line.basis {
        MacroBasis::Per100G(per_100) => {
            let factor = choose_correction_factor(&line.name, line.amount, &per_100, config);
            let scaled = per_100.scaled(f64::from(factor));
            if factor != 1 {
                debug!(
                    ingredient = %line.name,
                    factor,
                    kcal_per_100 = scaled.kcal,
                    "applied order-of-magnitude correction"
                );
            }

            let (repaired, kcal_was_repaired) = repair_kcal(scaled, config);
            if kcal_was_repaired {
                warn!(
                    ingredient = %line.name,
                    stated = scaled.kcal,
                    derived = repaired.kcal,
                    "stated kcal implausibly low, replaced with derived value"
                );
            }

            Ok(CorrectionResult {
                correction_factor: factor,
                kcal_was_repaired,
                line: NormalizedLine {
                    basis: MacroBasis::Per100G(repaired),
                    ..line
                },
            })
        }
        MacroBasis::PerUnit(per_unit) => {
            let (repaired, kcal_was_repaired) = repair_kcal(per_unit, config);
            if kcal_was_repaired {
                warn!(
                    ingredient = %line.name,
                    stated = per_unit.kcal,
                    derived = repaired.kcal,
                    "stated per-unit kcal implausibly low, replaced with derived value"
                );
            }

            Ok(CorrectionResult {
                correction_factor: 1,
                kcal_was_repaired,
                line: NormalizedLine {
                    basis: MacroBasis::PerUnit(repaired),
                    ..line
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> NormalizerConfig {
        NormalizerConfig::default()
    }

    #[test]
    fn test_relative_error_is_factor_invariant() {
        let values = MacroTotals::new(3.64, 0.05, 0.71, 0.015);
        let e1 = relative_kcal_error(&values, 0.05);
        let e100 = relative_kcal_error(&values.scaled(100.0), 0.05);
        assert!((e1 - e100).abs() < 1e-9);
    }

    #[test]
    fn test_factor_search_rejects_over_bounds() {
        // 100x would push macro mass to 200 g per 100 g: impossible.
        let values = MacroTotals::new(3.5, 1.0, 1.0, 0.0);
        let factor = choose_correction_factor("mystery paste", 50.0, &values, &cfg());
        assert!(factor < 100);
    }

    #[test]
    fn test_produce_guard_blocks_dense_scaling() {
        // The "couscous" signal pushes toward 100x, but that would claim
        // 7 g protein per 100 g of a tomato dish: the produce guard rejects
        // the candidate and the line stays at factor 1.
        let values = MacroTotals::new(0.11, 0.07, 0.23, 0.001);
        let factor = choose_correction_factor("tomato couscous salad", 50.0, &values, &cfg());
        assert_eq!(factor, 1);
    }

    #[test]
    fn test_repair_never_lowers_stated_kcal() {
        // Stated above derived: tolerated (fiber, alcohol, rounding).
        let values = MacroTotals::new(400.0, 10.0, 10.0, 10.0);
        let (out, repaired) = repair_kcal(values, &cfg());
        assert!(!repaired);
        assert!((out.kcal - 400.0).abs() < f64::EPSILON);
    }
}
