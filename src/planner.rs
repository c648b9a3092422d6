// ABOUTME: Meal plan search: greedy slot assignment plus local-search refinement
// ABOUTME: Pure enumerate-and-score over a finite candidate set, deterministic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Meal Plan Search
//!
//! Assigns one recipe and a quarter-step serving count to each of the four
//! daily meal slots so the day's macros track the user's targets under fixed
//! per-meal calorie shares.
//!
//! Two phases. Phase 1 fills each slot greedily against the slot's share of
//! the daily target. Phase 2 runs a bounded first-improvement local search
//! over ±0.25/±0.5 serving moves, scored against the *day* total: the greedy
//! phase optimizes slots in isolation, so shifting a quarter serving between
//! breakfast and dinner frequently buys back day-level error the greedy pass
//! could not see.
//!
//! Acceptance is first-improvement (not best-of-candidates), inherited
//! behavior kept for reproducibility; with the improvement epsilon and the
//! pass cap the search is deterministic and always terminates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::MacroTotals;

/// Serving deltas tried for each filled slot during refinement
const REFINEMENT_DELTAS: [f64; 4] = [-0.25, 0.25, -0.5, 0.5];

// ============================================================================
// Planner Inputs
// ============================================================================

/// Daily meal slots, in planning order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// First meal of the day (25% share)
    Breakfast,
    /// Midday meal (30% share)
    Lunch,
    /// Evening meal (35% share)
    Dinner,
    /// Between-meal snack (10% share)
    Snack,
}

impl MealType {
    /// Planning order: Breakfast → Lunch → Dinner → Snack
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Fixed share of the daily target assigned to this slot, applied
    /// uniformly to all four macro dimensions
    #[must_use]
    pub const fn target_share(self) -> f64 {
        match self {
            Self::Breakfast => 0.25,
            Self::Lunch => 0.30,
            Self::Dinner => 0.35,
            Self::Snack => 0.10,
        }
    }
}

/// Daily macro targets the plan should track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    /// Daily energy target in kcal
    pub kcal: f64,
    /// Daily protein target in grams
    pub protein_g: f64,
    /// Daily carbohydrate target in grams
    pub carbs_g: f64,
    /// Daily fat target in grams
    pub fat_g: f64,
}

impl DailyTargets {
    fn validate(&self) -> EngineResult<()> {
        let components = [
            ("kcal", self.kcal),
            ("protein", self.protein_g),
            ("carbs", self.carbs_g),
            ("fat", self.fat_g),
        ];
        for (label, value) in components {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::domain(format!(
                    "daily {label} target must be a positive number"
                )));
            }
        }
        Ok(())
    }

    fn as_totals(&self) -> MacroTotals {
        MacroTotals::new(self.kcal, self.protein_g, self.carbs_g, self.fat_g)
    }
}

/// A recipe as the planner sees it: per-serving macros plus catalog metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecipe {
    /// Recipe identity
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Macros for a single serving (recipe total ÷ servings)
    pub per_serving: MacroTotals,
    /// Meal types this recipe is tagged for; empty means any slot
    pub meal_tags: Vec<MealType>,
    /// Declared number of servings the recipe makes
    pub servings: f64,
    /// Number of ingredient lines in the recipe
    pub ingredient_count: usize,
}

impl CatalogRecipe {
    /// A recipe the planner may assign: positive servings and at least one
    /// ingredient
    #[must_use]
    pub fn is_plannable(&self) -> bool {
        self.servings > 0.0 && self.ingredient_count >= 1
    }
}

// ============================================================================
// Planner Outputs
// ============================================================================

/// One filled meal slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealSlot {
    /// Which daily slot this fills
    pub meal_type: MealType,
    /// Assigned recipe
    pub recipe_id: Uuid,
    /// Assigned recipe's display name
    pub recipe_name: String,
    /// Quarter-step serving count
    pub servings: f64,
    /// Macros at the assigned serving count
    pub macros: MacroTotals,
}

/// A day's worth of assigned slots: exactly the row set to persist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// The day this plan is for
    pub date: NaiveDate,
    /// Filled slots in planning order; unfillable slots are absent
    pub slots: Vec<MealSlot>,
    /// Sum of all slot macros
    pub totals: MacroTotals,
    /// Number of filled slots
    pub filled_slots: usize,
}

// ============================================================================
// Scoring
// ============================================================================

fn relative_error(actual: f64, target: f64) -> f64 {
    (actual - target).abs() / target.max(1.0)
}

/// Weighted relative-error distance between achieved macros and a target.
///
/// Used for both per-slot greedy scoring and day-total refinement scoring.
#[must_use]
pub fn score_delta(actual: &MacroTotals, target: &MacroTotals, config: &PlannerConfig) -> f64 {
    config.kcal_weight * relative_error(actual.kcal, target.kcal)
        + config.protein_weight * relative_error(actual.protein_g, target.protein_g)
        + config.carbs_weight * relative_error(actual.carbs_g, target.carbs_g)
        + config.fat_weight * relative_error(actual.fat_g, target.fat_g)
}

fn round_quarter(servings: f64) -> f64 {
    (servings * 4.0).round() / 4.0
}

// ============================================================================
// Search
// ============================================================================

/// Working slot: the output row plus the per-serving macros needed to rescale
struct FilledSlot {
    slot: MealSlot,
    per_serving: MacroTotals,
}

fn day_totals(filled: &[FilledSlot]) -> MacroTotals {
    let mut totals = MacroTotals::default();
    for f in filled {
        totals.add(&f.slot.macros);
    }
    totals
}

/// Greedy phase: pick the lowest-scoring candidate for one slot, or `None`
/// when the candidate pool is empty.
fn fill_slot_greedy(
    meal_type: MealType,
    slot_target: &MacroTotals,
    catalog: &[CatalogRecipe],
    config: &PlannerConfig,
) -> Option<FilledSlot> {
    // Restrict to recipes tagged for this slot; when nothing in the catalog
    // is, every recipe is a candidate. Unplannable records are filtered after
    // the tag restriction so a slot whose only tagged recipes are unplannable
    // is omitted rather than silently retargeted.
    let tagged: Vec<&CatalogRecipe> = catalog
        .iter()
        .filter(|r| r.meal_tags.contains(&meal_type))
        .collect();
    let pool: Vec<&CatalogRecipe> = if tagged.is_empty() {
        catalog.iter().collect()
    } else {
        tagged
    };

    let mut best: Option<(f64, FilledSlot)> = None;
    for recipe in pool.into_iter().filter(|r| r.is_plannable()) {
        let servings = round_quarter(slot_target.kcal / recipe.per_serving.kcal.max(1.0))
            .clamp(config.greedy_min_servings, config.greedy_max_servings);
        let macros = recipe.per_serving.scaled(servings);
        let score = score_delta(&macros, slot_target, config);

        let is_better = best.as_ref().is_none_or(|(best_score, _)| score < *best_score);
        if is_better {
            best = Some((
                score,
                FilledSlot {
                    slot: MealSlot {
                        meal_type,
                        recipe_id: recipe.id,
                        recipe_name: recipe.name.clone(),
                        servings,
                        macros,
                    },
                    per_serving: recipe.per_serving,
                },
            ));
        }
    }

    best.map(|(_, filled)| filled)
}

/// Refinement phase: bounded first-improvement local search over serving
/// deltas, scored against the day total. Returns the number of passes run.
fn refine_servings(
    filled: &mut [FilledSlot],
    day_target: &MacroTotals,
    config: &PlannerConfig,
) -> u32 {
    let mut totals = day_totals(filled);
    let mut current_score = score_delta(&totals, day_target, config);

    let mut passes = 0;
    for _ in 0..config.max_refinement_passes {
        passes += 1;
        let mut changed = false;

        for index in 0..filled.len() {
            for delta in REFINEMENT_DELTAS {
                let current = filled[index].slot.servings;
                let candidate = round_quarter(current + delta)
                    .clamp(config.refine_min_servings, config.refine_max_servings);
                if (candidate - current).abs() < 1e-9 {
                    continue;
                }

                let candidate_macros = filled[index].per_serving.scaled(candidate);
                let mut candidate_totals = totals;
                let removed = filled[index].slot.macros.scaled(-1.0);
                candidate_totals.add(&removed);
                candidate_totals.add(&candidate_macros);

                let candidate_score = score_delta(&candidate_totals, day_target, config);
                if current_score - candidate_score > config.improvement_epsilon {
                    // First improvement: accept immediately and keep scanning
                    // the remaining moves of this pass.
                    filled[index].slot.servings = candidate;
                    filled[index].slot.macros = candidate_macros;
                    totals = candidate_totals;
                    current_score = candidate_score;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    passes
}

/// Search for the day's meal assignment that best fits `targets`.
///
/// The output is the complete row set an external storage layer persists for
/// `date` (replacing any existing plan for that date). An individual slot
/// with no eligible candidates is omitted, not an error.
///
/// # Errors
///
/// Returns [`EngineError::Domain`] when any daily target component is
/// missing/zero/non-finite, or when no catalog recipe has positive servings
/// and at least one ingredient.
pub fn generate_day_plan(
    date: NaiveDate,
    targets: &DailyTargets,
    catalog: &[CatalogRecipe],
    config: &PlannerConfig,
) -> EngineResult<DayPlan> {
    targets.validate()?;
    if !catalog.iter().any(CatalogRecipe::is_plannable) {
        return Err(EngineError::domain(
            "catalog has no recipe with positive servings and at least one ingredient",
        ));
    }

    let day_target = targets.as_totals();

    // Phase 1: greedy fill, fixed slot order.
    let mut filled: Vec<FilledSlot> = Vec::with_capacity(MealType::ALL.len());
    for meal_type in MealType::ALL {
        let slot_target = day_target.scaled(meal_type.target_share());
        if let Some(slot) = fill_slot_greedy(meal_type, &slot_target, catalog, config) {
            filled.push(slot);
        } else {
            debug!(?meal_type, "no eligible candidates, slot omitted");
        }
    }

    // Phase 2: day-total local search over serving counts.
    let passes = refine_servings(&mut filled, &day_target, config);
    debug!(passes, slots = filled.len(), "meal plan refinement finished");

    let totals = day_totals(&filled);
    let filled_slots = filled.len();
    Ok(DayPlan {
        date,
        slots: filled.into_iter().map(|f| f.slot).collect(),
        totals,
        filled_slots,
    })
}
