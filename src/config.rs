// ABOUTME: Tunable constants for the normalizer and the meal-plan search
// ABOUTME: Documented defaults; pure functions take configs by reference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Engine Configuration
//!
//! The plausibility bounds and penalty constants below were hand-tuned
//! against a fixture set of generated recipes. Their *relative ordering* is
//! load-bearing (the dense-staple penalty must dominate the off-factor
//! penalty, which must dominate rounding-level kcal error); the exact values
//! are not.

use serde::{Deserialize, Serialize};

/// Plausibility bounds and penalties for the macro normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Maximum combined protein+carbs+fat grams per 100 mass-units (105.0)
    pub max_macro_mass_per_100: f64,
    /// Maximum kcal per 100 mass-units (900.0, pure fat ceiling)
    pub max_kcal_per_100: f64,
    /// Produce guard: maximum plausible protein per 100 g for produce (6.0)
    pub produce_protein_limit: f64,
    /// Produce guard: maximum plausible fat per 100 g for produce (4.0)
    pub produce_fat_limit: f64,
    /// Score penalty for any factor other than 1 (0.02)
    pub off_factor_penalty: f64,
    /// Score penalty for a dense staple left with implausibly thin macros (2.0)
    pub dense_penalty: f64,
    /// Dense guard: macro-mass per 100 below which the penalty applies (8.0)
    pub dense_mass_floor: f64,
    /// Dense guard: minimum literal amount for the penalty to apply (10.0)
    pub dense_amount_threshold: f64,
    /// Denominator floor for relative kcal error (0.05)
    pub derived_kcal_floor: f64,
    /// Relative kcal error above which a stated value is repaired (0.35)
    pub repair_tolerance: f64,
    /// Derived kcal at or below which repair is skipped entirely (0.01)
    pub min_derived_for_repair: f64,
    /// Kcal per 100 at or below which a line counts as practically zero (0.1)
    pub negligible_kcal: f64,
    /// Macro-mass per 100 at or below which a line counts as practically zero (0.1)
    pub negligible_macro_mass: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_macro_mass_per_100: 105.0,
            max_kcal_per_100: 900.0,
            produce_protein_limit: 6.0,
            produce_fat_limit: 4.0,
            off_factor_penalty: 0.02,
            dense_penalty: 2.0,
            dense_mass_floor: 8.0,
            dense_amount_threshold: 10.0,
            derived_kcal_floor: 0.05,
            repair_tolerance: 0.35,
            min_derived_for_repair: 0.01,
            negligible_kcal: 0.1,
            negligible_macro_mass: 0.1,
        }
    }
}

/// Scoring weights and search bounds for the meal-plan search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Weight of the kcal relative error in the slot/day score (0.35)
    pub kcal_weight: f64,
    /// Weight of the protein relative error (0.25)
    pub protein_weight: f64,
    /// Weight of the carbs relative error (0.20)
    pub carbs_weight: f64,
    /// Weight of the fat relative error (0.20)
    pub fat_weight: f64,
    /// Greedy phase: minimum servings per slot (0.5)
    pub greedy_min_servings: f64,
    /// Greedy phase: maximum servings per slot (3.0)
    pub greedy_max_servings: f64,
    /// Refinement phase: minimum servings per slot (0.5)
    pub refine_min_servings: f64,
    /// Refinement phase: maximum servings per slot (4.0)
    pub refine_max_servings: f64,
    /// Maximum refinement passes before unconditional stop (80)
    pub max_refinement_passes: u32,
    /// Day-score improvement below which a move is not accepted (0.0001)
    pub improvement_epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            kcal_weight: 0.35,
            protein_weight: 0.25,
            carbs_weight: 0.20,
            fat_weight: 0.20,
            greedy_min_servings: 0.5,
            greedy_max_servings: 3.0,
            refine_min_servings: 0.5,
            refine_max_servings: 4.0,
            max_refinement_passes: 80,
            improvement_epsilon: 0.0001,
        }
    }
}
