// ABOUTME: Library entry point for the nutricore nutrition engine
// ABOUTME: Normalization, part-graph aggregation, import audit, meal-plan search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

#![deny(unsafe_code)]

//! # Nutricore
//!
//! A nutrition data normalization and meal-plan optimization engine.
//!
//! The engine ingests untrusted, generative-text-derived ingredient and
//! recipe data and makes it usable:
//!
//! - **Normalizer**: canonicalizes units, validates the macro-set shape,
//!   searches for an order-of-magnitude correction factor, and repairs
//!   implausible calorie values.
//! - **Aggregator**: computes per-part prepared/consumed macros and a
//!   recipe total across sub-parts that may draw from each other's prepared
//!   output, without double counting.
//! - **Auditor**: compares a pasted source recipe against generated
//!   structured output and reports dropped ingredients, steps, and sections.
//! - **Planner**: assigns one recipe and serving count per daily meal slot
//!   via greedy selection plus local-search refinement.
//!
//! Everything is a pure, synchronous, stateless function over in-memory
//! values: no I/O, no shared mutable state, safe for concurrent callers.
//! Persistence, transport, and generative-service invocation are external
//! collaborators.
//!
//! ## Example
//!
//! ```rust
//! use nutricore::config::NormalizerConfig;
//! use nutricore::models::{IngredientMacroLine, MacroTotals};
//! use nutricore::normalizer::normalize_and_scale;
//!
//! // Pasta reported two decimal orders of magnitude too small.
//! let line = IngredientMacroLine::mass_basis(
//!     "dry pasta",
//!     120.0,
//!     "g",
//!     MacroTotals::new(3.64, 0.05, 0.71, 0.015),
//! );
//! let result = normalize_and_scale(&line, &NormalizerConfig::default()).unwrap();
//! assert_eq!(result.correction_factor, 100);
//! ```

/// Part graph aggregation: prepared/consumed macros across recipe sub-parts
pub mod aggregator;
/// Import completeness auditing against pasted source text
pub mod audit;
/// Tunable thresholds and weights for the normalizer and planner
pub mod config;
/// Error taxonomy shared by all components
pub mod errors;
/// Core value types: macro totals, tagged basis, parts and lines
pub mod models;
/// Macro normalization: shape validation, scale correction, kcal repair
pub mod normalizer;
/// Meal plan search: greedy assignment plus local refinement
pub mod planner;
/// Unit vocabulary and the shared classification predicate
pub mod units;

pub use aggregator::{compute_part_macros, per_serving, PartMacros};
pub use audit::{
    detect_structured_recipe_input, evaluate_recipe_import_completeness, fuzzy_contains,
    CompletenessReport, GeneratedRecipe,
};
pub use config::{NormalizerConfig, PlannerConfig};
pub use errors::{EngineError, EngineResult};
pub use models::{
    CorrectionResult, IngredientMacroLine, MacroBasis, MacroPercentages, MacroTotals,
    NormalizedLine, PartLine, RecipePart,
};
pub use normalizer::{choose_correction_factor, normalize_and_scale, validate_shape};
pub use planner::{
    generate_day_plan, score_delta, CatalogRecipe, DailyTargets, DayPlan, MealSlot, MealType,
};
pub use units::{canonical_unit, short_name, UnitClass};
