// ABOUTME: Unit vocabulary: canonical spellings, mass-basis classification, short names
// ABOUTME: Single source of truth shared by the normalizer, aggregator, and auditor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Unit Vocabulary
//!
//! Generative text sources spell units inconsistently ("Grams", "millilitres",
//! "TBSP"). Every component goes through [`canonical_unit`] before comparing
//! units, and through [`UnitClass::of`] before deciding how an ingredient's
//! macros are interpreted. There is exactly one classification predicate in
//! the crate; nothing else inspects unit strings.

/// Gram spellings folded to `"g"`
const GRAM_SPELLINGS: &[&str] = &["g", "g.", "gr", "gram", "grams", "gramme", "grammes"];

/// Milliliter spellings folded to `"ml"`
const ML_SPELLINGS: &[&str] = &[
    "ml",
    "ml.",
    "milliliter",
    "milliliters",
    "millilitre",
    "millilitres",
];

/// Measurement tokens the auditor strips from the head of ingredient lines.
///
/// Includes short, long, and plural forms; matching is case-insensitive.
pub const MEASURE_TOKENS: &[&str] = &[
    "cup",
    "cups",
    "tbsp",
    "tablespoon",
    "tablespoons",
    "tsp",
    "teaspoon",
    "teaspoons",
    "oz",
    "ounce",
    "ounces",
    "g",
    "gram",
    "grams",
    "kg",
    "kilogram",
    "kilograms",
    "mg",
    "ml",
    "milliliter",
    "milliliters",
    "millilitre",
    "millilitres",
    "l",
    "liter",
    "liters",
    "litre",
    "litres",
    "slice",
    "slices",
    "piece",
    "pieces",
    "clove",
    "cloves",
];

/// Fold a raw unit spelling to its canonical form.
///
/// Gram and milliliter spellings map to `"g"` / `"ml"`; anything else is
/// lower-cased and trimmed and passes through unchanged (a `"clove"` stays a
/// `"clove"`).
#[must_use]
pub fn canonical_unit(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if GRAM_SPELLINGS.contains(&lowered.as_str()) {
        return "g".to_owned();
    }
    if ML_SPELLINGS.contains(&lowered.as_str()) {
        return "ml".to_owned();
    }
    lowered
}

/// How an ingredient's macro values are interpreted, decided solely by its
/// canonical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    /// Macros are stated per 100 g/ml of the ingredient
    MassBasis,
    /// Macros are stated per one discrete unit (clove, slice, piece, ...)
    Discrete,
}

impl UnitClass {
    /// Classify a canonical unit. This is the single discrimination predicate
    /// for the whole crate.
    #[must_use]
    pub fn of(canonical: &str) -> Self {
        if canonical == "g" || canonical == "ml" {
            Self::MassBasis
        } else {
            Self::Discrete
        }
    }

    /// Mass-basis units state macros per 100 g/ml
    #[must_use]
    pub const fn is_mass_basis(self) -> bool {
        matches!(self, Self::MassBasis)
    }
}

/// Display short-name for a canonical unit.
///
/// Used by the display layer when rendering ingredient rows; unknown units
/// render as themselves.
#[must_use]
pub fn short_name(canonical: &str) -> &str {
    match canonical {
        "tablespoon" | "tablespoons" | "tbsp" => "tbsp",
        "teaspoon" | "teaspoons" | "tsp" => "tsp",
        "cup" | "cups" => "cup",
        "ounce" | "ounces" | "oz" => "oz",
        "kilogram" | "kilograms" | "kg" => "kg",
        "liter" | "liters" | "litre" | "litres" | "l" => "l",
        "piece" | "pieces" => "pc",
        "slice" | "slices" => "slice",
        "clove" | "cloves" => "clove",
        other => other,
    }
}
