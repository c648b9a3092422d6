// ABOUTME: Core value types: macro totals, the tagged macro basis, parts and lines
// ABOUTME: Pure per-request value objects; the engine holds no cross-call state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Data Model
//!
//! Everything here is a plain value object deserialized from persisted records
//! or from the JSON shape the generative text service returns. The one
//! structural rule: an ingredient's macro representation is a tagged union
//! ([`MacroBasis`]), discriminated by the unit classification predicate in
//! [`crate::units`], never by scattered optional-field checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};

/// Energy per gram of protein and carbohydrate (Atwater general factor)
pub const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;
/// Energy per gram of fat (Atwater general factor)
pub const KCAL_PER_G_FAT: f64 = 9.0;

// ============================================================================
// Macro Totals
// ============================================================================

/// Additive, scale-linear macro quantities.
///
/// Doubles as a per-100 g/ml macro set, a per-unit macro set, and an absolute
/// total; the interpretation is carried by the surrounding type, never by
/// this struct.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    /// Energy in kilocalories
    pub kcal: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
}

impl MacroTotals {
    /// Create a macro set from its four components
    #[must_use]
    pub const fn new(kcal: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            kcal,
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    /// Accumulate another macro set into this one
    pub fn add(&mut self, other: &Self) {
        self.kcal += other.kcal;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
    }

    /// Multiply all four components by a factor
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            kcal: self.kcal * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
        }
    }

    /// Energy implied by the macro fields alone (4/4/9 Atwater factors)
    #[must_use]
    pub fn derived_kcal(&self) -> f64 {
        self.fat_g.mul_add(
            KCAL_PER_G_FAT,
            (self.protein_g + self.carbs_g) * KCAL_PER_G_PROTEIN_CARB,
        )
    }

    /// Combined protein + carbs + fat mass in grams
    #[must_use]
    pub fn macro_mass_g(&self) -> f64 {
        self.protein_g + self.carbs_g + self.fat_g
    }

    /// All four fields are finite and non-negative
    #[must_use]
    pub fn is_plausible_shape(&self) -> bool {
        [self.kcal, self.protein_g, self.carbs_g, self.fat_g]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Calorie share of each macro, from derived energy
    #[must_use]
    pub fn percentages(&self) -> MacroPercentages {
        let total = self.derived_kcal();
        if total <= 0.0 {
            return MacroPercentages::default();
        }
        MacroPercentages {
            protein_percent: self.protein_g * KCAL_PER_G_PROTEIN_CARB / total * 100.0,
            carbs_percent: self.carbs_g * KCAL_PER_G_PROTEIN_CARB / total * 100.0,
            fat_percent: self.fat_g * KCAL_PER_G_FAT / total * 100.0,
        }
    }
}

/// Macronutrient percentage breakdown
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroPercentages {
    /// Protein as percentage of derived calories
    pub protein_percent: f64,
    /// Carbohydrates as percentage of derived calories
    pub carbs_percent: f64,
    /// Fat as percentage of derived calories
    pub fat_percent: f64,
}

// ============================================================================
// Macro Basis (tagged union)
// ============================================================================

/// An ingredient's macro representation.
///
/// Mass-basis ingredients ("g"/"ml" units) state macros per 100 mass-units;
/// discrete ingredients state macros per one unit. The variant is decided by
/// [`crate::units::UnitClass::of`] during shape validation and is the only
/// place the distinction is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", content = "values")]
pub enum MacroBasis {
    /// Values per 100 g/ml
    #[serde(rename = "per_100g")]
    Per100G(MacroTotals),
    /// Values per one discrete unit (clove, slice, tablespoon, ...)
    #[serde(rename = "per_unit")]
    PerUnit(MacroTotals),
}

impl MacroBasis {
    /// The underlying macro values, whichever basis they are stated in
    #[must_use]
    pub const fn values(&self) -> &MacroTotals {
        match self {
            Self::Per100G(v) | Self::PerUnit(v) => v,
        }
    }

    /// Scale the stated values, preserving the basis
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::Per100G(v) => Self::Per100G(v.scaled(factor)),
            Self::PerUnit(v) => Self::PerUnit(v.scaled(factor)),
        }
    }

    /// Replace the stated values, preserving the basis
    #[must_use]
    pub const fn with_values(&self, values: MacroTotals) -> Self {
        match self {
            Self::Per100G(_) => Self::Per100G(values),
            Self::PerUnit(_) => Self::PerUnit(values),
        }
    }

    /// Absolute macro contribution of `amount` in this basis.
    ///
    /// Mass basis: `values × amount / 100`. Discrete: `values × amount`.
    #[must_use]
    pub fn contribution(&self, amount: f64) -> MacroTotals {
        match self {
            Self::Per100G(v) => v.scaled(amount / 100.0),
            Self::PerUnit(v) => v.scaled(amount),
        }
    }
}

// ============================================================================
// Ingredient Lines
// ============================================================================

/// Raw ingredient line as returned by the generative text service.
///
/// Exactly one of `per_100g` / `per_unit` must be present, and which one is
/// dictated by the unit: "g"/"ml" force `per_100g`, anything else forces
/// `per_unit`. [`crate::normalizer::validate_shape`] enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientMacroLine {
    /// Ingredient name as generated
    pub name: String,
    /// Amount in `unit`
    pub amount: f64,
    /// Unit spelling as generated (not yet canonical)
    pub unit: String,
    /// Mass-basis macro set (per 100 g/ml), if stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_100g: Option<MacroTotals>,
    /// Per-unit macro set, if stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<MacroTotals>,
}

impl IngredientMacroLine {
    /// Mass-basis line ("g"/"ml" unit, macros per 100)
    #[must_use]
    pub fn mass_basis(
        name: impl Into<String>,
        amount: f64,
        unit: &str,
        per_100g: MacroTotals,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.to_owned(),
            per_100g: Some(per_100g),
            per_unit: None,
        }
    }

    /// Discrete line (countable unit, macros per single unit)
    #[must_use]
    pub fn discrete(
        name: impl Into<String>,
        amount: f64,
        unit: &str,
        per_unit: MacroTotals,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.to_owned(),
            per_100g: None,
            per_unit: Some(per_unit),
        }
    }

    /// Parse a line from the JSON shape the generative service returns.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Shape`] when the JSON does not deserialize into
    /// an ingredient line at all; field-level shape rules are enforced later
    /// by [`crate::normalizer::validate_shape`].
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::shape(format!("malformed ingredient JSON: {e}")))
    }
}

/// Shape-validated ingredient line with a canonical unit and a tagged basis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLine {
    /// Ingredient name
    pub name: String,
    /// Literal amount in the canonical unit
    pub amount: f64,
    /// Canonical unit ("g", "ml", or a lower-trimmed discrete unit)
    pub unit: String,
    /// Tagged macro representation
    pub basis: MacroBasis,
}

impl NormalizedLine {
    /// Absolute macro contribution of this line at its literal amount
    #[must_use]
    pub fn contribution(&self) -> MacroTotals {
        self.basis.contribution(self.amount)
    }
}

/// Outcome of normalizing one ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Chosen order-of-magnitude factor (1, 10, or 100)
    pub correction_factor: u32,
    /// Whether the stated kcal value was replaced with the derived one
    pub kcal_was_repaired: bool,
    /// The normalized line, with corrections applied
    pub line: NormalizedLine,
}

impl CorrectionResult {
    /// The line was passed through untouched
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.correction_factor == 1 && !self.kcal_was_repaired
    }
}

// ============================================================================
// Recipe Parts
// ============================================================================

/// A named sub-preparation with its own scale and optional total yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePart {
    /// Part identity within the recipe
    pub id: Uuid,
    /// Display name ("Sauce", "Marinade", ...)
    pub name: String,
    /// Multiplier applied to this part's ingredients' literal amounts
    pub scale: f64,
    /// Total prepared output amount, used as the denominator when another
    /// part draws from this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_amount: Option<f64>,
    /// Unit of `yield_amount`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_unit: Option<String>,
}

impl RecipePart {
    /// Create a part with no declared yield
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>, scale: f64) -> Self {
        Self {
            id,
            name: name.into(),
            scale,
            yield_amount: None,
            yield_unit: None,
        }
    }

    /// Declare the part's total prepared output
    #[must_use]
    pub fn with_yield(mut self, amount: f64, unit: &str) -> Self {
        self.yield_amount = Some(amount);
        self.yield_unit = Some(unit.to_owned());
        self
    }
}

/// An ingredient line owned by a recipe part, optionally drawing its quantity
/// from another part's prepared output instead of its own literal amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartLine {
    /// Owning part; `None` means the recipe-level implicit part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<Uuid>,
    /// The normalized ingredient line
    pub line: NormalizedLine,
    /// Usage link: part whose prepared output this line draws from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_part_id: Option<Uuid>,
    /// Usage link: quantity drawn from the source part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_amount: Option<f64>,
    /// Usage link: unit of `used_amount`; must match the source's yield unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_unit: Option<String>,
}

impl PartLine {
    /// Plain line owned by `part_id` (or the implicit part when `None`)
    #[must_use]
    pub const fn new(part_id: Option<Uuid>, line: NormalizedLine) -> Self {
        Self {
            part_id,
            line,
            source_part_id: None,
            used_amount: None,
            used_unit: None,
        }
    }

    /// Attach a usage link drawing `amount` `unit` from `source`'s output
    #[must_use]
    pub fn drawing_from(mut self, source: Uuid, amount: f64, unit: &str) -> Self {
        self.source_part_id = Some(source);
        self.used_amount = Some(amount);
        self.used_unit = Some(unit.to_owned());
        self
    }

    /// Whether this line carries usage-link fields (resolution happens in the
    /// aggregator; a carried link may still fail to resolve)
    #[must_use]
    pub const fn has_usage_link(&self) -> bool {
        self.source_part_id.is_some()
    }
}
