// ABOUTME: Part graph aggregator: prepared/consumed macro totals across recipe sub-parts
// ABOUTME: Two strictly sequenced passes; defensive fallbacks, never raises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Part Graph Aggregator
//!
//! A recipe's sub-parts may consume one another's prepared output: the main
//! part of a pasta dish draws 15 g from a 200 g sauce batch. Counting both
//! the whole batch and the portion served would double the macros; counting
//! only the portion and dropping a batch nobody draws from would lose them.
//!
//! The aggregator resolves this with two strictly sequenced passes over a
//! read-only intermediate: a *prepared* pass accumulating what every part
//! produces from its literal ingredients, then a *consumed* pass that
//! distributes prepared totals through resolved usage links and falls back to
//! literal counting whenever a link fails to resolve. Inputs are assumed
//! pre-validated, so malformed references are dropped defensively rather than
//! raised.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::{MacroTotals, PartLine, RecipePart};
use crate::units::canonical_unit;

/// Per-part and whole-recipe macro totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartMacros {
    /// Recipe-countable total: sum of all parts' consumed totals
    pub total: MacroTotals,
    /// What each part produces from its own literal ingredient lines
    pub prepared_by_part: HashMap<Uuid, MacroTotals>,
    /// What each part contributes to the countable recipe total
    pub consumed_by_part: HashMap<Uuid, MacroTotals>,
}

/// A usage link that resolved against an existing source part
struct ResolvedLink {
    source_id: Uuid,
    /// Fraction of the source's prepared macros this line draws
    ratio: f64,
}

/// Divide a recipe total into per-serving macros.
///
/// Zero or negative serving counts yield the untouched total; catalog
/// construction guards against them separately.
#[must_use]
pub fn per_serving(total: &MacroTotals, servings: f64) -> MacroTotals {
    if servings > 0.0 {
        total.scaled(1.0 / servings)
    } else {
        *total
    }
}

/// Compute per-part prepared/consumed macros and the recipe total.
///
/// Lines owned by no part (or by an unknown part id) fold into an implicit
/// part of scale 1 keyed by `Uuid::nil()`: the aggregator's contract is that
/// macros are never silently lost. This function never fails.
#[must_use]
pub fn compute_part_macros(parts: &[RecipePart], lines: &[PartLine]) -> PartMacros {
    let part_index: HashMap<Uuid, &RecipePart> = parts.iter().map(|p| (p.id, p)).collect();

    let owner_of = |line: &PartLine| -> Uuid {
        line.part_id
            .filter(|id| part_index.contains_key(id))
            .unwrap_or(Uuid::nil())
    };
    let scale_of = |id: Uuid| -> f64 { part_index.get(&id).map_or(1.0, |p| p.scale) };

    // Resolve every usage link up front. The resolved-source set must be
    // complete before the consumed pass starts, and a link that fails any
    // check degrades the line to literal counting in both passes.
    let resolved: Vec<Option<ResolvedLink>> = lines
        .iter()
        .map(|line| resolve_link(line, &part_index, scale_of(owner_of(line))))
        .collect();

    let referenced_sources: HashSet<Uuid> = resolved
        .iter()
        .flatten()
        .map(|link| link.source_id)
        .collect();

    // Prepared pass: literal contributions of every non-link line.
    let mut prepared_by_part: HashMap<Uuid, MacroTotals> =
        parts.iter().map(|p| (p.id, MacroTotals::default())).collect();
    for (line, link) in lines.iter().zip(&resolved) {
        if link.is_some() {
            continue;
        }
        let owner = owner_of(line);
        let contribution = line.line.contribution().scaled(scale_of(owner));
        prepared_by_part
            .entry(owner)
            .or_default()
            .add(&contribution);
    }

    // Consumed pass: reads prepared totals, never writes them.
    let mut consumed_by_part: HashMap<Uuid, MacroTotals> =
        parts.iter().map(|p| (p.id, MacroTotals::default())).collect();
    for (line, link) in lines.iter().zip(&resolved) {
        let owner = owner_of(line);
        match link {
            Some(resolved_link) => {
                let source_prepared = prepared_by_part
                    .get(&resolved_link.source_id)
                    .copied()
                    .unwrap_or_default();
                consumed_by_part
                    .entry(owner)
                    .or_default()
                    .add(&source_prepared.scaled(resolved_link.ratio));
            }
            // A part whose output is drawn on by a resolved link is already
            // distributed through its consuming lines.
            None if referenced_sources.contains(&owner) => {}
            None => {
                let contribution = line.line.contribution().scaled(scale_of(owner));
                consumed_by_part
                    .entry(owner)
                    .or_default()
                    .add(&contribution);
            }
        }
    }

    let mut total = MacroTotals::default();
    for part_total in consumed_by_part.values() {
        total.add(part_total);
    }

    PartMacros {
        total,
        prepared_by_part,
        consumed_by_part,
    }
}

/// Try to resolve a line's usage link.
///
/// Requires an existing source part, a declared positive yield, and a
/// canonical-unit match between the drawn amount and the yield. Any failure
/// returns `None`, which the caller treats as literal-amount counting.
fn resolve_link(
    line: &PartLine,
    part_index: &HashMap<Uuid, &RecipePart>,
    consuming_scale: f64,
) -> Option<ResolvedLink> {
    let source_id = line.source_part_id?;
    let Some(source) = part_index.get(&source_id) else {
        warn!(
            ingredient = %line.line.name,
            source = %source_id,
            "usage link references a missing part, counting literally"
        );
        return None;
    };

    let used_amount = line.used_amount?;
    let used_unit = line.used_unit.as_deref()?;
    let yield_amount = source.yield_amount?;
    let yield_unit = source.yield_unit.as_deref()?;

    if canonical_unit(used_unit) != canonical_unit(yield_unit) {
        return None;
    }

    let denominator = yield_amount * source.scale;
    if denominator <= 0.0 || used_amount < 0.0 {
        return None;
    }

    Some(ResolvedLink {
        source_id,
        ratio: used_amount * consuming_scale / denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MacroBasis, NormalizedLine};

    fn mass_line(name: &str, amount: f64, per_100: MacroTotals) -> NormalizedLine {
        NormalizedLine {
            name: name.to_owned(),
            amount,
            unit: "g".to_owned(),
            basis: MacroBasis::Per100G(per_100),
        }
    }

    #[test]
    fn test_no_parts_behaves_as_implicit_part() {
        let lines = vec![PartLine::new(
            None,
            mass_line("chicken", 200.0, MacroTotals::new(165.0, 31.0, 0.0, 3.6)),
        )];
        let result = compute_part_macros(&[], &lines);
        assert!((result.total.kcal - 330.0).abs() < 1e-9);
        assert!(result.consumed_by_part.contains_key(&Uuid::nil()));
    }

    #[test]
    fn test_dangling_owner_folds_into_implicit_part() {
        let lines = vec![PartLine::new(
            Some(Uuid::new_v4()),
            mass_line("rice", 100.0, MacroTotals::new(360.0, 7.0, 79.0, 0.6)),
        )];
        let result = compute_part_macros(&[], &lines);
        assert!((result.total.kcal - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_link_does_not_lose_macros() {
        let part_id = Uuid::new_v4();
        let part = RecipePart::new(part_id, "Dough", 1.0).with_yield(500.0, "g");
        let lines = vec![
            PartLine::new(
                Some(part_id),
                mass_line("flour", 500.0, MacroTotals::new(364.0, 10.0, 76.0, 1.0)),
            ),
            PartLine::new(
                Some(part_id),
                mass_line("dough", 250.0, MacroTotals::new(0.0, 0.0, 0.0, 0.0)),
            )
            .drawing_from(part_id, 250.0, "g"),
        ];
        let result = compute_part_macros(&[part], &lines);
        // Half of the prepared dough is consumed; the flour line itself is
        // skipped because the part is a referenced source.
        assert!((result.total.kcal - 910.0).abs() < 1e-9);
    }
}
