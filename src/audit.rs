// ABOUTME: Import completeness auditor: compares pasted source text to generated output
// ABOUTME: Pure text heuristics; degrades to an empty report, never raises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Import Completeness Auditor
//!
//! When a user pastes a recipe and the generative service returns structured
//! data, content silently goes missing: an ingredient dropped, a sub-recipe
//! section collapsed, a step paraphrased away. The auditor compares the
//! pasted source against the generated output with deliberately loose text
//! heuristics and reports what it could not find.
//!
//! Match thresholds differ per list on purpose: a dropped ingredient is a
//! strict correctness bug (0.6), instructions are legitimately paraphrased
//! (0.25), and sub-recipe section names matter but may be referenced
//! obliquely (0.5).
//!
//! The auditor never raises. Text that does not look like a structured
//! recipe produces an empty report, and the caller decides whether to
//! regenerate.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::units::MEASURE_TOKENS;

// ============================================================================
// Thresholds and Vocabulary
// ============================================================================

/// Minimum non-blank lines for text to count as a structured recipe
const MIN_STRUCTURED_LINES: usize = 6;
/// Minimum quantity-bearing lines for text to count as a structured recipe
const MIN_QUANTITY_LINES: usize = 3;
/// Minimum raw length for a line to count as an instruction candidate
const MIN_INSTRUCTION_LEN: usize = 8;

/// Match ratio for ingredient candidates vs. generated ingredient names
const INGREDIENT_MATCH_RATIO: f64 = 0.6;
/// Match ratio for step candidates vs. generated instructions
const STEP_MATCH_RATIO: f64 = 0.25;
/// Match ratio for section candidates vs. generated ingredients+instructions
const SECTION_MATCH_RATIO: f64 = 0.5;

/// Marker words that open the instructions zone of a pasted recipe
const INSTRUCTION_MARKERS: &[&str] = &["directions", "instructions", "method", "preparation"];

/// Section headers too generic to count as sub-recipe sections
const GENERIC_SECTION_HEADERS: &[&str] = &[
    "directions",
    "instructions",
    "method",
    "preparation",
    "assembly",
    "ingredients",
];

/// Unicode vulgar-fraction glyphs that mark a quantity
const FRACTION_GLYPHS: &[char] = &[
    '¼', '½', '¾', '⅐', '⅑', '⅒', '⅓', '⅔', '⅕', '⅖', '⅗', '⅘', '⅙', '⅚', '⅛', '⅜', '⅝', '⅞',
];

/// Words carrying no matching signal: articles, connectives, common cooking
/// verbs, and the seasoning boilerplate of every recipe. Measurement tokens
/// from [`crate::units::MEASURE_TOKENS`] are excluded as well.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "into", "until", "then", "over", "about", "from", "each",
    "add", "mix", "stir", "cook", "bake", "heat", "boil", "simmer", "serve", "place", "remove",
    "combine", "pour", "chop", "slice", "dice", "mince", "whisk", "drain", "preheat", "season",
    "fresh", "large", "small", "medium", "optional", "finely", "roughly",
    "salt", "pepper", "taste",
];

/// Ascii fractions like "1/2" or "3 / 4"
static ASCII_FRACTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b\d+\s*/\s*\d+\b").ok());

/// `Word( Word)*:` section header lines ("Sauce:", "For the crust:")
static SECTION_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z'’-]*(?: [A-Za-z][A-Za-z'’-]*)*:\s*$").ok()
});

/// Parenthetical asides stripped from ingredient candidates
static PARENTHETICAL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\([^)]*\)").ok());

/// "to taste" idiom, any case
static TO_TASTE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)\bto taste\b").ok());

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word) || MEASURE_TOKENS.contains(&word)
}

// ============================================================================
// Report Types
// ============================================================================

/// Generated structured recipe content, as far as the auditor needs it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    /// Ingredient names in the generated output
    pub ingredients: Vec<String>,
    /// Instruction steps in the generated output
    pub instructions: Vec<String>,
}

/// Result of auditing a generated recipe against its pasted source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Whether the source text looked like a structured recipe at all
    pub is_structured_recipe: bool,
    /// Source ingredients with no counterpart in the generated output
    pub missing_ingredients: Vec<String>,
    /// Source instruction fragments with no counterpart in the output
    pub missing_steps: Vec<String>,
    /// Source section headers with no counterpart in the output
    pub missing_sections: Vec<String>,
}

impl CompletenessReport {
    /// Empty report for input that is not a structured recipe
    #[must_use]
    pub const fn unstructured() -> Self {
        Self {
            is_structured_recipe: false,
            missing_ingredients: Vec::new(),
            missing_steps: Vec::new(),
            missing_sections: Vec::new(),
        }
    }

    /// Nothing from the source went missing
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    /// Total number of unmatched source fragments
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing_ingredients.len() + self.missing_steps.len() + self.missing_sections.len()
    }
}

// ============================================================================
// Structure Detection
// ============================================================================

/// A line that states a quantity: leading numeral, fraction glyph, ascii
/// fraction, or the "to taste" idiom.
fn is_quantity_bearing(line: &str) -> bool {
    let trimmed = line.trim_start_matches(['-', '*', '•', '–', ' ', '\t']);
    if trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    if trimmed.contains(FRACTION_GLYPHS) {
        return true;
    }
    if ASCII_FRACTION
        .as_ref()
        .is_some_and(|re| re.is_match(trimmed))
    {
        return true;
    }
    line.to_lowercase().contains("to taste")
}

/// A short line opening the instructions zone ("Directions:", "Method")
fn is_instruction_marker(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() > 40 {
        return false;
    }
    let lowered = trimmed.to_lowercase();
    let first_word = lowered
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty());
    first_word.is_some_and(|w| INSTRUCTION_MARKERS.contains(&w))
}

/// Decide whether pasted text looks like a structured recipe: enough
/// non-blank lines, an instructions marker, and enough quantity-bearing
/// lines.
#[must_use]
pub fn detect_structured_recipe_input(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.len() < MIN_STRUCTURED_LINES {
        return false;
    }
    if !lines.iter().any(|l| is_instruction_marker(l)) {
        return false;
    }
    lines.iter().filter(|l| is_quantity_bearing(l)).count() >= MIN_QUANTITY_LINES
}

/// Source text split at the first instructions marker
struct SourceZones {
    ingredient_lines: Vec<String>,
    instruction_lines: Vec<String>,
}

fn split_sections(text: &str) -> SourceZones {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines.iter().position(|l| is_instruction_marker(l)).map_or_else(
        || SourceZones {
            // No marker: every quantity-bearing line is an ingredient
            // candidate and there is no instructions zone.
            ingredient_lines: lines
                .iter()
                .filter(|l| is_quantity_bearing(l))
                .map(|l| (*l).to_owned())
                .collect(),
            instruction_lines: Vec::new(),
        },
        |marker| SourceZones {
            ingredient_lines: lines[..marker].iter().map(|l| (*l).to_owned()).collect(),
            instruction_lines: lines[marker + 1..].iter().map(|l| (*l).to_owned()).collect(),
        },
    )
}

// ============================================================================
// Candidate Extraction
// ============================================================================

/// Lowercase, strip punctuation, collapse whitespace
fn normalize_fragment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_owned()
}

/// Order-preserving de-duplication on the normalized form
fn dedupe_ordered(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(normalize_fragment(item)))
        .collect()
}

fn is_quantity_token(token: &str) -> bool {
    if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    if token.contains(FRACTION_GLYPHS) {
        return true;
    }
    ASCII_FRACTION.as_ref().is_some_and(|re| re.is_match(token))
}

/// Strip bullets, parentheticals, leading quantity+unit tokens, and
/// "to taste" from an ingredient line, leaving the ingredient name.
fn clean_ingredient_candidate(line: &str) -> String {
    let without_bullet = line.trim_start_matches(['-', '*', '•', '–', ' ', '\t']);
    let without_parens = PARENTHETICAL.as_ref().map_or_else(
        || without_bullet.to_owned(),
        |re| re.replace_all(without_bullet, " ").into_owned(),
    );
    let without_taste = TO_TASTE.as_ref().map_or_else(
        || without_parens.clone(),
        |re| re.replace_all(&without_parens, " ").into_owned(),
    );

    let mut tokens = without_taste.split_whitespace().peekable();
    while let Some(token) = tokens.peek() {
        let bare = token
            .trim_matches(|c: char| {
                !c.is_alphanumeric() && !"¼½¾⅓⅔⅛⅜⅝⅞⅕⅖⅗⅘⅙⅚⅐⅑⅒/".contains(c)
            })
            .to_lowercase();
        if bare.is_empty()
            || is_quantity_token(&bare)
            || MEASURE_TOKENS.contains(&bare.as_str())
            || bare == "of"
        {
            tokens.next();
        } else {
            break;
        }
    }

    tokens
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches([',', '.', ';', ':', ' '])
        .to_owned()
}

fn extract_ingredient_candidates(zone: &[String]) -> Vec<String> {
    let kept: Vec<String> = zone
        .iter()
        .filter(|l| is_quantity_bearing(l) || l.to_lowercase().contains("to taste"))
        .map(|l| clean_ingredient_candidate(l))
        .filter(|c| c.len() >= 2)
        .collect();
    dedupe_ordered(kept)
}

fn is_section_header(line: &str) -> bool {
    SECTION_HEADER
        .as_ref()
        .is_some_and(|re| re.is_match(line.trim()))
}

fn is_generic_header(line: &str) -> bool {
    let lowered = line.trim().trim_end_matches(':').to_lowercase();
    let first_word = lowered
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty());
    first_word.is_some_and(|w| GENERIC_SECTION_HEADERS.contains(&w))
}

fn extract_instruction_candidates(zone: &[String]) -> Vec<String> {
    let kept: Vec<String> = zone
        .iter()
        .filter(|l| !is_section_header(l) && !is_instruction_marker(l))
        .filter(|l| l.trim().len() >= MIN_INSTRUCTION_LEN)
        .map(|l| normalize_fragment(l))
        .filter(|l| !l.is_empty())
        .collect();
    dedupe_ordered(kept)
}

fn extract_section_candidates(text: &str) -> Vec<String> {
    let kept: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && is_section_header(l) && !is_generic_header(l))
        .map(|l| normalize_fragment(l.trim_end_matches(':')))
        .filter(|l| !l.is_empty())
        .collect();
    dedupe_ordered(kept)
}

// ============================================================================
// Fuzzy Containment
// ============================================================================

/// Meaningful lowercase words: length ≥ 3, not a stopword or measure token
fn meaningful_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3 && !is_stopword(w))
        .map(str::to_owned)
        .collect()
}

fn fuzzy_contains_set(haystack: &HashSet<String>, token: &str, min_ratio: f64) -> bool {
    let words: HashSet<String> = meaningful_words(token).into_iter().collect();
    if words.is_empty() {
        // All-stopword fragments ("salt and pepper to taste") carry no
        // matchable signal and are trivially satisfied.
        return true;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let required = ((words.len() as f64 * min_ratio).floor() as usize).max(1);
    let matched = words.iter().filter(|w| haystack.contains(*w)).count();
    matched >= required
}

/// Fuzzy word-overlap containment used by the completeness evaluation.
///
/// `token` counts as contained when at least `max(1, floor(word_count ×
/// min_ratio))` of its distinct meaningful words appear in `haystack`.
#[must_use]
pub fn fuzzy_contains(haystack: &str, token: &str, min_ratio: f64) -> bool {
    let hay: HashSet<String> = meaningful_words(haystack).into_iter().collect();
    fuzzy_contains_set(&hay, token, min_ratio)
}

// ============================================================================
// Evaluation
// ============================================================================

/// Audit a generated recipe against the pasted source text it came from.
///
/// Unstructured input produces `CompletenessReport::unstructured()`; this
/// function never fails. Miss-lists preserve discovery order and are
/// de-duplicated.
#[must_use]
pub fn evaluate_recipe_import_completeness(
    source_text: &str,
    generated: &GeneratedRecipe,
) -> CompletenessReport {
    if !detect_structured_recipe_input(source_text) {
        return CompletenessReport::unstructured();
    }

    let zones = split_sections(source_text);
    let ingredient_candidates = extract_ingredient_candidates(&zones.ingredient_lines);
    let step_candidates = extract_instruction_candidates(&zones.instruction_lines);
    let section_candidates = extract_section_candidates(source_text);

    let ingredient_hay: HashSet<String> =
        meaningful_words(&generated.ingredients.join(" ")).into_iter().collect();
    let instruction_hay: HashSet<String> =
        meaningful_words(&generated.instructions.join(" ")).into_iter().collect();
    let combined_hay: HashSet<String> =
        ingredient_hay.union(&instruction_hay).cloned().collect();

    let missing_ingredients = ingredient_candidates
        .into_iter()
        .filter(|c| !fuzzy_contains_set(&ingredient_hay, c, INGREDIENT_MATCH_RATIO))
        .collect();
    let missing_steps = step_candidates
        .into_iter()
        .filter(|c| !fuzzy_contains_set(&instruction_hay, c, STEP_MATCH_RATIO))
        .collect();
    let missing_sections = section_candidates
        .into_iter()
        .filter(|c| !fuzzy_contains_set(&combined_hay, c, SECTION_MATCH_RATIO))
        .collect();

    CompletenessReport {
        is_structured_recipe: true,
        missing_ingredients,
        missing_steps,
        missing_sections,
    }
}
