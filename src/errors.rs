// ABOUTME: Unified error taxonomy for the nutrition engine
// ABOUTME: Validation, shape, and domain errors with constructor helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutricore Project

//! # Error Handling
//!
//! Three error classes cover every failure the engine can report:
//!
//! - [`EngineError::Validation`]: a macro field is non-finite or negative
//! - [`EngineError::Shape`]: macro-set presence/kind disagrees with the
//!   ingredient's unit class
//! - [`EngineError::Domain`]: meal-plan preconditions unmet
//!
//! Validation and shape errors propagate immediately to the caller, which
//! typically requests a regeneration from the upstream text service. The
//! auditor and the part-graph aggregator never raise; they degrade
//! defensively instead.

use thiserror::Error;

/// Unified error type for the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A macro field is non-finite or negative
    #[error("invalid macro data: {0}")]
    Validation(String),

    /// Macro-set presence or kind disagrees with the unit class
    #[error("macro shape mismatch: {0}")]
    Shape(String),

    /// Meal-plan preconditions unmet
    #[error("meal plan precondition failed: {0}")]
    Domain(String),
}

impl EngineError {
    /// Non-finite or negative macro field
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Macro-set presence/kind disagrees with the unit class
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Meal-plan precondition failure
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// Check whether this error should trigger an upstream regeneration
    /// request (validation and shape errors do; domain errors do not).
    #[must_use]
    pub const fn is_regenerable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Shape(_))
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
